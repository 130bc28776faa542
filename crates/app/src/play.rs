//! Line-based terminal front end: renders a `GameView` and turns keystrokes
//! into session events.

use std::error::Error;
use std::io::{BufRead, Write};

use flash_core::model::Rating;
use services::{GameLoopService, GamePhase, GameSession, GameView};

type PlayResult<T> = Result<T, Box<dyn Error>>;

/// Run `session` until the player quits or input ends.
pub async fn play<R: BufRead, W: Write>(
    game: &GameLoopService,
    session: &mut GameSession,
    input: &mut R,
    out: &mut W,
) -> PlayResult<()> {
    loop {
        let view = GameView::from(&*session);
        match view.phase {
            GamePhase::Loading => return Err("session did not finish loading".into()),
            GamePhase::Error => {
                writeln!(
                    out,
                    "Could not start: {}",
                    view.error.as_deref().unwrap_or("unknown error")
                )?;
                match prompt(input, out, "[r]etry or [q]uit > ")?.as_deref() {
                    Some("r") => {
                        game.retry(session).await?;
                    }
                    Some("q") | None => return Ok(()),
                    Some(_) => {}
                }
            }
            GamePhase::BlindIntro => {
                render_intro(&view, out)?;
                match prompt(input, out, "[enter] start, [q]uit > ")?.as_deref() {
                    Some("q") | None => return Ok(()),
                    Some(_) => {
                        game.start_tier(session)?;
                    }
                }
            }
            GamePhase::Playing => {
                let Some(card) = &view.card else {
                    return Ok(());
                };
                let stage = match &view.tier {
                    Some(tier) if view.is_blind() => format!("{} ", tier.tier.label),
                    _ => String::new(),
                };
                writeln!(
                    out,
                    "\n[{stage}{}/{}] {}",
                    view.progress.answered + 1,
                    view.progress.total,
                    card.question
                )?;
                if prompt(input, out, "[enter] reveal > ")?.as_deref() == Some("q") {
                    return Ok(());
                }
                writeln!(out, "  {}", card.answer)?;

                let Some(rating) = ask_rating(input, out)? else {
                    return Ok(());
                };
                let answer = game.rate(session, rating).await?;
                if !answer.persisted {
                    writeln!(out, "(progress for this card could not be saved)")?;
                }
                if let Some(outcome) = answer.tier {
                    writeln!(
                        out,
                        "\nTier {}: {}/{} correct, {} (+{} points)",
                        outcome.tier_index + 1,
                        outcome.correct,
                        outcome.dealt,
                        if outcome.passed { "passed" } else { "failed" },
                        outcome.earned
                    )?;
                }
            }
            GamePhase::Results => {
                render_summary(&view, out)?;
                match prompt(input, out, "study [a]gain or [q]uit > ")?.as_deref() {
                    Some("a") => {
                        game.study_again(session)?;
                    }
                    Some("q") | None => return Ok(()),
                    Some(_) => {}
                }
            }
            GamePhase::RoundOver => {
                if view.ladder_cleared {
                    writeln!(out, "\nLadder cleared!")?;
                } else {
                    writeln!(out, "\nRound over after {} blind(s).", view.blinds_reached)?;
                }
                writeln!(out, "Score: {}", view.score)?;
                render_summary(&view, out)?;
                match prompt(input, out, "[n]ew round or [q]uit > ")?.as_deref() {
                    Some("n") => {
                        game.new_round(session)?;
                    }
                    Some("q") | None => return Ok(()),
                    Some(_) => {}
                }
            }
        }
    }
}

fn render_intro<W: Write>(view: &GameView, out: &mut W) -> PlayResult<()> {
    if let Some(tier) = &view.tier {
        writeln!(
            out,
            "\n== {} ({}/{}) ==\n{} cards, pass at {:.0}%, x{} points. Score so far: {}",
            tier.tier.label,
            tier.index + 1,
            tier.of,
            view.progress.total,
            tier.tier.threshold * 100.0,
            tier.tier.point_multiplier,
            view.score
        )?;
    }
    Ok(())
}

fn render_summary<W: Write>(view: &GameView, out: &mut W) -> PlayResult<()> {
    let s = &view.summary;
    write!(out, "{}/{} correct ({}%)", s.correct(), s.total(), s.pct())?;
    for rating in Rating::ALL {
        write!(out, "  {} {}", rating.label(), s.count(rating))?;
    }
    writeln!(out)?;
    Ok(())
}

fn rating_prompt() -> String {
    let options: Vec<String> = Rating::ALL
        .iter()
        .map(|r| format!("{} {}", r.value(), r.label()))
        .collect();
    format!("rate {} > ", options.join(", "))
}

fn ask_rating<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> PlayResult<Option<Rating>> {
    let text = rating_prompt();
    loop {
        let line = prompt(input, out, &text)?;
        let Some(line) = line else {
            return Ok(None);
        };
        if line == "q" {
            return Ok(None);
        }
        match parse_rating(&line) {
            Some(rating) => return Ok(Some(rating)),
            None => writeln!(out, "enter a number from 1 to 4")?,
        }
    }
}

fn parse_rating(raw: &str) -> Option<Rating> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(|v| Rating::from_u8(v).ok())
}

/// Print `text` and read one trimmed line; `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> PlayResult<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}
