use thiserror::Error;

use crate::ladder::LadderError;
use crate::model::{CardError, DeckError, RatingError};

/// Any error produced by the core domain types.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Ladder(#[from] LadderError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeckDraft, Rating};

    fn parse_and_validate(raw: u8, deck: DeckDraft) -> Result<Rating, Error> {
        deck.validate()?;
        Ok(Rating::from_u8(raw)?)
    }

    #[test]
    fn domain_errors_convert_with_question_mark() {
        let empty = DeckDraft::new("net", "Networking", "net.json");
        assert!(matches!(
            parse_and_validate(3, empty),
            Err(Error::Deck(DeckError::NoCards))
        ));

        let ok = DeckDraft::new("net", "Networking", "net.json")
            .with_card(crate::model::CardDraft::new("q", "a"));
        assert!(matches!(
            parse_and_validate(7, ok),
            Err(Error::Rating(RatingError::OutOfRange(7)))
        ));
    }
}
