use std::sync::Arc;

use async_trait::async_trait;
use flash_core::model::{CardDraft, CardId, CardStats, DeckDraft, DeckId, Rating, StatsMap};
use flash_core::time::{fixed_clock, fixed_now};
use flash_core::{BlindLadder, BlindTier};
use services::{AppServices, GamePhase, GameView};
use storage::repository::{StatsStore, Storage, StorageError};
use storage::{InMemoryDeckSource, InMemoryStatsStore};

fn deck(id: &str, path: &str, cards: usize) -> DeckDraft {
    (0..cards).fold(DeckDraft::new(id, format!("Deck {id}"), path), |d, i| {
        d.with_card(CardDraft::new(format!("{id} Q{i}"), format!("{id} A{i}")))
    })
}

fn services_with(decks: InMemoryDeckSource, stats: Arc<dyn StatsStore>) -> AppServices {
    let storage = Storage {
        stats,
        decks: Arc::new(decks),
    };
    AppServices::from_storage(&storage, fixed_clock(), BlindLadder::standard())
}

#[tokio::test]
async fn unit_session_on_unseen_deck_scores_full_marks_and_persists() {
    let decks = InMemoryDeckSource::new();
    decks.add_deck(deck("net", "unit-1/net.json", 3)).unwrap();
    let store = InMemoryStatsStore::new();
    let app = services_with(decks, Arc::new(store.clone()));
    let game = app.game_loop();

    let mut session = game.start_unit("unit-1", &DeckId::new("net")).await.unwrap();
    assert_eq!(session.phase(), GamePhase::Playing);

    for _ in 0..3 {
        let answer = game.rate(&mut session, Rating::Good).await.unwrap();
        assert!(answer.persisted);
    }
    assert_eq!(session.phase(), GamePhase::Results);

    let view = GameView::from(&session);
    assert_eq!(view.summary.correct(), 3);
    assert_eq!(view.summary.total(), 3);
    assert_eq!(view.summary.pct(), 100);

    let stored = store.load_all().await.unwrap();
    assert_eq!(stored.len(), 3);
    for i in 0..3 {
        let stats = &stored[&CardId::new(format!("net-{i}"))];
        assert_eq!(stats.reviews, 1);
        assert_eq!(stats.interval, 1);
    }

    let overview = app
        .stats_service()
        .deck_overview(
            &app.deck_service()
                .find_deck("", &DeckId::new("net"))
                .await
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(overview.unseen, 0);
    assert_eq!(overview.scheduled, 3);
}

struct FailingStore;

#[async_trait]
impl StatsStore for FailingStore {
    async fn load_all(&self) -> Result<StatsMap, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
    async fn save_one(&self, _stats: &CardStats) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
    async fn save_batch(&self, _stats: &[CardStats]) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn persistence_failures_do_not_stop_the_session() {
    let decks = InMemoryDeckSource::new();
    decks.add_deck(deck("net", "net.json", 2)).unwrap();
    let app = services_with(decks, Arc::new(FailingStore));
    let game = app.game_loop();

    let mut session = game.start_unit("", &DeckId::new("net")).await.unwrap();
    let first = game.rate(&mut session, Rating::Again).await.unwrap();
    assert!(!first.persisted);
    assert_eq!(first.rated.lapses, 1);
    let second = game.rate(&mut session, Rating::Easy).await.unwrap();
    assert!(!second.persisted);

    assert_eq!(session.phase(), GamePhase::Results);
    assert_eq!(session.summary().correct(), 1);
    // in-memory stats keep the update even though the store lost it
    assert_eq!(session.stats()[&CardId::new("net-0")].lapses, 1);
}

#[tokio::test]
async fn broken_decks_are_dropped_and_the_rest_still_play() {
    let decks = InMemoryDeckSource::new();
    decks.add_deck(deck("net", "u1/net.json", 4)).unwrap();
    decks.add_deck(deck("os", "u1/os.json", 0)).unwrap();
    decks.add_unreadable("u1/db.json", "unexpected end of file").unwrap();
    decks.add_deck(deck("algo", "u1/algo.json", 4)).unwrap();
    let app = services_with(decks, Arc::new(InMemoryStatsStore::new()));

    let report = app.deck_service().load_scope("u1").await.unwrap();
    assert_eq!(report.decks.len(), 2);
    assert_eq!(report.rejected.len(), 2);

    let session = app.game_loop().start_random("u1").await.unwrap();
    assert_eq!(session.phase(), GamePhase::BlindIntro);
    assert_eq!(session.queue().len(), 5);
}

#[tokio::test]
async fn missing_deck_lands_in_error_and_retry_recovers() {
    let decks = InMemoryDeckSource::new();
    let app = services_with(decks.clone(), Arc::new(InMemoryStatsStore::new()));
    let game = app.game_loop();

    let mut session = game.start_unit("", &DeckId::new("net")).await.unwrap();
    assert_eq!(session.phase(), GamePhase::Error);
    assert!(session.error().unwrap().contains("net"));

    assert!(game.rate(&mut session, Rating::Good).await.is_err());

    decks.add_deck(deck("net", "net.json", 2)).unwrap();
    let phase = game.retry(&mut session).await.unwrap();
    assert_eq!(phase, GamePhase::Playing);
    assert_eq!(session.error(), None);
}

#[tokio::test]
async fn blind_round_climbs_the_ladder_and_clears_it() {
    let decks = InMemoryDeckSource::new();
    decks.add_deck(deck("net", "net.json", 6)).unwrap();
    let store = InMemoryStatsStore::new();
    let storage = Storage {
        stats: Arc::new(store.clone()),
        decks: Arc::new(decks),
    };
    let ladder = BlindLadder::new(vec![
        BlindTier::new("small", "Small", 2, 0.5, 1.0),
        BlindTier::new("boss", "Boss", 3, 1.0, 2.0),
    ])
    .unwrap();
    let app = AppServices::from_storage(&storage, fixed_clock(), ladder);
    let game = app.game_loop();

    let mut session = game.start_random("").await.unwrap();
    assert_eq!(game.start_tier(&mut session).unwrap(), GamePhase::Playing);
    game.rate(&mut session, Rating::Again).await.unwrap();
    let end_of_small = game.rate(&mut session, Rating::Good).await.unwrap();
    let small = end_of_small.tier.unwrap();
    assert!(small.passed);
    assert_eq!(small.earned, 100);
    assert_eq!(end_of_small.phase, GamePhase::BlindIntro);

    game.start_tier(&mut session).unwrap();
    for _ in 0..3 {
        game.rate(&mut session, Rating::Easy).await.unwrap();
    }
    assert_eq!(session.phase(), GamePhase::RoundOver);
    assert!(session.ladder_cleared());
    assert_eq!(session.score(), 100 + 600);

    let view = GameView::from(&session);
    assert_eq!(view.blinds_reached, 2);
    assert_eq!(view.summary.total(), 5);

    // every rating was written through
    let stored = store.load_all().await.unwrap();
    let reviews: u32 = stored.values().map(|s| s.reviews).sum();
    assert_eq!(reviews, 5);
    assert!(stored.values().all(|s| s.due >= fixed_now()));

    assert_eq!(game.new_round(&mut session).unwrap(), GamePhase::BlindIntro);
    assert_eq!(session.score(), 0);
}

#[tokio::test]
async fn deck_with_colliding_card_ids_is_never_played() {
    let decks = InMemoryDeckSource::new();
    decks
        .add_deck(
            DeckDraft::new("net", "Networking", "net.json")
                .with_card(CardDraft::new("What is TCP?", "Stream").with_id("net-1"))
                .with_card(CardDraft::new("What is UDP?", "Datagrams")),
        )
        .unwrap();
    decks.add_deck(deck("os", "os.json", 2)).unwrap();
    let store = InMemoryStatsStore::new();
    let app = services_with(decks, Arc::new(store.clone()));

    let report = app.deck_service().load_scope("").await.unwrap();
    assert_eq!(report.decks.len(), 1);
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected[0].reason.contains("net-1"));

    let game = app.game_loop();
    let mut session = game.start_unit("", &DeckId::new("net")).await.unwrap();
    assert_eq!(session.phase(), GamePhase::Error);
    assert!(session.queue().is_empty());
    assert!(store.load_all().await.unwrap().is_empty());

    let mut session = game.start_unit("", &DeckId::new("os")).await.unwrap();
    for _ in 0..2 {
        game.rate(&mut session, Rating::Good).await.unwrap();
    }
    let stored = store.load_all().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.values().all(|s| s.reviews == 1));
}
