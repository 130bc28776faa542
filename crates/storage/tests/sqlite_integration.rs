use flash_core::model::{CardId, CardStats, Rating};
use flash_core::scheduler::apply_rating;
use flash_core::time::fixed_now;
use sqlx::Row;
use storage::StatsStore;
use storage::blob::STATS_KEY;
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn rated(id: &str, rating: Rating) -> CardStats {
    apply_rating(
        &CardStats::unseen(CardId::new(id), fixed_now()),
        rating,
        fixed_now(),
    )
}

#[tokio::test]
async fn empty_store_loads_nothing() {
    let repo = repo("memdb_empty").await;
    assert!(repo.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_one_and_batch_round_trip_through_single_blob() {
    let repo = repo("memdb_roundtrip").await;

    repo.save_one(&rated("net-0", Rating::Good)).await.unwrap();
    repo.save_batch(&[rated("net-1", Rating::Again), rated("net-2", Rating::Easy)])
        .await
        .unwrap();

    let all = repo.load_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[&CardId::new("net-1")].lapses, 1);
    assert_eq!(all[&CardId::new("net-2")].interval, 4);

    let rows = sqlx::query("SELECT key, value FROM kv_store")
        .fetch_all(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let key: String = rows[0].get("key");
    assert_eq!(key, STATS_KEY);
    let value: String = rows[0].get("value");
    let parsed: serde_json::Value = serde_json::from_str(&value).unwrap();
    assert_eq!(parsed["net-0"]["reviews"], 1);
}

#[tokio::test]
async fn later_writes_replace_earlier_ones() {
    let repo = repo("memdb_lww").await;

    let first = rated("a", Rating::Good);
    let second = apply_rating(&first, Rating::Hard, fixed_now());
    repo.save_one(&first).await.unwrap();
    repo.save_one(&second).await.unwrap();

    let all = repo.load_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[&CardId::new("a")], second);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = repo("memdb_migrate_twice").await;
    repo.save_one(&rated("a", Rating::Good)).await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.load_all().await.unwrap().len(), 1);
}
