use quiz_core::model::{GameResult, Player, PlayerId, PlayerName};
use quiz_core::time::fixed_now;
use storage::repository::{PlayerRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_player(name: &str) -> Player {
    Player::new(
        PlayerId::generate(),
        PlayerName::new(name).unwrap(),
        fixed_now(),
    )
}

#[tokio::test]
async fn sqlite_roundtrip_persists_stats() {
    let repo = connect("memdb_player_roundtrip").await;

    let mut player = build_player("Ann");
    repo.upsert_player(&player).await.unwrap();

    player
        .record_game(
            GameResult {
                score: 10,
                boss_played: true,
            },
            fixed_now(),
        )
        .unwrap();
    player
        .record_game(
            GameResult {
                score: 3,
                boss_played: false,
            },
            fixed_now(),
        )
        .unwrap();
    repo.upsert_player(&player).await.unwrap();

    let fetched = repo.get_player(player.id()).await.expect("fetch");
    assert_eq!(fetched.name().as_str(), "Ann");
    assert_eq!(fetched.stats(), player.stats());
    assert_eq!(fetched.stats().perfect_games, 1);
    assert_eq!(fetched.stats().boss_levels_completed, 1);
    assert_eq!(fetched.last_played(), Some(fixed_now()));
}

#[tokio::test]
async fn sqlite_finds_player_by_name() {
    let repo = connect("memdb_player_by_name").await;
    let player = build_player("Nivin");
    repo.upsert_player(&player).await.unwrap();

    let found = repo
        .find_player_by_name(&PlayerName::new("Nivin").unwrap())
        .await
        .unwrap()
        .expect("player exists");
    assert_eq!(found.id(), player.id());

    let missing = repo
        .find_player_by_name(&PlayerName::new("Nobody").unwrap())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn sqlite_rejects_duplicate_names() {
    let repo = connect("memdb_player_conflict").await;
    repo.upsert_player(&build_player("Ann")).await.unwrap();
    let err = repo.upsert_player(&build_player("Ann")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_missing_player_is_not_found() {
    let repo = connect("memdb_player_missing").await;
    let err = repo.get_player(PlayerId::generate()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_bundle_opens_migrated_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage_bundle?mode=memory&cache=shared")
        .await
        .expect("open storage");
    let player = build_player("Ann");
    storage.players.upsert_player(&player).await.unwrap();
    let found = storage
        .players
        .find_player_by_name(player.name())
        .await
        .unwrap();
    assert_eq!(found, Some(player));
}
