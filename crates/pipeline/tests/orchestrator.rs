//! Integration tests for full load runs.
//!
//! Covers stage ordering, skip-not-fail on unresolved references,
//! referential integrity of the junction table, and recovery after a run
//! that failed part-way through.

mod common;

use assert_matches::assert_matches;
use common::{genre, jan, link, movie, popular_snapshot, session_for, stat};
use reelstats_core::records::NormalizedBatches;
use reelstats_core::run_state::LoadStage;
use reelstats_db::repositories::{DailyStatRepo, GenreRepo, MovieGenreRepo, MovieRepo};
use reelstats_db::{DbConfig, DbError};
use reelstats_pipeline::{LoadError, LoadOrchestrator, RunResult, StageError};
use sqlx::PgPool;

#[tokio::test]
async fn test_unreachable_store_fails_before_any_stage() {
    let config = DbConfig {
        url: None,
        host: "127.0.0.1".into(),
        port: 1,
        database: Some("movies".into()),
        user: Some("etl".into()),
        password: None,
    };

    let err = LoadOrchestrator::run(&config, &popular_snapshot())
        .await
        .unwrap_err();

    assert_matches!(&err, LoadError::Connection(DbError::Connection(_)));
    assert_eq!(err.stage(), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_run_loads_every_stage(pool: PgPool) {
    let session = session_for(&pool).await;
    let result = LoadOrchestrator::run_with_session(session, &popular_snapshot())
        .await
        .unwrap();

    assert_eq!(
        result,
        RunResult {
            genres_loaded: 3,
            movies_loaded: 2,
            links_loaded: 4,
            links_skipped: 0,
            stats_loaded: 2,
            stats_skipped: 0,
        }
    );

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(GenreRepo::count(&mut conn).await.unwrap(), 3);
    assert_eq!(MovieRepo::count(&mut conn).await.unwrap(), 2);
    assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 4);
    assert_eq!(DailyStatRepo::count(&mut conn).await.unwrap(), 2);
    assert_eq!(MovieGenreRepo::count_dangling(&mut conn).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rerun_is_idempotent(pool: PgPool) {
    let batches = popular_snapshot();

    let first = LoadOrchestrator::run_with_session(session_for(&pool).await, &batches)
        .await
        .unwrap();
    let second = LoadOrchestrator::run_with_session(session_for(&pool).await, &batches)
        .await
        .unwrap();

    assert_eq!(first, second);
    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(GenreRepo::count(&mut conn).await.unwrap(), 3);
    assert_eq!(MovieRepo::count(&mut conn).await.unwrap(), 2);
    assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 4);
    assert_eq!(DailyStatRepo::count(&mut conn).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unresolved_link_is_skipped_and_run_reaches_stats(pool: PgPool) {
    let batches = NormalizedBatches {
        genres: vec![genre(28, "Action")],
        movies: vec![movie(550, "Fight Club")],
        movie_genres: vec![link(999_999, 28), link(550, 28)],
        daily_stats: vec![stat(550, jan(1), 80.1)],
    };

    let result = LoadOrchestrator::run_with_session(session_for(&pool).await, &batches)
        .await
        .unwrap();

    assert_eq!(result.links_loaded, 1);
    assert_eq!(result.links_skipped, 1);
    assert_eq!(result.stats_loaded, 1);

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 1);
    assert_eq!(MovieGenreRepo::count_dangling(&mut conn).await.unwrap(), 0);
    assert_eq!(DailyStatRepo::count(&mut conn).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_links_without_movies_in_batch_resolve_against_earlier_runs(pool: PgPool) {
    LoadOrchestrator::run_with_session(session_for(&pool).await, &popular_snapshot())
        .await
        .unwrap();

    let links_only = NormalizedBatches {
        movie_genres: vec![link(550, 28)],
        ..Default::default()
    };
    let result = LoadOrchestrator::run_with_session(session_for(&pool).await, &links_only)
        .await
        .unwrap();

    assert_eq!(result.genres_loaded, 0);
    assert_eq!(result.movies_loaded, 0);
    assert_eq!(result.links_loaded, 1);
    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_stats_stage_keeps_earlier_stages_and_rerun_recovers(pool: PgPool) {
    let mut batches = popular_snapshot();
    batches.daily_stats[1].vote_average = 11.0;

    let err = LoadOrchestrator::run_with_session(session_for(&pool).await, &batches)
        .await
        .unwrap_err();

    assert_matches!(
        &err,
        LoadError::Stage {
            stage: LoadStage::DailyStats,
            last_completed: Some(LoadStage::MovieGenres),
            cause: StageError::ConstraintViolation(_),
        }
    );
    {
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(GenreRepo::count(&mut conn).await.unwrap(), 3);
        assert_eq!(MovieRepo::count(&mut conn).await.unwrap(), 2);
        assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 4);
        assert_eq!(DailyStatRepo::count(&mut conn).await.unwrap(), 0);
    }

    let fixed = popular_snapshot();
    let result = LoadOrchestrator::run_with_session(session_for(&pool).await, &fixed)
        .await
        .unwrap();

    assert_eq!(result.stats_loaded, 2);
    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(MovieRepo::count(&mut conn).await.unwrap(), 2);
    assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 4);
    assert_eq!(DailyStatRepo::count(&mut conn).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_movies_stage_stops_before_links(pool: PgPool) {
    let mut batches = popular_snapshot();
    batches.movies[0].budget = -1;

    let err = LoadOrchestrator::run_with_session(session_for(&pool).await, &batches)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(LoadStage::Movies));
    assert_eq!(err.last_completed(), Some(LoadStage::Genres));
    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(GenreRepo::count(&mut conn).await.unwrap(), 3);
    assert_eq!(MovieRepo::count(&mut conn).await.unwrap(), 0);
    assert_eq!(MovieGenreRepo::count(&mut conn).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_input_is_a_successful_noop(pool: PgPool) {
    let session = session_for(&pool).await;
    let result = LoadOrchestrator::run_with_session(session, &NormalizedBatches::default())
        .await
        .unwrap();

    assert_eq!(result, RunResult::default());
}
