//! Load run orchestration.
//!
//! Runs the four entity batches in foreign-key order:
//! 1. Genres
//! 2. Movies
//! 3. Movie-genre links (need movies and genres)
//! 4. Daily stats (need movies)
//!
//! Every batch commits on its own. When a batch fails the run stops there:
//! earlier batches stay committed, later ones never start. Re-running the
//! same input is safe because every write is an upsert.

use reelstats_core::records::NormalizedBatches;
use reelstats_core::run_state::{LoadStage, RunState};
use reelstats_db::{DbConfig, LoadSession};
use serde::Serialize;

use crate::error::{LoadError, StageError};
use crate::upsert::{BatchReport, UpsertEngine};

/// Per-stage counts of a successful run.
///
/// `links_loaded` and `stats_loaded` count records whose references
/// resolved; the `*_skipped` fields count the ones that did not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub genres_loaded: usize,
    pub movies_loaded: usize,
    pub links_loaded: usize,
    pub links_skipped: usize,
    pub stats_loaded: usize,
    pub stats_skipped: usize,
}

impl RunResult {
    fn record(&mut self, stage: LoadStage, report: BatchReport) {
        match stage {
            LoadStage::Genres => self.genres_loaded = report.applied,
            LoadStage::Movies => self.movies_loaded = report.applied,
            LoadStage::MovieGenres => {
                self.links_loaded = report.applied;
                self.links_skipped = report.skipped;
            }
            LoadStage::DailyStats => {
                self.stats_loaded = report.applied;
                self.stats_skipped = report.skipped;
            }
        }
    }
}

/// Sequences a load run over one exclusively owned session.
pub struct LoadOrchestrator;

impl LoadOrchestrator {
    /// Open a session from `config` and load `batches` through it.
    ///
    /// A store that cannot be reached fails with [`LoadError::Connection`]
    /// before any stage runs.
    pub async fn run(
        config: &DbConfig,
        batches: &NormalizedBatches,
    ) -> Result<RunResult, LoadError> {
        let mut session = match LoadSession::open(config).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "Could not open database connection");
                return Err(LoadError::Connection(e));
            }
        };
        if let Err(e) = session.health_check().await {
            tracing::error!(error = %e, "Database health check failed");
            session.close().await;
            return Err(LoadError::Connection(e));
        }
        Self::run_with_session(session, batches).await
    }

    /// Load `batches` through an already-open session.
    ///
    /// The session is closed before returning, whatever the outcome.
    pub async fn run_with_session(
        mut session: LoadSession,
        batches: &NormalizedBatches,
    ) -> Result<RunResult, LoadError> {
        let mut state = RunState::NotStarted;
        state.advance(RunState::ConnectionOpen)?;
        tracing::info!(
            genres = batches.genres.len(),
            movies = batches.movies.len(),
            movie_genres = batches.movie_genres.len(),
            daily_stats = batches.daily_stats.len(),
            "Load run started"
        );

        let outcome = Self::load_all(&mut session, batches, &mut state).await;
        session.close().await;

        match outcome {
            Ok(result) => {
                state.advance(RunState::Closed)?;
                tracing::info!(
                    genres_loaded = result.genres_loaded,
                    movies_loaded = result.movies_loaded,
                    links_loaded = result.links_loaded,
                    links_skipped = result.links_skipped,
                    stats_loaded = result.stats_loaded,
                    stats_skipped = result.stats_skipped,
                    "Load run completed"
                );
                Ok(result)
            }
            Err(e) => {
                state.advance(RunState::Failed)?;
                tracing::error!(
                    error = %e,
                    stage = e.stage().map(|s| s.as_str()),
                    last_completed = e.last_completed().map(|s| s.as_str()),
                    "Load run failed"
                );
                Err(e)
            }
        }
    }

    async fn load_all(
        session: &mut LoadSession,
        batches: &NormalizedBatches,
        state: &mut RunState,
    ) -> Result<RunResult, LoadError> {
        let mut result = RunResult::default();
        for stage in LoadStage::ORDER {
            let report = Self::load_stage(session, stage, batches)
                .await
                .map_err(|cause| LoadError::Stage {
                    stage,
                    last_completed: state.last_completed_stage(),
                    cause,
                })?;
            state.advance(stage.completed_state())?;
            result.record(stage, report);
            tracing::info!(
                stage = stage.as_str(),
                attempted = report.attempted,
                applied = report.applied,
                skipped = report.skipped,
                rows_written = report.rows_written,
                "Stage committed"
            );
        }
        Ok(result)
    }

    /// Run one batch in its own transaction. Empty batches open no
    /// transaction at all.
    async fn load_stage(
        session: &mut LoadSession,
        stage: LoadStage,
        batches: &NormalizedBatches,
    ) -> Result<BatchReport, StageError> {
        if batch_len(batches, stage) == 0 {
            tracing::debug!(stage = stage.as_str(), "Empty batch, nothing to load");
            return Ok(BatchReport::default());
        }

        let mut tx = session.begin(stage.as_str()).await?;
        let report = match stage {
            LoadStage::Genres => UpsertEngine::upsert_genres(tx.conn(), &batches.genres).await?,
            LoadStage::Movies => UpsertEngine::upsert_movies(tx.conn(), &batches.movies).await?,
            LoadStage::MovieGenres => {
                UpsertEngine::link_movie_genres(tx.conn(), &batches.movie_genres).await?
            }
            LoadStage::DailyStats => {
                UpsertEngine::upsert_daily_stats(tx.conn(), &batches.daily_stats).await?
            }
        };
        tx.commit().await?;
        Ok(report)
    }
}

fn batch_len(batches: &NormalizedBatches, stage: LoadStage) -> usize {
    match stage {
        LoadStage::Genres => batches.genres.len(),
        LoadStage::Movies => batches.movies.len(),
        LoadStage::MovieGenres => batches.movie_genres.len(),
        LoadStage::DailyStats => batches.daily_stats.len(),
    }
}
