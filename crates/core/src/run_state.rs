//! Load run lifecycle: the four stages and the state machine that tracks
//! a run's progress through them.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// One entity batch within a load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Genres,
    Movies,
    MovieGenres,
    DailyStats,
}

impl LoadStage {
    /// Foreign-key dependency order. Links and stats resolve movie ids, links
    /// also resolve genre ids, so both must come after the entities they
    /// reference.
    pub const ORDER: [LoadStage; 4] = [
        LoadStage::Genres,
        LoadStage::Movies,
        LoadStage::MovieGenres,
        LoadStage::DailyStats,
    ];

    /// Label used for batch commits and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genres => "genres",
            Self::Movies => "movies",
            Self::MovieGenres => "movie_genres",
            Self::DailyStats => "daily_stats",
        }
    }

    /// The run state reached once this stage has committed.
    pub fn completed_state(&self) -> RunState {
        match self {
            Self::Genres => RunState::GenresLoaded,
            Self::Movies => RunState::MoviesLoaded,
            Self::MovieGenres => RunState::LinksLoaded,
            Self::DailyStats => RunState::StatsLoaded,
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Run state machine
// ---------------------------------------------------------------------------

/// Progress of a single load run.
///
/// `NotStarted -> ConnectionOpen -> GenresLoaded -> MoviesLoaded ->
/// LinksLoaded -> StatsLoaded -> Closed`, with `Failed` reachable from
/// every state before `Closed`. `Closed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    ConnectionOpen,
    GenresLoaded,
    MoviesLoaded,
    LinksLoaded,
    StatsLoaded,
    Closed,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::ConnectionOpen => "connection_open",
            Self::GenresLoaded => "genres_loaded",
            Self::MoviesLoaded => "movies_loaded",
            Self::LinksLoaded => "links_loaded",
            Self::StatsLoaded => "stats_loaded",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Check whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (NotStarted, ConnectionOpen)
            | (ConnectionOpen, GenresLoaded)
            | (GenresLoaded, MoviesLoaded)
            | (MoviesLoaded, LinksLoaded)
            | (LinksLoaded, StatsLoaded)
            | (StatsLoaded, Closed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Move to `next`, rejecting anything the state machine does not allow.
    pub fn advance(&mut self, next: RunState) -> Result<(), CoreError> {
        if !self.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// The most recent stage that committed, if any.
    pub fn last_completed_stage(&self) -> Option<LoadStage> {
        match self {
            Self::GenresLoaded => Some(LoadStage::Genres),
            Self::MoviesLoaded => Some(LoadStage::Movies),
            Self::LinksLoaded => Some(LoadStage::MovieGenres),
            Self::StatsLoaded | Self::Closed => Some(LoadStage::DailyStats),
            Self::NotStarted | Self::ConnectionOpen | Self::Failed => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
