use reelstats_core::error::CoreError;
use reelstats_core::run_state::LoadStage;
use reelstats_db::DbError;

/// Why a single batch could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// A record failed validation or the store rejected it on an
    /// integrity constraint.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other store failure while the batch was running.
    #[error(transparent)]
    Store(DbError),
}

impl From<CoreError> for StageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => StageError::ConstraintViolation(msg),
            other => StageError::ConstraintViolation(other.to_string()),
        }
    }
}

impl From<DbError> for StageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConstraintViolation { message, .. } => {
                StageError::ConstraintViolation(message)
            }
            other => StageError::Store(other),
        }
    }
}

impl From<sqlx::Error> for StageError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

/// Structured failure of a load run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The store could not be reached; no stage ran.
    #[error("Connection error: {0}")]
    Connection(#[source] DbError),

    /// A stage failed. Every stage before it is committed; it and every
    /// later stage did not run.
    #[error("Load failed at stage '{stage}': {cause}")]
    Stage {
        stage: LoadStage,
        last_completed: Option<LoadStage>,
        #[source]
        cause: StageError,
    },

    /// The run tried an illegal lifecycle transition.
    #[error(transparent)]
    State(#[from] CoreError),
}

impl LoadError {
    /// The stage that failed, if the run got as far as loading.
    pub fn stage(&self) -> Option<LoadStage> {
        match self {
            LoadError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The last stage whose batch was committed before the failure.
    pub fn last_completed(&self) -> Option<LoadStage> {
        match self {
            LoadError::Stage { last_completed, .. } => *last_completed,
            _ => None,
        }
    }
}
