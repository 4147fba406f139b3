pub mod dedupe;
pub mod error;
pub mod records;
pub mod run_state;
pub mod types;
pub mod validation;
