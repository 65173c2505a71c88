use shared::error::ValidationError;
use thiserror::Error;

/// Terminal outcomes of a provisioning submission attempt.
///
/// `Validation` and `AlreadyInProgress` are resolved locally and never reach
/// the backend. `RequestFailed` covers both non-2xx responses (carrying the
/// backend's `detail` when present) and transport-level failures; the
/// controller stays in a stable failed state that allows retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a submission is already in progress")]
    AlreadyInProgress,
    #[error("{message}")]
    RequestFailed { message: String },
}
