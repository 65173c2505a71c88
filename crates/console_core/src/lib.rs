use async_trait::async_trait;
use shared::domain::Surface;
use tracing::{error, info};

pub mod active_state;
pub mod error;
pub mod provisioning;
pub mod request;
pub mod workflow;

pub use active_state::{ActiveState, ActiveStateStore};
pub use error::ProvisionError;
pub use provisioning::{ProvisioningController, SubmissionState, SubmissionStatus};
pub use request::{build_request, NamespaceForm, DATA_LOADER_PROPERTIES};
pub use workflow::{SurfaceState, WorkflowCoordinator};

/// User-facing notification capability (toast display or equivalent).
/// Success and error are mutually exclusive per submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn success(&self, message: &str);
    async fn error(&self, message: &str);
}

/// Fallback notifier for headless or test contexts: routes messages to the
/// log instead of a display surface.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn success(&self, message: &str) {
        info!(message, "notify: success");
    }

    async fn error(&self, message: &str) {
        error!(message, "notify: error");
    }
}

/// Native folder-selection capability. Returns the chosen path, or `None`
/// when the user cancels the dialog. The core never reaches into
/// presentation internals to trigger the picker.
#[async_trait]
pub trait FolderPicker: Send + Sync {
    async fn pick_folder(&self) -> Option<String>;
}

/// Picker for contexts without a native dialog; always reports cancellation.
pub struct MissingFolderPicker;

#[async_trait]
impl FolderPicker for MissingFolderPicker {
    async fn pick_folder(&self) -> Option<String> {
        None
    }
}

/// Events broadcast to console observers. Delivery is best-effort: emitters
/// ignore the send result when nobody is subscribed.
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    ProvisioningSucceeded {
        namespace: String,
    },
    ProvisioningFailed {
        message: String,
    },
    ActiveDatabaseUpdated {
        active_database: Option<String>,
    },
    ActiveRepositoriesUpdated {
        active_repositories: Option<Vec<String>>,
    },
    SurfaceOpened {
        surface: Surface,
    },
    SurfaceClosed {
        surface: Surface,
    },
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
