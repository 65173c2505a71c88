use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use shared::error::ErrorBody;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{error::ProvisionError, request, ConsoleEvent, NamespaceForm, Notifier};

/// Upper bound on a single create-namespace round trip. The backend wraps a
/// potentially slow engine install, so this is generous; without it an
/// unresponsive backend would pin the surface in `Submitting` forever.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

const SUCCESS_NOTICE: &str = "Database created successfully.";
const VALIDATION_NOTICE: &str =
    "Please select the database type, provide the installation path, and enter a namespace.";
const REJECTION_NOTICE: &str = "Failed to create the database. Please try again.";
const TRANSPORT_NOTICE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Lifecycle of one provisioning attempt. Fresh at `Idle` when the surface
/// opens, forward-only within an attempt, reset to `Idle` when the surface
/// closes regardless of terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionState {
    pub status: SubmissionStatus,
    pub error_message: Option<String>,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self {
            status: SubmissionStatus::Idle,
            error_message: None,
        }
    }
}

/// Submission state plus the attempt generation. `reset` bumps the
/// generation; a completion carrying a stale generation writes nothing.
#[derive(Debug, Default)]
struct AttemptState {
    submission: SubmissionState,
    attempt: u64,
}

/// Owns the submission lifecycle: validation gate, in-flight flag,
/// success/failure outcome, and the single-flight guarantee.
pub struct ProvisioningController {
    http: reqwest::Client,
    backend_url: String,
    submit_timeout: Duration,
    notifier: Arc<dyn Notifier>,
    state: Mutex<AttemptState>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl ProvisioningController {
    pub fn new(
        http: reqwest::Client,
        backend_url: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        events: broadcast::Sender<ConsoleEvent>,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            http,
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            submit_timeout,
            notifier,
            state: Mutex::new(AttemptState::default()),
            events,
        }
    }

    pub async fn state(&self) -> SubmissionState {
        self.state.lock().await.submission.clone()
    }

    /// Discards the current attempt. Invoked by the coordinator when the
    /// owning surface opens or closes; an already-dispatched request is not
    /// cancelled, but its completion becomes stale: no state write, no
    /// notification, no event.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.attempt = state.attempt.wrapping_add(1);
        state.submission = SubmissionState::default();
    }

    /// Runs one provisioning attempt; `Ok` carries the created namespace
    /// name. Exactly one backend request is issued per validation pass and
    /// none on a validation failure. A call while a prior submission is in
    /// flight is rejected with `AlreadyInProgress` and has no side effects.
    pub async fn submit(&self, form: &NamespaceForm) -> Result<String, ProvisionError> {
        // Validation runs under the state lock so the in-flight check and
        // the transition to Submitting are a single step. The failed path
        // never passes through Submitting. The attempt generation captured
        // here lets a reset that races the round trip invalidate this
        // attempt's completion.
        let (request, attempt) = {
            let mut state = self.state.lock().await;
            if state.submission.status == SubmissionStatus::Submitting {
                return Err(ProvisionError::AlreadyInProgress);
            }
            state.submission.status = SubmissionStatus::Validating;
            state.submission.error_message = None;

            match request::build_request(form) {
                Ok(request) => {
                    state.submission.status = SubmissionStatus::Submitting;
                    (request, state.attempt)
                }
                Err(err) => {
                    state.submission.status = SubmissionStatus::Failed;
                    state.submission.error_message = Some(err.to_string());
                    drop(state);
                    self.report_failure(err.to_string(), VALIDATION_NOTICE).await;
                    return Err(ProvisionError::Validation(err));
                }
            }
        };

        info!(
            namespace = %request.namespace,
            port = %request.port,
            "provisioning: submitting create-namespace request"
        );

        let url = format!("{}/create_namespace/", self.backend_url);
        let sent = tokio::time::timeout(
            self.submit_timeout,
            self.http.post(url).json(&request).send(),
        )
        .await;

        match sent {
            Ok(Ok(response)) => {
                let status = response.status();
                if status == StatusCode::OK || status == StatusCode::CREATED {
                    self.report_success(&request.namespace, attempt).await;
                    Ok(request.namespace)
                } else {
                    let bytes = response.bytes().await.unwrap_or_default();
                    let message = ErrorBody::from_bytes(&bytes)
                        .detail_or(REJECTION_NOTICE)
                        .to_string();
                    warn!(
                        namespace = %request.namespace,
                        status = %status,
                        message = %message,
                        "provisioning: backend rejected create-namespace request"
                    );
                    self.fail_request(message, attempt).await
                }
            }
            Ok(Err(err)) => {
                warn!(
                    namespace = %request.namespace,
                    "provisioning: create-namespace transport failure: {err}"
                );
                self.fail_request(TRANSPORT_NOTICE.to_string(), attempt).await
            }
            Err(_) => {
                warn!(
                    namespace = %request.namespace,
                    timeout_secs = self.submit_timeout.as_secs(),
                    "provisioning: create-namespace request timed out"
                );
                self.fail_request(TRANSPORT_NOTICE.to_string(), attempt).await
            }
        }
    }

    async fn report_success(&self, namespace: &str, attempt: u64) {
        {
            let mut state = self.state.lock().await;
            if state.attempt != attempt {
                info!(namespace, "provisioning: attempt superseded, dropping success outcome");
                return;
            }
            state.submission.status = SubmissionStatus::Succeeded;
            state.submission.error_message = None;
        }
        info!(namespace, "provisioning: namespace created");
        self.notifier.success(SUCCESS_NOTICE).await;
        let _ = self.events.send(ConsoleEvent::ProvisioningSucceeded {
            namespace: namespace.to_string(),
        });
    }

    async fn fail_request(&self, message: String, attempt: u64) -> Result<String, ProvisionError> {
        {
            let mut state = self.state.lock().await;
            if state.attempt != attempt {
                info!(message = %message, "provisioning: attempt superseded, dropping failure outcome");
                return Err(ProvisionError::RequestFailed { message });
            }
            state.submission.status = SubmissionStatus::Failed;
            state.submission.error_message = Some(message.clone());
        }
        self.report_failure(message.clone(), &message).await;
        Err(ProvisionError::RequestFailed { message })
    }

    async fn report_failure(&self, event_message: String, notice: &str) {
        self.notifier.error(notice).await;
        let _ = self.events.send(ConsoleEvent::ProvisioningFailed {
            message: event_message,
        });
    }
}
