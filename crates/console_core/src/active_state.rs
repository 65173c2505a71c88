use chrono::{DateTime, Utc};
use shared::protocol::{ActiveDatabaseResponse, ActiveRepositoriesResponse};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::ConsoleEvent;

/// Process-wide view of what the backend currently considers active.
///
/// The two read models are fetched independently and each carries its own
/// loading flag; there is no combined "ready" flag. Repository order is the
/// backend's and is never re-sorted. A backend `null` is stored as `None`,
/// an empty repository list as `Some(vec![])`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveState {
    pub active_database: Option<String>,
    pub active_repositories: Option<Vec<String>>,
    pub database_loading: bool,
    pub repositories_loading: bool,
    pub database_fetched_at: Option<DateTime<Utc>>,
    pub repositories_fetched_at: Option<DateTime<Utc>>,
}

/// Single owner of [`ActiveState`]. Only this store's own refresh
/// completions mutate the state; controllers and coordinators read
/// snapshots and trigger refreshes.
///
/// Refreshes are best-effort telemetry: a failed read keeps the prior value
/// and is logged, never surfaced to the user. Overlapping refreshes of the
/// same resource are not sequenced; responses apply in completion order
/// (last completion wins).
pub struct ActiveStateStore {
    http: reqwest::Client,
    backend_url: String,
    inner: Mutex<ActiveState>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl ActiveStateStore {
    pub fn new(
        http: reqwest::Client,
        backend_url: impl Into<String>,
        events: broadcast::Sender<ConsoleEvent>,
    ) -> Self {
        Self {
            http,
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            inner: Mutex::new(ActiveState::default()),
            events,
        }
    }

    pub async fn snapshot(&self) -> ActiveState {
        self.inner.lock().await.clone()
    }

    /// Re-reads the active database from the backend. Idempotent and safe
    /// to call repeatedly; the loading flag is always cleared on completion.
    pub async fn refresh_database(&self) {
        self.inner.lock().await.database_loading = true;

        let fetched = self.fetch_active_database().await;

        let mut inner = self.inner.lock().await;
        inner.database_loading = false;
        match fetched {
            Ok(active_database) => {
                inner.active_database = active_database.clone();
                inner.database_fetched_at = Some(Utc::now());
                drop(inner);
                info!(
                    active_database = active_database.as_deref().unwrap_or("<none>"),
                    "active-state: database view refreshed"
                );
                let _ = self
                    .events
                    .send(ConsoleEvent::ActiveDatabaseUpdated { active_database });
            }
            Err(err) => {
                drop(inner);
                warn!("active-state: database refresh failed: {err:#}");
            }
        }
    }

    /// Re-reads the active repository list. Fully independent of
    /// [`refresh_database`]; the two may run concurrently.
    pub async fn refresh_repositories(&self) {
        self.inner.lock().await.repositories_loading = true;

        let fetched = self.fetch_active_repositories().await;

        let mut inner = self.inner.lock().await;
        inner.repositories_loading = false;
        match fetched {
            Ok(active_repositories) => {
                inner.active_repositories = active_repositories.clone();
                inner.repositories_fetched_at = Some(Utc::now());
                drop(inner);
                info!(
                    count = active_repositories.as_ref().map(Vec::len).unwrap_or(0),
                    "active-state: repository view refreshed"
                );
                let _ = self
                    .events
                    .send(ConsoleEvent::ActiveRepositoriesUpdated {
                        active_repositories,
                    });
            }
            Err(err) => {
                drop(inner);
                warn!("active-state: repository refresh failed: {err:#}");
            }
        }
    }

    async fn fetch_active_database(&self) -> anyhow::Result<Option<String>> {
        let response: ActiveDatabaseResponse = self
            .http
            .get(format!("{}/active-database/", self.backend_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.active_database)
    }

    async fn fetch_active_repositories(&self) -> anyhow::Result<Option<Vec<String>>> {
        let response: ActiveRepositoriesResponse = self
            .http
            .get(format!("{}/active-repository/", self.backend_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.active_repositories)
    }
}

#[cfg(test)]
#[path = "tests/active_state_tests.rs"]
mod tests;
