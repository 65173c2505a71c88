use std::sync::Arc;

use shared::domain::Surface;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::{
    active_state::ActiveStateStore,
    error::ProvisionError,
    provisioning::{ProvisioningController, DEFAULT_SUBMIT_TIMEOUT},
    ConsoleEvent, NamespaceForm, Notifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy)]
struct SurfaceStates {
    creation: SurfaceState,
    connection: SurfaceState,
}

impl SurfaceStates {
    fn get(&self, surface: Surface) -> SurfaceState {
        match surface {
            Surface::Creation => self.creation,
            Surface::Connection => self.connection,
        }
    }

    fn set(&mut self, surface: Surface, state: SurfaceState) {
        match surface {
            Surface::Creation => self.creation = state,
            Surface::Connection => self.connection = state,
        }
    }
}

/// Wires controller outcomes to store refreshes and surface visibility.
/// This is the only component with cross-component ordering rules: on a
/// successful creation the database view is refreshed before the creation
/// surface closes.
pub struct WorkflowCoordinator {
    controller: Arc<ProvisioningController>,
    store: Arc<ActiveStateStore>,
    surfaces: Mutex<SurfaceStates>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl WorkflowCoordinator {
    pub fn new(backend_url: impl Into<String>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Self::with_submit_timeout(backend_url, notifier, DEFAULT_SUBMIT_TIMEOUT)
    }

    pub fn with_submit_timeout(
        backend_url: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        submit_timeout: std::time::Duration,
    ) -> Arc<Self> {
        let backend_url = backend_url.into();
        let (events, _) = broadcast::channel(64);
        let http = reqwest::Client::new();
        let controller = Arc::new(ProvisioningController::new(
            http.clone(),
            backend_url.clone(),
            notifier,
            events.clone(),
            submit_timeout,
        ));
        let store = Arc::new(ActiveStateStore::new(http, backend_url, events.clone()));
        Arc::new(Self {
            controller,
            store,
            surfaces: Mutex::new(SurfaceStates {
                creation: SurfaceState::Closed,
                connection: SurfaceState::Closed,
            }),
            events,
        })
    }

    pub fn store(&self) -> &Arc<ActiveStateStore> {
        &self.store
    }

    pub fn controller(&self) -> &Arc<ProvisioningController> {
        &self.controller
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events.subscribe()
    }

    /// Process-start hook: both surfaces begin closed and both active-state
    /// views are fetched unconditionally.
    pub async fn startup(&self) {
        tokio::join!(
            self.store.refresh_database(),
            self.store.refresh_repositories()
        );
    }

    pub async fn surface_state(&self, surface: Surface) -> SurfaceState {
        self.surfaces.lock().await.get(surface)
    }

    /// Shows a surface with a fresh submission state.
    pub async fn open(&self, surface: Surface) {
        self.surfaces.lock().await.set(surface, SurfaceState::Open);
        if surface == Surface::Creation {
            self.controller.reset().await;
        }
        let _ = self.events.send(ConsoleEvent::SurfaceOpened { surface });
    }

    /// Hides a surface and discards its submission observation. A request
    /// already dispatched to the backend is not cancelled; its outcome is
    /// silently dropped when it completes.
    pub async fn close(&self, surface: Surface) {
        self.surfaces
            .lock()
            .await
            .set(surface, SurfaceState::Closed);
        if surface == Surface::Creation {
            self.controller.reset().await;
        }
        let _ = self.events.send(ConsoleEvent::SurfaceClosed { surface });
    }

    /// Submits the creation form. On success the database view is refreshed
    /// once and the creation surface closes; on failure the surface stays
    /// open and the store is untouched, allowing retry.
    pub async fn submit_creation(&self, form: &NamespaceForm) -> Result<String, ProvisionError> {
        let namespace = self.controller.submit(form).await?;

        let still_open = {
            let surfaces = self.surfaces.lock().await;
            surfaces.get(Surface::Creation) == SurfaceState::Open
        };
        if !still_open {
            // The user closed the surface while the request was in flight;
            // nobody is listening for this outcome anymore.
            info!(
                namespace = %namespace,
                "workflow: creation surface closed mid-flight, dropping outcome"
            );
            return Ok(namespace);
        }

        self.store.refresh_database().await;
        self.close(Surface::Creation).await;
        Ok(namespace)
    }
}
