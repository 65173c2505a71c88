use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload for `POST /create_namespace/`.
///
/// Field names are the backend's JSON contract: the user-supplied fields are
/// camelCase, `properties` is the fixed configuration block for the engine's
/// data-loader subsystem. Port and the memory bounds are deliberately
/// free-form strings; the backend owns their interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespaceRequest {
    pub namespace: String,
    pub properties: BTreeMap<String, String>,
    pub port: String,
    pub min_memory: String,
    pub max_memory: String,
    pub installation_path: String,
}

/// Response for `GET /active-database/`. `null` means no database is
/// currently active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveDatabaseResponse {
    #[serde(default)]
    pub active_database: Option<String>,
}

/// Response for `GET /active-repository/`. Repository order is the
/// backend's; consumers must not re-sort it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRepositoriesResponse {
    #[serde(default)]
    pub active_repositories: Option<Vec<String>>,
}
