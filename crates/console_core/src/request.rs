use std::collections::BTreeMap;

use shared::{
    domain::DatabaseKind,
    error::ValidationError,
    protocol::CreateNamespaceRequest,
};

use crate::FolderPicker;

/// Configuration flags required by the engine's data-loader subsystem.
/// This block is identical on every submission and is never derived from or
/// overridable by form state.
pub const DATA_LOADER_PROPERTIES: [(&str, &str); 7] = [
    (
        "com.bigdata.rdf.store.DataLoader",
        "com.bigdata.rdf.data.RDFDataLoader",
    ),
    (
        "com.bigdata.rdf.store.DataLoader.context",
        "com.bigdata.rdf.data.RDFDataLoaderContext",
    ),
    ("com.bigdata.rdf.sail.isolates", "true"),
    ("com.bigdata.rdf.sail.quads", "true"),
    ("com.bigdata.rdf.sail.axioms", "true"),
    ("com.bigdata.rdf.sail.includeInferred", "true"),
    ("com.bigdata.rdf.sail.incremental", "false"),
];

pub fn data_loader_properties() -> BTreeMap<String, String> {
    DATA_LOADER_PROPERTIES
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// User input for a create-namespace submission. Owned by the open
/// provisioning surface and discarded on close or success.
///
/// Port and memory bounds are free-form strings by contract; the backend
/// owns their interpretation (JVM-style flags such as `"4g"` are typical).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceForm {
    pub database_kind: Option<DatabaseKind>,
    pub namespace: String,
    pub installation_path: String,
    pub port: String,
    pub min_memory: String,
    pub max_memory: String,
}

impl Default for NamespaceForm {
    fn default() -> Self {
        Self {
            database_kind: Some(DatabaseKind::Blazegraph),
            namespace: String::new(),
            installation_path: String::new(),
            port: "9999".to_string(),
            min_memory: String::new(),
            max_memory: String::new(),
        }
    }
}

/// Shapes a validated request payload from form fields. Pure: no side
/// effects, no I/O.
///
/// The database-kind selector, namespace, and installation path are
/// required (whitespace-only counts as empty); everything else passes
/// through untouched with the fixed properties block injected verbatim.
pub fn build_request(form: &NamespaceForm) -> Result<CreateNamespaceRequest, ValidationError> {
    if form.database_kind.is_none() {
        return Err(ValidationError::MissingRequiredField {
            field: "database_kind",
        });
    }
    if form.installation_path.trim().is_empty() {
        return Err(ValidationError::MissingRequiredField {
            field: "installation_path",
        });
    }
    if form.namespace.trim().is_empty() {
        return Err(ValidationError::MissingRequiredField { field: "namespace" });
    }

    Ok(CreateNamespaceRequest {
        namespace: form.namespace.clone(),
        properties: data_loader_properties(),
        port: form.port.clone(),
        min_memory: form.min_memory.clone(),
        max_memory: form.max_memory.clone(),
        installation_path: form.installation_path.clone(),
    })
}

/// Runs the folder-picker capability and applies the result to the form.
/// Returns `true` when a path was chosen; cancellation leaves the form
/// untouched.
pub async fn choose_installation_path(picker: &dyn FolderPicker, form: &mut NamespaceForm) -> bool {
    match picker.pick_folder().await {
        Some(path) => {
            form.installation_path = path;
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "tests/request_tests.rs"]
mod tests;
