use serde::{Deserialize, Serialize};

/// Database engines the console can provision. Blazegraph is the only
/// supported engine today; the selector still has to be chosen explicitly
/// before a provisioning request is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    Blazegraph,
}

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Blazegraph => "Blazegraph",
        }
    }
}

/// Submission surfaces the console exposes. Each has its own open/closed
/// lifecycle and they never interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Creation,
    Connection,
}
