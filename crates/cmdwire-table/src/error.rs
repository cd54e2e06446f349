use crate::descriptor::CommandIdentity;

/// Errors that can occur while building or loading a command table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Two descriptors claim the same (feature, class, command) triple.
    #[error("duplicate command identity {identity} ('{existing}' and '{incoming}')")]
    DuplicateIdentity {
        identity: CommandIdentity,
        existing: String,
        incoming: String,
    },

    /// Two descriptors share a dotted name.
    #[error("duplicate command name '{0}'")]
    DuplicateName(String),

    /// A descriptor is internally inconsistent.
    #[error("invalid descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    /// The descriptor file could not be loaded.
    #[error("failed to load command table: {0}")]
    LoadFailed(String),

    /// The descriptor document is not valid JSON for the table schema.
    #[error("command table is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No descriptor carries the requested dotted name.
    #[error("no command named '{0}'")]
    UnknownName(String),
}

pub type Result<T> = std::result::Result<T, TableError>;
