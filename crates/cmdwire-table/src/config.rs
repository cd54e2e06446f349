/// Controls how descriptor tables are assembled and loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// When true, merging a table replaces descriptors with the same identity
    /// instead of failing with `TableError::DuplicateIdentity`.
    pub allow_override: bool,
    /// Maximum bytes allowed for a JSON descriptor file.
    pub max_table_file_size: usize,
    /// Maximum number of descriptors accepted from one JSON document.
    pub max_commands: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            allow_override: false,
            max_table_file_size: 4 * 1024 * 1024,
            max_commands: 16 * 1024,
        }
    }
}
