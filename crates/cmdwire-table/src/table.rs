use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::config::TableConfig;
use crate::descriptor::{CommandDescriptor, CommandIdentity};
use crate::error::{Result, TableError};
use crate::schema::{CommandEntry, TableDocument};

/// Identity-keyed table of command descriptors.
///
/// Built once and then only read; share it behind an `Arc` across decoders.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    descriptors: HashMap<CommandIdentity, CommandDescriptor>,
    names: HashMap<String, CommandIdentity>,
    config: TableConfig,
}

impl CommandTable {
    /// Create an empty table with default config.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    /// Create an empty table with explicit config.
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            descriptors: HashMap::new(),
            names: HashMap::new(),
            config,
        }
    }

    /// Build a table from a list of descriptors.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = CommandDescriptor>) -> Result<Self> {
        let mut table = Self::new();
        for descriptor in descriptors {
            table.insert(descriptor)?;
        }
        Ok(table)
    }

    /// Add one descriptor.
    ///
    /// Identities and names must be unique; replacing an entry is only
    /// possible through [`CommandTable::extend`] with `allow_override`.
    pub fn insert(&mut self, descriptor: CommandDescriptor) -> Result<()> {
        descriptor
            .check()
            .map_err(|reason| TableError::InvalidDescriptor {
                name: descriptor.name.clone(),
                reason,
            })?;

        if let Some(existing) = self.descriptors.get(&descriptor.identity) {
            return Err(TableError::DuplicateIdentity {
                identity: descriptor.identity,
                existing: existing.name.clone(),
                incoming: descriptor.name,
            });
        }
        if self.names.contains_key(&descriptor.name) {
            return Err(TableError::DuplicateName(descriptor.name));
        }

        self.names
            .insert(descriptor.name.clone(), descriptor.identity);
        self.descriptors.insert(descriptor.identity, descriptor);
        Ok(())
    }

    /// Merge another table into this one.
    ///
    /// With `allow_override` set, incoming descriptors replace existing ones
    /// that share their identity. The merge is all or nothing: on error the
    /// table is left as it was.
    pub fn extend(&mut self, other: CommandTable) -> Result<()> {
        let mut incoming: Vec<CommandDescriptor> = other.descriptors.into_values().collect();
        incoming.sort_by_key(|d| d.identity);

        let mut staged = self.clone();
        if staged.config.allow_override {
            for descriptor in &incoming {
                if let Some(old) = staged.descriptors.remove(&descriptor.identity) {
                    tracing::debug!(
                        identity = %descriptor.identity,
                        old = %old.name,
                        new = %descriptor.name,
                        "overriding command descriptor"
                    );
                    staged.names.remove(&old.name);
                }
            }
        }
        for descriptor in incoming {
            staged.insert(descriptor)?;
        }

        *self = staged;
        Ok(())
    }

    /// Parse a JSON descriptor document.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_config(json, TableConfig::default())
    }

    /// Parse a JSON descriptor document with explicit config.
    pub fn from_json_with_config(json: &str, config: TableConfig) -> Result<Self> {
        let document: TableDocument = serde_json::from_str(json)?;
        if document.commands.len() > config.max_commands {
            return Err(TableError::LoadFailed(format!(
                "command count exceeds configured max ({}): {}",
                config.max_commands,
                document.commands.len()
            )));
        }

        let mut table = Self::with_config(config);
        for entry in document.commands {
            table.insert(entry.into())?;
        }
        Ok(table)
    }

    /// Load a JSON descriptor file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, TableConfig::default())
    }

    /// Load a JSON descriptor file with explicit config.
    pub fn from_file_with_config(path: &Path, config: TableConfig) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|err| TableError::LoadFailed(format!("{}: {err}", path.display())))?;
        if !metadata.is_file() {
            return Err(TableError::LoadFailed(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        if metadata.len() > config.max_table_file_size as u64 {
            return Err(TableError::LoadFailed(format!(
                "table file too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|err| {
            TableError::LoadFailed(format!("failed opening {}: {err}", path.display()))
        })?;
        let max_bytes = config.max_table_file_size;
        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                TableError::LoadFailed(format!("failed reading {}: {err}", path.display()))
            })?;
        if content.len() > max_bytes {
            return Err(TableError::LoadFailed(format!(
                "table file too large while reading: {}",
                path.display()
            )));
        }

        let table = Self::from_json_with_config(&content, config)?;
        tracing::debug!(path = %path.display(), commands = table.len(), "loaded command table");
        Ok(table)
    }

    /// Render the table as a JSON document readable by [`CommandTable::from_json`].
    pub fn to_json(&self) -> Result<String> {
        let document = TableDocument {
            commands: self.iter().map(CommandEntry::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Descriptor for an identity, or `None` for an unknown command.
    pub fn lookup(&self, identity: CommandIdentity) -> Option<&CommandDescriptor> {
        self.descriptors.get(&identity)
    }

    /// Descriptor for a dotted name such as `ardrone3.Piloting.TakeOff`.
    pub fn lookup_name(&self, name: &str) -> Option<&CommandDescriptor> {
        self.names
            .get(name)
            .and_then(|identity| self.descriptors.get(identity))
    }

    /// Like [`CommandTable::lookup_name`], failing with `UnknownName`.
    pub fn require_name(&self, name: &str) -> Result<&CommandDescriptor> {
        self.lookup_name(name)
            .ok_or_else(|| TableError::UnknownName(name.to_string()))
    }

    /// Check if an identity has a descriptor.
    pub fn contains(&self, identity: CommandIdentity) -> bool {
        self.descriptors.contains_key(&identity)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All descriptors, sorted by identity.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        let mut all: Vec<&CommandDescriptor> = self.descriptors.values().collect();
        all.sort_unstable_by_key(|d| d.identity);
        all.into_iter()
    }

    /// Feature ids present in the table with their names, sorted by id.
    pub fn features(&self) -> Vec<(u8, String)> {
        let mut features: Vec<(u8, String)> = Vec::new();
        for descriptor in self.iter() {
            let id = descriptor.identity.feature_id;
            if features.last().map(|(last, _)| *last) != Some(id) {
                features.push((id, descriptor.feature_name().to_string()));
            }
        }
        features
    }

    /// Get table configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Replace the table configuration used by later merges.
    pub fn set_config(&mut self, config: TableConfig) {
        self.config = config;
    }
}
