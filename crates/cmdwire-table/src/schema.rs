//! JSON form of a descriptor table.
//!
//! ```json
//! {
//!   "commands": [
//!     {
//!       "feature": 1, "class": 4, "command": 1,
//!       "name": "ardrone3.PilotingState.FlyingStateChanged",
//!       "list_item": false,
//!       "arguments": [
//!         { "name": "state", "type": "enum",
//!           "enumerators": [{ "name": "landed", "value": 0 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::descriptor::{
    ArgumentDescriptor, ArgumentTypeTag, CommandDescriptor, CommandIdentity, Enumerator,
};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TableDocument {
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CommandEntry {
    pub feature: u8,
    pub class: u8,
    pub command: u16,
    pub name: String,
    #[serde(default)]
    pub list_item: bool,
    #[serde(default)]
    pub arguments: Vec<ArgumentEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ArgumentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: ArgumentTypeTag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerators: Vec<Enumerator>,
}

impl From<CommandEntry> for CommandDescriptor {
    fn from(entry: CommandEntry) -> Self {
        CommandDescriptor {
            identity: CommandIdentity::new(entry.feature, entry.class, entry.command),
            name: entry.name,
            arguments: entry
                .arguments
                .into_iter()
                .map(|arg| ArgumentDescriptor {
                    name: arg.name,
                    type_tag: arg.type_tag,
                    enumerators: arg.enumerators,
                })
                .collect(),
            is_list_item: entry.list_item,
        }
    }
}

impl From<&CommandDescriptor> for CommandEntry {
    fn from(desc: &CommandDescriptor) -> Self {
        CommandEntry {
            feature: desc.identity.feature_id,
            class: desc.identity.class_id,
            command: desc.identity.command_id,
            name: desc.name.clone(),
            list_item: desc.is_list_item,
            arguments: desc
                .arguments
                .iter()
                .map(|arg| ArgumentEntry {
                    name: arg.name.clone(),
                    type_tag: arg.type_tag,
                    enumerators: arg.enumerators.clone(),
                })
                .collect(),
        }
    }
}
