use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one command within the whole protocol.
///
/// Ordered feature-first, so sorting groups commands the way the protocol
/// documents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandIdentity {
    #[serde(rename = "feature")]
    pub feature_id: u8,
    #[serde(rename = "class")]
    pub class_id: u8,
    #[serde(rename = "command")]
    pub command_id: u16,
}

impl CommandIdentity {
    /// Wire size of an identity header: feature (1) + class (1) + command (2).
    pub const WIRE_SIZE: usize = 4;

    pub const fn new(feature_id: u8, class_id: u8, command_id: u16) -> Self {
        Self {
            feature_id,
            class_id,
            command_id,
        }
    }
}

impl fmt::Display for CommandIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.feature_id, self.class_id, self.command_id)
    }
}

/// Wire type of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentTypeTag {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    Float,
    Double,
    String,
    /// Signed 32-bit code.
    Enum,
}

impl ArgumentTypeTag {
    pub const ALL: [ArgumentTypeTag; 12] = [
        ArgumentTypeTag::U8,
        ArgumentTypeTag::I8,
        ArgumentTypeTag::U16,
        ArgumentTypeTag::I16,
        ArgumentTypeTag::U32,
        ArgumentTypeTag::I32,
        ArgumentTypeTag::U64,
        ArgumentTypeTag::I64,
        ArgumentTypeTag::Float,
        ArgumentTypeTag::Double,
        ArgumentTypeTag::String,
        ArgumentTypeTag::Enum,
    ];

    /// Fixed wire width in bytes, `None` for NUL-terminated strings.
    pub fn wire_size(self) -> Option<usize> {
        match self {
            ArgumentTypeTag::U8 | ArgumentTypeTag::I8 => Some(1),
            ArgumentTypeTag::U16 | ArgumentTypeTag::I16 => Some(2),
            ArgumentTypeTag::U32
            | ArgumentTypeTag::I32
            | ArgumentTypeTag::Float
            | ArgumentTypeTag::Enum => Some(4),
            ArgumentTypeTag::U64 | ArgumentTypeTag::I64 | ArgumentTypeTag::Double => Some(8),
            ArgumentTypeTag::String => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArgumentTypeTag::U8 => "u8",
            ArgumentTypeTag::I8 => "i8",
            ArgumentTypeTag::U16 => "u16",
            ArgumentTypeTag::I16 => "i16",
            ArgumentTypeTag::U32 => "u32",
            ArgumentTypeTag::I32 => "i32",
            ArgumentTypeTag::U64 => "u64",
            ArgumentTypeTag::I64 => "i64",
            ArgumentTypeTag::Float => "float",
            ArgumentTypeTag::Double => "double",
            ArgumentTypeTag::String => "string",
            ArgumentTypeTag::Enum => "enum",
        }
    }
}

impl fmt::Display for ArgumentTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named code of an enum argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i32,
}

/// One argument position of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub type_tag: ArgumentTypeTag,
    /// Known codes for `Enum` arguments. Codes outside this list still decode.
    pub enumerators: Vec<Enumerator>,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, type_tag: ArgumentTypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            enumerators: Vec::new(),
        }
    }

    /// Attach enumerator names to an `Enum` argument.
    pub fn with_enumerators(mut self, enumerators: &[(&str, i32)]) -> Self {
        self.enumerators = enumerators
            .iter()
            .map(|(name, value)| Enumerator {
                name: (*name).to_string(),
                value: *value,
            })
            .collect();
        self
    }

    /// Name of the enumerator with this code, if the code is known.
    pub fn enumerator_name(&self, code: i32) -> Option<&str> {
        self.enumerators
            .iter()
            .find(|e| e.value == code)
            .map(|e| e.name.as_str())
    }
}

/// Static metadata describing how to decode one command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub identity: CommandIdentity,
    /// Dotted path, `feature.Class.Command`.
    pub name: String,
    pub arguments: Vec<ArgumentDescriptor>,
    /// The body starts with a list-flags byte.
    pub is_list_item: bool,
}

impl CommandDescriptor {
    pub fn new(identity: CommandIdentity, name: impl Into<String>) -> Self {
        Self {
            identity,
            name: name.into(),
            arguments: Vec::new(),
            is_list_item: false,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, argument: ArgumentDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Mark the command as one element of a streamed list.
    pub fn list_item(self) -> Self {
        self.list_item_if(true)
    }

    pub fn list_item_if(mut self, is_list_item: bool) -> Self {
        self.is_list_item = is_list_item;
        self
    }

    /// First segment of the dotted name.
    pub fn feature_name(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }

    /// Smallest body size that could hold this command (header included).
    pub fn min_wire_size(&self) -> usize {
        let list = usize::from(self.is_list_item);
        let args: usize = self
            .arguments
            .iter()
            .map(|arg| arg.type_tag.wire_size().unwrap_or(1))
            .sum();
        CommandIdentity::WIRE_SIZE + list + args
    }

    /// Check internal consistency, returning the first problem found.
    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("command name is empty".to_string());
        }

        for (index, arg) in self.arguments.iter().enumerate() {
            if arg.name.trim().is_empty() {
                return Err(format!("argument {index} has no name"));
            }
            if self.arguments[..index].iter().any(|a| a.name == arg.name) {
                return Err(format!("argument name '{}' repeated", arg.name));
            }
            if arg.type_tag != ArgumentTypeTag::Enum && !arg.enumerators.is_empty() {
                return Err(format!(
                    "argument '{}' of type {} cannot carry enumerators",
                    arg.name, arg.type_tag
                ));
            }
            for (pos, enumerator) in arg.enumerators.iter().enumerate() {
                if arg.enumerators[..pos]
                    .iter()
                    .any(|e| e.value == enumerator.value)
                {
                    return Err(format!(
                        "argument '{}' repeats enumerator code {}",
                        arg.name, enumerator.value
                    ));
                }
            }
        }

        Ok(())
    }
}
