use cmdwire_table::{ArgumentTypeTag, CommandIdentity};
use serde::Serialize;

use crate::error::ArgumentError;

/// One decoded argument, tagged with its wire type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DecodedValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Raw enum code, kept even when no enumerator carries it.
    Enum(i32),
}

impl DecodedValue {
    /// Wire type this value was decoded from.
    pub fn type_tag(&self) -> ArgumentTypeTag {
        match self {
            DecodedValue::U8(_) => ArgumentTypeTag::U8,
            DecodedValue::I8(_) => ArgumentTypeTag::I8,
            DecodedValue::U16(_) => ArgumentTypeTag::U16,
            DecodedValue::I16(_) => ArgumentTypeTag::I16,
            DecodedValue::U32(_) => ArgumentTypeTag::U32,
            DecodedValue::I32(_) => ArgumentTypeTag::I32,
            DecodedValue::U64(_) => ArgumentTypeTag::U64,
            DecodedValue::I64(_) => ArgumentTypeTag::I64,
            DecodedValue::Float(_) => ArgumentTypeTag::Float,
            DecodedValue::Double(_) => ArgumentTypeTag::Double,
            DecodedValue::String(_) => ArgumentTypeTag::String,
            DecodedValue::Enum(_) => ArgumentTypeTag::Enum,
        }
    }
}

impl std::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedValue::U8(v) => write!(f, "{v}"),
            DecodedValue::I8(v) => write!(f, "{v}"),
            DecodedValue::U16(v) => write!(f, "{v}"),
            DecodedValue::I16(v) => write!(f, "{v}"),
            DecodedValue::U32(v) => write!(f, "{v}"),
            DecodedValue::I32(v) => write!(f, "{v}"),
            DecodedValue::U64(v) => write!(f, "{v}"),
            DecodedValue::I64(v) => write!(f, "{v}"),
            DecodedValue::Float(v) => write!(f, "{v}"),
            DecodedValue::Double(v) => write!(f, "{v}"),
            DecodedValue::String(v) => write!(f, "{v:?}"),
            DecodedValue::Enum(v) => write!(f, "#{v}"),
        }
    }
}

/// List-operation flags carried by list-item commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ListFlags(u8);

impl ListFlags {
    /// First element of a fresh list.
    pub const FIRST: u8 = 0x01;
    /// Last element of the list.
    pub const LAST: u8 = 0x02;
    /// The list is empty; the arguments carry no element.
    pub const EMPTY: u8 = 0x04;
    /// Remove this element instead of adding it.
    pub const REMOVE: u8 = 0x08;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_first(self) -> bool {
        self.0 & Self::FIRST != 0
    }

    pub fn is_last(self) -> bool {
        self.0 & Self::LAST != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::EMPTY != 0
    }

    pub fn is_remove(self) -> bool {
        self.0 & Self::REMOVE != 0
    }

    /// An element without the remove bit adds to (or updates) the list.
    pub fn is_add(self) -> bool {
        !self.is_remove() && !self.is_empty()
    }
}

/// A fully decoded command frame.
///
/// Values line up positionally with the descriptor's arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCommand {
    pub identity: CommandIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_flags: Option<ListFlags>,
    pub values: Vec<DecodedValue>,
}

impl DecodedCommand {
    pub fn new(identity: CommandIdentity, values: Vec<DecodedValue>) -> Self {
        Self {
            identity,
            list_flags: None,
            values,
        }
    }

    pub fn with_list_flags(mut self, flags: ListFlags) -> Self {
        self.list_flags = Some(flags);
        self
    }

    /// Typed argument at `index`.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, ArgumentError> {
        value_at(&self.values, index)
    }

    /// All arguments converted into a tuple.
    pub fn args<A: FromArgs>(&self) -> Result<A, ArgumentError> {
        A::from_args(&self.values)
    }
}

/// Enum argument code, kept distinct from plain `i32` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumCode(pub i32);

/// Conversion from a decoded value to a Rust type of the same wire type.
pub trait FromValue: Sized {
    /// Wire type this Rust type is read from.
    const TAG: ArgumentTypeTag;

    fn from_value(value: &DecodedValue) -> Option<Self>;
}

macro_rules! from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            const TAG: ArgumentTypeTag = ArgumentTypeTag::$variant;

            fn from_value(value: &DecodedValue) -> Option<Self> {
                match value {
                    DecodedValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

from_value!(u8, U8);
from_value!(i8, I8);
from_value!(u16, U16);
from_value!(i16, I16);
from_value!(u32, U32);
from_value!(i32, I32);
from_value!(u64, U64);
from_value!(i64, I64);
from_value!(f32, Float);
from_value!(f64, Double);

impl FromValue for String {
    const TAG: ArgumentTypeTag = ArgumentTypeTag::String;

    fn from_value(value: &DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::String(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl FromValue for EnumCode {
    const TAG: ArgumentTypeTag = ArgumentTypeTag::Enum;

    fn from_value(value: &DecodedValue) -> Option<Self> {
        match value {
            DecodedValue::Enum(code) => Some(EnumCode(*code)),
            _ => None,
        }
    }
}

fn value_at<T: FromValue>(values: &[DecodedValue], index: usize) -> Result<T, ArgumentError> {
    let value = values.get(index).ok_or(ArgumentError::OutOfRange {
        index,
        len: values.len(),
    })?;
    T::from_value(value).ok_or(ArgumentError::TypeMismatch {
        index,
        expected: T::TAG,
        found: value.type_tag(),
    })
}

/// Conversion from a full argument list to a tuple of typed values.
pub trait FromArgs: Sized {
    fn from_args(values: &[DecodedValue]) -> Result<Self, ArgumentError>;
}

impl FromArgs for () {
    fn from_args(values: &[DecodedValue]) -> Result<Self, ArgumentError> {
        if !values.is_empty() {
            return Err(ArgumentError::Arity {
                expected: 0,
                found: values.len(),
            });
        }
        Ok(())
    }
}

macro_rules! tuple_from_args {
    ($len:literal => $($idx:tt $t:ident),+) => {
        impl<$($t: FromValue),+> FromArgs for ($($t,)+) {
            fn from_args(values: &[DecodedValue]) -> Result<Self, ArgumentError> {
                if values.len() != $len {
                    return Err(ArgumentError::Arity {
                        expected: $len,
                        found: values.len(),
                    });
                }
                Ok(($(value_at::<$t>(values, $idx)?,)+))
            }
        }
    };
}

tuple_from_args!(1 => 0 A);
tuple_from_args!(2 => 0 A, 1 B);
tuple_from_args!(3 => 0 A, 1 B, 2 C);
tuple_from_args!(4 => 0 A, 1 B, 2 C, 3 D);
tuple_from_args!(5 => 0 A, 1 B, 2 C, 3 D, 4 E);
tuple_from_args!(6 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
tuple_from_args!(7 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
tuple_from_args!(8 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

#[cfg(test)]
mod tests {
    use super::*;

    fn pcmd() -> DecodedCommand {
        DecodedCommand::new(
            CommandIdentity::new(1, 0, 2),
            vec![
                DecodedValue::U8(1),
                DecodedValue::I8(-20),
                DecodedValue::I8(35),
                DecodedValue::I8(0),
                DecodedValue::I8(10),
                DecodedValue::U32(77),
            ],
        )
    }

    #[test]
    fn typed_arg_access() {
        let command = pcmd();
        assert_eq!(command.arg::<u8>(0).unwrap(), 1);
        assert_eq!(command.arg::<i8>(1).unwrap(), -20);
        assert_eq!(command.arg::<u32>(5).unwrap(), 77);
    }

    #[test]
    fn typed_arg_wrong_type() {
        let err = pcmd().arg::<u16>(0).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::TypeMismatch {
                index: 0,
                expected: ArgumentTypeTag::U16,
                found: ArgumentTypeTag::U8,
            }
        );
    }

    #[test]
    fn typed_arg_out_of_range() {
        let err = pcmd().arg::<u8>(6).unwrap_err();
        assert_eq!(err, ArgumentError::OutOfRange { index: 6, len: 6 });
    }

    #[test]
    fn tuple_conversion() {
        let (flag, roll, pitch, yaw, gaz, ts): (u8, i8, i8, i8, i8, u32) = pcmd().args().unwrap();
        assert_eq!((flag, roll, pitch, yaw, gaz, ts), (1, -20, 35, 0, 10, 77));

        let err = pcmd().args::<(u8, i8)>().unwrap_err();
        assert_eq!(
            err,
            ArgumentError::Arity {
                expected: 2,
                found: 6
            }
        );
    }

    #[test]
    fn unit_conversion_for_empty_commands() {
        let takeoff = DecodedCommand::new(CommandIdentity::new(1, 0, 1), Vec::new());
        assert!(takeoff.args::<()>().is_ok());
        assert!(pcmd().args::<()>().is_err());
    }

    #[test]
    fn enum_code_is_not_i32() {
        let command =
            DecodedCommand::new(CommandIdentity::new(1, 4, 1), vec![DecodedValue::Enum(42)]);
        assert_eq!(command.arg::<EnumCode>(0).unwrap(), EnumCode(42));
        assert!(command.arg::<i32>(0).is_err());
    }

    #[test]
    fn list_flags_bits() {
        let flags = ListFlags::from_bits(ListFlags::FIRST | ListFlags::LAST);
        assert!(flags.is_first());
        assert!(flags.is_last());
        assert!(flags.is_add());
        assert!(!flags.is_remove());

        let removal = ListFlags::from_bits(ListFlags::REMOVE);
        assert!(removal.is_remove());
        assert!(!removal.is_add());

        let empty = ListFlags::from_bits(ListFlags::EMPTY | 0x80);
        assert!(empty.is_empty());
        assert!(!empty.is_add());
        assert_eq!(empty.bits(), 0x84);
    }

    #[test]
    fn serializes_tagged_values() {
        let command = DecodedCommand::new(
            CommandIdentity::new(0, 5, 1),
            vec![DecodedValue::U8(80), DecodedValue::String("x".into())],
        );
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "identity": { "feature": 0, "class": 5, "command": 1 },
                "values": [
                    { "type": "u8", "value": 80 },
                    { "type": "string", "value": "x" }
                ]
            })
        );
    }

    #[test]
    fn display_values() {
        assert_eq!(DecodedValue::Enum(3).to_string(), "#3");
        assert_eq!(DecodedValue::String("a b".into()).to_string(), "\"a b\"");
        assert_eq!(DecodedValue::Float(1.5).to_string(), "1.5");
    }
}
