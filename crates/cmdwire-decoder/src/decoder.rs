//! Frame decoder: header, optional list flags, then the descriptor's
//! arguments in order.

use cmdwire_frame::ArgReader;
use cmdwire_table::{ArgumentDescriptor, ArgumentTypeTag, CommandIdentity, CommandTable};
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::value::{DecodedCommand, DecodedValue, ListFlags};

/// Decode one command buffer with the default configuration.
pub fn decode(table: &CommandTable, buffer: &[u8]) -> Result<DecodedCommand> {
    decode_with_config(table, buffer, &DecoderConfig::default())
}

/// Decode one command buffer.
///
/// The buffer must hold exactly one command. Unknown enum codes are not an
/// error; the raw code is kept.
pub fn decode_with_config(
    table: &CommandTable,
    buffer: &[u8],
    config: &DecoderConfig,
) -> Result<DecodedCommand> {
    let mut reader = ArgReader::with_byte_order(buffer, config.byte_order);
    let identity = read_header(&mut reader)?;

    let Some(descriptor) = table.lookup(identity) else {
        debug!(%identity, len = buffer.len(), "no descriptor for command");
        return Err(DecodeError::UnknownCommand(identity));
    };

    let list_flags = if descriptor.is_list_item {
        Some(ListFlags::from_bits(reader.read_u8()?))
    } else {
        None
    };

    let mut values = Vec::with_capacity(descriptor.arguments.len());
    for argument in &descriptor.arguments {
        let offset = reader.position();
        let value = read_value(&mut reader, argument.type_tag).inspect_err(|err| {
            debug!(
                %identity,
                argument = %argument.name,
                offset,
                error = %err,
                "argument decode failed"
            );
        })?;
        if let DecodedValue::Enum(code) = value {
            note_unknown_enumerator(identity, argument, code);
        }
        values.push(value);
    }

    let trailing = reader.remaining();
    if trailing > 0 {
        if config.reject_trailing_bytes {
            return Err(DecodeError::TrailingBytes { count: trailing });
        }
        trace!(%identity, trailing, "ignoring trailing bytes");
    }

    Ok(DecodedCommand {
        identity,
        list_flags,
        values,
    })
}

/// Read only the command header, without consulting a table.
pub fn peek_identity(buffer: &[u8], config: &DecoderConfig) -> Result<CommandIdentity> {
    read_header(&mut ArgReader::with_byte_order(buffer, config.byte_order))
}

fn read_header(reader: &mut ArgReader<'_>) -> Result<CommandIdentity> {
    let feature_id = reader.read_u8()?;
    let class_id = reader.read_u8()?;
    let command_id = reader.read_u16()?;
    Ok(CommandIdentity::new(feature_id, class_id, command_id))
}

fn read_value(reader: &mut ArgReader<'_>, tag: ArgumentTypeTag) -> Result<DecodedValue> {
    let value = match tag {
        ArgumentTypeTag::U8 => DecodedValue::U8(reader.read_u8()?),
        ArgumentTypeTag::I8 => DecodedValue::I8(reader.read_i8()?),
        ArgumentTypeTag::U16 => DecodedValue::U16(reader.read_u16()?),
        ArgumentTypeTag::I16 => DecodedValue::I16(reader.read_i16()?),
        ArgumentTypeTag::U32 => DecodedValue::U32(reader.read_u32()?),
        ArgumentTypeTag::I32 => DecodedValue::I32(reader.read_i32()?),
        ArgumentTypeTag::U64 => DecodedValue::U64(reader.read_u64()?),
        ArgumentTypeTag::I64 => DecodedValue::I64(reader.read_i64()?),
        ArgumentTypeTag::Float => DecodedValue::Float(reader.read_float()?),
        ArgumentTypeTag::Double => DecodedValue::Double(reader.read_double()?),
        ArgumentTypeTag::String => DecodedValue::String(reader.read_string()?),
        ArgumentTypeTag::Enum => DecodedValue::Enum(reader.read_enum()?),
    };
    Ok(value)
}

fn note_unknown_enumerator(identity: CommandIdentity, argument: &ArgumentDescriptor, code: i32) {
    if !argument.enumerators.is_empty() && argument.enumerator_name(code).is_none() {
        debug!(
            %identity,
            argument = %argument.name,
            code,
            "enum code has no enumerator; keeping raw value"
        );
    }
}

#[cfg(test)]
mod tests {
    use cmdwire_frame::ByteOrder;
    use cmdwire_table::{ArgumentDescriptor, CommandDescriptor};

    use super::*;

    fn scenario_table() -> CommandTable {
        CommandTable::from_descriptors([
            CommandDescriptor::new(CommandIdentity::new(1, 2, 5), "demo.Sample.Value")
                .arg(ArgumentDescriptor::new("value", ArgumentTypeTag::I32)),
            CommandDescriptor::new(CommandIdentity::new(1, 2, 6), "demo.Sample.Items")
                .list_item()
                .arg(ArgumentDescriptor::new("id", ArgumentTypeTag::U8))
                .arg(ArgumentDescriptor::new("label", ArgumentTypeTag::String)),
            CommandDescriptor::new(CommandIdentity::new(1, 2, 7), "demo.Sample.Level")
                .list_item()
                .arg(ArgumentDescriptor::new("level", ArgumentTypeTag::U16)),
        ])
        .unwrap()
    }

    #[test]
    fn decodes_little_endian_scenario() {
        let table = scenario_table();
        let command = decode(&table, &[0x01, 0x02, 0x05, 0x00, 0x2A, 0x00, 0x00, 0x00]).unwrap();

        assert_eq!(command.identity, CommandIdentity::new(1, 2, 5));
        assert_eq!(command.list_flags, None);
        assert_eq!(command.values, vec![DecodedValue::I32(42)]);
    }

    #[test]
    fn decodes_big_endian_scenario() {
        let table = scenario_table();
        let config = DecoderConfig {
            byte_order: ByteOrder::Big,
            ..DecoderConfig::default()
        };
        let command = decode_with_config(
            &table,
            &[0x01, 0x02, 0x00, 0x05, 0x00, 0x00, 0x00, 0x2A],
            &config,
        )
        .unwrap();

        assert_eq!(command.identity, CommandIdentity::new(1, 2, 5));
        assert_eq!(command.values, vec![DecodedValue::I32(42)]);
    }

    #[test]
    fn unknown_command_is_reported_with_identity() {
        let table = scenario_table();
        let err = decode(&table, &[0x09, 0x09, 0x09, 0x00, 0xFF]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownCommand(CommandIdentity::new(9, 9, 9)));
        assert!(err.is_unknown_command());
    }

    #[test]
    fn short_header_is_truncated() {
        let table = scenario_table();
        assert_eq!(decode(&table, &[]).unwrap_err(), DecodeError::Truncated { offset: 0 });
        assert_eq!(
            decode(&table, &[0x01, 0x02, 0x05]).unwrap_err(),
            DecodeError::Truncated { offset: 2 }
        );
    }

    #[test]
    fn short_argument_is_truncated() {
        let table = scenario_table();
        let err = decode(&table, &[0x01, 0x02, 0x05, 0x00, 0x2A, 0x00]).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { offset: 4 });
    }

    #[test]
    fn list_item_reads_flags_before_arguments() {
        let table = scenario_table();
        let buf = [0x01, 0x02, 0x06, 0x00, 0x03, 0x07, b'a', b'b', 0x00];
        let command = decode(&table, &buf).unwrap();

        let flags = command.list_flags.unwrap();
        assert!(flags.is_first());
        assert!(flags.is_last());
        assert_eq!(
            command.values,
            vec![DecodedValue::U8(7), DecodedValue::String("ab".into())]
        );
    }

    #[test]
    fn list_item_missing_flags_byte() {
        let table = scenario_table();

        // Fixed-width body comes up one byte short.
        let level = [0x01, 0x02, 0x07, 0x00, 0x2C, 0x01];
        assert_eq!(
            decode(&table, &level).unwrap_err(),
            DecodeError::Truncated { offset: 5 }
        );

        // A trailing string absorbs the shift: id becomes the flags.
        let items = [0x01, 0x02, 0x06, 0x00, 0x07, b'a', b'b', 0x00];
        let command = decode(&table, &items).unwrap();
        assert_eq!(command.list_flags.map(|flags| flags.bits()), Some(0x07));
        assert_eq!(
            command.values,
            vec![DecodedValue::U8(b'a'), DecodedValue::String("b".into())]
        );
    }

    #[test]
    fn missing_string_terminator_is_truncated() {
        let table = scenario_table();
        let buf = [0x01, 0x02, 0x06, 0x00, 0x00, 0x07, b'a', b'b'];
        assert_eq!(
            decode(&table, &buf).unwrap_err(),
            DecodeError::Truncated { offset: 6 }
        );
    }

    #[test]
    fn invalid_utf8_string_is_rejected() {
        let table = scenario_table();
        let buf = [0x01, 0x02, 0x06, 0x00, 0x00, 0x07, 0xFF, 0xFE, 0x00];
        assert_eq!(
            decode(&table, &buf).unwrap_err(),
            DecodeError::InvalidString { offset: 6 }
        );
    }

    #[test]
    fn trailing_bytes_tolerated_unless_strict() {
        let table = scenario_table();
        let buf = [0x01, 0x02, 0x05, 0x00, 0x2A, 0x00, 0x00, 0x00, 0xEE, 0xEE];

        let command = decode(&table, &buf).unwrap();
        assert_eq!(command.values, vec![DecodedValue::I32(42)]);

        let err = decode_with_config(&table, &buf, &DecoderConfig::strict()).unwrap_err();
        assert_eq!(err, DecodeError::TrailingBytes { count: 2 });
    }

    #[test]
    fn peek_identity_needs_no_table() {
        let identity =
            peek_identity(&[0x85, 0x1C, 0x02, 0x00], &DecoderConfig::default()).unwrap();
        assert_eq!(identity, CommandIdentity::new(133, 28, 2));
    }
}
