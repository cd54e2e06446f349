//! Encoder producing the exact layout the decoder reads.

use bytes::{Bytes, BytesMut};
use cmdwire_frame::{ArgWriter, ByteOrder};
use cmdwire_table::{CommandIdentity, CommandTable};

use crate::error::EncodeError;
use crate::value::{DecodedCommand, DecodedValue, ListFlags};

/// Append one command to `dst`, validated against its descriptor.
///
/// Nothing is written when validation fails.
pub fn encode_command(
    table: &CommandTable,
    identity: CommandIdentity,
    list_flags: Option<ListFlags>,
    values: &[DecodedValue],
    order: ByteOrder,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    let descriptor = table
        .lookup(identity)
        .ok_or(EncodeError::UnknownCommand(identity))?;

    if descriptor.is_list_item != list_flags.is_some() {
        return Err(EncodeError::ListFlags {
            identity,
            is_list_item: descriptor.is_list_item,
        });
    }
    if descriptor.arguments.len() != values.len() {
        return Err(EncodeError::Arity {
            identity,
            expected: descriptor.arguments.len(),
            found: values.len(),
        });
    }
    for (index, (argument, value)) in descriptor.arguments.iter().zip(values).enumerate() {
        if argument.type_tag != value.type_tag() {
            return Err(EncodeError::TypeMismatch {
                identity,
                index,
                expected: argument.type_tag,
                found: value.type_tag(),
            });
        }
        if let DecodedValue::String(text) = value {
            if text.as_bytes().contains(&cmdwire_frame::NUL) {
                return Err(EncodeError::InteriorNul { index });
            }
        }
    }

    dst.reserve(descriptor.min_wire_size());
    let mut writer = ArgWriter::with_byte_order(dst, order);
    writer
        .write_u8(identity.feature_id)
        .write_u8(identity.class_id)
        .write_u16(identity.command_id);
    if let Some(flags) = list_flags {
        writer.write_u8(flags.bits());
    }
    for value in values {
        write_value(&mut writer, value);
    }
    Ok(())
}

/// Encode a decoded command back to little-endian bytes.
pub fn encode(table: &CommandTable, command: &DecodedCommand) -> Result<Bytes, EncodeError> {
    let mut dst = BytesMut::new();
    encode_command(
        table,
        command.identity,
        command.list_flags,
        &command.values,
        ByteOrder::Little,
        &mut dst,
    )?;
    Ok(dst.freeze())
}

fn write_value(writer: &mut ArgWriter<'_>, value: &DecodedValue) {
    match value {
        DecodedValue::U8(v) => writer.write_u8(*v),
        DecodedValue::I8(v) => writer.write_i8(*v),
        DecodedValue::U16(v) => writer.write_u16(*v),
        DecodedValue::I16(v) => writer.write_i16(*v),
        DecodedValue::U32(v) => writer.write_u32(*v),
        DecodedValue::I32(v) => writer.write_i32(*v),
        DecodedValue::U64(v) => writer.write_u64(*v),
        DecodedValue::I64(v) => writer.write_i64(*v),
        DecodedValue::Float(v) => writer.write_float(*v),
        DecodedValue::Double(v) => writer.write_double(*v),
        DecodedValue::String(v) => writer.write_string(v),
        DecodedValue::Enum(v) => writer.write_enum(*v),
    };
}

#[cfg(test)]
mod tests {
    use cmdwire_table::builtin;

    use super::*;
    use crate::decoder::decode;

    #[test]
    fn encodes_pcmd_layout() {
        let table = builtin();
        let command = DecodedCommand::new(
            CommandIdentity::new(1, 0, 2),
            vec![
                DecodedValue::U8(1),
                DecodedValue::I8(-1),
                DecodedValue::I8(2),
                DecodedValue::I8(0),
                DecodedValue::I8(0),
                DecodedValue::U32(0x0102_0304),
            ],
        );

        let bytes = encode(&table, &command).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0x01, 0x00, 0x02, 0x00, 0x01, 0xFF, 0x02, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(decode(&table, &bytes).unwrap(), command);

        let descriptor = table.lookup(command.identity).unwrap();
        assert_eq!(bytes.len(), descriptor.min_wire_size());
    }

    #[test]
    fn big_endian_header() {
        let table = builtin();
        let mut dst = BytesMut::new();
        encode_command(
            &table,
            CommandIdentity::new(0, 5, 1),
            None,
            &[DecodedValue::U8(50)],
            ByteOrder::Big,
            &mut dst,
        )
        .unwrap();
        assert_eq!(dst.as_ref(), &[0x00, 0x05, 0x00, 0x01, 0x32]);
    }

    #[test]
    fn rejects_wrong_value_type() {
        let table = builtin();
        let err = encode(
            &table,
            &DecodedCommand::new(CommandIdentity::new(0, 5, 1), vec![DecodedValue::U16(50)]),
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::TypeMismatch { index: 0, .. }));
    }

    #[test]
    fn rejects_wrong_arity_and_unknown_command() {
        let table = builtin();
        let err = encode(&table, &DecodedCommand::new(CommandIdentity::new(1, 0, 1), vec![
            DecodedValue::U8(0),
        ]))
        .unwrap_err();
        assert!(matches!(err, EncodeError::Arity { expected: 0, found: 1, .. }));

        let unknown = CommandIdentity::new(250, 0, 0);
        assert_eq!(
            encode(&table, &DecodedCommand::new(unknown, Vec::new())).unwrap_err(),
            EncodeError::UnknownCommand(unknown)
        );
    }

    #[test]
    fn list_flags_must_match_descriptor() {
        let table = builtin();
        let plain = DecodedCommand::new(CommandIdentity::new(1, 0, 1), Vec::new())
            .with_list_flags(ListFlags::from_bits(ListFlags::FIRST));
        assert!(matches!(
            encode(&table, &plain).unwrap_err(),
            EncodeError::ListFlags { is_list_item: false, .. }
        ));

        let item = DecodedCommand::new(
            CommandIdentity::new(0, 5, 10),
            vec![DecodedValue::String("FR".into())],
        );
        assert!(matches!(
            encode(&table, &item).unwrap_err(),
            EncodeError::ListFlags { is_list_item: true, .. }
        ));
    }

    #[test]
    fn rejects_interior_nul() {
        let table = builtin();
        let command = DecodedCommand::new(
            CommandIdentity::new(0, 2, 2),
            vec![DecodedValue::String("a\0b".into())],
        );
        assert_eq!(
            encode(&table, &command).unwrap_err(),
            EncodeError::InteriorNul { index: 0 }
        );
    }
}
