//! Decoding behaviour across the whole built-in command table.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use cmdwire_decoder::{
    decode, encode, CommandDecoder, DecodeError, DecodedCommand, DecodedValue, EnumCode,
    ListFlags,
};
use cmdwire_table::{builtin, ArgumentTypeTag, CommandDescriptor, CommandIdentity};

fn sample_value(tag: ArgumentTypeTag, seed: usize) -> DecodedValue {
    let n = seed as u8;
    match tag {
        ArgumentTypeTag::U8 => DecodedValue::U8(n),
        ArgumentTypeTag::I8 => DecodedValue::I8(-(n as i8 & 0x3F)),
        ArgumentTypeTag::U16 => DecodedValue::U16(0x0100 + n as u16),
        ArgumentTypeTag::I16 => DecodedValue::I16(-300 - n as i16),
        ArgumentTypeTag::U32 => DecodedValue::U32(0x0001_0000 + n as u32),
        ArgumentTypeTag::I32 => DecodedValue::I32(-70_000 - n as i32),
        ArgumentTypeTag::U64 => DecodedValue::U64(u64::MAX - n as u64),
        ArgumentTypeTag::I64 => DecodedValue::I64(i64::MIN + n as i64),
        ArgumentTypeTag::Float => DecodedValue::Float(1.25 + n as f32),
        ArgumentTypeTag::Double => DecodedValue::Double(-48.875 + n as f64),
        ArgumentTypeTag::String => DecodedValue::String(format!("value-{seed}")),
        ArgumentTypeTag::Enum => DecodedValue::Enum(seed as i32 % 3),
    }
}

fn sample_command(descriptor: &CommandDescriptor) -> DecodedCommand {
    let values = descriptor
        .arguments
        .iter()
        .enumerate()
        .map(|(seed, argument)| sample_value(argument.type_tag, seed + 1))
        .collect();
    let command = DecodedCommand::new(descriptor.identity, values);
    if descriptor.is_list_item {
        command.with_list_flags(ListFlags::from_bits(ListFlags::FIRST))
    } else {
        command
    }
}

#[test]
fn every_builtin_command_decodes_what_was_encoded() {
    let table = builtin();
    for descriptor in table.iter() {
        let command = sample_command(descriptor);
        let bytes = encode(&table, &command).unwrap();
        let decoded = decode(&table, &bytes).unwrap();
        assert_eq!(decoded, command, "{}", descriptor.name);
    }
}

#[test]
fn every_strict_prefix_is_truncated() {
    let table = builtin();
    for descriptor in table.iter() {
        let bytes = encode(&table, &sample_command(descriptor)).unwrap();
        for len in 0..bytes.len() {
            match decode(&table, &bytes[..len]) {
                Err(DecodeError::Truncated { offset }) => {
                    assert!(offset <= len, "{} prefix {len}", descriptor.name)
                }
                other => panic!("{} prefix {len}: {other:?}", descriptor.name),
            }
        }
    }
}

#[test]
fn decoder_resumes_after_unknown_command() {
    let decoder = CommandDecoder::builtin();
    let frames: [&[u8]; 3] = [
        &[0x00, 0x05, 0x01, 0x00, 0x20],
        &[0xC8, 0x01, 0x00, 0x01, 0xAA, 0xBB],
        &[0x00, 0x05, 0x01, 0x00, 0x1F],
    ];

    let results: Vec<_> = frames.iter().map(|frame| decoder.decode(frame)).collect();
    assert_eq!(results[0].as_ref().unwrap().values, vec![DecodedValue::U8(0x20)]);
    assert_eq!(
        results[1].as_ref().unwrap_err(),
        &DecodeError::UnknownCommand(CommandIdentity::new(200, 1, 256))
    );
    assert_eq!(results[2].as_ref().unwrap().values, vec![DecodedValue::U8(0x1F)]);
    assert_eq!(decoder.stats().unknown, 1);
}

#[test]
fn unknown_enum_code_is_kept() {
    let table = builtin();
    // FlyingStateChanged with a state code newer than the table.
    let bytes = [0x01, 0x04, 0x01, 0x00, 0x2A, 0x00, 0x00, 0x00];
    let command = decode(&table, &bytes).unwrap();

    assert_eq!(command.arg::<EnumCode>(0).unwrap(), EnumCode(42));
    let descriptor = table.lookup(command.identity).unwrap();
    assert_eq!(descriptor.arguments[0].enumerator_name(42), None);
    assert_eq!(descriptor.arguments[0].enumerator_name(3), Some("flying"));
}

#[test]
fn wifi_scan_list_item_carries_flags() {
    let table = builtin();
    let mut bytes = vec![0x01, 0x0E, 0x00, 0x00, ListFlags::LAST | ListFlags::REMOVE];
    bytes.extend_from_slice(b"lab\0");
    bytes.extend_from_slice(&(-52i16).to_le_bytes());
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.push(36);

    let command = decode(&table, &bytes).unwrap();
    let flags = command.list_flags.unwrap();
    assert!(flags.is_last());
    assert!(flags.is_remove());
    assert!(!flags.is_first());

    let (ssid, rssi, band, channel): (String, i16, EnumCode, u8) = command.args().unwrap();
    assert_eq!(ssid, "lab");
    assert_eq!(rssi, -52);
    assert_eq!(band, EnumCode(1));
    assert_eq!(channel, 36);
}

#[test]
fn wifi_scan_item_without_flags_byte_is_misread() {
    let table = builtin();
    let mut bytes = vec![0x01, 0x0E, 0x00, 0x00];
    bytes.extend_from_slice(b"lab\0");
    bytes.extend_from_slice(&(-52i16).to_le_bytes());
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.push(36);

    // The first ssid byte is taken as the flags and the string shifts by one.
    let command = decode(&table, &bytes).unwrap();
    assert_eq!(command.list_flags.map(|flags| flags.bits()), Some(b'l'));
    let (ssid, rssi): (String, i16) = (command.arg(0).unwrap(), command.arg(1).unwrap());
    assert_eq!(ssid, "ab");
    assert_eq!(rssi, -52);
}

#[test]
fn fixed_width_list_items_without_flags_byte_are_truncated() {
    let table = builtin();
    let fixed: Vec<&CommandDescriptor> = table
        .iter()
        .filter(|d| d.is_list_item && d.arguments.iter().all(|a| a.type_tag.wire_size().is_some()))
        .collect();
    assert!(fixed
        .iter()
        .any(|d| d.name == "ardrone3.NetworkState.WifiAuthChannelListChanged"));

    for descriptor in fixed {
        let mut bytes = encode(&table, &sample_command(descriptor)).unwrap().to_vec();
        bytes.remove(CommandIdentity::WIRE_SIZE);
        assert!(
            matches!(decode(&table, &bytes), Err(DecodeError::Truncated { .. })),
            "{}",
            descriptor.name
        );
    }
}

#[test]
fn concurrent_registration_and_dispatch() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 500;

    let decoder = Arc::new(CommandDecoder::builtin());
    let battery = CommandIdentity::new(0, 5, 1);
    let hits = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let dispatchers: Vec<_> = (0..THREADS)
        .map(|_| {
            let decoder = Arc::clone(&decoder);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut handled = 0;
                for _ in 0..ROUNDS {
                    if decoder
                        .decode_and_dispatch(&[0x00, 0x05, 0x01, 0x00, 0x50])
                        .unwrap()
                    {
                        handled += 1;
                    }
                }
                handled
            })
        })
        .collect();

    barrier.wait();
    for _ in 0..ROUNDS {
        let sink = Arc::clone(&hits);
        decoder.register_handler(battery, move |_: &DecodedCommand| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        decoder.unregister_handler(battery);
    }

    let handled: usize = dispatchers.into_iter().map(|t| t.join().unwrap()).sum();
    assert_eq!(handled, hits.load(Ordering::SeqCst));

    let stats = decoder.stats();
    assert_eq!(stats.decoded, (THREADS * ROUNDS) as u64);
    assert_eq!(stats.dispatched + stats.unhandled, stats.decoded);
}
