use std::fs::File;
use std::io::BufReader;

use cmdwire_decoder::CommandDecoder;
use cmdwire_frame::{FrameConfig, FrameReader};
use tracing::{debug, warn};

use crate::cmd::{Context, StreamArgs};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_command, print_summary, FrameContext, StreamSummary};

pub fn run(args: StreamArgs, ctx: &Context) -> CliResult<i32> {
    let table = ctx.load_table()?;
    let decoder = CommandDecoder::with_config(table, ctx.decoder_config());

    let file = File::open(&args.path)
        .map_err(|err| io_error(&format!("open {}", args.path.display()), err))?;
    let config = FrameConfig {
        max_payload_size: args.max_payload,
    };
    let mut reader = FrameReader::with_config(BufReader::new(file), config);

    let mut summary = StreamSummary::default();
    let mut envelope_failure = None;
    for index in 0usize.. {
        let frame = match reader.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                // Envelope sizes are untrustworthy past this point.
                let offset = reader.position();
                warn!(index, offset, error = %err, "corrupt frame envelope; stopping");
                summary.envelope_error = true;
                envelope_failure = Some(frame_error(
                    &format!("frame {index} at offset {offset}"),
                    err,
                ));
                break;
            }
        };
        summary.frames += 1;

        if !frame.data_type.carries_command() {
            debug!(index, data_type = ?frame.data_type, "frame carries no command");
            summary.skipped_frames += 1;
            continue;
        }

        match decoder.decode(&frame.payload) {
            Ok(command) => {
                if args.summary_only {
                    continue;
                }
                if let Some(descriptor) = decoder.table().lookup(command.identity) {
                    let context = FrameContext {
                        index,
                        buffer_id: frame.buffer_id,
                        sequence: frame.sequence,
                    };
                    print_command(&command, descriptor, Some(context), ctx.format);
                }
            }
            Err(err) => {
                warn!(
                    index,
                    buffer_id = frame.buffer_id,
                    sequence = frame.sequence,
                    error = %err,
                    "skipping frame"
                );
            }
        }
    }

    summary.commands = decoder.stats();
    print_summary(&summary, ctx.format);

    match envelope_failure {
        Some(err) => Err(err),
        None => Ok(SUCCESS),
    }
}
