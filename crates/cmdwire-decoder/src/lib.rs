//! Table-driven command decoding and dispatch.
//!
//! A command buffer is a 4-byte header (feature, class, command) followed by
//! an optional list-flags byte and the arguments named by the command's
//! descriptor. [`decode`] turns a buffer into a [`DecodedCommand`];
//! [`CommandDecoder`] adds a [`HandlerRegistry`] so each decoded command
//! reaches the handler registered for its identity, if any.
//!
//! ```
//! use cmdwire_decoder::CommandDecoder;
//!
//! let decoder = CommandDecoder::builtin();
//! decoder
//!     .register_typed("common.CommonState.BatteryStateChanged", |(percent,): (u8,)| {
//!         assert_eq!(percent, 87);
//!     })
//!     .unwrap();
//!
//! let handled = decoder.decode_and_dispatch(&[0x00, 0x05, 0x01, 0x00, 87]).unwrap();
//! assert!(handled);
//! ```

pub mod config;
pub mod decoder;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod registry;
pub mod value;

pub use config::DecoderConfig;
pub use decoder::{decode, decode_with_config, peek_identity};
pub use dispatcher::{dispatch, CommandDecoder, StatsSnapshot};
pub use encoder::{encode, encode_command};
pub use error::{ArgumentError, DecodeError, EncodeError, Result};
pub use registry::{CommandHandler, HandlerRegistry, SharedHandler};
pub use value::{DecodedCommand, DecodedValue, EnumCode, FromArgs, FromValue, ListFlags};
