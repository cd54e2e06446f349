use std::fmt;
use std::io;

use cmdwire_decoder::DecodeError;
use cmdwire_frame::FrameError;
use cmdwire_table::TableError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidSize { .. }
        | FrameError::InvalidDataType(_)
        | FrameError::PayloadTooLarge { .. }
        | FrameError::ConnectionClosed => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn table_error(context: &str, err: TableError) -> CliError {
    match err {
        TableError::LoadFailed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        TableError::UnknownName(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn decode_error(context: &str, err: DecodeError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn usage_error(message: impl Into<String>) -> CliError {
    CliError::new(USAGE, message)
}

#[cfg(test)]
mod tests {
    use cmdwire_table::CommandIdentity;

    use super::*;

    #[test]
    fn decode_errors_are_data_invalid() {
        let err = decode_error(
            "decode",
            DecodeError::UnknownCommand(CommandIdentity::new(9, 9, 9)),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.to_string(), "decode: unknown command 9.9.9");
    }

    #[test]
    fn missing_table_file_is_failure() {
        let err = table_error("load table", TableError::LoadFailed("gone".into()));
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn truncated_envelope_is_data_invalid() {
        assert_eq!(
            frame_error("read", FrameError::ConnectionClosed).code,
            DATA_INVALID
        );
        let io = FrameError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(frame_error("read", io).code, INTERNAL);
    }
}
