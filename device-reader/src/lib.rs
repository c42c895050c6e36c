pub mod mock;
pub mod serial;

pub use serial::{LineReader, PendingInput, SerialDeviceReader, SerialSettings};

use thiserror::Error;

/// A source of newline-delimited text records, polled without blocking indefinitely.
pub trait LineSource {
    /// Returns the next record, trimmed of surrounding whitespace.
    ///
    /// `Ok(None)` means no bytes were pending and the caller should poll again
    /// later. `Ok(Some(line))` may carry an empty string when the device sent a
    /// blank line.
    fn read_line(&mut self) -> Result<Option<String>, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("could not open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("received bytes that are not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

/// Decodes one raw line as UTF-8 and trims it.
pub fn decode_line(raw: &[u8]) -> Result<String, ReadError> {
    let text = std::str::from_utf8(raw)?;

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line_trims_terminators() {
        assert_eq!(decode_line(b"{\"v\": 1.0}\r\n").unwrap(), "{\"v\": 1.0}");
        assert_eq!(decode_line(b"   \n").unwrap(), "");
    }

    #[test]
    fn test_decode_line_rejects_invalid_utf8() {
        let err = decode_line(&[0x7b, 0xff, 0xfe, b'\n']).unwrap_err();

        assert!(matches!(err, ReadError::Decode(_)));
    }
}
