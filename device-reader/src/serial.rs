use crate::{LineSource, ReadError, decode_line};
use log::debug;
use serialport::SerialPort;
use std::io::{self, BufRead, BufReader, Read};
use std::time::Duration;

/// Parameters needed to open the device's serial interface.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound on how long a single read waits for the rest of a line.
    pub read_timeout: Duration,
}

/// A byte stream that can report how many bytes are ready to be read.
pub trait PendingInput: Read {
    fn bytes_pending(&self) -> io::Result<u32>;
}

impl PendingInput for Box<dyn SerialPort> {
    fn bytes_pending(&self) -> io::Result<u32> {
        Ok(self.bytes_to_read()?)
    }
}

/// Splits a pending-aware byte stream into trimmed text lines.
pub struct LineReader<P: PendingInput> {
    reader: BufReader<P>,
}

/// Line reader over a real serial port.
pub type SerialDeviceReader = LineReader<Box<dyn SerialPort>>;

impl LineReader<Box<dyn SerialPort>> {
    /// Opens the serial port with the given settings.
    ///
    /// The caller is expected to wait for the device's settle delay before
    /// the first read.
    pub fn open(settings: &SerialSettings) -> Result<Self, ReadError> {
        let port = serialport::new(settings.port.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|source| ReadError::Open {
                port: settings.port.clone(),
                source,
            })?;

        debug!(
            "Opened {} at {} baud (timeout {:?})",
            settings.port, settings.baud_rate, settings.read_timeout
        );

        Ok(Self::new(port))
    }
}

impl<P: PendingInput> LineReader<P> {
    pub fn new(input: P) -> Self {
        Self {
            reader: BufReader::new(input),
        }
    }

    fn has_pending(&self) -> io::Result<bool> {
        if !self.reader.buffer().is_empty() {
            return Ok(true);
        }

        Ok(self.reader.get_ref().bytes_pending()? > 0)
    }
}

impl<P: PendingInput> LineSource for LineReader<P> {
    fn read_line(&mut self) -> Result<Option<String>, ReadError> {
        if !self.has_pending()? {
            return Ok(None);
        }

        let mut raw = Vec::new();

        match self.reader.read_until(b'\n', &mut raw) {
            Ok(_) => {}
            // The terminator never arrived; hand back what we have.
            Err(e) if e.kind() == io::ErrorKind::TimedOut && !raw.is_empty() => {
                debug!("Read timed out after {} bytes without a terminator", raw.len());
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        decode_line(&raw).map(Some)
    }
}
