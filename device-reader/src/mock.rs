use crate::{LineSource, ReadError, decode_line};
use std::collections::VecDeque;
use std::io;

enum Scripted {
    Idle,
    Raw(Vec<u8>),
    Fail(io::ErrorKind),
}

/// A scripted device that replays queued lines, idle polls and I/O failures.
///
/// Once the script is exhausted every poll reports no pending data.
#[derive(Default)]
pub struct MockDevice {
    script: VecDeque<Scripted>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a device that emits each given line once, in order.
    pub fn with_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut device = Self::new();
        for line in lines {
            device.push_line(line);
        }
        device
    }

    pub fn push_line(&mut self, line: &str) -> &mut Self {
        self.push_bytes(format!("{}\n", line).into_bytes())
    }

    pub fn push_bytes(&mut self, raw: Vec<u8>) -> &mut Self {
        self.script.push_back(Scripted::Raw(raw));
        self
    }

    /// Queues one poll that finds no pending bytes.
    pub fn push_idle(&mut self) -> &mut Self {
        self.script.push_back(Scripted::Idle);
        self
    }

    pub fn push_failure(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.script.push_back(Scripted::Fail(kind));
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl LineSource for MockDevice {
    fn read_line(&mut self) -> Result<Option<String>, ReadError> {
        match self.script.pop_front() {
            None | Some(Scripted::Idle) => Ok(None),
            Some(Scripted::Raw(raw)) => decode_line(&raw).map(Some),
            Some(Scripted::Fail(kind)) => Err(io::Error::from(kind).into()),
        }
    }
}
