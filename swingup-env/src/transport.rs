//! Byte links to the rotary pendulum controller.
use crate::codec::{decode_command, TELEMETRY_LEN};
use std::{
    collections::VecDeque,
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    path::Path,
};

/// A blocking, bidirectional byte link.
///
/// Reads and writes may time out. Line settings such as the baud rate are the
/// responsibility of whoever prepares the device.
pub trait Transport {
    /// Opens the link at `path`.
    fn open(path: &Path) -> io::Result<Self>
    where
        Self: Sized;

    /// Writes bytes, returning how many were written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Reads bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Releases the link.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for File {
    fn open(path: &Path) -> io::Result<Self> {
        OpenOptions::new().read(true).write(true).open(path)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = Write::write(self, buf)?;
        self.flush()?;
        Ok(n)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Replays telemetry frames and records every command written.
///
/// Each read hands out the next chunk, usually one frame. An exhausted replay
/// reads as a timeout.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    chunks: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    closed: bool,
}

impl ReplayTransport {
    /// Replays the given chunks in order.
    pub fn new<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Splits a recording into telemetry frames.
    ///
    /// A trailing partial frame is replayed as a short read.
    pub fn from_recording(bytes: &[u8]) -> Self {
        Self::new(bytes.chunks(TELEMETRY_LEN).map(<[u8]>::to_vec))
    }

    /// Appends a chunk to the replay.
    pub fn push(&mut self, chunk: impl Into<Vec<u8>>) {
        self.chunks.push_back(chunk.into());
    }

    /// Number of chunks left.
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }

    /// Raw bytes of every write.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Every written command that decodes.
    pub fn commands(&self) -> Vec<f64> {
        self.written
            .iter()
            .filter_map(|b| decode_command(b).ok())
            .collect()
    }

    /// Returns `true` once [`Transport::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for ReplayTransport {
    /// Loads a recording of concatenated telemetry frames.
    fn open(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_recording(&bytes))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "replay closed"));
        }
        self.written.push(buf.to_vec());
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "replay closed"));
        }
        match self.chunks.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "replay exhausted")),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
