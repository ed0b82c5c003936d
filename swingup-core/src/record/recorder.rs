use super::Record;

/// Destination of the per-episode [`Record`]s.
pub trait Recorder {
    /// Takes a record written at the end of an episode.
    fn write(&mut self, record: Record);
}

/// Drops every record.
#[derive(Default)]
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    fn write(&mut self, _: Record) {}
}
