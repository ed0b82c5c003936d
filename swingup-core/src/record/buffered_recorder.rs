use super::{Record, Recorder};

/// Keeps every record in memory, in the order of writing.
#[derive(Default)]
pub struct BufferedRecorder {
    records: Vec<Record>,
}

impl BufferedRecorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far, oldest first.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.records.iter()
    }

    /// Number of records written.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` until the first write.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.records.push(record);
    }
}
