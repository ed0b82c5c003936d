use super::{Record, RecordValue, Recorder};
use log::info;

/// Writes each record as one `info` line through the [`log`] facade.
///
/// Keys are sorted so that lines of successive episodes line up.
#[derive(Default)]
pub struct LogRecorder {}

impl LogRecorder {
    fn format(record: &Record) -> String {
        let mut items = record
            .iter()
            .map(|(k, v)| match v {
                RecordValue::Scalar(v) => format!("{}={}", k, v),
                RecordValue::String(s) => format!("{}={}", k, s),
                RecordValue::DateTime(t) => format!("{}={}", k, t.to_rfc3339()),
            })
            .collect::<Vec<_>>();
        items.sort();
        items.join(" ")
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", Self::format(&record));
    }
}
