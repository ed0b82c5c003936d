//! Types and traits for recording episode metrics.
//!
//! The [`Trainer`](crate::Trainer) writes one [`Record`] per episode to a
//! [`Recorder`] handed to it by the caller. The recorder decides where the
//! record goes:
//!
//! * [`LogRecorder`] - renders each record as a single log line
//! * [`BufferedRecorder`] - keeps records in memory
//! * [`NullRecorder`] - discards records
//!
//! # Basic Usage
//!
//! ```rust
//! use swingup_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("regime", RecordValue::String("up".to_string()));
//! assert_eq!(record.get_scalar("episode").unwrap(), 3.0);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use recorder::{NullRecorder, Recorder};
