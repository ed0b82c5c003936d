//! Episode records.
use crate::error::SwingupError;
use chrono::prelude::{DateTime, Local};
use std::collections::{hash_map::Iter, HashMap};

/// A value in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// Numbers such as the episode return or the step count.
    Scalar(f32),

    /// Wall-clock time at which an episode ended.
    DateTime(DateTime<Local>),

    /// Labels such as the control regime.
    String(String),
}

/// Named values describing one episode.
///
/// ```rust
/// use swingup_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("return", -12.5);
/// record.insert("regime", RecordValue::String("up".into()));
///
/// assert_eq!(record.get_scalar("return").unwrap(), -12.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// A record without entries.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// A record with the single entry `name`.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        let mut record = Self::empty();
        record.insert(name, RecordValue::Scalar(value));
        record
    }

    /// A record with the given entries. Later duplicates win.
    pub fn from_slice<K: Into<String> + Clone>(entries: &[(K, RecordValue)]) -> Self {
        let mut record = Self::empty();
        for (k, v) in entries {
            record.insert(k.clone(), v.clone());
        }
        record
    }

    /// Adds or replaces the entry `k`.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// The entry `k`, if any.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// The scalar entry `k`.
    pub fn get_scalar(&self, k: &str) -> Result<f32, SwingupError> {
        match self.lookup(k)? {
            RecordValue::Scalar(v) => Ok(*v),
            _ => Err(SwingupError::RecordValueTypeError("Scalar".to_string())),
        }
    }

    /// The string entry `k`.
    pub fn get_string(&self, k: &str) -> Result<String, SwingupError> {
        match self.lookup(k)? {
            RecordValue::String(s) => Ok(s.clone()),
            _ => Err(SwingupError::RecordValueTypeError("String".to_string())),
        }
    }

    /// `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn lookup(&self, k: &str) -> Result<&RecordValue, SwingupError> {
        self.0
            .get(k)
            .ok_or_else(|| SwingupError::RecordKeyError(k.to_string()))
    }
}
