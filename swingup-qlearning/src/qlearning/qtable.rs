//! Table of action values.
use super::explorer::greedy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};
use swingup_core::SwingupError;

/// Action values of every discretized state, stored row by row.
///
/// The dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f64>,
}

impl QTable {
    /// Constructs a table filled with `init`.
    pub fn new(n_states: usize, n_actions: usize, init: f64) -> Self {
        Self {
            n_states,
            n_actions,
            values: vec![init; n_states * n_actions],
        }
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Action values of a state.
    pub fn row(&self, s: usize) -> &[f64] {
        &self.values[s * self.n_actions..(s + 1) * self.n_actions]
    }

    /// Action value of a state and an action.
    pub fn get(&self, s: usize, a: usize) -> f64 {
        self.values[s * self.n_actions + a]
    }

    /// Sets an action value.
    pub fn set(&mut self, s: usize, a: usize, v: f64) {
        self.values[s * self.n_actions + a] = v;
    }

    /// The largest action value of a state.
    pub fn max(&self, s: usize) -> f64 {
        self.row(s).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// The action with the largest value, the lowest index among ties.
    pub fn argmax(&self, s: usize) -> usize {
        greedy(self.row(s))
    }

    /// Saves the table.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut file, self)?;
        file.flush()?;
        Ok(())
    }

    /// Loads a table saved with [`QTable::save`].
    ///
    /// Fails with [`SwingupError::PersistenceAbsent`] if there is no file, and
    /// with [`SwingupError::PersistenceCorrupt`] if it cannot be read or its
    /// dimensions differ from the given ones.
    pub fn load(path: &Path, n_states: usize, n_actions: usize) -> Result<Self, SwingupError> {
        let corrupt = |reason: String| SwingupError::PersistenceCorrupt {
            path: path.to_path_buf(),
            reason,
        };

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SwingupError::PersistenceAbsent(path.to_path_buf()))
            }
            Err(e) => return Err(corrupt(e.to_string())),
        };
        let table: Self =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| corrupt(e.to_string()))?;

        if table.n_states != n_states || table.n_actions != n_actions {
            return Err(corrupt(format!(
                "expected {}x{} values, but {}x{}",
                n_states, n_actions, table.n_states, table.n_actions
            )));
        }
        if table.values.len() != n_states * n_actions {
            return Err(corrupt(format!(
                "expected {} values, but {}",
                n_states * n_actions,
                table.values.len()
            )));
        }
        Ok(table)
    }
}
