//! Catalog of discrete actions.
use std::collections::HashMap;
use swingup_core::SwingupError;

/// A fixed list of action vectors.
///
/// Actions are looked up by exact value through a key made of the big-endian
/// bits of every element, so `0.0` and `-0.0` are the same action.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    actions: Vec<Vec<f64>>,
    index: HashMap<Vec<u8>, usize>,
}

fn key(a: &[f64]) -> Vec<u8> {
    // Adding positive zero turns -0.0 into 0.0.
    a.iter()
        .flat_map(|v| (v + 0.0).to_bits().to_be_bytes())
        .collect()
}

impl ActionCatalog {
    /// Constructs a catalog.
    ///
    /// Fails on an empty catalog, on actions of different lengths, on NaN and
    /// on duplicates.
    pub fn new(actions: Vec<Vec<f64>>) -> Result<Self, SwingupError> {
        let dim = match actions.first() {
            Some(a) if !a.is_empty() => a.len(),
            _ => {
                return Err(SwingupError::Configuration(
                    "the action catalog needs at least one non-empty action".to_string(),
                ))
            }
        };

        let mut index = HashMap::with_capacity(actions.len());
        for (i, a) in actions.iter().enumerate() {
            if a.len() != dim {
                return Err(SwingupError::Configuration(format!(
                    "action {} has {} elements, but {}",
                    i,
                    a.len(),
                    dim
                )));
            }
            if a.iter().any(|v| v.is_nan()) {
                return Err(SwingupError::Configuration(format!(
                    "action {} contains NaN: {:?}",
                    i, a
                )));
            }
            if let Some(j) = index.insert(key(a), i) {
                return Err(SwingupError::Configuration(format!(
                    "actions {} and {} are the same: {:?}",
                    j, i, a
                )));
            }
        }

        Ok(Self { actions, index })
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always `false`, a catalog is never empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of elements of every action.
    pub fn dim(&self) -> usize {
        self.actions[0].len()
    }

    /// Returns the `i`-th action.
    pub fn get(&self, i: usize) -> &[f64] {
        &self.actions[i]
    }

    /// Returns the index of an action.
    pub fn index_of(&self, a: &[f64]) -> Result<usize, SwingupError> {
        if a.len() != self.dim() {
            return Err(SwingupError::DimensionMismatch {
                expected: self.dim(),
                actual: a.len(),
            });
        }
        self.index.get(&key(a)).copied().ok_or_else(|| {
            SwingupError::Configuration(format!("action {:?} is not in the catalog", a))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of() -> Result<(), SwingupError> {
        let catalog = ActionCatalog::new(vec![vec![-1.0, 0.5], vec![0.0, 0.0], vec![1.0, 0.5]])?;
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.dim(), 2);
        assert_eq!(catalog.index_of(&[1.0, 0.5])?, 2);
        assert_eq!(catalog.index_of(&[-0.0, 0.0])?, 1);
        assert!(catalog.index_of(&[1.0, 0.25]).is_err());
        assert!(matches!(
            catalog.index_of(&[1.0]),
            Err(SwingupError::DimensionMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_reject_catalog() {
        assert!(ActionCatalog::new(vec![]).is_err());
        assert!(ActionCatalog::new(vec![vec![]]).is_err());
        assert!(ActionCatalog::new(vec![vec![0.0], vec![0.0, 1.0]]).is_err());
        assert!(ActionCatalog::new(vec![vec![f64::NAN]]).is_err());
        assert!(ActionCatalog::new(vec![vec![1.0], vec![2.0], vec![1.0]]).is_err());
        assert!(ActionCatalog::new(vec![vec![0.0], vec![-0.0]]).is_err());
    }

    #[test]
    fn test_close_values_are_distinct() -> Result<(), SwingupError> {
        let a = 0.1 + 0.2;
        let catalog = ActionCatalog::new(vec![vec![0.3], vec![a]])?;
        assert_eq!(catalog.index_of(&[0.3])?, 0);
        assert_eq!(catalog.index_of(&[a])?, 1);
        Ok(())
    }
}
