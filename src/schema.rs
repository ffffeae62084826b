//! Trained feature schema: the ordered column names the classifier was fitted on

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, RiskError};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from ordered column names. Names must be non-empty and unique.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(RiskError::Schema("feature list is empty".to_string()));
        }

        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(RiskError::Schema(format!("duplicate feature name '{}'", name)));
            }
        }

        Ok(Self { names, positions })
    }

    /// Load a schema artifact: a JSON array of column names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RiskError::Startup(format!("cannot read feature schema {}: {}", path.display(), e))
        })?;
        let names: Vec<String> = serde_json::from_str(&contents).map_err(|e| {
            RiskError::Startup(format!("feature schema {} is not a JSON string array: {}", path.display(), e))
        })?;

        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }
}
