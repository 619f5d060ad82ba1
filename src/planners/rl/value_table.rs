//! Tabular value estimates keyed by abstract state, with JSON persistence

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description};
use tracing::{info, warn};

use crate::error::PersistenceError;

use super::action_space::Intent;
use super::state::AbstractState;

const SNAPSHOT_TIMESTAMP: &str = "[year][month][day]-[hour][minute][second]";

/// One exported row: a state and its value per intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub state: AbstractState,
    pub values: BTreeMap<Intent, f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: HashMap<AbstractState, [f64; Intent::COUNT]>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, state: &AbstractState) -> bool {
        self.values.contains_key(state)
    }

    /// Row for `state`, inserted with zeros on first sight.
    pub fn ensure(&mut self, state: AbstractState) -> &mut [f64; Intent::COUNT] {
        self.values.entry(state).or_insert([0.0; Intent::COUNT])
    }

    /// Stored estimate, zero for unseen states. Does not insert.
    pub fn get(&self, state: &AbstractState, intent: Intent) -> f64 {
        self.values
            .get(state)
            .map_or(0.0, |row| row[intent.index()])
    }

    pub fn set(&mut self, state: AbstractState, intent: Intent, value: f64) {
        self.ensure(state)[intent.index()] = value;
    }

    pub fn best_value(&self, state: &AbstractState) -> f64 {
        let best = self.best_intent(state);
        self.get(state, best)
    }

    /// Highest-valued intent; ties go to the lowest intent index.
    pub fn best_intent(&self, state: &AbstractState) -> Intent {
        let mut best = Intent::ALL[0];
        for intent in Intent::ALL.into_iter().skip(1) {
            if self.get(state, intent) > self.get(state, best) {
                best = intent;
            }
        }
        best
    }

    /// Flat association list, sorted by state.
    pub fn export(&self) -> Vec<ValueEntry> {
        let mut entries: Vec<ValueEntry> = self
            .values
            .iter()
            .map(|(state, row)| ValueEntry {
                state: *state,
                values: Intent::ALL.into_iter().map(|i| (i, row[i.index()])).collect(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.state);
        entries
    }

    /// Rebuild a table from exported rows. Any bad row rejects the whole import.
    pub fn import(entries: Vec<ValueEntry>) -> Result<Self, PersistenceError> {
        let mut seen = HashSet::new();
        let mut values = HashMap::with_capacity(entries.len());

        for entry in entries {
            if !seen.insert(entry.state) {
                return Err(PersistenceError::DuplicateState(entry.state.to_string()));
            }

            let mut row = [0.0; Intent::COUNT];
            for intent in Intent::ALL {
                let value = *entry
                    .values
                    .get(&intent)
                    .ok_or_else(|| PersistenceError::MissingIntent(entry.state.to_string()))?;
                if !value.is_finite() {
                    return Err(PersistenceError::NonFinite(entry.state.to_string()));
                }
                row[intent.index()] = value;
            }
            values.insert(entry.state, row);
        }

        Ok(Self { values })
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let entries: Vec<ValueEntry> = serde_json::from_str(json)?;
        Self::import(entries)
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        info!("Saved {} value-table states to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// `dir/value_table-YYYYMMDD-HHMMSS.json` for the given time.
    pub fn snapshot_path(dir: &Path, now: OffsetDateTime) -> Result<PathBuf, PersistenceError> {
        let format =
            format_description::parse(SNAPSHOT_TIMESTAMP).map_err(time::error::Error::from)?;
        let stamp = now.format(&format).map_err(time::error::Error::from)?;
        Ok(dir.join(format!("value_table-{}.json", stamp)))
    }

    /// Load `path`, or start empty with a warning when it cannot be used.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => {
                info!("Loaded {} value-table states from {}", table.len(), path.display());
                table
            }
            Err(err) => {
                warn!("Ignoring value table {}: {}", path.display(), err);
                Self::new()
            }
        }
    }
}
