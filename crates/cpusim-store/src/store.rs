use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cpusim_core::{Computer, SimResult};

use crate::record::{ComputerRecord, MAX_CAPACITY};
use crate::{StoreError, StoreResult};

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    computers: BTreeMap<String, ComputerRecord>,
}

/// JSON file holding every persisted computer, keyed by id.
///
/// Each mutating call writes the whole file back; writes go to a sibling
/// temporary file that is then renamed over the original.
#[derive(Debug)]
pub struct ComputerStore {
    path: PathBuf,
    file: StoreFile,
}

impl ComputerStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            StoreFile::default()
        };
        debug!(path = %path.display(), computers = file.computers.len(), "store opened");
        Ok(ComputerStore { path, file })
    }

    /// Stored ids in ascending order
    pub fn ids(&self) -> Vec<String> {
        self.file.computers.keys().cloned().collect()
    }

    /// Create and persist an empty computer, returning its id
    pub fn create(&mut self, capacity: usize) -> StoreResult<String> {
        if capacity > MAX_CAPACITY {
            return Err(StoreError::InvalidRecord(format!(
                "stack size {} exceeds {}",
                capacity, MAX_CAPACITY
            )));
        }
        self.file.next_id += 1;
        let id = format!("{:07x}", self.file.next_id);
        let record = ComputerRecord::from_computer(id.clone(), &Computer::new(capacity));
        self.file.computers.insert(id.clone(), record);
        self.flush()?;
        info!(%id, capacity, "computer created");
        Ok(id)
    }

    pub fn load(&self, id: &str) -> StoreResult<Computer> {
        self.record(id)?.into_computer()
    }

    /// Overwrite an existing computer
    pub fn save(&mut self, id: &str, computer: &Computer) -> StoreResult<()> {
        self.record(id)?;
        self.file
            .computers
            .insert(id.to_string(), ComputerRecord::from_computer(id, computer));
        self.flush()
    }

    /// Load, mutate and save a computer. Nothing is written when `apply` fails.
    pub fn update<T>(
        &mut self,
        id: &str,
        apply: impl FnOnce(&mut Computer) -> SimResult<T>,
    ) -> StoreResult<(T, Computer)> {
        let mut computer = self.load(id)?;
        let value = apply(&mut computer)?;
        self.save(id, &computer)?;
        Ok((value, computer))
    }

    pub fn remove(&mut self, id: &str) -> StoreResult<()> {
        self.file
            .computers
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.flush()?;
        info!(%id, "computer removed");
        Ok(())
    }

    fn record(&self, id: &str) -> StoreResult<&ComputerRecord> {
        self.file
            .computers
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn flush(&self) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(&self.file)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}
