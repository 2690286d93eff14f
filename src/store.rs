//! Persistence for the task list.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::task::TaskList;

/// Key-value style storage holding the whole task list as one value.
pub trait TaskStore {
    /// Read the stored list. A store that has never been written yields an empty list.
    fn load(&self) -> Result<TaskList>;

    /// Replace the stored list.
    fn save(&self, tasks: &TaskList) -> Result<()>;

    /// Load the list, apply `f`, and write the result back.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut TaskList) -> T,
    {
        let mut tasks = self.load()?;
        let out = f(&mut tasks);
        self.save(&tasks)?;
        Ok(out)
    }
}

/// Task list stored as a JSON document `{ "tasks": [...] }`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<TaskList> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "task store not found, starting empty");
            return Ok(TaskList::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })?;
        let tasks: TaskList =
            serde_json::from_str(&content).map_err(|source| Error::StoreParse {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn save(&self, tasks: &TaskList) -> Result<()> {
        let write_err = |source| Error::Write {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(tasks).map_err(Error::StoreEncode)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        // Write beside the target and rename so a crash never leaves a truncated store
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;

        info!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}
