//! Task type registration and the module loader seam.
//!
//! How task libraries are found (plugin binaries, globbing, manual tables) is
//! the loader's business. The dispatcher only ever sees the `Vec<TaskType>`
//! a loader returns.

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use super::model::TaskType;

/// Parameters a loader receives from the launcher.
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    /// Only task types whose name matches are eligible.
    pub type_filter: Option<Regex>,
}

impl LoadRequest {
    pub fn accepts(&self, type_name: &str) -> bool {
        self.type_filter
            .as_ref()
            .is_none_or(|filter| filter.is_match(type_name))
    }
}

/// Supplies the candidate task types for one launcher run.
pub trait ModuleLoader {
    fn load(&self, request: &LoadRequest) -> Result<Vec<TaskType>>;
}

/// Loader over task types registered in-process.
#[derive(Debug, Clone, Default)]
pub struct StaticModules {
    types: Vec<TaskType>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, task: TaskType) -> Self {
        self.register(task);
        self
    }

    pub fn register(&mut self, task: TaskType) {
        self.types.push(task);
    }

}

impl ModuleLoader for StaticModules {
    fn load(&self, request: &LoadRequest) -> Result<Vec<TaskType>> {
        let loaded: Vec<TaskType> = self
            .types
            .iter()
            .filter(|task| request.accepts(task.name()))
            .cloned()
            .collect();
        debug!(
            registered = self.types.len(),
            loaded = loaded.len(),
            "loaded task types"
        );
        Ok(loaded)
    }
}
