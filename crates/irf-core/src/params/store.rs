use super::group::{ParError, ParGroup};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use tracing::debug;

/// An explicitly constructed store of parameter groups, keyed by application name.
///
/// The store searches an ordered list of directories for `<app>.par` files and
/// caches each group on first access. The directory list usually comes from the
/// PFILES environment variable, but the store itself never reads global state
/// unless asked to via [`ParameterStore::from_pfiles`].
#[derive(Debug, Default)]
pub struct ParameterStore {
    search_paths: Vec<PathBuf>,
    groups: HashMap<String, ParGroup>,
}

impl ParameterStore {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            groups: HashMap::new(),
        }
    }

    /// Builds a store from the PFILES environment variable, failing with a
    /// typed error when it is unset.
    pub fn from_pfiles() -> Result<Self, ParError> {
        let raw = std::env::var("PFILES").map_err(|_| ParError::PfilesNotSet)?;
        Ok(Self::from_pfiles_value(&raw))
    }

    /// Parses a PFILES-style path list: segments separated by `;` or `:`, with
    /// empty segments dropped.
    pub fn from_pfiles_value(raw: &str) -> Self {
        let search_paths = raw
            .split([';', ':'])
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        Self::new(search_paths)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Returns the parameter group for `app_name`, loading `<app_name>.par`
    /// from the search path on first access.
    pub fn group(&mut self, app_name: &str) -> Result<&mut ParGroup, ParError> {
        let file = format!("{app_name}.par");
        match self.groups.entry(app_name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = locate(&self.search_paths, &file)?;
                debug!(app = app_name, path = %path.display(), "loading parameter group");
                let group = ParGroup::load(&path)?;
                Ok(entry.insert(group))
            }
        }
    }

    /// Looks up the application's parameter group and hands it to
    /// [`Application::run`].
    pub fn run(&mut self, app: &mut dyn Application) -> Result<(), ParError> {
        let group = self.group(app.app_name())?;
        app.run(group)
    }
}

fn locate(search_paths: &[PathBuf], file: &str) -> Result<PathBuf, ParError> {
    for dir in search_paths {
        let candidate = dir.join(file);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ParError::GroupNotFound {
        file: file.to_string(),
        searched: search_paths.to_vec(),
    })
}

/// An application driven by a named parameter group.
///
/// The default [`Application::run`] is a deliberate no-op so adapters that only
/// need parameter access can implement `app_name` alone; tools override it with
/// their orchestration.
pub trait Application {
    fn app_name(&self) -> &str;

    fn run(&mut self, _pars: &mut ParGroup) -> Result<(), ParError> {
        Ok(())
    }
}
