use super::response::{EffectiveArea, IrfError, Irfs};
use super::tabulated::TabulatedAeff;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

type IrfFactory = Box<dyn Fn() -> Result<Irfs, IrfError> + Send + Sync>;

/// One response set in a TOML manifest: a front and a back effective-area table.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct IrfSetEntry {
    front: PathBuf,
    back: PathBuf,
}

/// An explicitly constructed registry of response-function factories.
///
/// The registry replaces a process-wide factory singleton: the caller owns it,
/// populates it before any lookup, and passes it by reference to whatever needs
/// to resolve handles. Entries are keyed by full name, `<set>::FRONT` or
/// `<set>::BACK`, and each [`IrfRegistry::create`] call produces a fresh owned
/// [`Irfs`] handle.
#[derive(Default)]
pub struct IrfRegistry {
    factories: HashMap<String, IrfFactory>,
}

impl IrfRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Irfs, IrfError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Resolves a fresh handle for `name`, failing if the entry is unknown.
    pub fn create(&self, name: &str) -> Result<Irfs, IrfError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| IrfError::UnknownIrf(name.to_string()))?;
        factory()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered entry names, sorted for stable presentation.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Loads a TOML manifest and registers every response set it declares.
    ///
    /// Each top-level table maps a set name to `front` and `back` CSV table
    /// paths; relative paths are resolved against the manifest's directory.
    /// Tables are loaded eagerly so that a broken manifest fails here rather
    /// than at first query. Returns the number of entries registered.
    pub fn load_manifest(&mut self, path: &Path) -> Result<usize, IrfError> {
        let content = std::fs::read_to_string(path).map_err(|e| IrfError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let sets: HashMap<String, IrfSetEntry> =
            toml::from_str(&content).map_err(|e| IrfError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;

        let base = path.parent().unwrap_or(Path::new("."));
        let mut registered = 0;
        for (set_name, entry) in sets {
            for (suffix, table_path) in [("FRONT", &entry.front), ("BACK", &entry.back)] {
                let resolved = if table_path.is_absolute() {
                    table_path.clone()
                } else {
                    base.join(table_path)
                };
                let table = Arc::new(TabulatedAeff::load(&resolved)?);
                let name = format!("{set_name}::{suffix}");
                debug!(entry = %name, table = %resolved.display(), "registered IRF entry");
                self.register_table(name, table);
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// Registers a shared table under `name`; each created handle gets its own copy.
    pub fn register_table(&mut self, name: impl Into<String>, table: Arc<TabulatedAeff>) {
        let name = name.into();
        let entry_name = name.clone();
        self.register(name, move || {
            let aeff: Box<dyn EffectiveArea> = Box::new(table.as_ref().clone());
            Ok(Irfs::new(entry_name.clone(), aeff))
        });
    }
}

impl std::fmt::Debug for IrfRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrfRegistry")
            .field("entries", &self.names())
            .finish()
    }
}
