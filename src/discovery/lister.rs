use std::fmt;

use super::types::{ModuleDescriptor, TypeDescriptor};

/// Failure listing the types of a single module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLoadError {
    /// Some types resolved, others did not.
    ///
    /// `loaded` holds the usable types; `causes` holds one entry per member
    /// that failed to resolve, in the order the host reported them.
    Partial {
        loaded: Vec<TypeDescriptor>,
        causes: Vec<String>,
    },
    /// The module could not be scanned at all (permissions, missing
    /// dependencies, ...).
    Total { reason: String },
}

impl TypeLoadError {
    pub fn partial<I, S>(loaded: Vec<TypeDescriptor>, causes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeLoadError::Partial {
            loaded,
            causes: causes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn total(reason: impl Into<String>) -> Self {
        TypeLoadError::Total {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TypeLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeLoadError::Partial { loaded, causes } => write!(
                f,
                "{} type(s) failed to load ({} loaded)",
                causes.len(),
                loaded.len()
            ),
            TypeLoadError::Total { reason } => write!(f, "module could not be scanned: {reason}"),
        }
    }
}

impl std::error::Error for TypeLoadError {}

/// Read-only view of the host's loaded modules.
///
/// The host owns every descriptor; implementations must only read shared
/// state so discovery can run from several threads.
pub trait ModuleLister: Send + Sync {
    /// Every module currently loaded, in load order.
    fn loaded_modules(&self) -> Vec<ModuleDescriptor>;

    /// Types defined in `module`.
    fn list_types(&self, module: &ModuleDescriptor) -> Result<Vec<TypeDescriptor>, TypeLoadError>;
}

/// In-memory module table.
///
/// Stands in for the host in tests and backs the module manifest loader.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleLister {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    module: ModuleDescriptor,
    listing: Result<Vec<TypeDescriptor>, TypeLoadError>,
    loaded: bool,
}

impl StaticModuleLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module and its types. Re-registering a module replaces its
    /// types but keeps its original load position.
    pub fn add_module(&mut self, module: ModuleDescriptor, types: Vec<TypeDescriptor>) -> &mut Self {
        self.insert(module, Ok(types), true)
    }

    /// Register a module whose type listing fails.
    pub fn add_failing_module(&mut self, module: ModuleDescriptor, error: TypeLoadError) -> &mut Self {
        self.insert(module, Err(error), true)
    }

    /// Register a module that can be listed but is not reported as loaded.
    ///
    /// Such modules only take part in discovery when named explicitly.
    pub fn add_unloaded_module(&mut self, module: ModuleDescriptor, types: Vec<TypeDescriptor>) -> &mut Self {
        self.insert(module, Ok(types), false)
    }

    /// Register a module that is not reported as loaded and whose listing fails.
    pub fn add_unloaded_failing_module(&mut self, module: ModuleDescriptor, error: TypeLoadError) -> &mut Self {
        self.insert(module, Err(error), false)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(
        &mut self,
        module: ModuleDescriptor,
        listing: Result<Vec<TypeDescriptor>, TypeLoadError>,
        loaded: bool,
    ) -> &mut Self {
        match self.entries.iter_mut().find(|e| e.module == module) {
            Some(entry) => {
                entry.listing = listing;
                entry.loaded = loaded;
            }
            None => self.entries.push(Entry { module, listing, loaded }),
        }
        self
    }
}

impl ModuleLister for StaticModuleLister {
    fn loaded_modules(&self) -> Vec<ModuleDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.loaded)
            .map(|e| e.module.clone())
            .collect()
    }

    fn list_types(&self, module: &ModuleDescriptor) -> Result<Vec<TypeDescriptor>, TypeLoadError> {
        self.entries
            .iter()
            .find(|e| e.module == *module)
            .map(|e| e.listing.clone())
            // Explicitly supplied modules may be unknown to the table
            .unwrap_or_else(|| Err(TypeLoadError::total("module is not loaded")))
    }
}
