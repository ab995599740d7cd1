use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Leading character the script compiler gives every module it emits at runtime.
///
/// Modules whose full identifier starts with this marker are treated as
/// dynamically generated even when the host does not flag them explicitly.
pub const DYNAMIC_MODULE_MARKER: char = 'ℛ';

/// Identity of a loaded code module as reported by the host.
///
/// Two descriptors are the same module when their `full_identifier` matches;
/// `name` and the dynamic flag are informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Short module name (e.g. `Acme.Controllers`)
    pub name: String,
    /// Fully qualified identifier, used for prefix filtering and identity
    /// (e.g. `Acme.Controllers, Version=1.0.0.0, Culture=neutral`)
    pub full_identifier: String,
    /// `true` for modules compiled from script text inside the running process
    #[serde(default)]
    pub is_dynamic: bool,
}

impl ModuleDescriptor {
    /// Describe a module, inferring `is_dynamic` from [`DYNAMIC_MODULE_MARKER`].
    pub fn new(name: impl Into<String>, full_identifier: impl Into<String>) -> Self {
        let full_identifier = full_identifier.into();
        let is_dynamic = full_identifier.starts_with(DYNAMIC_MODULE_MARKER);
        Self {
            name: name.into(),
            full_identifier,
            is_dynamic,
        }
    }

    /// Describe a module compiled at runtime from script text.
    pub fn dynamic(name: impl Into<String>, full_identifier: impl Into<String>) -> Self {
        Self::new(name, full_identifier).with_dynamic(true)
    }

    /// Override the dynamic flag.
    #[must_use]
    pub fn with_dynamic(mut self, is_dynamic: bool) -> Self {
        self.is_dynamic = is_dynamic;
        self
    }
}

impl PartialEq for ModuleDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_identifier == other.full_identifier
    }
}

impl Eq for ModuleDescriptor {}

impl Hash for ModuleDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_identifier.hash(state);
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_identifier)
    }
}

/// Capability tag attached to a type (e.g. `http-controller`).
pub type Capability = String;

/// Read-only snapshot of a type defined in a loaded module.
///
/// `capabilities` already contains everything the type inherits; see
/// [`TypeDescriptor::derives_from`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully qualified type name (e.g. `Acme.Controllers.OrdersController`)
    pub full_name: String,
    /// Module the type was loaded from
    pub owning_module: ModuleDescriptor,
    /// Abstract types can never service a request
    #[serde(default)]
    pub is_abstract: bool,
    /// Capability tags the type implements, directly or through a base type
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl TypeDescriptor {
    pub fn new(full_name: impl Into<String>, owning_module: &ModuleDescriptor) -> Self {
        Self {
            full_name: full_name.into(),
            owning_module: owning_module.clone(),
            is_abstract: false,
            capabilities: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Inherit every capability of `base`.
    #[must_use]
    pub fn derives_from(mut self, base: &TypeDescriptor) -> Self {
        self.capabilities.extend(base.capabilities.iter().cloned());
        self
    }

    #[inline]
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}
