//! Module manifests.
//!
//! A manifest describes a host's modules and types in YAML or JSON so that
//! discovery can run outside a live script host (the CLI, tests, benches).
//!
//! ```yaml
//! modules:
//!   - name: Acme.Api
//!     identifier: "Acme.Api, Version=1.0.0.0"
//!     types:
//!       - name: Acme.Api.ApiControllerBase
//!         abstract: true
//!         capabilities: [http-controller]
//!       - name: Acme.Api.OrdersController
//!         base: Acme.Api.ApiControllerBase
//!   - name: Broken
//!     identifier: "Broken, Version=0.1.0.0"
//!     failure:
//!       reason: "missing dependency Acme.Core"
//! ```
//!
//! A module whose identifier starts with `ℛ` is dynamic unless `dynamic` says
//! otherwise. `loaded: false` keeps a module out of the ambient set so it is
//! only scanned when named explicitly. `failure.causes` makes a listing
//! partial (the listed types still load); `failure.reason` alone makes it fail
//! outright.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::discovery::{ModuleDescriptor, StaticModuleLister, TypeDescriptor, TypeLoadError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,
    #[serde(default = "loaded_by_default")]
    pub loaded: bool,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Full name of a type declared earlier in the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub causes: Vec<String>,
}

fn loaded_by_default() -> bool {
    true
}

impl ModuleEntry {
    #[must_use]
    pub fn descriptor(&self) -> ModuleDescriptor {
        let module = ModuleDescriptor::new(self.name.as_str(), self.identifier.as_str());
        match self.dynamic {
            Some(is_dynamic) => module.with_dynamic(is_dynamic),
            None => module,
        }
    }
}

impl Manifest {
    /// Parse YAML (or JSON, which is valid YAML) text.
    ///
    /// # Errors
    ///
    /// Fails when the text does not describe a manifest.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("invalid module manifest")
    }

    /// # Errors
    ///
    /// Fails when the text does not describe a manifest.
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        serde_json::from_str(content).context("invalid module manifest")
    }

    /// Descriptor of the module named by `name` or `identifier`.
    #[must_use]
    pub fn module(&self, name_or_identifier: &str) -> Option<ModuleDescriptor> {
        self.modules
            .iter()
            .find(|m| m.identifier == name_or_identifier || m.name == name_or_identifier)
            .map(ModuleEntry::descriptor)
    }

    /// Build the module table this manifest describes.
    ///
    /// # Errors
    ///
    /// Fails when a type names a base type that was not declared before it.
    pub fn to_lister(&self) -> anyhow::Result<StaticModuleLister> {
        let mut lister = StaticModuleLister::new();
        let mut declared: HashMap<&str, TypeDescriptor> = HashMap::new();

        for entry in &self.modules {
            let module = entry.descriptor();
            let mut types = Vec::with_capacity(entry.types.len());

            for t in &entry.types {
                let mut descriptor = TypeDescriptor::new(t.name.as_str(), &module);
                if let Some(base) = &t.base {
                    let Some(base_type) = declared.get(base.as_str()) else {
                        bail!("type '{}' derives from undeclared type '{}'", t.name, base);
                    };
                    descriptor = descriptor.derives_from(base_type);
                }
                for capability in &t.capabilities {
                    descriptor = descriptor.with_capability(capability.as_str());
                }
                if t.is_abstract {
                    descriptor = descriptor.abstract_type();
                }
                declared.insert(t.name.as_str(), descriptor.clone());
                types.push(descriptor);
            }

            let error = entry.failure.as_ref().map(|failure| {
                if failure.causes.is_empty() {
                    TypeLoadError::total(failure.reason.as_deref().unwrap_or("unknown error"))
                } else {
                    TypeLoadError::partial(types.clone(), failure.causes.iter().cloned())
                }
            });

            match (error, entry.loaded) {
                (Some(error), true) => lister.add_failing_module(module, error),
                (Some(error), false) => lister.add_unloaded_failing_module(module, error),
                (None, true) => lister.add_module(module, types),
                (None, false) => lister.add_unloaded_module(module, types),
            };
        }

        Ok(lister)
    }
}

/// Read a manifest file; `.yaml`/`.yml` is parsed as YAML, anything else as JSON.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed.
pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read manifest {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let manifest = if is_yaml {
        Manifest::from_yaml_str(&content)
    } else {
        Manifest::from_json_str(&content)
    };
    manifest.with_context(|| format!("failed to load manifest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ModuleLister, HANDLER_CAPABILITY};

    const MANIFEST: &str = r#"
modules:
  - name: Acme.Api
    identifier: "Acme.Api, Version=1.0.0.0"
    types:
      - name: Acme.Api.ApiControllerBase
        abstract: true
        capabilities: [http-controller]
      - name: Acme.Api.OrdersController
        base: Acme.Api.ApiControllerBase
  - name: Script
    identifier: "ℛ*a1b2, Version=0.0.0.0"
  - name: Extra
    identifier: "Extra, Version=2.0.0.0"
    loaded: false
  - name: Broken
    identifier: "Broken, Version=0.1.0.0"
    failure:
      reason: "missing dependency Acme.Core"
"#;

    #[test]
    fn test_manifest_builds_lister() {
        let manifest = Manifest::from_yaml_str(MANIFEST).unwrap();
        let lister = manifest.to_lister().unwrap();

        let loaded: Vec<_> = lister.loaded_modules().into_iter().map(|m| m.name).collect();
        assert_eq!(loaded, vec!["Acme.Api", "Script", "Broken"]);

        let api = manifest.module("Acme.Api").unwrap();
        let types = lister.list_types(&api).unwrap();
        assert!(types[0].is_abstract);
        assert!(types[1].has_capability(HANDLER_CAPABILITY));
        assert!(!types[1].is_abstract);

        assert!(manifest.module("Script").unwrap().is_dynamic);
        assert!(matches!(
            lister.list_types(&manifest.module("Broken").unwrap()),
            Err(TypeLoadError::Total { .. })
        ));
    }

    #[test]
    fn test_undeclared_base_is_rejected() {
        let manifest = Manifest::from_yaml_str(
            r#"
modules:
  - name: A
    identifier: A
    types:
      - name: A.Child
        base: A.Missing
"#,
        )
        .unwrap();
        let err = manifest.to_lister().unwrap_err();
        assert!(err.to_string().contains("undeclared type 'A.Missing'"));
    }

    #[test]
    fn test_unloaded_failing_module_is_not_ambient() {
        let manifest = Manifest::from_yaml_str(
            r#"
modules:
  - name: X
    identifier: "X, Version=1.0.0.0"
    loaded: false
    failure:
      reason: boom
"#,
        )
        .unwrap();
        let lister = manifest.to_lister().unwrap();

        assert!(lister.loaded_modules().is_empty());
        match lister.list_types(&manifest.module("X").unwrap()) {
            Err(TypeLoadError::Total { reason }) => assert_eq!(reason, "boom"),
            other => panic!("expected total failure, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_failure_keeps_types() {
        let manifest = Manifest::from_json_str(
            r#"{"modules":[{"name":"P","identifier":"P","types":[{"name":"P.T"}],
                "failure":{"causes":["bad signature"]}}]}"#,
        )
        .unwrap();
        let lister = manifest.to_lister().unwrap();
        match lister.list_types(&manifest.module("P").unwrap()) {
            Err(TypeLoadError::Partial { loaded, causes }) => {
                assert_eq!(loaded.len(), 1);
                assert_eq!(causes, vec!["bad signature"]);
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
    }
}
