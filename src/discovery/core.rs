//! Controller discovery over the host's loaded modules.
//!
//! Script hosts keep every module they ever compiled loaded in the same
//! process. Each run of a script that declares a controller adds another
//! dynamically generated module holding another copy of it. Discovery
//! therefore keeps only the last dynamic controller it sees, so the routing
//! table always reflects the script that is currently executing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::classifier::{CapabilityClassifier, HandlerClassifier};
use super::filter::ModuleFilter;
use super::lister::{ModuleLister, TypeLoadError};
use super::types::{ModuleDescriptor, TypeDescriptor};

/// A module (or a member of one) that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub module: ModuleDescriptor,
    pub reason: String,
}

/// Handler types found by a discovery pass plus every scan failure absorbed
/// along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub handlers: Vec<TypeDescriptor>,
    pub failures: Vec<ScanFailure>,
}

impl DiscoveryResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.handlers.iter().any(|t| t.full_name == full_name)
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|t| t.full_name.as_str()).collect()
    }

    /// Consume the result, keeping only the handler types.
    #[must_use]
    pub fn into_handlers(self) -> Vec<TypeDescriptor> {
        self.handlers
    }
}

/// Finds controller types among the modules a [`ModuleLister`] reports.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use webapi_pack::discovery::{
///     ControllerDiscovery, ModuleDescriptor, StaticModuleLister, TypeDescriptor, HANDLER_CAPABILITY,
/// };
///
/// let module = ModuleDescriptor::new("Acme", "Acme, Version=1.0.0.0");
/// let mut lister = StaticModuleLister::new();
/// lister.add_module(
///     module.clone(),
///     vec![TypeDescriptor::new("Acme.OrdersController", &module).with_capability(HANDLER_CAPABILITY)],
/// );
///
/// let discovery = ControllerDiscovery::new(Arc::new(lister));
/// let result = discovery.discover_all();
/// assert_eq!(result.handler_names(), vec!["Acme.OrdersController"]);
/// ```
#[derive(Clone)]
pub struct ControllerDiscovery {
    lister: Arc<dyn ModuleLister>,
    classifier: Arc<dyn HandlerClassifier>,
    filter: ModuleFilter,
}

impl ControllerDiscovery {
    /// Discovery with the default [`CapabilityClassifier`] and [`ModuleFilter`].
    pub fn new(lister: Arc<dyn ModuleLister>) -> Self {
        Self {
            lister,
            classifier: Arc::new(CapabilityClassifier::default()),
            filter: ModuleFilter::new(),
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn HandlerClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: ModuleFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn classifier(&self) -> Arc<dyn HandlerClassifier> {
        Arc::clone(&self.classifier)
    }

    #[must_use]
    pub fn filter(&self) -> &ModuleFilter {
        &self.filter
    }

    /// Every type from every eligible module, in load order.
    ///
    /// Scan failures are logged and returned alongside; they never abort the pass.
    #[must_use]
    pub fn loaded_types(&self) -> (Vec<TypeDescriptor>, Vec<ScanFailure>) {
        let modules = self
            .lister
            .loaded_modules()
            .into_iter()
            .filter(|m| self.filter.is_eligible(m));
        self.scan(modules)
    }

    /// Discover controllers across all ambient modules.
    ///
    /// Keeps every concrete controller from ordinary modules, then appends the
    /// last concrete controller found in a dynamically generated module.
    #[must_use]
    pub fn discover_all(&self) -> DiscoveryResult {
        let (types, failures) = self.loaded_types();

        let (dynamic, ordinary): (Vec<_>, Vec<_>) = types
            .into_iter()
            .filter(|t| self.classifier.is_handler_type(t) && !t.is_abstract)
            .partition(|t| t.owning_module.is_dynamic);

        let mut handlers = ordinary;
        if let Some(latest) = dynamic.into_iter().last() {
            handlers.push(latest);
        }

        report(&handlers);
        DiscoveryResult { handlers, failures }
    }

    /// Discover controllers across the ambient modules plus `explicit_modules`.
    ///
    /// Explicitly supplied modules opt in: no module filtering and no dynamic
    /// module handling apply. Duplicate modules are scanned once.
    #[must_use]
    pub fn discover_from(&self, explicit_modules: &[ModuleDescriptor]) -> DiscoveryResult {
        let mut seen = HashSet::new();
        let modules: Vec<_> = self
            .lister
            .loaded_modules()
            .into_iter()
            .chain(explicit_modules.iter().cloned())
            .filter(|m| seen.insert(m.full_identifier.clone()))
            .collect();

        let (types, failures) = self.scan(modules);
        let handlers: Vec<_> = types
            .into_iter()
            .filter(|t| self.classifier.is_handler_type(t))
            .collect();

        report(&handlers);
        DiscoveryResult { handlers, failures }
    }

    fn scan<I>(&self, modules: I) -> (Vec<TypeDescriptor>, Vec<ScanFailure>)
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        let mut types = Vec::new();
        let mut failures = Vec::new();

        for module in modules {
            match self.lister.list_types(&module) {
                Ok(loaded) => {
                    debug!("Loaded module {}", module);
                    types.extend(loaded);
                }
                Err(TypeLoadError::Partial { loaded, causes }) => {
                    for cause in causes {
                        warn!("Could not load types from {}: {}", module, cause);
                        failures.push(ScanFailure {
                            module: module.clone(),
                            reason: cause,
                        });
                    }
                    types.extend(loaded);
                }
                Err(TypeLoadError::Total { reason }) => {
                    warn!("Could not load types from {}: {}", module, reason);
                    failures.push(ScanFailure { module, reason });
                }
            }
        }

        (types, failures)
    }
}

impl std::fmt::Debug for ControllerDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerDiscovery")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

fn report(handlers: &[TypeDescriptor]) {
    for handler in handlers {
        debug!("Found controller: {}", handler.full_name);
    }
}
