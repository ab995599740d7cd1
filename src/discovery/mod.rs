//! # Discovery Module
//!
//! Finds the controller types a script API should route to.
//!
//! ## Overview
//!
//! The host process carries an uncontrolled set of loaded modules: the script
//! host itself, its logging and DI libraries, the base runtime, pre-built user
//! libraries and every module compiled from script text so far. Discovery
//! works through that set in three steps:
//!
//! 1. **[`ModuleFilter`]** drops infrastructure and base-runtime modules by
//!    identifier prefix ([`IGNORED_MODULE_PREFIXES`], [`BASE_RUNTIME_PREFIXES`]).
//! 2. **[`ModuleLister`]** lists the types of each remaining module. Failures
//!    are absorbed per module ([`TypeLoadError`]) and logged.
//! 3. **[`HandlerClassifier`]** picks the controller types; abstract types are
//!    dropped and only the last controller from a dynamically generated module
//!    is kept.
//!
//! [`ControllerDiscovery::discover_from`] skips step 1 for modules the script
//! names explicitly.
//!
//! ## Logging
//!
//! | Event | Level | Message |
//! |-------|-------|---------|
//! | Controller reported | `debug` | `Found controller: <full name>` |
//! | Module or member failed | `warn` | `Could not load types from <module>: <detail>` |
//! | Module scanned | `debug` | `Loaded module <module>` |

mod classifier;
mod core;
mod filter;
mod lister;
mod resolver;
mod types;

pub use classifier::{CapabilityClassifier, HandlerClassifier, HANDLER_CAPABILITY};
pub use core::{ControllerDiscovery, DiscoveryResult, ScanFailure};
pub use filter::{ModuleFilter, BASE_RUNTIME_PREFIXES, IGNORED_MODULE_PREFIXES};
pub use lister::{ModuleLister, StaticModuleLister, TypeLoadError};
pub use resolver::{contains_controller_type, where_controller_type, ControllerResolver};
pub use types::{Capability, ModuleDescriptor, TypeDescriptor, DYNAMIC_MODULE_MARKER};
