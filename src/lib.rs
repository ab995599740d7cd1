//! # webapi-pack
//!
//! A script pack that lets a script stand up an in-process HTTP API: it finds
//! the controller types among the modules loaded into the script host and
//! configures an HTTP layer for them, with custom content-negotiation
//! formatters built through a fluent API.
//!
//! ## Architecture
//!
//! - **[`discovery`]** - Module filtering, controller classification and the
//!   "last dynamic controller wins" policy
//! - **[`formatter`]** - Formatter builder, negotiation rules and the built-in
//!   JSON and form-urlencoded formatters
//! - **[`host`]** - HTTP configuration (resolver, routes, formatters) and the
//!   script-facing [`WebApi`](host::WebApi)
//! - **[`script_pack`]** - Script session registration and context hand-out
//! - **[`manifest`]** - YAML/JSON module manifests standing in for a live host
//! - **[`runtime_config`]** / **[`logging`]** - Environment-driven setup
//! - **[`cli`]** - The `webapi-pack` binary
//!
//! ### Startup Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Script
//!     participant Pack as ScriptPack
//!     participant Api as WebApi
//!     participant Disc as ControllerDiscovery
//!     participant Lister as ModuleLister (host)
//!     participant Host as ApiHost
//!
//!     Script->>Pack: get_context()
//!     Pack-->>Script: WebApi
//!     Script->>Api: use_json_only()
//!     Script->>Api: start(host, "http://localhost:8080")
//!     Api->>Disc: discover_all()
//!     Disc->>Lister: loaded_modules()
//!     Disc->>Disc: ModuleFilter::is_eligible
//!     Disc->>Lister: list_types(module)
//!     Disc->>Disc: classify, keep last dynamic
//!     Disc-->>Api: DiscoveryResult
//!     Api->>Api: resolver, DefaultApi route, formatters
//!     Api->>Host: start(base_address, config)
//!     Host-->>Script: Handle
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use webapi_pack::discovery::{ControllerDiscovery, ModuleDescriptor, StaticModuleLister, TypeDescriptor, HANDLER_CAPABILITY};
//! use webapi_pack::script_pack::ScriptPack;
//!
//! let module = ModuleDescriptor::new("Acme", "Acme, Version=1.0.0.0");
//! let mut lister = StaticModuleLister::new();
//! lister.add_module(
//!     module.clone(),
//!     vec![TypeDescriptor::new("Acme.OrdersController", &module).with_capability(HANDLER_CAPABILITY)],
//! );
//!
//! let pack = ScriptPack::new(ControllerDiscovery::new(Arc::new(lister)));
//! let mut api = pack.get_context();
//! api.configure(&[]).unwrap();
//!
//! let config = api.configuration().unwrap();
//! assert_eq!(config.routes.get("DefaultApi").unwrap().template(), "api/{controller}/{id}");
//! let resolver = config.controller_resolver.as_ref().unwrap();
//! assert_eq!(resolver.controller_types()[0].full_name, "Acme.OrdersController");
//! ```

pub mod cli;
pub mod discovery;
pub mod formatter;
pub mod host;
pub mod logging;
pub mod manifest;
pub mod runtime_config;
pub mod script_pack;

pub use discovery::{ControllerDiscovery, DiscoveryResult, ModuleDescriptor, TypeDescriptor};
pub use formatter::{FormatterBuilder, FormatterConfiguration, FormatterError};
pub use host::{ApiHost, ConfigurationError, HttpConfiguration, WebApi};
pub use script_pack::{ScriptPack, ScriptPackSession};
