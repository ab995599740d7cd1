//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the web API pack.
//!
//! ## Environment Variables
//!
//! ### `WEBAPI_BASE_ADDRESS`
//!
//! Address the API is started at. Default: `http://localhost:8080`
//!
//! ### `WEBAPI_JSON_ONLY`
//!
//! `true` keeps only the JSON formatter. Default: `false`
//!
//! ### `WEBAPI_HANDLER_CAPABILITY`
//!
//! Capability tag that marks a type as a controller. Default: `http-controller`
//!
//! ### `WEBAPI_EXTRA_IGNORED_PREFIXES`
//!
//! Comma-separated module identifier prefixes skipped during discovery, on top
//! of the built-in list.
//!
//! ## Usage
//!
//! ```rust
//! use webapi_pack::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! let filter = config.module_filter();
//! println!("Starting at {} ({} extra prefixes)", config.base_address, filter.extra_prefixes().len());
//! ```

use std::env;
use std::sync::Arc;

use crate::discovery::{CapabilityClassifier, ControllerDiscovery, ModuleFilter, ModuleLister, HANDLER_CAPABILITY};
use crate::host::{ApiHost, WebApi};

pub const DEFAULT_BASE_ADDRESS: &str = "http://localhost:8080";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub base_address: String,
    pub json_only: bool,
    pub handler_capability: String,
    pub extra_ignored_prefixes: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS.to_string(),
            json_only: false,
            handler_capability: HANDLER_CAPABILITY.to_string(),
            extra_ignored_prefixes: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            base_address: non_blank("WEBAPI_BASE_ADDRESS").unwrap_or(defaults.base_address),
            json_only: non_blank("WEBAPI_JSON_ONLY")
                .and_then(|v| v.to_ascii_lowercase().parse().ok())
                .unwrap_or(defaults.json_only),
            handler_capability: non_blank("WEBAPI_HANDLER_CAPABILITY").unwrap_or(defaults.handler_capability),
            extra_ignored_prefixes: non_blank("WEBAPI_EXTRA_IGNORED_PREFIXES")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// The built-in module filter plus the configured extra prefixes.
    #[must_use]
    pub fn module_filter(&self) -> ModuleFilter {
        ModuleFilter::new().with_extra_prefixes(self.extra_ignored_prefixes.iter().cloned())
    }

    /// Discovery over `lister` with this configuration's filter and capability.
    #[must_use]
    pub fn discovery(&self, lister: Arc<dyn ModuleLister>) -> ControllerDiscovery {
        ControllerDiscovery::new(lister)
            .with_classifier(Arc::new(CapabilityClassifier::new(self.handler_capability.clone())))
            .with_filter(self.module_filter())
    }

    /// Start `api` on `host` at the configured base address.
    ///
    /// `json_only` switches the API to the JSON formatter before it starts.
    ///
    /// # Errors
    ///
    /// See [`WebApi::start`].
    pub fn start_api<H: ApiHost>(&self, api: &mut WebApi, host: &H) -> anyhow::Result<H::Handle> {
        if self.json_only {
            api.use_json_only();
        }
        api.start(host, &self.base_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ModuleDescriptor, StaticModuleLister, TypeDescriptor};
    use crate::host::HttpConfiguration;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use url::Url;

    #[derive(Default)]
    struct RecordingHost {
        started: Mutex<Vec<(String, usize)>>,
    }

    impl ApiHost for RecordingHost {
        type Handle = ();

        fn start(&self, base_address: &Url, configuration: Arc<HttpConfiguration>) -> anyhow::Result<()> {
            self.started
                .lock()
                .unwrap()
                .push((base_address.to_string(), configuration.formatters.len()));
            Ok(())
        }
    }

    fn api_for(config: &RuntimeConfig) -> WebApi {
        let module = ModuleDescriptor::new("Acme.Api", "Acme.Api, Version=1.0.0.0");
        let controller =
            TypeDescriptor::new("Acme.Api.OrdersController", &module).with_capability(config.handler_capability.clone());
        let mut lister = StaticModuleLister::new();
        lister.add_module(module, vec![controller]);
        WebApi::new(config.discovery(Arc::new(lister)))
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.base_address, "http://localhost:8080");
        assert_eq!(config.handler_capability, "http-controller");
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WEBAPI_BASE_ADDRESS", "http://0.0.0.0:9000"),
            ("WEBAPI_JSON_ONLY", "TRUE"),
            ("WEBAPI_HANDLER_CAPABILITY", "api-controller"),
            ("WEBAPI_EXTRA_IGNORED_PREFIXES", "Serilog., , Newtonsoft."),
        ]));
        assert_eq!(config.base_address, "http://0.0.0.0:9000");
        assert!(config.json_only);
        assert_eq!(config.handler_capability, "api-controller");
        assert_eq!(config.extra_ignored_prefixes, vec!["Serilog.", "Newtonsoft."]);
        assert_eq!(config.module_filter().extra_prefixes(), ["Serilog.", "Newtonsoft."]);
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WEBAPI_BASE_ADDRESS", "  "),
            ("WEBAPI_JSON_ONLY", "maybe"),
        ]));
        assert_eq!(config.base_address, DEFAULT_BASE_ADDRESS);
        assert!(!config.json_only);
    }

    #[test]
    fn test_start_api_uses_base_address_and_json_only() {
        let config = RuntimeConfig {
            base_address: "http://0.0.0.0:9000".into(),
            json_only: true,
            ..RuntimeConfig::default()
        };
        let host = RecordingHost::default();
        config.start_api(&mut api_for(&config), &host).unwrap();

        let default_host = RecordingHost::default();
        let defaults = RuntimeConfig::default();
        defaults.start_api(&mut api_for(&defaults), &default_host).unwrap();

        assert_eq!(*host.started.lock().unwrap(), vec![("http://0.0.0.0:9000/".to_string(), 1)]);
        assert_eq!(*default_host.started.lock().unwrap(), vec![("http://localhost:8080/".to_string(), 2)]);
    }

    #[test]
    fn test_start_api_rejects_bad_base_address() {
        let config = RuntimeConfig {
            base_address: "not a url".into(),
            ..RuntimeConfig::default()
        };
        let host = RecordingHost::default();
        let err = config.start_api(&mut api_for(&config), &host).unwrap_err();
        assert!(err.to_string().contains("invalid base address 'not a url'"));
        assert!(host.started.lock().unwrap().is_empty());
    }
}
