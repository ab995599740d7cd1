use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use url::Url;

use super::config::{FormatterCollection, HttpConfiguration, RouteDefault};
use super::error::ConfigurationError;
use crate::discovery::{where_controller_type, ControllerDiscovery, ControllerResolver, ModuleDescriptor, TypeDescriptor};
use crate::formatter::{FormatterBuilder, FormatterConfiguration};

pub const DEFAULT_ROUTE_NAME: &str = "DefaultApi";
pub const DEFAULT_ROUTE_TEMPLATE: &str = "api/{controller}/{id}";

/// Runs against the configuration right before it is handed to the host.
pub type StartupHook = Arc<dyn Fn(&mut HttpConfiguration) + Send + Sync>;

/// The HTTP server that actually serves a configured API.
pub trait ApiHost {
    /// Keeps the API running; dropping or closing it stops the API.
    type Handle;

    /// Start serving `configuration` at `base_address`.
    ///
    /// # Errors
    ///
    /// Whatever prevents the server from starting (address in use, ...).
    fn start(&self, base_address: &Url, configuration: Arc<HttpConfiguration>) -> anyhow::Result<Self::Handle>;
}

/// Which formatters the configured API keeps.
#[derive(Debug, Clone, Default)]
pub enum FormatterMode {
    /// Leave the configuration's formatter set alone
    #[default]
    Default,
    /// Keep only the JSON formatter
    JsonOnly,
    /// Replace the formatter set with this formatter
    Only(FormatterConfiguration),
}

/// Script-facing entry point for building and starting an API.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use webapi_pack::discovery::{ControllerDiscovery, ModuleDescriptor, StaticModuleLister, TypeDescriptor, HANDLER_CAPABILITY};
/// use webapi_pack::host::WebApi;
///
/// let module = ModuleDescriptor::new("Acme", "Acme, Version=1.0.0.0");
/// let orders = TypeDescriptor::new("Acme.OrdersController", &module).with_capability(HANDLER_CAPABILITY);
///
/// let mut api = WebApi::new(ControllerDiscovery::new(Arc::new(StaticModuleLister::new())));
/// api.use_json_only().configure(&[orders]).unwrap();
///
/// let config = api.configuration().unwrap();
/// assert_eq!(config.routes.len(), 1);
/// assert_eq!(config.formatters.len(), 1);
/// ```
#[derive(Clone)]
pub struct WebApi {
    discovery: ControllerDiscovery,
    startup: Option<StartupHook>,
    config: Option<HttpConfiguration>,
    formatter_mode: FormatterMode,
}

impl WebApi {
    pub fn new(discovery: ControllerDiscovery) -> Self {
        Self {
            discovery,
            startup: None,
            config: None,
            formatter_mode: FormatterMode::Default,
        }
    }

    /// Configure a fresh [`HttpConfiguration`] for `controller_types`.
    ///
    /// An empty slice means "discover controllers across the loaded modules".
    ///
    /// # Errors
    ///
    /// `NoControllers` when the final type set holds no controller.
    pub fn configure(&mut self, controller_types: &[TypeDescriptor]) -> Result<&mut Self, ConfigurationError> {
        self.configure_with(HttpConfiguration::new(), controller_types)
    }

    /// Configure for the controllers found in the loaded modules plus `modules`.
    ///
    /// # Errors
    ///
    /// `NoControllers` when no controller is found.
    pub fn configure_modules(&mut self, modules: &[ModuleDescriptor]) -> Result<&mut Self, ConfigurationError> {
        let types = self.discovery.discover_from(modules).into_handlers();
        self.configure_with(HttpConfiguration::new(), &types)
    }

    /// Like [`configure`](Self::configure), against a caller-supplied configuration.
    ///
    /// # Errors
    ///
    /// `NoControllers` when the final type set holds no controller.
    pub fn configure_with(
        &mut self,
        mut config: HttpConfiguration,
        controller_types: &[TypeDescriptor],
    ) -> Result<&mut Self, ConfigurationError> {
        let types = if controller_types.is_empty() {
            self.discovery.discover_all().into_handlers()
        } else {
            controller_types.to_vec()
        };

        self.apply_default_configuration(&mut config, &types)?;
        self.config = Some(config);
        Ok(self)
    }

    pub fn with_startup<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut HttpConfiguration) + Send + Sync + 'static,
    {
        self.startup = Some(Arc::new(hook));
        self
    }

    /// Serve JSON only. Cancels [`use_formatter_only`](Self::use_formatter_only).
    pub fn use_json_only(&mut self) -> &mut Self {
        self.formatter_mode = FormatterMode::JsonOnly;
        self
    }

    /// Serve through `formatter` alone. Cancels [`use_json_only`](Self::use_json_only).
    pub fn use_formatter_only(&mut self, formatter: FormatterConfiguration) -> &mut Self {
        self.formatter_mode = FormatterMode::Only(formatter);
        self
    }

    #[must_use]
    pub fn new_formatter(&self) -> FormatterBuilder {
        FormatterBuilder::new()
    }

    #[must_use]
    pub fn configuration(&self) -> Option<&HttpConfiguration> {
        self.config.as_ref()
    }

    #[must_use]
    pub fn formatter_mode(&self) -> &FormatterMode {
        &self.formatter_mode
    }

    #[must_use]
    pub fn discovery(&self) -> &ControllerDiscovery {
        &self.discovery
    }

    /// Start the API on `host`.
    ///
    /// Configures by discovery first if nothing was configured yet. The
    /// formatter mode is applied again so that it may be chosen after
    /// configuring; then the startup hook runs.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable base address, when configuring fails, or when
    /// the host cannot start.
    pub fn start<H: ApiHost>(&mut self, host: &H, base_address: &str) -> anyhow::Result<H::Handle> {
        let base_address =
            Url::parse(base_address).with_context(|| format!("invalid base address '{base_address}'"))?;

        if self.config.is_none() {
            self.configure(&[]).context("failed to configure web API")?;
        }
        let mut config = self.config.clone().unwrap_or_default();
        self.apply_formatter_mode(&mut config.formatters);
        if let Some(hook) = &self.startup {
            hook(&mut config);
        }

        info!("Starting web API at {}", base_address);
        host.start(&base_address, Arc::new(config))
            .with_context(|| format!("failed to start web API at {base_address}"))
    }

    /// Install the controller resolver, the default route and the formatter mode.
    ///
    /// # Errors
    ///
    /// `NoControllers` when `controller_types` holds no controller.
    pub fn apply_default_configuration(
        &self,
        config: &mut HttpConfiguration,
        controller_types: &[TypeDescriptor],
    ) -> Result<(), ConfigurationError> {
        let classifier = self.discovery.classifier();
        let controllers: Vec<TypeDescriptor> = where_controller_type(controller_types, &classifier).cloned().collect();
        if controllers.is_empty() {
            return Err(ConfigurationError::NoControllers {
                offered: controller_types.len(),
            });
        }

        info!("Configuring web API with {} controller(s)", controllers.len());
        config.controller_resolver = Some(ControllerResolver::new(controllers));

        config.routes.clear();
        config
            .routes
            .map_http_route(DEFAULT_ROUTE_NAME, DEFAULT_ROUTE_TEMPLATE, [("id", RouteDefault::Optional)])?;

        self.apply_formatter_mode(&mut config.formatters);
        Ok(())
    }

    fn apply_formatter_mode(&self, formatters: &mut FormatterCollection) {
        match &self.formatter_mode {
            FormatterMode::Default => {}
            FormatterMode::JsonOnly => {
                let json = formatters.json_formatter().cloned();
                formatters.clear();
                match json {
                    Some(json) => formatters.add(json),
                    None => warn!("JSON only requested but no JSON formatter is configured"),
                }
            }
            FormatterMode::Only(formatter) => {
                formatters.clear();
                formatters.add(formatter.clone());
            }
        }
    }
}

impl std::fmt::Debug for WebApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebApi")
            .field("discovery", &self.discovery)
            .field("config", &self.config)
            .field("formatter_mode", &self.formatter_mode)
            .field("startup", &self.startup.as_ref().map(|_| "<hook>"))
            .finish()
    }
}
