//! # Host Module
//!
//! Composition root that turns discovered controller types and formatter
//! configurations into an [`HttpConfiguration`] and hands it to an
//! [`ApiHost`].
//!
//! Applying the default configuration:
//!
//! 1. Fails with [`ConfigurationError::NoControllers`] when the type set holds
//!    no controller. An API without handlers is never started.
//! 2. Installs a [`ControllerResolver`](crate::discovery::ControllerResolver)
//!    over the controllers.
//! 3. Clears the route table and maps `DefaultApi` → `api/{controller}/{id}`
//!    with `id` optional.
//! 4. Applies the [`FormatterMode`] (JSON only, or a single formatter).

mod config;
mod error;
mod webapi;

pub use config::{FormatterCollection, HttpConfiguration, Negotiated, Route, RouteDefault, RouteTable};
pub use error::ConfigurationError;
pub use webapi::{ApiHost, FormatterMode, StartupHook, WebApi, DEFAULT_ROUTE_NAME, DEFAULT_ROUTE_TEMPLATE};
