//! Script-host lifecycle adapter.
//!
//! The script host calls [`ScriptPack::initialize`] once per session so that
//! scripts can use the HTTP types without importing them, then asks for a
//! [`WebApi`] through [`ScriptPack::get_context`].

use tracing::debug;

use crate::discovery::ControllerDiscovery;
use crate::host::WebApi;

/// Reference added to every script session.
pub const SESSION_REFERENCE: &str = "System.Net.Http";

/// Namespaces imported into every script session, in import order.
pub const SESSION_NAMESPACES: [&str; 5] = [
    "System.Net.Http",
    "System.Net.Http.Headers",
    "System.Web.Http",
    "System.Web.Http.Routing",
    "Owin",
];

/// The script session a pack registers itself with.
pub trait ScriptPackSession {
    fn add_reference(&mut self, reference: &str);
    fn import_namespace(&mut self, namespace: &str);
}

/// Hands out [`WebApi`] contexts that share one discovery setup.
#[derive(Debug, Clone)]
pub struct ScriptPack {
    discovery: ControllerDiscovery,
}

impl ScriptPack {
    pub fn new(discovery: ControllerDiscovery) -> Self {
        Self { discovery }
    }

    /// Register the reference and namespace imports with `session`.
    pub fn initialize(&self, session: &mut dyn ScriptPackSession) {
        session.add_reference(SESSION_REFERENCE);
        for namespace in SESSION_NAMESPACES {
            session.import_namespace(namespace);
        }
        debug!(
            "Initialized script session with reference {} and {} namespace(s)",
            SESSION_REFERENCE,
            SESSION_NAMESPACES.len()
        );
    }

    /// A fresh, unconfigured [`WebApi`].
    #[must_use]
    pub fn get_context(&self) -> WebApi {
        WebApi::new(self.discovery.clone())
    }

    pub fn terminate(&self) {
        debug!("Script pack terminated");
    }
}
