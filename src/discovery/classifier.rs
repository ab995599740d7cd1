use super::types::TypeDescriptor;

/// Capability tag the HTTP layer uses to recognise a controller.
pub const HANDLER_CAPABILITY: &str = "http-controller";

/// Strategy deciding whether a type can service requests.
///
/// The HTTP layer owns the definition of "controller", so discovery takes the
/// check as a strategy instead of hard-coding it. Closures work directly:
///
/// ```rust
/// use webapi_pack::discovery::{HandlerClassifier, ModuleDescriptor, TypeDescriptor};
///
/// let by_suffix = |t: &TypeDescriptor| t.full_name.ends_with("Controller");
/// let module = ModuleDescriptor::new("Acme", "Acme");
/// assert!(by_suffix.is_handler_type(&TypeDescriptor::new("Acme.OrdersController", &module)));
/// ```
pub trait HandlerClassifier: Send + Sync {
    fn is_handler_type(&self, ty: &TypeDescriptor) -> bool;
}

impl<F> HandlerClassifier for F
where
    F: Fn(&TypeDescriptor) -> bool + Send + Sync,
{
    fn is_handler_type(&self, ty: &TypeDescriptor) -> bool {
        self(ty)
    }
}

/// Default classifier: the type carries the handler marker capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityClassifier {
    capability: String,
}

impl CapabilityClassifier {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }

    #[must_use]
    pub fn capability(&self) -> &str {
        &self.capability
    }
}

impl Default for CapabilityClassifier {
    fn default() -> Self {
        Self::new(HANDLER_CAPABILITY)
    }
}

impl HandlerClassifier for CapabilityClassifier {
    fn is_handler_type(&self, ty: &TypeDescriptor) -> bool {
        ty.has_capability(&self.capability)
    }
}
