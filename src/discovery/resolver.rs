use std::sync::Arc;

use super::classifier::HandlerClassifier;
use super::types::TypeDescriptor;

/// Handler-type resolution strategy handed to the HTTP configuration.
///
/// Replaces the HTTP layer's own scan of loaded modules with the fixed list
/// produced by discovery (or supplied by the script).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerResolver {
    controller_types: Vec<TypeDescriptor>,
}

impl ControllerResolver {
    pub fn new(controller_types: Vec<TypeDescriptor>) -> Self {
        Self { controller_types }
    }

    /// The controller types this resolver was created with, in order.
    #[must_use]
    pub fn controller_types(&self) -> &[TypeDescriptor] {
        &self.controller_types
    }
}

/// Only the types `classifier` accepts, in order.
pub fn where_controller_type<'a>(
    types: &'a [TypeDescriptor],
    classifier: &'a Arc<dyn HandlerClassifier>,
) -> impl Iterator<Item = &'a TypeDescriptor> + 'a {
    types.iter().filter(move |t| classifier.is_handler_type(t))
}

/// `true` when at least one of `types` is a controller.
#[must_use]
pub fn contains_controller_type(types: &[TypeDescriptor], classifier: &Arc<dyn HandlerClassifier>) -> bool {
    where_controller_type(types, classifier).next().is_some()
}
