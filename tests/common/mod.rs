#![allow(dead_code)]

/// Manifest files that are removed when dropped.
pub mod temp_files {
    use std::io::Write;

    use tempfile::NamedTempFile;

    pub fn manifest_file(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("webapi_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn yaml_manifest(content: &str) -> NamedTempFile {
        manifest_file(content, "yaml")
    }

    pub fn json_manifest(content: &str) -> NamedTempFile {
        manifest_file(content, "json")
    }
}

/// Records `tracing` events emitted while a closure runs.
pub mod log_capture {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CapturedEvent {
        pub level: Level,
        pub message: String,
    }

    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.0,
            });
        }
    }

    /// Run `f` with a capturing subscriber installed on this thread.
    pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
        let layer = CaptureLayer::default();
        let events = Arc::clone(&layer.events);
        let subscriber = tracing_subscriber::registry().with(layer);
        let result = tracing::subscriber::with_default(subscriber, f);
        let events = events.lock().unwrap().clone();
        (result, events)
    }

    /// Messages at `level` that start with `prefix`.
    pub fn messages<'a>(events: &'a [CapturedEvent], level: Level, prefix: &str) -> Vec<&'a str> {
        events
            .iter()
            .filter(|e| e.level == level && e.message.starts_with(prefix))
            .map(|e| e.message.as_str())
            .collect()
    }
}

pub mod fixtures {
    use std::sync::Arc;

    use webapi_pack::discovery::{
        ControllerDiscovery, ModuleDescriptor, StaticModuleLister, TypeDescriptor, HANDLER_CAPABILITY,
    };

    pub fn module(name: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(name, format!("{name}, Version=1.0.0.0, Culture=neutral"))
    }

    /// A module compiled from script text, named the way the script compiler names them.
    pub fn dynamic_module(submission: u32) -> ModuleDescriptor {
        ModuleDescriptor::new(
            format!("Submission#{submission}"),
            format!("ℛ*{submission:08x}, Version=0.0.0.0"),
        )
    }

    pub fn controller(full_name: &str, module: &ModuleDescriptor) -> TypeDescriptor {
        TypeDescriptor::new(full_name, module).with_capability(HANDLER_CAPABILITY)
    }

    pub fn plain_type(full_name: &str, module: &ModuleDescriptor) -> TypeDescriptor {
        TypeDescriptor::new(full_name, module)
    }

    pub fn discovery(lister: StaticModuleLister) -> ControllerDiscovery {
        ControllerDiscovery::new(Arc::new(lister))
    }
}
