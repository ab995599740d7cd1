use super::types::ModuleDescriptor;

/// Module identifier prefixes that are never scanned for controllers.
///
/// Covers the script host itself, logging, dependency injection, the script
/// compiler, other web frameworks, package management, argument parsing and
/// service abstractions. Entries ending in `,` match only the exact module
/// (`Autofac, Version=...`); entries ending in `.` match its satellites.
pub const IGNORED_MODULE_PREFIXES: [&str; 12] = [
    "Autofac,",
    "Autofac.",
    "Common.Logging",
    "log4net,",
    "Nancy,",
    "Nancy.",
    "NuGet.",
    "PowerArgs,",
    "Roslyn.",
    "scriptcs,",
    "ScriptCs.",
    "ServiceStack.",
];

/// Base runtime modules. They never contain user controllers.
pub const BASE_RUNTIME_PREFIXES: [&str; 2] = ["System", "mscorlib"];

/// Decides which loaded modules are scanned during discovery.
///
/// The static denylists always apply. Extra prefixes (usually from
/// [`RuntimeConfig`](crate::runtime_config::RuntimeConfig)) are checked after them.
#[derive(Debug, Clone, Default)]
pub struct ModuleFilter {
    extra_prefixes: Vec<String>,
}

impl ModuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore additional module prefixes on top of [`IGNORED_MODULE_PREFIXES`].
    ///
    /// Blank entries are dropped; an empty prefix would exclude every module.
    #[must_use]
    pub fn with_extra_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_prefixes.extend(
            prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.trim().is_empty()),
        );
        self
    }

    #[must_use]
    pub fn extra_prefixes(&self) -> &[String] {
        &self.extra_prefixes
    }

    /// `true` when the module may contain user controllers.
    #[must_use]
    pub fn is_eligible(&self, module: &ModuleDescriptor) -> bool {
        let id = module.full_identifier.as_str();

        if IGNORED_MODULE_PREFIXES.iter().any(|p| id.starts_with(p)) {
            return false;
        }
        if BASE_RUNTIME_PREFIXES.iter().any(|p| id.starts_with(p)) {
            return false;
        }
        !self.extra_prefixes.iter().any(|p| id.starts_with(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(id.split(',').next().unwrap_or(id), id)
    }

    #[test]
    fn test_denylisted_modules_are_excluded() {
        let filter = ModuleFilter::new();
        for id in [
            "Autofac, Version=3.0.0.0",
            "Autofac.Integration.Mef",
            "Common.Logging.Core",
            "log4net, Version=1.2.10.0",
            "Nancy, Version=0.21.0.0",
            "Nancy.Hosting.Self",
            "NuGet.Core",
            "PowerArgs, Version=1.5.0.0",
            "Roslyn.Compilers.CSharp",
            "scriptcs, Version=0.8.0.0",
            "ScriptCs.Core",
            "ServiceStack.Text",
        ] {
            assert!(!filter.is_eligible(&module(id)), "{id} should be excluded");
        }
    }

    #[test]
    fn test_base_runtime_modules_are_excluded() {
        let filter = ModuleFilter::new();
        assert!(!filter.is_eligible(&module("System.Web.Http, Version=5.0.0.0")));
        assert!(!filter.is_eligible(&module("System")));
        assert!(!filter.is_eligible(&module("mscorlib, Version=4.0.0.0")));
    }

    #[test]
    fn test_comma_prefix_matches_exact_module_only() {
        let filter = ModuleFilter::new();
        // "log4net," only excludes the log4net module itself
        assert!(filter.is_eligible(&module("log4net.Extensions, Version=1.0.0.0")));
        // "Common.Logging" has no separator and excludes anything starting with it
        assert!(!filter.is_eligible(&module("Common.LoggingAdapters")));
    }

    #[test]
    fn test_user_and_dynamic_modules_are_eligible() {
        let filter = ModuleFilter::new();
        assert!(filter.is_eligible(&module("Acme.Controllers, Version=1.0.0.0")));
        assert!(filter.is_eligible(&ModuleDescriptor::new("ℛ*42", "ℛ*42, Version=0.0.0.0")));
    }

    #[test]
    fn test_extra_prefixes() {
        let filter = ModuleFilter::new().with_extra_prefixes(["Acme.Internal", "  "]);
        assert_eq!(filter.extra_prefixes(), ["Acme.Internal".to_string()]);
        assert!(!filter.is_eligible(&module("Acme.Internal.Jobs")));
        assert!(filter.is_eligible(&module("Acme.Controllers")));
    }
}
