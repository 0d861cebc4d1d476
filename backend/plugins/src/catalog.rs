//! Plugin catalog: statically registered plugin factories.
//!
//! The binary registers every plugin it ships under an import name. A
//! manifest on disk refers to an import name; importing means looking the
//! name up here and calling its factory.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::error::{panic_message, PluginError};
use crate::sdk::Plugin;

type Factory = Box<dyn Fn() -> anyhow::Result<Box<dyn Plugin>> + Send + Sync>;

#[derive(Default)]
pub struct PluginCatalog {
    factories: BTreeMap<String, Factory>,
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. A later registration under the same name
    /// replaces the earlier one.
    pub fn register<F>(&mut self, import_name: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        let import_name = import_name.into();
        debug!(plugin = %import_name, "Registered plugin factory");
        self.factories.insert(import_name, Box::new(factory));
    }

    pub fn contains(&self, import_name: &str) -> bool {
        self.factories.contains_key(import_name)
    }

    /// Registered import names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct the plugin registered as `import_name`. A panicking
    /// factory is reported as [`PluginError::FactoryPanicked`].
    pub fn instantiate(&self, import_name: &str) -> Result<Box<dyn Plugin>, PluginError> {
        let factory = self
            .factories
            .get(import_name)
            .ok_or_else(|| PluginError::Unknown(import_name.to_string()))?;
        match panic::catch_unwind(AssertUnwindSafe(factory)) {
            Ok(Ok(plugin)) => Ok(plugin),
            Ok(Err(source)) => Err(PluginError::Factory {
                name: import_name.to_string(),
                source,
            }),
            Err(payload) => Err(PluginError::FactoryPanicked {
                name: import_name.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_register_and_instantiate() {
        let mut catalog = PluginCatalog::new();
        catalog.register("tab1", || Ok(Box::new(Named("tab1")) as Box<dyn Plugin>));
        catalog.register("about", || Ok(Box::new(Named("about")) as Box<dyn Plugin>));

        assert_eq!(catalog.names(), vec!["about", "tab1"]);
        assert_eq!(catalog.instantiate("tab1").unwrap().name(), "tab1");
    }

    #[test]
    fn test_unknown_and_failing_factories() {
        let mut catalog = PluginCatalog::new();
        catalog.register("broken", || anyhow::bail!("missing resource"));

        let err = catalog.instantiate("nope").err().unwrap();
        assert!(matches!(err, PluginError::Unknown(ref n) if n == "nope"));

        let err = catalog.instantiate("broken").err().unwrap();
        assert!(err.to_string().contains("missing resource"));
    }

    #[test]
    fn test_panicking_factory_is_an_error() {
        let mut catalog = PluginCatalog::new();
        catalog.register("fragile", || panic!("fragile fell over"));

        let err = catalog.instantiate("fragile").err().unwrap();
        assert!(matches!(
            err,
            PluginError::FactoryPanicked { ref name, ref message }
                if name == "fragile" && message == "fragile fell over"
        ));
    }
}
