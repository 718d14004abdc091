use std::collections::BTreeMap;

use crate::component::Component;
use crate::error::{InstallerError, Result};

/// Components by lowercase id.
pub struct ComponentRegistry {
    components: BTreeMap<String, Box<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, component: Box<dyn Component>) {
        let id = component.info().id.to_lowercase();
        self.components.insert(id, component);
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Result<&dyn Component> {
        self.components
            .get(&name.to_lowercase())
            .map(|c| c.as_ref())
            .ok_or_else(|| InstallerError::ComponentNotFound {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn list(&self) -> Vec<&dyn Component> {
        self.components.values().map(|c| c.as_ref()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentInfo, InstallConfig, InstallStatus};
    use async_trait::async_trait;

    struct Dummy(ComponentInfo);

    #[async_trait]
    impl Component for Dummy {
        fn info(&self) -> &ComponentInfo {
            &self.0
        }

        async fn status(&self) -> Result<InstallStatus> {
            Ok(InstallStatus::NotInstalled)
        }

        async fn install(&self, _config: &InstallConfig) -> Result<()> {
            Ok(())
        }

        async fn uninstall(&self) -> Result<()> {
            Ok(())
        }
    }

    fn dummy(id: &str) -> Box<dyn Component> {
        Box::new(Dummy(ComponentInfo {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
        }))
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = ComponentRegistry::new();
        registry.register(dummy("swiervision"));

        assert!(registry.get("SwierVision").is_ok());
        assert!(registry.get("SWIERVISION").is_ok());
        assert!(matches!(
            registry.get("klipperscreen"),
            Err(InstallerError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = ComponentRegistry::new();
        registry.register(dummy("swiervision"));
        registry.register(dummy("crowsnest"));

        assert_eq!(registry.names(), vec!["crowsnest", "swiervision"]);
        assert_eq!(registry.list().len(), 2);

        let err = registry.get("klipperscreen").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Component not found: klipperscreen (available: crowsnest, swiervision)"
        );
    }
}
