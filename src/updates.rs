use std::collections::BTreeSet;

/// Components whose remote version differs from the local one.
#[derive(Debug, Default, Clone)]
pub struct ApplicationUpdates {
    names: BTreeSet<String>,
}

impl ApplicationUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str) {
        tracing::debug!(name, "Update available");
        self.names.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates() {
        let mut updates = ApplicationUpdates::new();
        assert!(updates.is_empty());

        updates.add("swiervision");
        updates.add("swiervision");
        updates.add("crowsnest");

        assert!(updates.contains("swiervision"));
        assert_eq!(updates.names().collect::<Vec<_>>(), vec!["crowsnest", "swiervision"]);
    }
}
