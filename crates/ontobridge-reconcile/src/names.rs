//! Canonical name map for merge mode.

use ontobridge_graph::Ontology;
use std::collections::HashMap;

/// Label spelling used as the map key: all whitespace removed.
pub fn normalize(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Two-way index between model resource names and their normalized display
/// names (first label, else name).
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    model2name: HashMap<String, String>,
    name2model: HashMap<String, String>,
}

impl NameMap {
    /// Index every declared resource of `graph` and its imports.
    pub fn build(graph: &Ontology) -> Self {
        let mut map = Self::default();
        for resource in graph.all_resources() {
            map.insert(&resource.name, resource.display_name());
        }
        map
    }

    pub fn insert(&mut self, model_name: &str, display_name: &str) {
        let label = normalize(display_name);
        self.model2name.insert(model_name.to_string(), label.clone());
        self.name2model.insert(label, model_name.to_string());
    }

    /// Model name for a display name (normalized before lookup).
    pub fn model_name(&self, display_name: &str) -> Option<&str> {
        self.name2model
            .get(&normalize(display_name))
            .map(String::as_str)
    }

    pub fn label_of(&self, model_name: &str) -> Option<&str> {
        self.model2name.get(model_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.model2name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model2name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_whitespace_insensitive() {
        let mut model = Ontology::create("http://example.org/model.owl");
        let site = model.create_class("C0001").unwrap();
        model.add_label(&site, "Body Site").unwrap();
        model.create_class("Tumor").unwrap();

        let map = NameMap::build(&model);
        assert_eq!(map.model_name("BodySite"), Some("C0001"));
        assert_eq!(map.model_name("Body\tSite "), Some("C0001"));
        assert_eq!(map.model_name("Tumor"), Some("Tumor"));
        assert_eq!(map.label_of("C0001"), Some("BodySite"));
        assert_eq!(map.model_name("Nothing"), None);
    }
}
