//! Cross-reference ledger: reciprocal see-also links between a source
//! resource and its copy.

use crate::config::ReconcileConfig;
use ontobridge_graph::vocab::RDFS_SEE_ALSO;
use ontobridge_graph::{Ontology, PropertyType, Result, Value};
use std::collections::HashMap;

/// See-also property handle per graph, created on first use.
#[derive(Debug, Default)]
pub struct Ledger {
    handles: HashMap<String, String>,
}

impl Ledger {
    pub fn handle(&mut self, graph: &mut Ontology) -> String {
        if let Some(handle) = self.handles.get(graph.iri()) {
            return handle.clone();
        }
        if !graph.is_property(RDFS_SEE_ALSO) {
            graph.declare_property(RDFS_SEE_ALSO, PropertyType::Annotation);
        }
        self.handles
            .insert(graph.iri().to_string(), RDFS_SEE_ALSO.to_string());
        RDFS_SEE_ALSO.to_string()
    }

    /// Remove the reserved-namespace see-also values `iri` holds in `graph`.
    pub fn purge(
        &mut self,
        config: &ReconcileConfig,
        graph: &mut Ontology,
        iri: &str,
    ) -> Result<usize> {
        let handle = self.handle(graph);
        let mut removed = 0;
        for value in graph.annotation_values(iri, &handle) {
            if config.is_reserved(value.as_str()) && graph.remove_annotation(iri, &handle, &value)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Link `a` (in `a_graph`) and `b` (in `b_graph`) both ways, purging the
    /// reserved links each side held before.
    pub fn link(
        &mut self,
        config: &ReconcileConfig,
        a_graph: &mut Ontology,
        a: &str,
        b_graph: &mut Ontology,
        b: &str,
    ) -> Result<()> {
        self.purge(config, a_graph, a)?;
        self.purge(config, b_graph, b)?;
        let a_handle = self.handle(a_graph);
        let b_handle = self.handle(b_graph);
        a_graph.add_annotation(a, &a_handle, Value::iri(b))?;
        b_graph.add_annotation(b, &b_handle, Value::iri(a))?;
        Ok(())
    }
}

/// See-also values of `iri` in `graph`, IRIs and string literals alike.
pub fn links(graph: &Ontology, iri: &str) -> Vec<String> {
    graph
        .annotation_values(iri, RDFS_SEE_ALSO)
        .into_iter()
        .map(|v| v.as_str().to_string())
        .collect()
}

/// The see-also value of `iri` that names a resource of `other`.
pub fn counterpart(graph: &Ontology, iri: &str, other: &Ontology) -> Option<String> {
    links(graph, iri).into_iter().find(|v| other.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relinking_does_not_accumulate() {
        let config = ReconcileConfig::default();
        let mut ledger = Ledger::default();
        let mut source = Ontology::create("http://example.org/source.owl");
        let mut target = Ontology::create("http://ontologies.dbmi.pitt.edu/t/target.owl");
        let s = source.create_class("A").unwrap();
        let t = target.create_class("DP000001").unwrap();
        source
            .add_annotation(&s, RDFS_SEE_ALSO, Value::iri("http://ontologies.dbmi.pitt.edu/old.owl#DP000009"))
            .unwrap();
        source
            .add_annotation(&s, RDFS_SEE_ALSO, Value::iri("http://elsewhere.org/keep"))
            .unwrap();

        ledger.link(&config, &mut source, &s, &mut target, &t).unwrap();
        ledger.link(&config, &mut source, &s, &mut target, &t).unwrap();

        assert_eq!(
            links(&source, &s),
            vec!["http://elsewhere.org/keep".to_string(), t.clone()]
        );
        assert_eq!(links(&target, &t), vec![s.clone()]);
        assert_eq!(counterpart(&source, &s, &target), Some(t.clone()));
        assert_eq!(counterpart(&target, &t, &source), Some(s));
    }
}
