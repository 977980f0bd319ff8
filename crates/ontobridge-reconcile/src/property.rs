//! Property copier.

use crate::error::Result;
use crate::report::SkipReason;
use crate::session::Session;
use ontobridge_graph::vocab::is_universal;
use ontobridge_graph::{PropertyType, Value};

impl Session<'_> {
    /// Whether the source flags `iri` with the ignore annotation.
    pub(crate) fn is_ignored(&self, iri: &str) -> bool {
        self.source
            .annotation_value_by_name(iri, &self.config.ignore_annotation)
            .is_some_and(|v| v.as_str().trim().eq_ignore_ascii_case("true"))
    }

    /// Copy `source_iri` and the property lattice around it into the target.
    /// Returns the target property, or `None` when the property is skipped.
    pub fn copy_property(&mut self, source_iri: &str) -> Result<Option<String>> {
        if is_universal(source_iri) {
            return Ok(Some(source_iri.to_string()));
        }
        if self.policy.honor_ignore && self.is_ignored(source_iri) {
            self.skip(source_iri, SkipReason::Ignored);
            return Ok(None);
        }
        let target_graph = self.target.iri().to_string();
        if let Some(done) = self.ctx.visited(source_iri, &target_graph) {
            return Ok(Some(done.clone()));
        }
        let Some(property_type) = self.source.property_type(source_iri) else {
            // a property only the target knows, e.g. one the model defines
            if self.target.is_property(source_iri) {
                return Ok(Some(source_iri.to_string()));
            }
            self.skip(source_iri, SkipReason::UnresolvedReference);
            return Ok(None);
        };

        let name = self.resolve_name(source_iri);
        if let Some(existing) = self.target.lookup_name(&name) {
            if !self.target.is_property(&existing) {
                self.skip(source_iri, SkipReason::UnresolvedReference);
                return Ok(None);
            }
            self.ctx.remember(source_iri, &target_graph, &existing);
            if self.policy.link_reused {
                self.link(source_iri, &existing)?;
            }
            return Ok(Some(existing));
        }

        let copy = self.target.create_property(&name, property_type)?;
        self.ctx.remember(source_iri, &target_graph, &copy);
        self.ctx.report.properties_created += 1;
        tracing::debug!(source = source_iri, target = %copy, "copied property");

        self.copy_labels_and_annotations(source_iri, &copy)?;

        let top = self.target.top_property(property_type);
        for super_property in self.source.super_properties(source_iri) {
            let Some(copied) = self.copy_property(&super_property)? else {
                continue;
            };
            self.target.add_super_property(&copy, &copied)?;
            if let Some(top) = top.filter(|t| *t != copied) {
                self.target.remove_super_property(&copy, top)?;
            }
        }

        if self.policy.copy_domain_range {
            self.copy_domain_and_range(source_iri, &copy)?;
        }

        self.target
            .set_functional(&copy, self.source.is_functional(source_iri))?;
        if property_type == PropertyType::Object {
            self.target
                .set_symmetric(&copy, self.source.is_symmetric(source_iri))?;
            self.target
                .set_transitive(&copy, self.source.is_transitive(source_iri))?;
        }

        self.link(source_iri, &copy)?;
        if let Some(names) = self.ctx.names.as_mut() {
            names.insert(&name, &self.target.display_name(&copy));
        }

        for sub_property in self.source.sub_properties(source_iri) {
            self.copy_property(&sub_property)?;
        }

        Ok(Some(copy))
    }

    fn copy_domain_and_range(&mut self, source_iri: &str, copy: &str) -> Result<()> {
        let mut domain = Vec::new();
        for class in self.source.domain(source_iri) {
            if let Some(copied) = self.copy_class(&class)? {
                domain.push(copied);
            }
        }
        if !domain.is_empty() {
            self.target.set_domain(copy, domain)?;
        }

        let mut range = Vec::new();
        for value in self.source.range(source_iri) {
            match value {
                Value::Iri(iri) if self.source.is_class(&iri) => {
                    if let Some(copied) = self.copy_class(&iri)? {
                        range.push(Value::Iri(copied));
                    }
                }
                other => range.push(other),
            }
        }
        if !range.is_empty() {
            self.target.set_range(copy, range)?;
        }
        Ok(())
    }
}
