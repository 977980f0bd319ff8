//! Class copier, in both entry shapes: into a graph (clone mode) and under a
//! parent class (merge mode).

use crate::error::Result;
use crate::report::SkipReason;
use crate::session::Session;
use ontobridge_graph::vocab::OWL_THING;

impl Session<'_> {
    /// Copy `source_iri` into the target graph. The root always maps to the
    /// target's root. Under the clone policy the super, equivalent and
    /// disjoint classes come along, and so does every sub-class.
    pub fn copy_class(&mut self, source_iri: &str) -> Result<Option<String>> {
        if source_iri == OWL_THING {
            return Ok(Some(self.target.root().to_string()));
        }
        let target_graph = self.target.iri().to_string();
        if let Some(done) = self.ctx.visited(source_iri, &target_graph) {
            return Ok(Some(done.clone()));
        }

        let name = self.resolve_name(source_iri);
        if let Some(existing) = self.target.lookup_name(&name) {
            if !self.target.is_class(&existing) {
                self.skip(source_iri, SkipReason::UnresolvedReference);
                return Ok(None);
            }
            self.ctx.remember(source_iri, &target_graph, &existing);
            if self.policy.link_reused {
                self.link(source_iri, &existing)?;
            }
            return Ok(Some(existing));
        }

        let copy = self.target.create_class(&name)?;
        self.ctx.remember(source_iri, &target_graph, &copy);
        self.ctx.report.classes_created += 1;
        tracing::debug!(source = source_iri, target = %copy, "copied class");

        self.copy_labels_and_annotations(source_iri, &copy)?;

        if self.policy.copy_structure {
            for super_class in self.source.super_classes(source_iri) {
                let Some(copied) = self.copy_class(&super_class)? else {
                    continue;
                };
                self.target.add_super_class(&copy, &copied)?;
                if copied != OWL_THING {
                    self.target.remove_super_class(&copy, OWL_THING)?;
                }
            }
            for equivalent in self.source.equivalent_classes(source_iri) {
                if equivalent == source_iri {
                    continue;
                }
                if let Some(copied) = self.copy_class(&equivalent)? {
                    self.target.add_equivalent_class(&copy, &copied)?;
                }
            }
            for disjoint in self.source.disjoint_classes(source_iri) {
                if let Some(copied) = self.copy_class(&disjoint)? {
                    self.target.add_disjoint_class(&copy, &copied)?;
                }
            }
        }

        self.link(source_iri, &copy)?;

        if self.policy.eager_sub_classes {
            for sub_class in self.source.sub_classes(source_iri) {
                self.copy_class(&sub_class)?;
            }
        }

        Ok(Some(copy))
    }

    /// Copy `source_iri` as a direct sub-class of `parent`, then its
    /// sub-classes beneath the copy. A name that already denotes a class in
    /// the target (a canonical class, or an earlier copy) is reused instead.
    pub fn copy_class_under(&mut self, source_iri: &str, parent: &str) -> Result<Option<String>> {
        if source_iri == OWL_THING {
            return Ok(Some(self.target.root().to_string()));
        }
        let target_graph = self.target.iri().to_string();
        if let Some(done) = self.ctx.visited(source_iri, &target_graph) {
            return Ok(Some(done.clone()));
        }

        let name = self.resolve_name(source_iri);
        let copy = match self.target.lookup_name(&name) {
            Some(existing) if !self.target.is_class(&existing) => {
                self.skip(source_iri, SkipReason::UnresolvedReference);
                return Ok(None);
            }
            Some(existing) => {
                self.ctx.remember(source_iri, &target_graph, &existing);
                if self.policy.link_reused {
                    self.link(source_iri, &existing)?;
                }
                existing
            }
            None => {
                let copy = self.target.create_sub_class(parent, &name)?;
                self.ctx.remember(source_iri, &target_graph, &copy);
                self.ctx.report.classes_created += 1;
                tracing::debug!(source = source_iri, target = %copy, parent, "attached class");

                self.copy_labels_and_annotations(source_iri, &copy)?;
                self.link(source_iri, &copy)?;
                if let Some(names) = self.ctx.names.as_mut() {
                    names.insert(&name, &self.target.display_name(&copy));
                }
                copy
            }
        };

        for sub_class in self.source.sub_classes(source_iri) {
            self.copy_class_under(&sub_class, &copy)?;
        }
        Ok(Some(copy))
    }

    /// Target counterpart of a class reference under the merge policy:
    /// an earlier copy, or a class the name map resolves. No new classes.
    pub(crate) fn existing_counterpart(&self, source_iri: &str) -> Option<String> {
        if source_iri == OWL_THING {
            return Some(OWL_THING.to_string());
        }
        if let Some(done) = self.ctx.visited(source_iri, self.target.iri()) {
            return Some(done.clone());
        }
        let display = self.source.display_name(source_iri);
        let name = self.ctx.names.as_ref()?.model_name(&display)?;
        self.target
            .lookup_name(name)
            .filter(|iri| self.target.is_class(iri))
    }
}
