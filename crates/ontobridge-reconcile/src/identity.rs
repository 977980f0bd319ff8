//! Identity resolution: which name a copy gets in the target graph.

use crate::config::ReconcileConfig;
use crate::ledger::links;
use crate::names::normalize;
use crate::report::SkipReason;
use crate::session::Session;
use std::collections::HashSet;
use url::Url;

/// The identifier a reserved-namespace cross-reference encodes, i.e. its
/// fragment. `None` for values outside the namespace; `Some(Err(()))` for
/// reserved values that are not URIs with a fragment.
pub fn reserved_fragment(config: &ReconcileConfig, value: &str) -> Option<Result<String, ()>> {
    if !config.is_reserved(value) {
        return None;
    }
    let fragment = Url::parse(value)
        .ok()
        .and_then(|url| url.fragment().map(str::to_string))
        .filter(|f| !f.is_empty());
    Some(fragment.ok_or(()))
}

impl Session<'_> {
    /// Reserve every identifier the cross-references of the source and its
    /// imports already claim.
    pub(crate) fn reserve_existing(&mut self) {
        let iris: HashSet<String> = self
            .source
            .resources()
            .iter()
            .chain(self.source.all_resources())
            .map(|r| r.iri.clone())
            .collect();
        for iri in iris {
            for value in links(self.source, &iri) {
                if let Some(Ok(fragment)) = reserved_fragment(self.config, &value) {
                    self.ctx.reserved.insert(fragment);
                }
            }
        }
    }

    /// Name for the copy of `source_iri`: the identifier its cross-reference
    /// encodes, else (merge mode) the canonical name of its display name,
    /// else the next free sequential identifier.
    pub(crate) fn resolve_name(&mut self, source_iri: &str) -> String {
        for value in links(self.source, source_iri) {
            match reserved_fragment(self.config, &value) {
                Some(Ok(fragment)) => return fragment,
                Some(Err(())) => {
                    tracing::warn!(resource = source_iri, value = %value, "malformed cross-reference");
                    self.skip(source_iri, SkipReason::MalformedCrossReference);
                }
                None => {}
            }
        }

        if self.policy.use_name_map {
            let display = normalize(&self.source.display_name(source_iri));
            if let Some(name) = self.ctx.names.as_ref().and_then(|m| m.model_name(&display)) {
                return name.to_string();
            }
        }

        self.mint()
    }

    /// Next sequential identifier not present in the target and not reserved.
    pub(crate) fn mint(&mut self) -> String {
        loop {
            let name = self.config.format_identifier(self.ctx.next_id);
            self.ctx.next_id += 1;
            if !self.target.has_resource(&name) && !self.ctx.reserved.contains(&name) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::policy::Policy;
    use ontobridge_graph::vocab::RDFS_SEE_ALSO;
    use ontobridge_graph::{Ontology, Value};

    #[test]
    fn fragments_decode_only_under_the_reserved_namespace() {
        let config = ReconcileConfig::default();
        assert_eq!(
            reserved_fragment(&config, "http://ontologies.dbmi.pitt.edu/deepphe/cancer.owl#DP000042"),
            Some(Ok("DP000042".to_string()))
        );
        assert_eq!(reserved_fragment(&config, "http://example.org/x#A"), None);
        assert_eq!(
            reserved_fragment(&config, "http://ontologies.dbmi.pitt.edu/no-fragment"),
            Some(Err(()))
        );
        assert_eq!(
            reserved_fragment(&config, "http://ontologies.dbmi.pitt.edu:bad port/x#A"),
            Some(Err(()))
        );
    }

    #[test]
    fn minting_skips_existing_and_reserved_names() {
        let config = ReconcileConfig::default();
        let mut source = Ontology::create("http://example.org/source.owl");
        let a = source.create_class("A").unwrap();
        source
            .add_annotation(
                &a,
                RDFS_SEE_ALSO,
                Value::iri("http://ontologies.dbmi.pitt.edu/t.owl#DP000002"),
            )
            .unwrap();
        let mut target = Ontology::create("http://ontologies.dbmi.pitt.edu/t.owl");
        target.create_class("DP000001").unwrap();

        let mut session = Session::new(
            &config,
            Policy::clone_mode(),
            &mut source,
            &mut target,
            RunContext::new(),
        );
        assert_eq!(session.mint(), "DP000003");
        assert_eq!(session.mint(), "DP000004");
        assert_eq!(session.resolve_name(&a), "DP000002");
    }

    #[test]
    fn malformed_reference_falls_through_to_minting() {
        let config = ReconcileConfig::default();
        let mut source = Ontology::create("http://example.org/source.owl");
        let a = source.create_class("A").unwrap();
        source
            .add_annotation(&a, RDFS_SEE_ALSO, Value::text("http://ontologies.dbmi.pitt.edu/oops"))
            .unwrap();
        let mut target = Ontology::create("http://ontologies.dbmi.pitt.edu/t.owl");

        let mut session = Session::new(
            &config,
            Policy::clone_mode(),
            &mut source,
            &mut target,
            RunContext::new(),
        );
        assert_eq!(session.resolve_name(&a), "DP000001");
        let report = session.finish();
        assert_eq!(
            report.skipped_for(SkipReason::MalformedCrossReference).count(),
            1
        );
    }
}
