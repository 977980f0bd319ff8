//! A copy session: one source graph, one target graph, one run context.
//!
//! The copiers (`property`, `class`, `expression`) and the identity resolver
//! are `impl Session` blocks in their own modules.

use crate::config::ReconcileConfig;
use crate::context::RunContext;
use crate::error::Result;
use crate::policy::Policy;
use crate::report::{RunReport, SkipReason};
use ontobridge_graph::Ontology;

pub struct Session<'a> {
    pub(crate) config: &'a ReconcileConfig,
    pub(crate) policy: Policy,
    pub(crate) source: &'a mut Ontology,
    pub(crate) target: &'a mut Ontology,
    pub(crate) ctx: RunContext,
}

impl<'a> Session<'a> {
    /// Open a session. Identifiers already claimed by the source's
    /// cross-references are reserved before anything is minted.
    pub fn new(
        config: &'a ReconcileConfig,
        policy: Policy,
        source: &'a mut Ontology,
        target: &'a mut Ontology,
        ctx: RunContext,
    ) -> Self {
        let mut session = Self {
            config,
            policy,
            source,
            target,
            ctx,
        };
        session.reserve_existing();
        session
    }

    pub fn source(&self) -> &Ontology {
        &*self.source
    }

    pub fn target(&self) -> &Ontology {
        &*self.target
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn finish(self) -> RunReport {
        self.ctx.into_report()
    }

    pub(crate) fn skip(&mut self, subject: &str, reason: SkipReason) {
        self.ctx.report.skip(subject, reason);
    }

    /// Record `source_iri` <-> `target_iri` in both graphs.
    pub(crate) fn link(&mut self, source_iri: &str, target_iri: &str) -> Result<()> {
        self.ctx.ledger.link(
            self.config,
            self.source,
            source_iri,
            self.target,
            target_iri,
        )?;
        self.ctx.report.links_written += 1;
        Ok(())
    }

    /// Copy labels, falling back to the bare name, then every annotation.
    pub(crate) fn copy_labels_and_annotations(&mut self, source_iri: &str, target_iri: &str) -> Result<()> {
        let labels = self.source.labels(source_iri);
        if labels.is_empty() {
            let name = self.source.name_of(source_iri);
            self.target.add_label(target_iri, name)?;
        }
        for label in labels {
            self.target.add_label(target_iri, label)?;
        }
        for (property, value) in self.source.annotations(source_iri) {
            self.target.add_annotation(target_iri, &property, value)?;
        }
        Ok(())
    }
}
