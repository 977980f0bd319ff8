//! Per-run state. Created at the start of a run and dropped with it; nothing
//! here outlives the run except what the run writes into the graphs.

use crate::ledger::Ledger;
use crate::names::NameMap;
use crate::report::RunReport;
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct RunContext {
    /// Next value of the identifier sequence.
    pub(crate) next_id: u64,
    /// Identifiers claimed by existing cross-references; never minted.
    pub(crate) reserved: HashSet<String>,
    /// (source IRI, target graph IRI) -> target IRI.
    pub(crate) visited: HashMap<(String, String), String>,
    pub(crate) ledger: Ledger,
    pub(crate) names: Option<NameMap>,
    pub(crate) report: RunReport,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            reserved: HashSet::new(),
            visited: HashMap::new(),
            ledger: Ledger::default(),
            names: None,
            report: RunReport::default(),
        }
    }

    pub fn with_names(names: NameMap) -> Self {
        Self {
            names: Some(names),
            ..Self::new()
        }
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }

    pub fn names(&self) -> Option<&NameMap> {
        self.names.as_ref()
    }

    pub(crate) fn visited(&self, source: &str, target_graph: &str) -> Option<&String> {
        self.visited
            .get(&(source.to_string(), target_graph.to_string()))
    }

    pub(crate) fn remember(&mut self, source: &str, target_graph: &str, target: &str) {
        self.visited.insert(
            (source.to_string(), target_graph.to_string()),
            target.to_string(),
        );
    }
}
