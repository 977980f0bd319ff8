//! OntoBridge reconciliation engine.
//!
//! Copies the resources of a source ontology graph into a target graph under a
//! new identifier scheme, keeping reciprocal see-also links between each
//! resource and its copy.
//!
//! ```text
//!   Reconciler ── clone_graph / merge_graph / convert / merge
//!        │
//!        ▼
//!   Session ── run_clone:  annotations → properties → classes → restrictions
//!        │     run_merge:  top properties → attached classes → restrictions
//!        ▼
//!   copy_property ⇄ copy_class / copy_class_under ⇄ copy_expression
//!        │
//!        ▼
//!   identity (resolve_name, mint) · ledger (purge, link) · names
//! ```
//!
//! Two policies drive the same copiers:
//!
//! - **Clone**: full structure-preserving migration; every resource gets a
//!   fresh `<prefix><sequence>` identifier unless a see-also link already
//!   names one.
//! - **Merge**: domain classes are filed under canonical model classes named
//!   by an attachment annotation; names come from the model's labels where
//!   they match, and references with no counterpart are dropped.
//!
//! Recoverable problems never abort a run; they are recorded in the
//! [`RunReport`].

mod class;
mod expression;
mod property;

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod names;
pub mod policy;
pub mod report;
pub mod session;

pub use config::ReconcileConfig;
pub use context::RunContext;
pub use driver::{Reconciler, RunOutcome};
pub use error::{ReconcileError, Result};
pub use ledger::{counterpart, links, Ledger};
pub use names::{normalize, NameMap};
pub use policy::{Mode, Policy};
pub use report::{RunReport, SkipNote, SkipReason};
pub use session::Session;
