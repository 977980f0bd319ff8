//! Ontology graph store for OntoBridge.
//!
//! An [`Ontology`] is an in-memory OWL-shaped graph: classes and properties
//! addressed by IRI, with labels, annotations, class/property axioms and
//! restriction-style constraints. Graphs can import other graphs; reads see the
//! whole imports closure, writes stay local.
//!
//! ```text
//!   .json / .nt / .ttl / .owl
//!            │
//!            ▼
//!   persistence::load_ontology ──► Ontology ──► Ontology::save / write
//!            │                       ▲
//!            └── rdf (sophia) ───────┘
//! ```
//!
//! The universal class (`owl:Thing`) and the top object/datatype properties
//! exist implicitly in every graph and are never stored.

pub mod error;
pub mod model;
pub mod ontology;
pub mod persistence;
pub mod rdf;
pub mod vocab;

pub use error::{GraphError, Result};
pub use model::{
    ClassAxioms, Condition, ExpressionKind, Literal, LogicExpression, Operand, PropertyAxioms,
    PropertyType, Resource, ResourceBody, Restriction, RestrictionKind, Value,
};
pub use ontology::{ontology_name, Import, Ontology};
pub use persistence::{load_ontology, Format};
