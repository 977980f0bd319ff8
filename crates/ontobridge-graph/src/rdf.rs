//! RDF/OWL boundary: parse RDF serializations into ontology graphs and emit
//! ontology graphs back as RDF.
//!
//! Parsing goes through **Sophia** (N-Triples, Turtle, RDF/XML). Writing emits
//! N-Triples directly; Turtle and RDF/XML are produced by feeding that triple
//! stream back through Sophia's serializers.

use crate::error::{GraphError, Result};
use crate::model::{
    Condition, ExpressionKind, Literal, LogicExpression, Operand, PropertyType, ResourceBody,
    Restriction, RestrictionKind, Value,
};
use crate::ontology::Ontology;
use crate::vocab::*;
use serde::{Deserialize, Serialize};
use sophia::api::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;

// ============================================================================
// RDF term model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdfNode {
    Iri(String),
    BlankNode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdfObject {
    Node(RdfNode),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfTriple {
    pub subject: RdfNode,
    pub predicate: String,
    pub object: RdfObject,
}

impl RdfTriple {
    fn new(subject: RdfNode, predicate: &str, object: RdfObject) -> Self {
        Self {
            subject,
            predicate: predicate.to_string(),
            object,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct TripleSinkError {
    message: String,
}

// ============================================================================
// Term parsing (Sophia display form)
// ============================================================================

fn unescape_rdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_term_display(term: &str) -> std::result::Result<RdfObject, TripleSinkError> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(RdfObject::Node(RdfNode::Iri(rest.to_string())));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(RdfObject::Node(RdfNode::BlankNode(rest.to_string())));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            if ch == '"' && !escaped {
                end_quote = Some(i);
                break;
            }
            escaped = ch == '\\' && !escaped;
        }
        let Some(end) = end_quote else {
            return Err(TripleSinkError {
                message: format!("invalid literal term (missing closing quote): {s}"),
            });
        };

        let lexical = unescape_rdf_string(&s[1..end]);
        let rest = s[end + 1..].trim();

        let mut literal = Literal::plain(lexical);
        if let Some(lang) = rest.strip_prefix('@') {
            literal.language = Some(lang.to_string());
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            let dt = dt
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(dt);
            // simple literals are xsd:string in RDF 1.1
            if !dt.is_empty() && dt != XSD_STRING {
                literal.datatype = Some(dt.to_string());
            }
        }
        return Ok(RdfObject::Literal(literal));
    }

    Err(TripleSinkError {
        message: format!("unsupported RDF term form: {s}"),
    })
}

fn triple_from_display(
    s: &str,
    p: &str,
    o: &str,
) -> std::result::Result<Option<RdfTriple>, TripleSinkError> {
    let RdfObject::Node(subject) = parse_term_display(s)? else {
        return Err(TripleSinkError {
            message: format!("literal in subject position: {s}"),
        });
    };
    let RdfObject::Node(RdfNode::Iri(predicate)) = parse_term_display(p)? else {
        return Ok(None);
    };
    let object = parse_term_display(o)?;
    Ok(Some(RdfTriple {
        subject,
        predicate,
        object,
    }))
}

macro_rules! collect_triples {
    ($parser:expr, $what:literal, $location:expr) => {{
        let mut out: Vec<RdfTriple> = Vec::new();
        let mut parser = $parser;
        parser
            .try_for_each_triple(|t| -> std::result::Result<(), TripleSinkError> {
                let triple = triple_from_display(
                    &t.s().to_string(),
                    &t.p().to_string(),
                    &t.o().to_string(),
                )?;
                if let Some(triple) = triple {
                    out.push(triple);
                }
                Ok(())
            })
            .map_err(|e| GraphError::Parse {
                location: $location.to_string(),
                message: format!("failed to parse {}: {e}", $what),
            })?;
        out
    }};
}

/// Parse an RDF document into triples.
pub fn parse_triples(bytes: &[u8], format: RdfFormat, location: &str) -> Result<Vec<RdfTriple>> {
    let cursor = std::io::Cursor::new(bytes);
    let reader = std::io::BufReader::new(cursor);

    let triples = match format {
        RdfFormat::NTriples => collect_triples!(
            sophia::turtle::parser::nt::parse_bufread(reader),
            "N-Triples",
            location
        ),
        RdfFormat::Turtle => collect_triples!(
            sophia::turtle::parser::turtle::parse_bufread(reader),
            "Turtle",
            location
        ),
        RdfFormat::RdfXml => collect_triples!(
            sophia::xml::parser::parse_bufread(reader),
            "RDF/XML",
            location
        ),
    };
    Ok(triples)
}

// ============================================================================
// Triples -> ontology
// ============================================================================

struct TripleIndex {
    subjects: Vec<RdfNode>,
    by_subject: HashMap<RdfNode, Vec<(String, RdfObject)>>,
}

impl TripleIndex {
    fn new(triples: Vec<RdfTriple>) -> Self {
        let mut subjects = Vec::new();
        let mut by_subject: HashMap<RdfNode, Vec<(String, RdfObject)>> = HashMap::new();
        for t in triples {
            let entry = by_subject.entry(t.subject.clone()).or_insert_with(|| {
                subjects.push(t.subject.clone());
                Vec::new()
            });
            entry.push((t.predicate, t.object));
        }
        Self {
            subjects,
            by_subject,
        }
    }

    fn statements(&self, node: &RdfNode) -> &[(String, RdfObject)] {
        self.by_subject.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    fn objects<'a, 'p>(
        &'a self,
        node: &RdfNode,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a RdfObject> + 'p
    where
        'a: 'p,
    {
        self.statements(node)
            .iter()
            .filter(move |(p, _)| p == predicate)
            .map(|(_, o)| o)
    }

    fn first(&self, node: &RdfNode, predicate: &str) -> Option<&RdfObject> {
        self.statements(node)
            .iter()
            .find(|(p, _)| p == predicate)
            .map(|(_, o)| o)
    }

    fn has_type(&self, node: &RdfNode, ty: &str) -> bool {
        self.objects(node, RDF_TYPE)
            .any(|o| matches!(o, RdfObject::Node(RdfNode::Iri(t)) if t == ty))
    }
}

const MAX_EXPRESSION_DEPTH: usize = 64;

struct OwlReader<'a> {
    index: &'a TripleIndex,
    classes: HashSet<String>,
}

impl OwlReader<'_> {
    fn is_datatype(&self, iri: &str) -> bool {
        (is_builtin(iri) && !iri.starts_with(OWL_NS))
            || self
                .index
                .has_type(&RdfNode::Iri(iri.to_string()), RDFS_DATATYPE)
    }

    fn operand_for_iri(&self, iri: &str) -> Operand {
        if self.classes.contains(iri) || iri == OWL_THING || !self.is_datatype(iri) {
            Operand::Class(iri.to_string())
        } else {
            Operand::Value(Value::Iri(iri.to_string()))
        }
    }

    fn list(&self, head: &RdfObject) -> Vec<RdfObject> {
        let mut out = Vec::new();
        let mut seen: HashSet<RdfNode> = HashSet::new();
        let mut cursor = head.clone();
        while let RdfObject::Node(node) = cursor {
            if node == RdfNode::Iri(RDF_NIL.to_string()) || !seen.insert(node.clone()) {
                break;
            }
            if let Some(first) = self.index.first(&node, RDF_FIRST) {
                out.push(first.clone());
            }
            match self.index.first(&node, RDF_REST) {
                Some(rest) => cursor = rest.clone(),
                None => break,
            }
        }
        out
    }

    fn is_restriction(&self, node: &RdfNode) -> bool {
        self.index.has_type(node, OWL_RESTRICTION) || self.index.first(node, OWL_ON_PROPERTY).is_some()
    }

    fn operand(&self, object: &RdfObject, depth: usize) -> Option<Operand> {
        match object {
            RdfObject::Node(RdfNode::Iri(iri)) => Some(self.operand_for_iri(iri)),
            RdfObject::Literal(lit) => Some(Operand::Value(Value::Literal(lit.clone()))),
            RdfObject::Node(node @ RdfNode::BlankNode(_)) => {
                if self.is_restriction(node) {
                    self.restriction(node, depth + 1).map(Operand::Restriction)
                } else {
                    self.expression(node, depth + 1).map(Operand::Expression)
                }
            }
        }
    }

    fn filler(&self, object: &RdfObject, depth: usize) -> Option<LogicExpression> {
        match object {
            RdfObject::Node(node @ RdfNode::BlankNode(_)) if !self.is_restriction(node) => {
                self.expression(node, depth + 1)
            }
            other => self.operand(other, depth).map(LogicExpression::leaf),
        }
    }

    fn expression(&self, node: &RdfNode, depth: usize) -> Option<LogicExpression> {
        if depth > MAX_EXPRESSION_DEPTH {
            tracing::warn!(depth, "class expression nested too deeply, dropping");
            return None;
        }
        let combinators = [
            (OWL_INTERSECTION_OF, ExpressionKind::Intersection),
            (OWL_UNION_OF, ExpressionKind::Union),
        ];
        for (predicate, kind) in combinators {
            if let Some(head) = self.index.first(node, predicate) {
                let operands = self
                    .list(head)
                    .iter()
                    .filter_map(|o| self.operand(o, depth))
                    .collect();
                return Some(LogicExpression::with_operands(kind, operands));
            }
        }
        if let Some(inner) = self.index.first(node, OWL_COMPLEMENT_OF) {
            let operand = self.operand(inner, depth)?;
            return Some(LogicExpression::with_operands(
                ExpressionKind::Complement,
                vec![operand],
            ));
        }
        None
    }

    fn cardinality(&self, node: &RdfNode, predicate: &str) -> Option<u32> {
        match self.index.first(node, predicate)? {
            RdfObject::Literal(lit) => lit.lexical.trim().parse().ok(),
            RdfObject::Node(_) => None,
        }
    }

    fn restriction(&self, node: &RdfNode, depth: usize) -> Option<Restriction> {
        if depth > MAX_EXPRESSION_DEPTH {
            return None;
        }
        let Some(RdfObject::Node(RdfNode::Iri(property))) = self.index.first(node, OWL_ON_PROPERTY)
        else {
            tracing::warn!(node = ?node, "restriction without owl:onProperty, dropping");
            return None;
        };

        let qualifier = self
            .index
            .first(node, OWL_ON_CLASS)
            .or_else(|| self.index.first(node, OWL_ON_DATA_RANGE));
        let qualified = |kind: RestrictionKind| {
            let parameter = match qualifier {
                Some(q) => self.filler(q, depth)?,
                None => LogicExpression::new(ExpressionKind::Leaf),
            };
            Some((kind, parameter))
        };

        let (kind, parameter) = if let Some(o) = self.index.first(node, OWL_SOME_VALUES_FROM) {
            (RestrictionKind::SomeValuesFrom, self.filler(o, depth)?)
        } else if let Some(o) = self.index.first(node, OWL_ALL_VALUES_FROM) {
            (RestrictionKind::AllValuesFrom, self.filler(o, depth)?)
        } else if let Some(o) = self.index.first(node, OWL_HAS_VALUE) {
            let value = match o {
                RdfObject::Node(RdfNode::Iri(iri)) => Operand::Value(Value::Iri(iri.clone())),
                RdfObject::Literal(lit) => Operand::Value(Value::Literal(lit.clone())),
                RdfObject::Node(RdfNode::BlankNode(_)) => return None,
            };
            (RestrictionKind::HasValue, LogicExpression::leaf(value))
        } else if let Some(n) = self
            .cardinality(node, OWL_QUALIFIED_CARDINALITY)
            .or_else(|| self.cardinality(node, OWL_CARDINALITY))
        {
            qualified(RestrictionKind::Cardinality(n))?
        } else if let Some(n) = self
            .cardinality(node, OWL_MIN_QUALIFIED_CARDINALITY)
            .or_else(|| self.cardinality(node, OWL_MIN_CARDINALITY))
        {
            qualified(RestrictionKind::MinCardinality(n))?
        } else if let Some(n) = self
            .cardinality(node, OWL_MAX_QUALIFIED_CARDINALITY)
            .or_else(|| self.cardinality(node, OWL_MAX_CARDINALITY))
        {
            qualified(RestrictionKind::MaxCardinality(n))?
        } else {
            tracing::warn!(property = %property, "unsupported restriction shape, dropping");
            return None;
        };

        Some(Restriction::new(kind, property.clone(), parameter))
    }

    fn condition(&self, node: &RdfNode) -> Option<Condition> {
        if self.is_restriction(node) {
            self.restriction(node, 0).map(Condition::Restriction)
        } else {
            self.expression(node, 0).map(Condition::Expression)
        }
    }
}

fn object_value(object: &RdfObject) -> Option<Value> {
    match object {
        RdfObject::Node(RdfNode::Iri(iri)) => Some(Value::Iri(iri.clone())),
        RdfObject::Literal(lit) => Some(Value::Literal(lit.clone())),
        RdfObject::Node(RdfNode::BlankNode(_)) => None,
    }
}

/// Declaration types the reader turns into resources.
fn is_declaration_type(ty: &str) -> bool {
    matches!(
        ty,
        OWL_CLASS | OWL_OBJECT_PROPERTY | OWL_DATATYPE_PROPERTY | OWL_ANNOTATION_PROPERTY
    )
}

/// Statements the graph model has no place for, together with the blank-node
/// structure they hang off.
struct Unmodelled<'a> {
    index: &'a TripleIndex,
    kept: Vec<RdfTriple>,
    walked: HashSet<RdfNode>,
}

impl<'a> Unmodelled<'a> {
    fn new(index: &'a TripleIndex) -> Self {
        Self {
            index,
            kept: Vec::new(),
            walked: HashSet::new(),
        }
    }

    fn keep(&mut self, subject: &RdfNode, predicate: &str, object: &RdfObject) {
        self.kept
            .push(RdfTriple::new(subject.clone(), predicate, object.clone()));
        if let RdfObject::Node(node @ RdfNode::BlankNode(_)) = object {
            self.keep_node(node);
        }
    }

    /// Keep every statement reachable from `node` through blank nodes.
    fn keep_node(&mut self, node: &RdfNode) {
        let index = self.index;
        let mut pending = vec![node.clone()];
        while let Some(node) = pending.pop() {
            if !self.walked.insert(node.clone()) {
                continue;
            }
            for (predicate, object) in index.statements(&node) {
                self.kept
                    .push(RdfTriple::new(node.clone(), predicate, object.clone()));
                if let RdfObject::Node(next @ RdfNode::BlankNode(_)) = object {
                    pending.push(next.clone());
                }
            }
        }
    }

    /// Blank nodes get stable `u<n>` labels, apart from the `b<n>` labels the
    /// writer hands out.
    fn into_triples(self) -> Vec<RdfTriple> {
        let mut labels: HashMap<String, String> = HashMap::new();
        let mut relabel = |node: RdfNode| match node {
            RdfNode::BlankNode(id) => {
                let next = labels.len() + 1;
                RdfNode::BlankNode(labels.entry(id).or_insert_with(|| format!("u{next}")).clone())
            }
            iri => iri,
        };
        self.kept
            .into_iter()
            .map(|t| {
                let subject = relabel(t.subject);
                let object = match t.object {
                    RdfObject::Node(node) => RdfObject::Node(relabel(node)),
                    literal => literal,
                };
                RdfTriple {
                    subject,
                    predicate: t.predicate,
                    object,
                }
            })
            .collect()
    }
}

/// Build an ontology graph from RDF triples. `fallback_iri` names the graph
/// when the document has no `owl:Ontology` header. Each `owl:imports` target
/// is handed to `resolve_import`; imports it cannot load stay as unresolved
/// references. Axioms about resources the imports declare become overlays.
/// Statements outside the graph model are kept verbatim on the ontology.
pub fn triples_to_ontology(
    triples: Vec<RdfTriple>,
    fallback_iri: &str,
    resolve_import: &mut dyn FnMut(&str) -> Option<Ontology>,
) -> Result<Ontology> {
    let index = TripleIndex::new(triples);

    let ontology_node = index
        .subjects
        .iter()
        .find(|s| matches!(s, RdfNode::Iri(_)) && index.has_type(s, OWL_ONTOLOGY))
        .cloned();
    let iri = match &ontology_node {
        Some(RdfNode::Iri(iri)) => iri.clone(),
        _ => fallback_iri.to_string(),
    };
    let mut ontology = Ontology::create(iri);
    let mut unmodelled = Unmodelled::new(&index);

    if let Some(node) = &ontology_node {
        for (predicate, object) in index.statements(node) {
            match (predicate.as_str(), object) {
                (RDF_TYPE, RdfObject::Node(RdfNode::Iri(ty))) if ty == OWL_ONTOLOGY => {}
                (OWL_IMPORTS, RdfObject::Node(RdfNode::Iri(import))) => {
                    match resolve_import(import) {
                        Some(imported) => ontology.add_import(imported),
                        None => ontology.add_import_reference(import.clone(), None),
                    }
                }
                _ => match object_value(object) {
                    Some(value) if predicate != RDF_TYPE => {
                        ontology.add_ontology_annotation(predicate.clone(), value);
                    }
                    _ => unmodelled.keep(node, predicate, object),
                },
            }
        }
    }

    // declarations first so that every axiom below finds its subject
    let mut classes: HashSet<String> = HashSet::new();
    for subject in &index.subjects {
        let RdfNode::Iri(iri) = subject else { continue };
        if Some(subject) == ontology_node.as_ref() || is_universal(iri) {
            continue;
        }
        if index.has_type(subject, OWL_OBJECT_PROPERTY) {
            ontology.declare_property(iri, PropertyType::Object);
        } else if index.has_type(subject, OWL_DATATYPE_PROPERTY) {
            ontology.declare_property(iri, PropertyType::Datatype);
        } else if index.has_type(subject, OWL_ANNOTATION_PROPERTY) {
            ontology.declare_property(iri, PropertyType::Annotation);
        } else if index.has_type(subject, OWL_CLASS)
            || (index.first(subject, RDFS_SUB_CLASS_OF).is_some() && !ontology.contains(iri))
        {
            ontology.declare_class(iri);
            classes.insert(iri.clone());
        }
    }

    let reader = OwlReader {
        index: &index,
        classes,
    };

    for subject in &index.subjects {
        let RdfNode::Iri(iri) = subject else { continue };
        if Some(subject) == ontology_node.as_ref() {
            continue;
        }
        let Some(body) = ontology.resource(iri).map(|r| r.body.clone()) else {
            // individuals, datatypes and anything else that is not a class or property
            for (predicate, object) in index.statements(subject) {
                unmodelled.keep(subject, predicate, object);
            }
            continue;
        };
        let is_class = matches!(body, ResourceBody::Class(_));
        let mut domain = Vec::new();
        let mut range = Vec::new();

        for (predicate, object) in index.statements(subject) {
            match (predicate.as_str(), object, is_class) {
                (RDF_TYPE, RdfObject::Node(RdfNode::Iri(ty)), _) => match (ty.as_str(), is_class) {
                    (OWL_FUNCTIONAL_PROPERTY, false) => ontology.set_functional(iri, true)?,
                    (OWL_SYMMETRIC_PROPERTY, false) => ontology.set_symmetric(iri, true)?,
                    (OWL_TRANSITIVE_PROPERTY, false) => ontology.set_transitive(iri, true)?,
                    (ty, _) if is_declaration_type(ty) => {}
                    _ => unmodelled.keep(subject, predicate, object),
                },
                (RDFS_LABEL, RdfObject::Literal(lit), _) => {
                    ontology.add_label(iri, lit.lexical.clone())?;
                }
                (RDFS_SUB_CLASS_OF, RdfObject::Node(RdfNode::Iri(sup)), true) => {
                    ontology.add_super_class(iri, sup)?;
                }
                (RDFS_SUB_CLASS_OF, RdfObject::Node(node), true) => match reader.condition(node) {
                    Some(condition) => {
                        ontology.add_necessary_condition(iri, condition)?;
                    }
                    None => unmodelled.keep(subject, predicate, object),
                },
                (OWL_EQUIVALENT_CLASS, RdfObject::Node(RdfNode::Iri(eq)), true) => {
                    ontology.add_equivalent_class(iri, eq)?;
                }
                (OWL_EQUIVALENT_CLASS, RdfObject::Node(node), true) => {
                    match reader.condition(node) {
                        Some(condition) => {
                            ontology.add_equivalent_condition(iri, condition)?;
                        }
                        None => unmodelled.keep(subject, predicate, object),
                    }
                }
                (OWL_DISJOINT_WITH, RdfObject::Node(RdfNode::Iri(other)), true) => {
                    ontology.add_disjoint_class(iri, other)?;
                }
                (RDFS_SUB_PROPERTY_OF, RdfObject::Node(RdfNode::Iri(sup)), false) => {
                    ontology.add_super_property(iri, sup)?;
                }
                (RDFS_DOMAIN, RdfObject::Node(RdfNode::Iri(class)), false) => {
                    domain.push(class.clone());
                }
                (RDFS_RANGE, RdfObject::Node(RdfNode::Iri(ty)), false) => {
                    range.push(Value::Iri(ty.clone()));
                }
                (RDFS_DOMAIN | RDFS_RANGE, _, false) => {
                    tracing::debug!(property = %iri, "anonymous domain/range kept verbatim");
                    unmodelled.keep(subject, predicate, object);
                }
                _ => match object_value(object) {
                    Some(value) => {
                        ontology.add_annotation(iri, predicate, value)?;
                    }
                    None => unmodelled.keep(subject, predicate, object),
                },
            }
        }

        if !domain.is_empty() {
            ontology.set_domain(iri, domain)?;
        }
        if !range.is_empty() {
            ontology.set_range(iri, range)?;
        }
    }

    // blank nodes nothing points at: axiom annotations, AllDisjointClasses, ...
    let referenced: HashSet<&RdfNode> = index
        .by_subject
        .values()
        .flatten()
        .filter_map(|(_, object)| match object {
            RdfObject::Node(node @ RdfNode::BlankNode(_)) => Some(node),
            _ => None,
        })
        .collect();
    for subject in &index.subjects {
        if matches!(subject, RdfNode::BlankNode(_)) && !referenced.contains(subject) {
            unmodelled.keep_node(subject);
        }
    }

    let kept = unmodelled.into_triples();
    if !kept.is_empty() {
        tracing::debug!(iri = ontology.iri(), statements = kept.len(), "keeping unmodelled statements");
    }
    ontology.set_unmodelled(kept);
    Ok(ontology)
}

// ============================================================================
// Ontology -> triples
// ============================================================================

struct TripleWriter {
    triples: Vec<RdfTriple>,
    next_blank: usize,
}

impl TripleWriter {
    fn blank(&mut self) -> RdfNode {
        self.next_blank += 1;
        RdfNode::BlankNode(format!("b{}", self.next_blank))
    }

    fn push(&mut self, subject: &RdfNode, predicate: &str, object: RdfObject) {
        self.triples
            .push(RdfTriple::new(subject.clone(), predicate, object));
    }

    fn push_iri(&mut self, subject: &RdfNode, predicate: &str, iri: &str) {
        self.push(subject, predicate, iri_object(iri));
    }

    fn list(&mut self, items: Vec<RdfObject>) -> RdfObject {
        let mut head = iri_object(RDF_NIL);
        for item in items.into_iter().rev() {
            let cell = self.blank();
            self.push(&cell, RDF_FIRST, item);
            self.push(&cell, RDF_REST, head);
            head = RdfObject::Node(cell);
        }
        head
    }

    fn operand(&mut self, operand: &Operand) -> RdfObject {
        match operand {
            Operand::Class(iri) => iri_object(iri),
            Operand::Value(value) => value_object(value),
            Operand::Restriction(r) => RdfObject::Node(self.restriction(r)),
            Operand::Expression(e) => self.expression(e),
        }
    }

    fn combinator(&mut self, predicate: &str, operands: &[Operand]) -> RdfObject {
        let items = operands.iter().map(|o| self.operand(o)).collect();
        let list = self.list(items);
        let node = self.blank();
        self.push_iri(&node, RDF_TYPE, OWL_CLASS);
        self.push(&node, predicate, list);
        RdfObject::Node(node)
    }

    fn expression(&mut self, expr: &LogicExpression) -> RdfObject {
        match (expr.kind, expr.operands.as_slice()) {
            (ExpressionKind::Leaf, []) => iri_object(OWL_THING),
            (ExpressionKind::Leaf, [single]) => self.operand(single),
            (ExpressionKind::Leaf | ExpressionKind::Intersection, operands) => {
                self.combinator(OWL_INTERSECTION_OF, operands)
            }
            (ExpressionKind::Union, operands) => self.combinator(OWL_UNION_OF, operands),
            (ExpressionKind::Complement, operands) => {
                let inner = match operands {
                    [single] => self.operand(single),
                    many => self.combinator(OWL_INTERSECTION_OF, many),
                };
                let node = self.blank();
                self.push_iri(&node, RDF_TYPE, OWL_CLASS);
                self.push(&node, OWL_COMPLEMENT_OF, inner);
                RdfObject::Node(node)
            }
        }
    }

    fn restriction(&mut self, r: &Restriction) -> RdfNode {
        let node = self.blank();
        self.push_iri(&node, RDF_TYPE, OWL_RESTRICTION);
        self.push_iri(&node, OWL_ON_PROPERTY, &r.property);

        let count = |n: u32| RdfObject::Literal(Literal::typed(n.to_string(), XSD_NON_NEGATIVE_INTEGER));
        let cardinality = match r.kind {
            RestrictionKind::SomeValuesFrom => {
                let filler = self.expression(&r.parameter);
                self.push(&node, OWL_SOME_VALUES_FROM, filler);
                None
            }
            RestrictionKind::AllValuesFrom => {
                let filler = self.expression(&r.parameter);
                self.push(&node, OWL_ALL_VALUES_FROM, filler);
                None
            }
            RestrictionKind::HasValue => {
                let value = match r.parameter.operands.first() {
                    Some(operand) => self.operand(operand),
                    None => iri_object(OWL_THING),
                };
                self.push(&node, OWL_HAS_VALUE, value);
                None
            }
            RestrictionKind::Cardinality(n) => {
                Some((n, OWL_CARDINALITY, OWL_QUALIFIED_CARDINALITY))
            }
            RestrictionKind::MinCardinality(n) => {
                Some((n, OWL_MIN_CARDINALITY, OWL_MIN_QUALIFIED_CARDINALITY))
            }
            RestrictionKind::MaxCardinality(n) => {
                Some((n, OWL_MAX_CARDINALITY, OWL_MAX_QUALIFIED_CARDINALITY))
            }
        };

        if let Some((n, plain, qualified)) = cardinality {
            if r.parameter.is_empty() {
                self.push(&node, plain, count(n));
            } else {
                let filler = self.expression(&r.parameter);
                self.push(&node, qualified, count(n));
                self.push(&node, OWL_ON_CLASS, filler);
            }
        }
        node
    }

    fn condition(&mut self, condition: &Condition) -> RdfObject {
        match condition {
            Condition::Restriction(r) => RdfObject::Node(self.restriction(r)),
            Condition::Expression(e) => self.expression(e),
        }
    }
}

fn iri_object(iri: &str) -> RdfObject {
    RdfObject::Node(RdfNode::Iri(iri.to_string()))
}

fn value_object(value: &Value) -> RdfObject {
    match value {
        Value::Iri(iri) => iri_object(iri),
        Value::Literal(lit) => RdfObject::Literal(lit.clone()),
    }
}

/// Flatten an ontology graph (without its imports) into RDF triples.
pub fn ontology_to_triples(ontology: &Ontology) -> Vec<RdfTriple> {
    let mut w = TripleWriter {
        triples: Vec::new(),
        next_blank: 0,
    };

    let header = RdfNode::Iri(ontology.iri().to_string());
    w.push_iri(&header, RDF_TYPE, OWL_ONTOLOGY);
    for import in ontology.imports() {
        w.push_iri(&header, OWL_IMPORTS, &import.iri);
    }
    for (property, value) in ontology.ontology_annotations() {
        w.push(&header, property, value_object(value));
    }

    for resource in ontology.resources() {
        let subject = RdfNode::Iri(resource.iri.clone());
        match &resource.body {
            ResourceBody::Class(c) => {
                if !resource.overlay {
                    w.push_iri(&subject, RDF_TYPE, OWL_CLASS);
                }
                for label in &resource.labels {
                    w.push(&subject, RDFS_LABEL, RdfObject::Literal(Literal::plain(label.clone())));
                }
                for (property, value) in &resource.annotations {
                    w.push(&subject, property, value_object(value));
                }
                for sup in c.super_classes.iter().filter(|s| s.as_str() != OWL_THING) {
                    w.push_iri(&subject, RDFS_SUB_CLASS_OF, sup);
                }
                for eq in &c.equivalent_classes {
                    w.push_iri(&subject, OWL_EQUIVALENT_CLASS, eq);
                }
                for other in &c.disjoint_classes {
                    w.push_iri(&subject, OWL_DISJOINT_WITH, other);
                }
                for condition in &c.equivalent_conditions {
                    let object = w.condition(condition);
                    w.push(&subject, OWL_EQUIVALENT_CLASS, object);
                }
                for condition in &c.necessary_conditions {
                    let object = w.condition(condition);
                    w.push(&subject, RDFS_SUB_CLASS_OF, object);
                }
            }
            ResourceBody::Property(p) => {
                if !resource.overlay {
                    let ty = match p.property_type {
                        PropertyType::Object => OWL_OBJECT_PROPERTY,
                        PropertyType::Datatype => OWL_DATATYPE_PROPERTY,
                        PropertyType::Annotation => OWL_ANNOTATION_PROPERTY,
                    };
                    w.push_iri(&subject, RDF_TYPE, ty);
                }
                if p.functional {
                    w.push_iri(&subject, RDF_TYPE, OWL_FUNCTIONAL_PROPERTY);
                }
                if p.symmetric {
                    w.push_iri(&subject, RDF_TYPE, OWL_SYMMETRIC_PROPERTY);
                }
                if p.transitive {
                    w.push_iri(&subject, RDF_TYPE, OWL_TRANSITIVE_PROPERTY);
                }
                for label in &resource.labels {
                    w.push(&subject, RDFS_LABEL, RdfObject::Literal(Literal::plain(label.clone())));
                }
                for (property, value) in &resource.annotations {
                    w.push(&subject, property, value_object(value));
                }
                for sup in p.super_properties.iter().filter(|s| !is_universal(s)) {
                    w.push_iri(&subject, RDFS_SUB_PROPERTY_OF, sup);
                }
                for class in &p.domain {
                    w.push_iri(&subject, RDFS_DOMAIN, class);
                }
                for value in &p.range {
                    if let Value::Iri(ty) = value {
                        w.push_iri(&subject, RDFS_RANGE, ty);
                    }
                }
            }
        }
    }

    w.triples.extend(ontology.unmodelled().iter().cloned());
    w.triples
}

// ============================================================================
// Serialization
// ============================================================================

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn node_ntriples(node: &RdfNode) -> String {
    match node {
        RdfNode::Iri(iri) => format!("<{iri}>"),
        RdfNode::BlankNode(id) => format!("_:{id}"),
    }
}

fn object_ntriples(object: &RdfObject) -> String {
    match object {
        RdfObject::Node(node) => node_ntriples(node),
        RdfObject::Literal(lit) => {
            let mut out = format!("\"{}\"", escape_literal(&lit.lexical));
            if let Some(lang) = &lit.language {
                out.push('@');
                out.push_str(lang);
            } else if let Some(dt) = &lit.datatype {
                out.push_str(&format!("^^<{dt}>"));
            }
            out
        }
    }
}

pub fn triples_to_ntriples(triples: &[RdfTriple]) -> String {
    let mut out = String::new();
    for t in triples {
        out.push_str(&format!(
            "{} <{}> {} .\n",
            node_ntriples(&t.subject),
            t.predicate,
            object_ntriples(&t.object)
        ));
    }
    out
}

/// Write triples in `format`.
pub fn write_triples<W: Write>(triples: &[RdfTriple], format: RdfFormat, mut out: W) -> Result<()> {
    use sophia::api::serializer::TripleSerializer;
    use sophia::inmem::graph::LightGraph;

    let ntriples = triples_to_ntriples(triples);
    if format == RdfFormat::NTriples {
        out.write_all(ntriples.as_bytes())?;
        return Ok(());
    }

    let graph: LightGraph = sophia::turtle::parser::nt::parse_str(&ntriples)
        .collect_triples()
        .map_err(|e| GraphError::Parse {
            location: "<serializer>".to_string(),
            message: format!("failed to rebuild graph for serialization: {e}"),
        })?;

    let serialized = match format {
        RdfFormat::Turtle => sophia::turtle::serializer::turtle::TurtleSerializer::new(&mut out)
            .serialize_graph(&graph)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        RdfFormat::RdfXml => sophia::xml::serializer::RdfXmlSerializer::new(&mut out)
            .serialize_graph(&graph)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        RdfFormat::NTriples => Ok(()),
    };
    serialized.map_err(|message| GraphError::Parse {
        location: "<serializer>".to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TTL: &str = r#"
@prefix : <http://example.org/onco.owl#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<http://example.org/onco.owl> a owl:Ontology ;
    owl:imports <http://example.org/model.owl> .

:hasSite a owl:ObjectProperty , owl:FunctionalProperty ;
    rdfs:domain :Tumor ;
    rdfs:range :Site .

:size a owl:DatatypeProperty ;
    rdfs:range xsd:decimal .

:Site a owl:Class .
:Breast a owl:Class ; rdfs:subClassOf :Site ; rdfs:label "Breast" .

:Tumor a owl:Class ;
    rdfs:label "Tumor" ;
    rdfs:subClassOf [
        a owl:Restriction ;
        owl:onProperty :hasSite ;
        owl:someValuesFrom [ a owl:Class ; owl:unionOf ( :Site :Breast ) ]
    ] ;
    rdfs:subClassOf [
        a owl:Restriction ;
        owl:onProperty :size ;
        owl:maxCardinality "1"^^xsd:nonNegativeInteger
    ] .
"#;

    fn sample() -> Ontology {
        let triples = parse_triples(SAMPLE_TTL.as_bytes(), RdfFormat::Turtle, "sample.ttl")
            .expect("turtle parses");
        triples_to_ontology(triples, "http://example.org/fallback", &mut |_| None)
            .expect("ontology")
    }

    #[test]
    fn reads_owl_structure_from_turtle() {
        let onto = sample();
        assert_eq!(onto.iri(), "http://example.org/onco.owl");
        assert_eq!(onto.imports().len(), 1);

        let tumor = onto.class_by_name("Tumor").expect("Tumor declared");
        let has_site = onto.property_by_name("hasSite").expect("hasSite declared");
        assert!(onto.is_functional(&has_site));
        assert_eq!(onto.domain(&has_site), vec![tumor.clone()]);

        let site_restrictions = onto.restrictions_on(&tumor, &has_site);
        assert_eq!(site_restrictions.len(), 1);
        let parameter = &site_restrictions[0].parameter;
        assert_eq!(parameter.kind, ExpressionKind::Union);
        assert_eq!(parameter.operands.len(), 2);

        let size = onto.property_by_name("size").unwrap();
        let size_restrictions = onto.restrictions_on(&tumor, &size);
        assert_eq!(size_restrictions[0].kind, RestrictionKind::MaxCardinality(1));
        assert!(size_restrictions[0].parameter.is_empty());

        let breast = onto.class_by_name("Breast").unwrap();
        assert_eq!(onto.super_classes(&breast), vec![onto.resource_iri("Site")]);
    }

    #[test]
    fn ntriples_output_reads_back_to_the_same_axioms() {
        let onto = sample();
        let text = triples_to_ntriples(&ontology_to_triples(&onto));
        let triples = parse_triples(text.as_bytes(), RdfFormat::NTriples, "roundtrip.nt").unwrap();
        let back =
            triples_to_ontology(triples, "http://example.org/fallback", &mut |_| None).unwrap();

        let tumor = back.class_by_name("Tumor").unwrap();
        let has_site = back.property_by_name("hasSite").unwrap();
        assert_eq!(
            back.restrictions_on(&tumor, &has_site),
            onto.restrictions_on(&onto.class_by_name("Tumor").unwrap(), &has_site)
        );
        assert_eq!(back.labels(&tumor), vec!["Tumor".to_string()]);
    }

    const INDIVIDUALS_TTL: &str = r#"
@prefix : <http://example.org/side.owl#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/side.owl> a owl:Ontology .

:Tumor a owl:Class .
:Other a owl:Class .
:hasSide a owl:ObjectProperty ;
    rdfs:range [ a owl:Class ; owl:unionOf ( :Tumor :Other ) ] .

:Left a owl:NamedIndividual , :Tumor ;
    rdfs:label "left" .

[] a owl:AllDisjointClasses ;
    owl:members ( :Tumor :Other ) .
"#;

    fn has_statement(triples: &[RdfTriple], subject: &str, predicate: &str, object: &str) -> bool {
        triples.iter().any(|t| {
            t.subject == RdfNode::Iri(subject.to_string())
                && t.predicate == predicate
                && t.object == iri_object(object)
        })
    }

    #[test]
    fn statements_outside_the_model_survive_a_turtle_round_trip() {
        let triples =
            parse_triples(INDIVIDUALS_TTL.as_bytes(), RdfFormat::Turtle, "side.ttl").unwrap();
        let onto = triples_to_ontology(triples, "http://example.org/fallback", &mut |_| None)
            .unwrap();
        let left = "http://example.org/side.owl#Left";
        let tumor = onto.class_by_name("Tumor").unwrap();
        let has_side = onto.property_by_name("hasSide").unwrap();
        assert!(!onto.contains(left));
        assert!(onto.range(&has_side).is_empty());
        assert!(has_statement(onto.unmodelled(), left, RDF_TYPE, &tumor));

        let mut turtle = Vec::new();
        write_triples(&ontology_to_triples(&onto), RdfFormat::Turtle, &mut turtle).unwrap();
        let back = triples_to_ontology(
            parse_triples(&turtle, RdfFormat::Turtle, "side.ttl").unwrap(),
            "http://example.org/fallback",
            &mut |_| None,
        )
        .unwrap();

        let kept = back.unmodelled();
        assert!(has_statement(kept, left, RDF_TYPE, &tumor));
        assert!(kept.iter().any(|t| t.subject == RdfNode::Iri(left.to_string())
            && t.object == RdfObject::Literal(Literal::plain("left"))));
        assert!(kept.iter().any(|t| t.subject == RdfNode::Iri(has_side.clone())
            && t.predicate == RDFS_RANGE));
        assert!(kept.iter().any(|t| t.predicate == OWL_UNION_OF));
        assert!(kept
            .iter()
            .any(|t| t.object == iri_object("http://www.w3.org/2002/07/owl#AllDisjointClasses")));
        assert_eq!(kept.len(), onto.unmodelled().len());
    }

    #[test]
    fn term_display_handles_escapes_and_tags() {
        let lit = parse_term_display(r#""say \"hi\""@en"#).unwrap();
        assert_eq!(
            lit,
            RdfObject::Literal(Literal::tagged("say \"hi\"", "en"))
        );
        let simple = parse_term_display(
            "\"x\"^^<http://www.w3.org/2001/XMLSchema#string>",
        )
        .unwrap();
        assert_eq!(simple, RdfObject::Literal(Literal::plain("x")));
    }
}
