//! Resource model: literals, values, logic expressions and resource records.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// Object of an annotation: either another resource or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Iri(String),
    Literal(Literal),
}

impl Value {
    pub fn iri(iri: impl Into<String>) -> Self {
        Value::Iri(iri.into())
    }

    pub fn text(lexical: impl Into<String>) -> Self {
        Value::Literal(Literal::plain(lexical))
    }

    /// The IRI or the lexical form, whichever this value carries.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Iri(iri) => iri,
            Value::Literal(lit) => &lit.lexical,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Iri(iri) => write!(f, "<{iri}>"),
            Value::Literal(lit) => {
                write!(f, "\"{}\"", lit.lexical)?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")?;
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Logic expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    /// A single operand (or nothing) with no combinator.
    Leaf,
    Intersection,
    Union,
    Complement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicExpression {
    pub kind: ExpressionKind,
    #[serde(default)]
    pub operands: Vec<Operand>,
}

impl LogicExpression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self {
            kind,
            operands: Vec::new(),
        }
    }

    pub fn leaf(operand: Operand) -> Self {
        Self {
            kind: ExpressionKind::Leaf,
            operands: vec![operand],
        }
    }

    pub fn with_operands(kind: ExpressionKind, operands: Vec<Operand>) -> Self {
        Self { kind, operands }
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    pub fn push(&mut self, operand: Operand) {
        self.operands.push(operand);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Expression(LogicExpression),
    Restriction(Restriction),
    Class(String),
    /// Copied verbatim: literals, datatypes, individuals.
    Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    SomeValuesFrom,
    AllValuesFrom,
    HasValue,
    MinCardinality(u32),
    MaxCardinality(u32),
    Cardinality(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub kind: RestrictionKind,
    pub property: String,
    /// Filler; empty for unqualified cardinalities.
    pub parameter: LogicExpression,
}

impl Restriction {
    pub fn new(kind: RestrictionKind, property: impl Into<String>, parameter: LogicExpression) -> Self {
        Self {
            kind,
            property: property.into(),
            parameter,
        }
    }
}

/// A constraint attached to a class, as an equivalent or necessary condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Restriction(Restriction),
    Expression(LogicExpression),
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Datatype,
    Object,
    Annotation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAxioms {
    #[serde(default)]
    pub super_classes: Vec<String>,
    #[serde(default)]
    pub equivalent_classes: Vec<String>,
    #[serde(default)]
    pub disjoint_classes: Vec<String>,
    #[serde(default)]
    pub equivalent_conditions: Vec<Condition>,
    #[serde(default)]
    pub necessary_conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAxioms {
    pub property_type: PropertyType,
    #[serde(default)]
    pub super_properties: Vec<String>,
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub range: Vec<Value>,
    #[serde(default)]
    pub functional: bool,
    #[serde(default)]
    pub symmetric: bool,
    #[serde(default)]
    pub transitive: bool,
}

impl PropertyAxioms {
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            super_properties: Vec::new(),
            domain: Vec::new(),
            range: Vec::new(),
            functional: false,
            symmetric: false,
            transitive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceBody {
    Class(ClassAxioms),
    Property(PropertyAxioms),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub iri: String,
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<(String, Value)>,
    /// Local record holding axioms about a resource declared in an import.
    #[serde(default)]
    pub overlay: bool,
    pub body: ResourceBody,
}

impl Resource {
    pub fn is_class(&self) -> bool {
        matches!(self.body, ResourceBody::Class(_))
    }

    pub fn is_property(&self) -> bool {
        matches!(self.body, ResourceBody::Property(_))
    }

    pub fn class_axioms(&self) -> Option<&ClassAxioms> {
        match &self.body {
            ResourceBody::Class(c) => Some(c),
            ResourceBody::Property(_) => None,
        }
    }

    pub fn property_axioms(&self) -> Option<&PropertyAxioms> {
        match &self.body {
            ResourceBody::Property(p) => Some(p),
            ResourceBody::Class(_) => None,
        }
    }

    /// Super-classes of a class record, super-properties of a property record.
    pub fn parents(&self) -> &[String] {
        match &self.body {
            ResourceBody::Class(c) => &c.super_classes,
            ResourceBody::Property(p) => &p.super_properties,
        }
    }

    /// First label, or the bare name when there is none.
    pub fn display_name(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or(&self.name)
    }
}

pub(crate) fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) -> bool {
    if list.contains(&value) {
        false
    } else {
        list.push(value);
        true
    }
}
