//! The ontology graph store.
//!
//! Resources live in an arena owned by their ontology and are addressed by IRI.
//! Reads see the imports closure (the graph itself first, then each import
//! depth-first); writes always land in the graph itself. Writing an axiom about
//! an imported resource creates a local *overlay* record that only carries the
//! added axioms, the way an OWL document can state facts about foreign IRIs.

use crate::error::{GraphError, Result};
use crate::model::{
    push_unique, ClassAxioms, Condition, PropertyAxioms, PropertyType, Resource, ResourceBody,
    Restriction, Value,
};
use crate::rdf::RdfTriple;
use crate::vocab::{
    is_universal, local_name, OWL_THING, OWL_TOP_DATA_PROPERTY, OWL_TOP_OBJECT_PROPERTY,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// An `owl:imports` edge. The imported graph is read-only from the importer's
/// point of view; `ontology` is `None` when the import could not be resolved.
#[derive(Debug, Clone)]
pub struct Import {
    pub iri: String,
    pub location: Option<PathBuf>,
    pub ontology: Option<Ontology>,
}

#[derive(Debug, Clone)]
pub struct Ontology {
    iri: String,
    location: Option<PathBuf>,
    annotations: Vec<(String, Value)>,
    resources: Vec<Resource>,
    by_iri: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    /// Super IRI -> local records stating it as their super-class or super-property.
    children: HashMap<String, Vec<usize>>,
    imports: Vec<Import>,
    unmodelled: Vec<RdfTriple>,
}

/// Short name of an ontology IRI: last path segment without extension.
pub fn ontology_name(iri: &str) -> String {
    let trimmed = iri.trim_end_matches(['#', '/']);
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    match last.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => last.to_string(),
    }
}

impl Ontology {
    /// Create an empty ontology identified by `iri`.
    pub fn create(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into().trim_end_matches('#').to_string(),
            location: None,
            annotations: Vec::new(),
            resources: Vec::new(),
            by_iri: HashMap::new(),
            by_name: HashMap::new(),
            children: HashMap::new(),
            imports: Vec::new(),
            unmodelled: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        iri: String,
        annotations: Vec<(String, Value)>,
        resources: Vec<Resource>,
        imports: Vec<Import>,
        unmodelled: Vec<RdfTriple>,
    ) -> Self {
        let mut ontology = Self::create(iri);
        ontology.annotations = annotations;
        ontology.imports = imports;
        ontology.unmodelled = unmodelled;
        for resource in resources {
            ontology.insert(resource);
        }
        ontology
    }

    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn name(&self) -> String {
        ontology_name(&self.iri)
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: impl Into<PathBuf>) {
        self.location = Some(location.into());
    }

    /// IRI a resource called `name` gets in this graph.
    pub fn resource_iri(&self, name: &str) -> String {
        format!("{}#{}", self.iri, name)
    }

    /// Whether `iri` lies in this graph's own namespace.
    pub fn owns(&self, iri: &str) -> bool {
        match iri.strip_prefix(self.iri.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('#') || rest.starts_with('/'),
            None => false,
        }
    }

    /// The universal class.
    pub fn root(&self) -> &'static str {
        OWL_THING
    }

    /// The implicit top of the property lattice for `property_type`.
    pub fn top_property(&self, property_type: PropertyType) -> Option<&'static str> {
        match property_type {
            PropertyType::Object => Some(OWL_TOP_OBJECT_PROPERTY),
            PropertyType::Datatype => Some(OWL_TOP_DATA_PROPERTY),
            PropertyType::Annotation => None,
        }
    }

    /// Release the graph. Unsaved changes are lost.
    pub fn dispose(self) {}

    // ========================================================================
    // Imports
    // ========================================================================

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// Import a loaded graph. Replaces an unresolved reference with the same IRI.
    pub fn add_import(&mut self, ontology: Ontology) {
        let iri = ontology.iri.clone();
        let location = ontology.location.clone();
        if let Some(existing) = self.imports.iter_mut().find(|i| i.iri == iri) {
            existing.location = location;
            existing.ontology = Some(ontology);
            return;
        }
        self.imports.push(Import {
            iri,
            location,
            ontology: Some(ontology),
        });
    }

    pub fn add_import_reference(&mut self, iri: impl Into<String>, location: Option<PathBuf>) {
        let iri = iri.into();
        if self.imports.iter().any(|i| i.iri == iri) {
            return;
        }
        self.imports.push(Import {
            iri,
            location,
            ontology: None,
        });
    }

    pub fn imported_ontologies(&self) -> impl Iterator<Item = &Ontology> {
        self.imports.iter().filter_map(|i| i.ontology.as_ref())
    }

    /// This graph followed by every graph it transitively imports.
    fn closure(&self) -> Vec<&Ontology> {
        let mut out: Vec<&Ontology> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack = vec![self];
        while let Some(ontology) = stack.pop() {
            if !seen.insert(ontology.iri.as_str()) {
                continue;
            }
            out.push(ontology);
            for imported in ontology.imported_ontologies().collect::<Vec<_>>().into_iter().rev() {
                stack.push(imported);
            }
        }
        out
    }

    // ========================================================================
    // Ontology-level annotations
    // ========================================================================

    pub fn ontology_annotations(&self) -> &[(String, Value)] {
        &self.annotations
    }

    pub fn add_ontology_annotation(&mut self, property: impl Into<String>, value: Value) -> bool {
        push_unique(&mut self.annotations, (property.into(), value))
    }

    /// Statements read from RDF that the graph model does not represent
    /// (individuals, anonymous domains and ranges, axiom annotations, ...).
    /// They are written back unchanged on save.
    pub fn unmodelled(&self) -> &[RdfTriple] {
        &self.unmodelled
    }

    pub(crate) fn set_unmodelled(&mut self, triples: Vec<RdfTriple>) {
        self.unmodelled = triples;
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Records the graph itself holds, overlays included.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    fn local(&self, iri: &str) -> Option<&Resource> {
        self.by_iri.get(iri).map(|&i| &self.resources[i])
    }

    fn records(&self, iri: &str) -> Vec<&Resource> {
        self.closure()
            .into_iter()
            .filter_map(|o| o.local(iri))
            .collect()
    }

    /// The defining record of `iri`, preferring a declaration over an overlay.
    pub fn resource(&self, iri: &str) -> Option<&Resource> {
        let records = self.records(iri);
        records
            .iter()
            .find(|r| !r.overlay)
            .or_else(|| records.first())
            .copied()
    }

    pub fn contains(&self, iri: &str) -> bool {
        is_universal(iri) || !self.records(iri).is_empty()
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.lookup_name(name).is_some()
    }

    /// IRI of the resource called `name`, searching the imports closure.
    pub fn lookup_name(&self, name: &str) -> Option<String> {
        self.closure()
            .into_iter()
            .find_map(|o| o.by_name.get(name).map(|&i| o.resources[i].iri.clone()))
    }

    pub fn class_by_name(&self, name: &str) -> Option<String> {
        self.lookup_name(name).filter(|iri| self.is_class(iri))
    }

    pub fn property_by_name(&self, name: &str) -> Option<String> {
        self.lookup_name(name).filter(|iri| self.is_property(iri))
    }

    pub fn is_class(&self, iri: &str) -> bool {
        iri == OWL_THING || self.resource(iri).is_some_and(Resource::is_class)
    }

    pub fn is_property(&self, iri: &str) -> bool {
        self.property_type(iri).is_some()
    }

    pub fn property_type(&self, iri: &str) -> Option<PropertyType> {
        match iri {
            OWL_TOP_OBJECT_PROPERTY => Some(PropertyType::Object),
            OWL_TOP_DATA_PROPERTY => Some(PropertyType::Datatype),
            _ => self
                .resource(iri)
                .and_then(Resource::property_axioms)
                .map(|p| p.property_type),
        }
    }

    pub fn name_of(&self, iri: &str) -> String {
        self.resource(iri)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| local_name(iri))
    }

    pub fn labels(&self, iri: &str) -> Vec<String> {
        let mut out = Vec::new();
        for record in self.records(iri) {
            for label in &record.labels {
                push_unique(&mut out, label.clone());
            }
        }
        out
    }

    /// First label, or the bare name when there is none.
    pub fn display_name(&self, iri: &str) -> String {
        self.labels(iri)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.name_of(iri))
    }

    pub fn annotations(&self, iri: &str) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        for record in self.records(iri) {
            for pair in &record.annotations {
                push_unique(&mut out, pair.clone());
            }
        }
        out
    }

    pub fn annotation_values(&self, iri: &str, property: &str) -> Vec<Value> {
        self.annotations(iri)
            .into_iter()
            .filter(|(p, _)| p == property)
            .map(|(_, v)| v)
            .collect()
    }

    /// First value of the annotation whose property has the local name `name`.
    pub fn annotation_value_by_name(&self, iri: &str, name: &str) -> Option<Value> {
        self.annotations(iri)
            .into_iter()
            .find(|(p, _)| local_name(p) == name)
            .map(|(_, v)| v)
    }

    // ========================================================================
    // Class queries
    // ========================================================================

    fn class_records(&self, iri: &str) -> Vec<&ClassAxioms> {
        self.records(iri)
            .into_iter()
            .filter_map(Resource::class_axioms)
            .collect()
    }

    fn collect_class<T: Clone + PartialEq>(
        &self,
        iri: &str,
        field: impl Fn(&ClassAxioms) -> &Vec<T>,
    ) -> Vec<T> {
        let mut out = Vec::new();
        for axioms in self.class_records(iri) {
            for value in field(axioms) {
                push_unique(&mut out, value.clone());
            }
        }
        out
    }

    pub fn super_classes(&self, iri: &str) -> Vec<String> {
        self.collect_class(iri, |c| &c.super_classes)
    }

    pub fn equivalent_classes(&self, iri: &str) -> Vec<String> {
        self.collect_class(iri, |c| &c.equivalent_classes)
    }

    pub fn disjoint_classes(&self, iri: &str) -> Vec<String> {
        self.collect_class(iri, |c| &c.disjoint_classes)
    }

    pub fn equivalent_conditions(&self, iri: &str) -> Vec<Condition> {
        self.collect_class(iri, |c| &c.equivalent_conditions)
    }

    pub fn necessary_conditions(&self, iri: &str) -> Vec<Condition> {
        self.collect_class(iri, |c| &c.necessary_conditions)
    }

    /// Top-level restrictions on `property` among the class's conditions.
    pub fn restrictions_on(&self, iri: &str, property: &str) -> Vec<Restriction> {
        self.equivalent_conditions(iri)
            .into_iter()
            .chain(self.necessary_conditions(iri))
            .filter_map(|c| match c {
                Condition::Restriction(r) if r.property == property => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Direct sub-classes across the imports closure. Classes without any
    /// declared super-class are direct sub-classes of the root.
    pub fn sub_classes(&self, iri: &str) -> Vec<String> {
        let closure = self.closure();
        if iri != OWL_THING {
            return indexed_children(&closure, iri, Resource::is_class);
        }
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for ontology in closure.iter().copied() {
            for resource in &ontology.resources {
                if !resource.is_class() || !seen.insert(resource.iri.as_str()) {
                    continue;
                }
                let parents = stated_parents(&closure, &resource.iri);
                if parents.is_empty() || parents.contains(&OWL_THING) {
                    out.push(resource.iri.clone());
                }
            }
        }
        out
    }

    /// All transitive sub-classes, breadth-first, each reported once.
    pub fn descendants(&self, iri: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(iri.to_string());
        let mut queue: VecDeque<String> = self.sub_classes(iri).into();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.sub_classes(&next));
            out.push(next);
        }
        out
    }

    // ========================================================================
    // Property queries
    // ========================================================================

    fn property_records(&self, iri: &str) -> Vec<&PropertyAxioms> {
        self.records(iri)
            .into_iter()
            .filter_map(Resource::property_axioms)
            .collect()
    }

    pub fn super_properties(&self, iri: &str) -> Vec<String> {
        let mut out = Vec::new();
        for axioms in self.property_records(iri) {
            for value in &axioms.super_properties {
                push_unique(&mut out, value.clone());
            }
        }
        out
    }

    /// Direct sub-properties. Properties without a declared super-property sit
    /// directly under the top property of their kind.
    pub fn sub_properties(&self, iri: &str) -> Vec<String> {
        let closure = self.closure();
        let top = match iri {
            OWL_TOP_OBJECT_PROPERTY => PropertyType::Object,
            OWL_TOP_DATA_PROPERTY => PropertyType::Datatype,
            _ => return indexed_children(&closure, iri, Resource::is_property),
        };
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for ontology in closure.iter().copied() {
            for resource in &ontology.resources {
                if !resource.is_property() || !seen.insert(resource.iri.as_str()) {
                    continue;
                }
                let parents = stated_parents(&closure, &resource.iri);
                let under_top =
                    parents.is_empty() && self.property_type(&resource.iri) == Some(top);
                if under_top || parents.contains(&iri) {
                    out.push(resource.iri.clone());
                }
            }
        }
        out
    }

    pub fn domain(&self, iri: &str) -> Vec<String> {
        let mut out = Vec::new();
        for axioms in self.property_records(iri) {
            for value in &axioms.domain {
                push_unique(&mut out, value.clone());
            }
        }
        out
    }

    pub fn range(&self, iri: &str) -> Vec<Value> {
        let mut out = Vec::new();
        for axioms in self.property_records(iri) {
            for value in &axioms.range {
                push_unique(&mut out, value.clone());
            }
        }
        out
    }

    pub fn is_functional(&self, iri: &str) -> bool {
        self.property_records(iri).iter().any(|p| p.functional)
    }

    pub fn is_symmetric(&self, iri: &str) -> bool {
        self.property_records(iri).iter().any(|p| p.symmetric)
    }

    pub fn is_transitive(&self, iri: &str) -> bool {
        self.property_records(iri).iter().any(|p| p.transitive)
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Classes this graph declares, in declaration order.
    pub fn classes(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter(|r| r.is_class() && !r.overlay)
            .map(|r| r.iri.clone())
            .collect()
    }

    /// Properties this graph declares, in declaration order.
    pub fn properties(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter(|r| r.is_property() && !r.overlay)
            .map(|r| r.iri.clone())
            .collect()
    }

    /// Every declared resource in the imports closure, each IRI once.
    pub fn all_resources(&self) -> Vec<&Resource> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for ontology in self.closure() {
            for resource in &ontology.resources {
                if !resource.overlay && seen.insert(resource.iri.as_str()) {
                    out.push(resource);
                }
            }
        }
        out
    }

    // ========================================================================
    // Creation
    // ========================================================================

    fn insert(&mut self, resource: Resource) -> String {
        let iri = resource.iri.clone();
        let index = self.resources.len();
        if !resource.overlay {
            self.by_name.entry(resource.name.clone()).or_insert(index);
        }
        self.by_iri.insert(iri.clone(), index);
        self.resources.push(resource);
        let parents = self.resources[index].parents().to_vec();
        for parent in parents {
            self.link_child(&parent, index);
        }
        iri
    }

    fn link_child(&mut self, parent: &str, index: usize) {
        let children = self.children.entry(parent.to_string()).or_default();
        if !children.contains(&index) {
            children.push(index);
        }
    }

    fn unlink_child(&mut self, parent: &str, index: usize) {
        if let Some(children) = self.children.get_mut(parent) {
            children.retain(|&i| i != index);
        }
    }

    fn check_free(&self, name: &str) -> Result<String> {
        let iri = self.resource_iri(name);
        if self.by_name.contains_key(name) || self.by_iri.contains_key(&iri) {
            return Err(GraphError::DuplicateName {
                name: name.to_string(),
                ontology: self.iri.clone(),
            });
        }
        Ok(iri)
    }

    /// Create a class under the root.
    pub fn create_class(&mut self, name: &str) -> Result<String> {
        let iri = self.check_free(name)?;
        Ok(self.insert(Resource {
            iri,
            name: name.to_string(),
            labels: Vec::new(),
            annotations: Vec::new(),
            overlay: false,
            body: ResourceBody::Class(ClassAxioms {
                super_classes: vec![OWL_THING.to_string()],
                ..ClassAxioms::default()
            }),
        }))
    }

    /// Create a class directly under `parent`, which may be imported.
    pub fn create_sub_class(&mut self, parent: &str, name: &str) -> Result<String> {
        if !self.is_class(parent) {
            return Err(GraphError::WrongKind {
                iri: parent.to_string(),
                expected: "class",
            });
        }
        let iri = self.check_free(name)?;
        Ok(self.insert(Resource {
            iri,
            name: name.to_string(),
            labels: Vec::new(),
            annotations: Vec::new(),
            overlay: false,
            body: ResourceBody::Class(ClassAxioms {
                super_classes: vec![parent.to_string()],
                ..ClassAxioms::default()
            }),
        }))
    }

    /// Create a property. Object and datatype properties start under the top
    /// property of their kind.
    pub fn create_property(&mut self, name: &str, property_type: PropertyType) -> Result<String> {
        let iri = self.check_free(name)?;
        let mut axioms = PropertyAxioms::new(property_type);
        if let Some(top) = self.top_property(property_type) {
            axioms.super_properties.push(top.to_string());
        }
        Ok(self.insert(Resource {
            iri,
            name: name.to_string(),
            labels: Vec::new(),
            annotations: Vec::new(),
            overlay: false,
            body: ResourceBody::Property(axioms),
        }))
    }

    /// Declare a class under an arbitrary IRI; no-op if already declared here.
    pub fn declare_class(&mut self, iri: &str) -> String {
        if self.by_iri.contains_key(iri) || iri == OWL_THING {
            return iri.to_string();
        }
        self.insert(Resource {
            iri: iri.to_string(),
            name: local_name(iri),
            labels: Vec::new(),
            annotations: Vec::new(),
            overlay: false,
            body: ResourceBody::Class(ClassAxioms::default()),
        })
    }

    /// Declare a property under an arbitrary IRI; no-op if already declared here.
    pub fn declare_property(&mut self, iri: &str, property_type: PropertyType) -> String {
        if self.by_iri.contains_key(iri) || is_universal(iri) {
            return iri.to_string();
        }
        self.insert(Resource {
            iri: iri.to_string(),
            name: local_name(iri),
            labels: Vec::new(),
            annotations: Vec::new(),
            overlay: false,
            body: ResourceBody::Property(PropertyAxioms::new(property_type)),
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    fn local_index_mut(&mut self, iri: &str) -> Result<usize> {
        if let Some(&index) = self.by_iri.get(iri) {
            return Ok(index);
        }
        let body = match self.resource(iri).map(|r| &r.body) {
            Some(ResourceBody::Class(_)) => ResourceBody::Class(ClassAxioms::default()),
            Some(ResourceBody::Property(p)) => {
                ResourceBody::Property(PropertyAxioms::new(p.property_type))
            }
            None => return Err(GraphError::UnknownResource(iri.to_string())),
        };
        let name = self.name_of(iri);
        self.insert(Resource {
            iri: iri.to_string(),
            name,
            labels: Vec::new(),
            annotations: Vec::new(),
            overlay: true,
            body,
        });
        Ok(self.resources.len() - 1)
    }

    fn resource_mut(&mut self, iri: &str) -> Result<&mut Resource> {
        let index = self.local_index_mut(iri)?;
        Ok(&mut self.resources[index])
    }

    fn class_entry(&mut self, iri: &str) -> Result<(usize, &mut ClassAxioms)> {
        let index = self.local_index_mut(iri)?;
        match &mut self.resources[index].body {
            ResourceBody::Class(c) => Ok((index, c)),
            ResourceBody::Property(_) => Err(GraphError::WrongKind {
                iri: iri.to_string(),
                expected: "class",
            }),
        }
    }

    fn class_mut(&mut self, iri: &str) -> Result<&mut ClassAxioms> {
        self.class_entry(iri).map(|(_, c)| c)
    }

    fn property_entry(&mut self, iri: &str) -> Result<(usize, &mut PropertyAxioms)> {
        let index = self.local_index_mut(iri)?;
        match &mut self.resources[index].body {
            ResourceBody::Property(p) => Ok((index, p)),
            ResourceBody::Class(_) => Err(GraphError::WrongKind {
                iri: iri.to_string(),
                expected: "property",
            }),
        }
    }

    fn property_mut(&mut self, iri: &str) -> Result<&mut PropertyAxioms> {
        self.property_entry(iri).map(|(_, p)| p)
    }

    pub fn add_label(&mut self, iri: &str, label: impl Into<String>) -> Result<bool> {
        let resource = self.resource_mut(iri)?;
        Ok(push_unique(&mut resource.labels, label.into()))
    }

    pub fn add_annotation(&mut self, iri: &str, property: &str, value: Value) -> Result<bool> {
        let resource = self.resource_mut(iri)?;
        Ok(push_unique(
            &mut resource.annotations,
            (property.to_string(), value),
        ))
    }

    /// Remove a locally stated annotation. Values held by imports are untouched.
    pub fn remove_annotation(&mut self, iri: &str, property: &str, value: &Value) -> Result<bool> {
        let Some(&index) = self.by_iri.get(iri) else {
            return Ok(false);
        };
        let annotations = &mut self.resources[index].annotations;
        let before = annotations.len();
        annotations.retain(|(p, v)| !(p == property && v == value));
        Ok(annotations.len() != before)
    }

    pub fn add_super_class(&mut self, iri: &str, super_class: &str) -> Result<bool> {
        let (index, axioms) = self.class_entry(iri)?;
        let added = push_unique(&mut axioms.super_classes, super_class.to_string());
        if added {
            self.link_child(super_class, index);
        }
        Ok(added)
    }

    pub fn remove_super_class(&mut self, iri: &str, super_class: &str) -> Result<bool> {
        let (index, axioms) = self.class_entry(iri)?;
        let before = axioms.super_classes.len();
        axioms.super_classes.retain(|s| s != super_class);
        let removed = axioms.super_classes.len() != before;
        if removed {
            self.unlink_child(super_class, index);
        }
        Ok(removed)
    }

    pub fn add_equivalent_class(&mut self, iri: &str, other: &str) -> Result<bool> {
        let axioms = self.class_mut(iri)?;
        Ok(push_unique(&mut axioms.equivalent_classes, other.to_string()))
    }

    pub fn add_disjoint_class(&mut self, iri: &str, other: &str) -> Result<bool> {
        let axioms = self.class_mut(iri)?;
        Ok(push_unique(&mut axioms.disjoint_classes, other.to_string()))
    }

    pub fn add_equivalent_condition(&mut self, iri: &str, condition: Condition) -> Result<bool> {
        let axioms = self.class_mut(iri)?;
        Ok(push_unique(&mut axioms.equivalent_conditions, condition))
    }

    pub fn add_necessary_condition(&mut self, iri: &str, condition: Condition) -> Result<bool> {
        let axioms = self.class_mut(iri)?;
        Ok(push_unique(&mut axioms.necessary_conditions, condition))
    }

    pub fn add_super_property(&mut self, iri: &str, super_property: &str) -> Result<bool> {
        let (index, axioms) = self.property_entry(iri)?;
        let added = push_unique(
            &mut axioms.super_properties,
            super_property.to_string(),
        );
        if added {
            self.link_child(super_property, index);
        }
        Ok(added)
    }

    pub fn remove_super_property(&mut self, iri: &str, super_property: &str) -> Result<bool> {
        let (index, axioms) = self.property_entry(iri)?;
        let before = axioms.super_properties.len();
        axioms.super_properties.retain(|s| s != super_property);
        let removed = axioms.super_properties.len() != before;
        if removed {
            self.unlink_child(super_property, index);
        }
        Ok(removed)
    }

    pub fn set_domain(&mut self, iri: &str, domain: Vec<String>) -> Result<()> {
        self.property_mut(iri)?.domain = domain;
        Ok(())
    }

    pub fn set_range(&mut self, iri: &str, range: Vec<Value>) -> Result<()> {
        self.property_mut(iri)?.range = range;
        Ok(())
    }

    pub fn set_functional(&mut self, iri: &str, functional: bool) -> Result<()> {
        self.property_mut(iri)?.functional = functional;
        Ok(())
    }

    pub fn set_symmetric(&mut self, iri: &str, symmetric: bool) -> Result<()> {
        self.property_mut(iri)?.symmetric = symmetric;
        Ok(())
    }

    pub fn set_transitive(&mut self, iri: &str, transitive: bool) -> Result<()> {
        self.property_mut(iri)?.transitive = transitive;
        Ok(())
    }
}

/// Super edges of `iri` stated by any record in `closure`.
fn stated_parents<'o>(closure: &[&'o Ontology], iri: &str) -> Vec<&'o str> {
    closure
        .iter()
        .copied()
        .filter_map(|o| o.local(iri))
        .flat_map(|r| r.parents().iter().map(String::as_str))
        .collect()
}

/// Records of kind `kind` that name `parent` as a direct super, looked up in
/// each graph's child index. Declaration order is kept within a graph.
fn indexed_children(
    closure: &[&Ontology],
    parent: &str,
    kind: fn(&Resource) -> bool,
) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for ontology in closure.iter().copied() {
        let mut indices = ontology.children.get(parent).cloned().unwrap_or_default();
        indices.sort_unstable();
        for index in indices {
            let resource = &ontology.resources[index];
            if kind(resource) && resource.iri != parent && seen.insert(resource.iri.as_str()) {
                out.push(resource.iri.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpressionKind, LogicExpression, Operand, RestrictionKind};

    fn tumor_model() -> Ontology {
        let mut model = Ontology::create("http://example.org/model.owl");
        let tumor = model.create_class("Tumor").unwrap();
        model.add_label(&tumor, "Tumor").unwrap();
        model
    }

    #[test]
    fn ontology_name_strips_path_and_extension() {
        assert_eq!(
            ontology_name("http://ontologies.dbmi.pitt.edu/deepphe/cancer/cancer.owl"),
            "cancer"
        );
        assert_eq!(ontology_name("http://example.org/onto#"), "onto");
    }

    #[test]
    fn created_class_sits_under_root_until_reparented() {
        let mut onto = Ontology::create("http://example.org/a.owl");
        let a = onto.create_class("A").unwrap();
        let b = onto.create_class("B").unwrap();
        assert_eq!(onto.sub_classes(OWL_THING), vec![a.clone(), b.clone()]);

        onto.add_super_class(&b, &a).unwrap();
        onto.remove_super_class(&b, OWL_THING).unwrap();
        assert_eq!(onto.sub_classes(OWL_THING), vec![a.clone()]);
        assert_eq!(onto.sub_classes(&a), vec![b]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut onto = Ontology::create("http://example.org/a.owl");
        onto.create_class("A").unwrap();
        assert!(matches!(
            onto.create_class("A"),
            Err(GraphError::DuplicateName { .. })
        ));
        assert!(onto.create_property("A", PropertyType::Object).is_err());
    }

    #[test]
    fn imported_resources_are_visible_and_get_overlays_on_write() {
        let model = tumor_model();
        let tumor = model.resource_iri("Tumor");

        let mut target = Ontology::create("http://example.org/target.owl");
        target.add_import(model);

        assert!(target.has_resource("Tumor"));
        assert_eq!(target.class_by_name("Tumor"), Some(tumor.clone()));
        assert!(!target.owns(&tumor));

        let child = target.create_sub_class(&tumor, "Lump").unwrap();
        assert!(target.owns(&child));
        assert_eq!(target.sub_classes(&tumor), vec![child.clone()]);

        let restriction = Restriction::new(
            RestrictionKind::SomeValuesFrom,
            "http://example.org/model.owl#hasSite",
            LogicExpression::leaf(Operand::Class(child.clone())),
        );
        target
            .add_necessary_condition(&tumor, Condition::Restriction(restriction))
            .unwrap();
        assert_eq!(
            target
                .restrictions_on(&tumor, "http://example.org/model.owl#hasSite")
                .len(),
            1
        );
        // the overlay is not a declaration of the graph itself
        assert_eq!(target.classes(), vec![child]);
        assert_eq!(target.labels(&tumor), vec!["Tumor".to_string()]);
    }

    #[test]
    fn properties_hang_under_their_top_property() {
        let mut onto = Ontology::create("http://example.org/a.owl");
        let has_part = onto.create_property("hasPart", PropertyType::Object).unwrap();
        let has_size = onto.create_property("hasSize", PropertyType::Datatype).unwrap();
        let note = onto.create_property("note", PropertyType::Annotation).unwrap();

        assert_eq!(onto.sub_properties(OWL_TOP_OBJECT_PROPERTY), vec![has_part.clone()]);
        assert_eq!(onto.sub_properties(OWL_TOP_DATA_PROPERTY), vec![has_size]);
        assert!(onto.super_properties(&note).is_empty());
        assert_eq!(onto.property_type(&has_part), Some(PropertyType::Object));
    }

    #[test]
    fn descendants_terminate_on_cycles() {
        let mut onto = Ontology::create("http://example.org/a.owl");
        let a = onto.create_class("A").unwrap();
        let b = onto.create_class("B").unwrap();
        onto.add_super_class(&b, &a).unwrap();
        onto.add_super_class(&a, &b).unwrap();
        let below_a = onto.descendants(&a);
        assert_eq!(below_a, vec![b]);
    }

    #[test]
    fn child_index_follows_super_class_edits() {
        let mut onto = Ontology::create("http://example.org/chain.owl");
        let mut chain = vec![onto.create_class("C0").unwrap()];
        for i in 1..2000 {
            let parent = chain[i - 1].clone();
            chain.push(onto.create_sub_class(&parent, &format!("C{i}")).unwrap());
        }
        assert_eq!(onto.descendants(&chain[0]).len(), 1999);
        assert_eq!(onto.sub_classes(&chain[999]), vec![chain[1000].clone()]);

        onto.remove_super_class(&chain[1000], &chain[999]).unwrap();
        assert!(onto.sub_classes(&chain[999]).is_empty());
        assert_eq!(onto.descendants(&chain[0]).len(), 999);
        // an orphaned class falls back under the root
        assert_eq!(onto.sub_classes(OWL_THING), vec![chain[0].clone(), chain[1000].clone()]);

        onto.add_super_class(&chain[1000], &chain[0]).unwrap();
        assert_eq!(
            onto.sub_classes(&chain[0]),
            vec![chain[1].clone(), chain[1000].clone()]
        );
    }

    #[test]
    fn overlay_super_classes_are_indexed_in_the_importer() {
        let model = tumor_model();
        let tumor = model.resource_iri("Tumor");
        let mut target = Ontology::create("http://example.org/target.owl");
        let lump = target.create_class("Lump").unwrap();
        target.add_import(model);

        target.add_super_class(&tumor, &lump).unwrap();
        assert_eq!(target.sub_classes(&lump), vec![tumor.clone()]);
        assert_eq!(target.super_classes(&tumor), vec![lump.clone(), OWL_THING.to_string()]);

        let note = target.create_property("note", PropertyType::Datatype).unwrap();
        let detail = target.create_property("detail", PropertyType::Datatype).unwrap();
        target.add_super_property(&detail, &note).unwrap();
        target.remove_super_property(&detail, OWL_TOP_DATA_PROPERTY).unwrap();
        assert_eq!(target.sub_properties(&note), vec![detail]);
        assert_eq!(target.sub_properties(OWL_TOP_DATA_PROPERTY), vec![note]);
    }

    #[test]
    fn writes_are_set_like() {
        let mut onto = Ontology::create("http://example.org/a.owl");
        let a = onto.create_class("A").unwrap();
        assert!(onto.add_label(&a, "Alpha").unwrap());
        assert!(!onto.add_label(&a, "Alpha").unwrap());
        let expr = Condition::Expression(LogicExpression::new(ExpressionKind::Union));
        assert!(onto.add_equivalent_condition(&a, expr.clone()).unwrap());
        assert!(!onto.add_equivalent_condition(&a, expr).unwrap());
    }
}
