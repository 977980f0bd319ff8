//! Integration tests for the complete OntoBridge pipeline
//!
//! These tests run file-based conversions and merges end to end:
//! - source file → clone → converted file + source with reciprocal links
//! - converted imports picked up from the output directory
//! - source + model → merged file importing the model
//!
//! Run with: cargo test --test integration_tests

use ontobridge_graph::rdf::{RdfNode, RdfObject};
use ontobridge_graph::vocab::{OWL_THING, OWL_UNION_OF, RDF_TYPE};
use ontobridge_graph::{load_ontology, Ontology, PropertyType, Value};
use ontobridge_reconcile::{counterpart, links, ReconcileConfig, ReconcileError, Reconciler};
use std::path::Path;
use tempfile::tempdir;

const CANCER_IRI: &str = "http://ontologies.dbmi.pitt.edu/deepphe/cancer.owl";

fn write_source(path: &Path) {
    let mut source = Ontology::create("http://example.org/deepphe/source.owl");
    let a = source.create_class("A").unwrap();
    let a1 = source.create_sub_class(&a, "A1").unwrap();
    source.add_label(&a1, "Foo").unwrap();
    source.save_as(path).unwrap();
}

// ============================================================================
// Convert
// ============================================================================

#[test]
fn test_convert_writes_target_and_links_source() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("source.ttl");
    let out_dir = dir.path().join("out");
    write_source(&source_path);

    let outcome = Reconciler::default()
        .convert(&source_path, &out_dir, CANCER_IRI)
        .unwrap();
    assert_eq!(outcome.target_path, out_dir.join("cancer.ttl"));
    assert_eq!(outcome.report.classes_created, 2);

    let target = load_ontology(&outcome.target_path).unwrap();
    let source = load_ontology(&source_path).unwrap();
    let dp1 = format!("{CANCER_IRI}#DP000001");
    let dp2 = format!("{CANCER_IRI}#DP000002");
    assert_eq!(target.iri(), CANCER_IRI);
    assert_eq!(target.sub_classes(OWL_THING), vec![dp1.clone()]);
    assert_eq!(target.super_classes(&dp2), vec![dp1.clone()]);
    assert_eq!(target.labels(&dp2), vec!["Foo".to_string()]);

    let a = source.resource_iri("A");
    let a1 = source.resource_iri("A1");
    assert_eq!(links(&source, &a), vec![dp1.clone()]);
    assert_eq!(links(&source, &a1), vec![dp2.clone()]);
    assert_eq!(links(&target, &dp1), vec![a]);
    assert_eq!(links(&target, &dp2), vec![a1]);
}

#[test]
fn test_convert_again_reuses_identifiers() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("source.owl");
    write_source(&source_path);
    let reconciler = Reconciler::default();

    let first = reconciler
        .convert(&source_path, dir.path().join("v1"), CANCER_IRI)
        .unwrap();
    let second = reconciler
        .convert(&source_path, dir.path().join("v2"), CANCER_IRI)
        .unwrap();

    let v1 = load_ontology(&first.target_path).unwrap();
    let v2 = load_ontology(&second.target_path).unwrap();
    assert_eq!(v1.classes(), v2.classes());

    let source = load_ontology(&source_path).unwrap();
    for name in ["A", "A1"] {
        assert_eq!(links(&source, &source.resource_iri(name)).len(), 1);
    }
}

#[test]
fn test_convert_uses_earlier_conversions_of_imports() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    std::fs::create_dir_all(&src).unwrap();

    let mut base = Ontology::create("http://example.org/base.owl");
    let neoplasm = base.create_class("Neoplasm").unwrap();
    base.save_as(src.join("base.ttl")).unwrap();

    let mut cancer = Ontology::create("http://example.org/cancer.owl");
    cancer.add_import(load_ontology(src.join("base.ttl")).unwrap());
    let carcinoma = cancer.create_sub_class(&neoplasm, "Carcinoma").unwrap();
    cancer.save_as(src.join("cancer.ttl")).unwrap();

    let reconciler = Reconciler::default();
    let converted_base = reconciler
        .convert(
            src.join("base.ttl"),
            &out,
            "http://ontologies.dbmi.pitt.edu/deepphe/base.owl",
        )
        .unwrap();
    let outcome = reconciler
        .convert(src.join("cancer.ttl"), &out, CANCER_IRI)
        .unwrap();

    let base_copy = "http://ontologies.dbmi.pitt.edu/deepphe/base.owl#DP000001";
    assert_eq!(converted_base.target_path, out.join("base.ttl"));
    assert_eq!(outcome.report.classes_created, 1);

    let target = load_ontology(&outcome.target_path).unwrap();
    assert_eq!(target.imports().len(), 1);
    assert!(target.imports()[0].ontology.is_some());
    let copy = format!("{CANCER_IRI}#DP000002");
    assert_eq!(target.classes(), vec![copy.clone()]);
    assert_eq!(target.super_classes(&copy), vec![base_copy.to_string()]);

    let source = load_ontology(src.join("cancer.ttl")).unwrap();
    assert_eq!(counterpart(&source, &carcinoma, &target), Some(copy));
}

#[test]
fn test_convert_keeps_individuals_in_the_source_file() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("source.ttl");
    std::fs::write(
        &source_path,
        r#"
@prefix : <http://example.org/deepphe/source.owl#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/deepphe/source.owl> a owl:Ontology .

:Tumor a owl:Class .
:Other a owl:Class .
:hasSide a owl:ObjectProperty ;
    rdfs:range [ a owl:Class ; owl:unionOf ( :Tumor :Other ) ] .
:Left a owl:NamedIndividual , :Tumor .
"#,
    )
    .unwrap();

    let outcome = Reconciler::default()
        .convert(&source_path, dir.path().join("out"), CANCER_IRI)
        .unwrap();
    assert_eq!(outcome.report.classes_created, 2);

    let source = load_ontology(&source_path).unwrap();
    let tumor = source.resource_iri("Tumor");
    let left = source.resource_iri("Left");
    assert_eq!(links(&source, &tumor).len(), 1);
    assert!(source.unmodelled().iter().any(|t| {
        t.subject == RdfNode::Iri(left.clone())
            && t.predicate == RDF_TYPE
            && t.object == RdfObject::Node(RdfNode::Iri(tumor.clone()))
    }));
    assert!(source.unmodelled().iter().any(|t| t.predicate == OWL_UNION_OF));

    let text = std::fs::read_to_string(&source_path).unwrap();
    assert!(text.contains("Left"));
}

#[test]
fn test_convert_rejects_a_malformed_iri() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("source.ttl");
    write_source(&source_path);

    let err = Reconciler::default()
        .convert(&source_path, dir.path().join("out"), "not an iri")
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidIri { .. }));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_convert_with_custom_identifier_scheme() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("source.json");
    write_source(&source_path);
    let config_path = dir.path().join("ontobridge.json");
    std::fs::write(
        &config_path,
        r#"{ "reserved_namespace": "http://example.org/bc", "identifier_prefix": "BC", "identifier_width": 4 }"#,
    )
    .unwrap();

    let config = ReconcileConfig::from_path(&config_path).unwrap();
    let outcome = Reconciler::new(config)
        .convert(&source_path, dir.path().join("out"), "http://example.org/bc/breast.owl")
        .unwrap();

    assert_eq!(outcome.target_path, dir.path().join("out").join("breast.json"));
    let target = load_ontology(&outcome.target_path).unwrap();
    assert_eq!(
        target.classes(),
        vec![
            "http://example.org/bc/breast.owl#BC0001".to_string(),
            "http://example.org/bc/breast.owl#BC0002".to_string(),
        ]
    );
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_merge_files_under_the_model() {
    let dir = tempdir().unwrap();

    let mut model = Ontology::create("http://ontologies.dbmi.pitt.edu/deepphe/model.owl");
    let tumor = model.create_class("Tumor").unwrap();
    model.add_label(&tumor, "Tumor").unwrap();
    model.save_as(dir.path().join("model.ttl")).unwrap();

    let mut source = Ontology::create("http://example.org/deepphe/breast-source.owl");
    let has_model = source
        .create_property("hasModel", PropertyType::Annotation)
        .unwrap();
    let x = source.create_class("X").unwrap();
    source
        .add_annotation(&x, &has_model, Value::text("Tumor"))
        .unwrap();
    let x1 = source.create_sub_class(&x, "X1").unwrap();
    let y = source.create_class("Y").unwrap();
    source.save_as(dir.path().join("breast-source.owl")).unwrap();

    let out = dir.path().join("breast.owl");
    let outcome = Reconciler::default()
        .merge(
            dir.path().join("breast-source.owl"),
            &out,
            dir.path().join("model.ttl"),
            None,
        )
        .unwrap();
    assert_eq!(outcome.target_path, out);
    assert_eq!(outcome.report.classes_created, 2);

    let target = load_ontology(&out).unwrap();
    assert_eq!(target.iri(), "http://ontologies.dbmi.pitt.edu/breast.owl");
    assert!(target.imports()[0].ontology.is_some());

    let source = load_ontology(dir.path().join("breast-source.owl")).unwrap();
    let tx = counterpart(&source, &x, &target).unwrap();
    let tx1 = counterpart(&source, &x1, &target).unwrap();
    assert_eq!(target.super_classes(&tx), vec![tumor.clone()]);
    assert_eq!(target.super_classes(&tx1), vec![tx]);
    assert!(counterpart(&source, &y, &target).is_none());
    assert_eq!(target.sub_classes(&tumor).len(), 1);

    let report = serde_json::to_value(&outcome.report).unwrap();
    assert_eq!(report["classes_created"], 2);
}
