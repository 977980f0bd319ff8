//! Reconciliation driver: the clone-mode and merge-mode passes, in memory and
//! over files.

use crate::config::ReconcileConfig;
use crate::context::RunContext;
use crate::error::{ReconcileError, Result};
use crate::names::{normalize, NameMap};
use crate::policy::Policy;
use crate::report::{RunReport, SkipReason};
use crate::session::Session;
use ontobridge_graph::vocab::{
    is_builtin, local_name, OWL_THING, OWL_TOP_DATA_PROPERTY, OWL_TOP_OBJECT_PROPERTY,
};
use ontobridge_graph::{load_ontology, ontology_name, Ontology, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

// ============================================================================
// Passes
// ============================================================================

impl Session<'_> {
    /// Clone mode: ontology annotations, then every property, every class,
    /// and finally every class's restrictions.
    pub fn run_clone(&mut self) -> Result<()> {
        for (property, value) in self.source.ontology_annotations().to_vec() {
            self.target.add_ontology_annotation(property, value);
        }

        let properties: Vec<String> = self
            .source
            .properties()
            .into_iter()
            .filter(|p| !is_builtin(p))
            .collect();
        tracing::info!(count = properties.len(), "copying properties");
        for property in &properties {
            self.copy_property(property)?;
        }

        let classes: Vec<String> = self
            .source
            .classes()
            .into_iter()
            .filter(|c| !is_builtin(c))
            .collect();
        tracing::info!(count = classes.len(), "copying classes");
        for class in &classes {
            self.copy_class(class)?;
        }

        tracing::info!("copying restrictions");
        for class in &classes {
            self.copy_restrictions(class)?;
        }
        Ok(())
    }

    /// Merge mode: the top property lattices, the attachment-driven class
    /// walk, then restrictions matched by display name.
    pub fn run_merge(&mut self) -> Result<()> {
        tracing::info!("copying top properties");
        for top in [OWL_TOP_DATA_PROPERTY, OWL_TOP_OBJECT_PROPERTY] {
            for property in self.source.sub_properties(top) {
                if !is_builtin(&property) {
                    self.copy_property(&property)?;
                }
            }
        }

        tracing::info!("copying domain classes");
        let mut walked = HashSet::new();
        for class in self.source.sub_classes(OWL_THING) {
            self.copy_domain_class(&class, &mut walked)?;
        }

        tracing::info!("copying restrictions");
        let by_display: HashMap<String, String> = self
            .source
            .classes()
            .into_iter()
            .map(|c| (normalize(&self.source.display_name(&c)), c))
            .collect();
        for target_class in self.target.descendants(OWL_THING) {
            let key = normalize(&self.target.display_name(&target_class));
            let source_class = self
                .source
                .class_by_name(&key)
                .or_else(|| by_display.get(&key).cloned());
            if let Some(source_class) = source_class {
                self.copy_restrictions_onto(&source_class, &target_class)?;
            }
        }
        Ok(())
    }

    /// File `class` under the model class its attachment annotation names,
    /// then keep looking for attachment points below it.
    fn copy_domain_class(&mut self, class: &str, walked: &mut HashSet<String>) -> Result<()> {
        if !walked.insert(class.to_string()) {
            return Ok(());
        }

        let attachment = self
            .source
            .annotation_value_by_name(class, &self.config.attachment_annotation);
        if let Some(value) = attachment {
            let label = match &value {
                Value::Iri(iri) => local_name(iri),
                Value::Literal(lit) => lit.lexical.clone(),
            };
            let parent = self
                .ctx
                .names
                .as_ref()
                .and_then(|names| names.model_name(&label))
                .and_then(|name| self.target.class_by_name(name));
            match parent {
                Some(parent) => {
                    self.copy_class_under(class, &parent)?;
                }
                None => self.skip(class, SkipReason::MissingAttachment),
            }
        }

        for sub_class in self.source.sub_classes(class) {
            self.copy_domain_class(&sub_class, walked)?;
        }
        Ok(())
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Where a file-based run wrote its target, and what it did.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub target_path: PathBuf,
    pub report: RunReport,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Open a session with a fresh run context, for driving the copiers
    /// directly.
    pub fn session<'a>(
        &'a self,
        policy: Policy,
        source: &'a mut Ontology,
        target: &'a mut Ontology,
    ) -> Session<'a> {
        let ctx = if policy.use_name_map {
            RunContext::with_names(NameMap::build(target))
        } else {
            RunContext::new()
        };
        Session::new(&self.config, policy, source, target, ctx)
    }

    /// Clone every resource of `source` into `target`.
    pub fn clone_graph(&self, source: &mut Ontology, target: &mut Ontology) -> Result<RunReport> {
        let mut session = self.session(Policy::clone_mode(), source, target);
        session.run_clone()?;
        Ok(session.finish())
    }

    /// Merge the domain classes of `source` into `target`, whose imports
    /// carry the canonical model.
    pub fn merge_graph(&self, source: &mut Ontology, target: &mut Ontology) -> Result<RunReport> {
        let mut session = self.session(Policy::merge_mode(), source, target);
        session.run_merge()?;
        Ok(session.finish())
    }

    /// Clone mode over files. The target is written to
    /// `<target_dir>/<target name>.<source extension>`; the source is saved
    /// back with its reciprocal links.
    pub fn convert(
        &self,
        source_path: impl AsRef<Path>,
        target_dir: impl AsRef<Path>,
        target_iri: &str,
    ) -> Result<RunOutcome> {
        let source_path = source_path.as_ref();
        let target_dir = target_dir.as_ref();
        check_iri(target_iri)?;

        let mut source = load_ontology(source_path)?;
        let mut target = Ontology::create(target_iri);
        tracing::info!(source = source.iri(), target = target.iri(), "converting");

        std::fs::create_dir_all(target_dir)?;
        for import in source.imports() {
            match find_converted_import(target_dir, &import.iri)? {
                Some(path) => target.add_import(load_ontology(&path)?),
                None => tracing::warn!(
                    import = %import.iri,
                    dir = %target_dir.display(),
                    "no converted counterpart for import"
                ),
            }
        }

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("owl");
        let target_path = target_dir.join(format!("{}.{}", target.name(), extension));

        let report = self.clone_graph(&mut source, &mut target)?;

        tracing::info!(path = %target_path.display(), "saving target");
        target.save_as(&target_path)?;
        tracing::info!(path = %source_path.display(), "saving source");
        source.save()?;
        target.dispose();

        Ok(RunOutcome {
            target_path,
            report,
        })
    }

    /// Merge mode over files. Without `target_iri` the target is named
    /// `<reserved namespace>/<target file name>`.
    pub fn merge(
        &self,
        source_path: impl AsRef<Path>,
        target_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
        target_iri: Option<&str>,
    ) -> Result<RunOutcome> {
        let target_path = target_path.as_ref();
        let mut source = load_ontology(source_path)?;
        let model = load_ontology(model_path)?;

        let iri = match target_iri {
            Some(iri) => iri.to_string(),
            None => {
                let file_name = target_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!(
                    "{}/{}",
                    self.config.reserved_namespace.trim_end_matches('/'),
                    file_name
                )
            }
        };
        check_iri(&iri)?;

        let mut target = Ontology::create(iri);
        target.add_import(model);
        tracing::info!(source = source.iri(), target = target.iri(), "merging");

        let report = self.merge_graph(&mut source, &mut target)?;

        tracing::info!(path = %target_path.display(), "saving target");
        target.save_as(target_path)?;
        tracing::info!("saving source");
        source.save()?;
        target.dispose();

        Ok(RunOutcome {
            target_path: target_path.to_path_buf(),
            report,
        })
    }
}

fn check_iri(iri: &str) -> Result<()> {
    url::Url::parse(iri)
        .map(|_| ())
        .map_err(|e| ReconcileError::InvalidIri {
            iri: iri.to_string(),
            reason: e.to_string(),
        })
}

/// A file in `dir` whose stem matches the import's ontology name,
/// case-insensitively, in a format the store can read.
fn find_converted_import(dir: &Path, import_iri: &str) -> Result<Option<PathBuf>> {
    let wanted = ontology_name(import_iri).to_lowercase();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();
    Ok(entries.into_iter().find(|path| {
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.to_lowercase() == wanted);
        stem_matches && ontology_graph_format(path)
    }))
}

fn ontology_graph_format(path: &Path) -> bool {
    ontobridge_graph::Format::from_path(path).is_ok()
}
