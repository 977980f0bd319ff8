//! Loading and saving ontology graphs.
//!
//! The format follows the file extension. JSON is the lossless native form;
//! the RDF formats go through [`crate::rdf`].

use crate::error::{GraphError, Result};
use crate::model::{Resource, Value};
use crate::ontology::{ontology_name, Import, Ontology};
use crate::rdf::{self, RdfFormat, RdfTriple};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    NTriples,
    Turtle,
    RdfXml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "nt" => Ok(Format::NTriples),
            "ttl" => Ok(Format::Turtle),
            "owl" | "rdf" | "xml" => Ok(Format::RdfXml),
            _ => Err(GraphError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn rdf(self) -> Option<RdfFormat> {
        match self {
            Format::Json => None,
            Format::NTriples => Some(RdfFormat::NTriples),
            Format::Turtle => Some(RdfFormat::Turtle),
            Format::RdfXml => Some(RdfFormat::RdfXml),
        }
    }
}

/// Extensions tried, in order, when an import is looked up next to its importer.
const SIBLING_EXTENSIONS: &[&str] = &["owl", "ttl", "nt", "rdf", "json"];

// ============================================================================
// JSON document
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct ImportDocument {
    iri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OntologyDocument {
    iri: String,
    #[serde(default)]
    annotations: Vec<(String, Value)>,
    #[serde(default)]
    imports: Vec<ImportDocument>,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unmodelled: Vec<RdfTriple>,
}

// ============================================================================
// Loading
// ============================================================================

/// Load the graph stored at `path`, resolving its imports transitively.
pub fn load_ontology(path: impl AsRef<Path>) -> Result<Ontology> {
    let path = path.as_ref();
    let mut loading = Vec::new();
    Loader {
        loading: &mut loading,
    }
    .load(path)
    .map_err(|e| GraphError::Load {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

struct Loader<'a> {
    /// Files currently being loaded; guards against import cycles.
    loading: &'a mut Vec<PathBuf>,
}

impl Loader<'_> {
    fn load(&mut self, path: &Path) -> Result<Ontology> {
        let format = Format::from_path(path)?;
        let bytes = std::fs::read(path)?;
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.loading.push(canonical.clone());

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let result = match format.rdf() {
            None => self.load_json(&bytes, &dir),
            Some(rdf_format) => {
                let triples = rdf::parse_triples(&bytes, rdf_format, &path.display().to_string())?;
                let fallback = format!("file://{}", canonical.display());
                let mut resolve = |iri: &str| self.resolve_import(iri, None, &dir, format);
                rdf::triples_to_ontology(triples, &fallback, &mut resolve)
            }
        };

        self.loading.pop();
        let mut ontology = result?;
        ontology.set_location(path);
        tracing::debug!(
            path = %path.display(),
            iri = ontology.iri(),
            resources = ontology.resources().len(),
            "loaded ontology"
        );
        Ok(ontology)
    }

    fn load_json(&mut self, bytes: &[u8], dir: &Path) -> Result<Ontology> {
        let doc: OntologyDocument = serde_json::from_slice(bytes)?;
        let imports = doc
            .imports
            .into_iter()
            .map(|import| {
                let ontology =
                    self.resolve_import(&import.iri, import.location.as_deref(), dir, Format::Json);
                Import {
                    iri: import.iri,
                    location: import.location,
                    ontology,
                }
            })
            .collect();
        Ok(Ontology::from_parts(
            doc.iri,
            doc.annotations,
            doc.resources,
            imports,
            doc.unmodelled,
        ))
    }

    fn candidates(iri: &str, location: Option<&Path>, dir: &Path, format: Format) -> Vec<PathBuf> {
        if let Some(location) = location {
            return vec![if location.is_absolute() {
                location.to_path_buf()
            } else {
                dir.join(location)
            }];
        }
        let name = ontology_name(iri);
        let own_ext = match format {
            Format::Json => "json",
            Format::NTriples => "nt",
            Format::Turtle => "ttl",
            Format::RdfXml => "owl",
        };
        std::iter::once(own_ext)
            .chain(SIBLING_EXTENSIONS.iter().copied().filter(|e| *e != own_ext))
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .collect()
    }

    fn resolve_import(
        &mut self,
        iri: &str,
        location: Option<&Path>,
        dir: &Path,
        format: Format,
    ) -> Option<Ontology> {
        for candidate in Self::candidates(iri, location, dir, format) {
            if !candidate.is_file() {
                continue;
            }
            let canonical = candidate.canonicalize().unwrap_or_else(|_| candidate.clone());
            if self.loading.contains(&canonical) {
                tracing::warn!(import = iri, path = %candidate.display(), "import cycle, leaving reference unresolved");
                return None;
            }
            match self.load(&candidate) {
                Ok(ontology) => return Some(ontology),
                Err(error) => {
                    tracing::warn!(import = iri, path = %candidate.display(), error = %error, "failed to load import");
                    return None;
                }
            }
        }
        tracing::warn!(import = iri, dir = %dir.display(), "import not found, keeping unresolved reference");
        None
    }
}

// ============================================================================
// Saving
// ============================================================================

impl Ontology {
    /// Save to the location the graph was loaded from or last saved to.
    pub fn save(&self) -> Result<()> {
        let path = self
            .location()
            .ok_or_else(|| GraphError::NoLocation(self.iri().to_string()))?;
        let format = Format::from_path(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write(std::io::BufWriter::new(file), format)?;
        tracing::debug!(path = %path.display(), iri = self.iri(), "saved ontology");
        Ok(())
    }

    /// Set the location and save there.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.set_location(path);
        self.save()
    }

    /// Serialize the graph itself (not its imports) in `format`.
    pub fn write<W: Write>(&self, mut out: W, format: Format) -> Result<()> {
        match format.rdf() {
            None => {
                let doc = OntologyDocument {
                    iri: self.iri().to_string(),
                    annotations: self.ontology_annotations().to_vec(),
                    imports: self
                        .imports()
                        .iter()
                        .map(|i| ImportDocument {
                            iri: i.iri.clone(),
                            location: i.location.clone(),
                        })
                        .collect(),
                    resources: self.resources().to_vec(),
                    unmodelled: self.unmodelled().to_vec(),
                };
                serde_json::to_writer_pretty(&mut out, &doc)?;
                out.write_all(b"\n")?;
            }
            Some(rdf_format) => {
                let triples = rdf::ontology_to_triples(self);
                rdf::write_triples(&triples, rdf_format, &mut out)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.OWL")).unwrap(), Format::RdfXml);
        assert_eq!(Format::from_path(Path::new("b.ttl")).unwrap(), Format::Turtle);
        assert_eq!(Format::from_path(Path::new("b.nt")).unwrap(), Format::NTriples);
        assert_eq!(Format::from_path(Path::new("b.json")).unwrap(), Format::Json);
        assert!(matches!(
            Format::from_path(Path::new("b.csv")),
            Err(GraphError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn save_without_location_fails() {
        let onto = Ontology::create("http://example.org/a.owl");
        assert!(matches!(onto.save(), Err(GraphError::NoLocation(_))));
    }

    #[test]
    fn sibling_candidates_prefer_the_importers_format() {
        let found = Loader::candidates(
            "http://example.org/model.owl",
            None,
            Path::new("/data"),
            Format::Turtle,
        );
        assert_eq!(found[0], PathBuf::from("/data/model.ttl"));
        assert_eq!(found.len(), SIBLING_EXTENSIONS.len());
    }
}
