//! OntoBridge CLI
//!
//! - `convert`: clone a source ontology into a fresh graph under the reserved
//!   identifier scheme, linking every resource to its copy.
//! - `merge`: file the domain classes of a source ontology under the canonical
//!   classes of a model ontology.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ontobridge_reconcile::{ReconcileConfig, Reconciler, RunOutcome, SkipReason};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ontobridge")]
#[command(author, version, about = "OntoBridge: ontology reconciliation")]
struct Cli {
    /// Log more (`-v` debug, `-vv` trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// JSON run configuration (reserved namespace, identifier scheme, annotation names)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone a source ontology into a new graph with fresh identifiers.
    ///
    /// The target is written to `<OUT_DIR>/<name>.<source extension>`, where
    /// `<name>` is the last path segment of `--iri`. Imports of the source are
    /// matched against earlier conversions found in `<OUT_DIR>`.
    Convert {
        /// Source ontology (.owl, .rdf, .ttl, .nt or .json)
        source: PathBuf,
        /// Directory for the converted graph
        #[arg(short, long)]
        out_dir: PathBuf,
        /// IRI of the converted graph
        #[arg(long)]
        iri: String,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Merge the domain classes of a source ontology into a graph importing the model.
    Merge {
        /// Source ontology
        source: PathBuf,
        /// Canonical model ontology
        #[arg(short, long)]
        model: PathBuf,
        /// Merged graph to write
        #[arg(short, long)]
        out: PathBuf,
        /// IRI of the merged graph (default: reserved namespace + file name)
        #[arg(long)]
        iri: Option<String>,
        #[command(flatten)]
        run: RunArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            source,
            out_dir,
            iri,
            run,
        } => {
            let reconciler = reconciler(run.config.as_deref())?;
            eprintln!(
                "{} {} → {}",
                "Converting".green().bold(),
                source.display(),
                iri.bold()
            );
            let outcome = reconciler
                .convert(&source, &out_dir, &iri)
                .with_context(|| format!("failed to convert {}", source.display()))?;
            finish(&outcome, run.report.as_deref())?;
        }
        Commands::Merge {
            source,
            model,
            out,
            iri,
            run,
        } => {
            let reconciler = reconciler(run.config.as_deref())?;
            eprintln!(
                "{} {} into {} (model {})",
                "Merging".green().bold(),
                source.display(),
                out.display(),
                model.display()
            );
            let outcome = reconciler
                .merge(&source, &out, &model, iri.as_deref())
                .with_context(|| format!("failed to merge {}", source.display()))?;
            finish(&outcome, run.report.as_deref())?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn reconciler(config: Option<&Path>) -> Result<Reconciler> {
    let config = match config {
        Some(path) => ReconcileConfig::from_path(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ReconcileConfig::default(),
    };
    Ok(Reconciler::new(config))
}

fn finish(outcome: &RunOutcome, report_path: Option<&Path>) -> Result<()> {
    print_summary(outcome);
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&outcome.report)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write report {}", path.display()))?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}

fn print_summary(outcome: &RunOutcome) {
    let report = &outcome.report;
    eprintln!(
        "{} {}",
        "wrote".green().bold(),
        outcome.target_path.display().to_string().bold()
    );
    eprintln!(
        "  classes created:       {}\n  properties created:    {}\n  restrictions attached: {}\n  links written:         {}",
        report.classes_created,
        report.properties_created,
        report.restrictions_attached,
        report.links_written
    );
    if report.skipped.is_empty() {
        return;
    }
    eprintln!("  {} {}", "skipped:".yellow().bold(), report.skipped.len());
    for reason in [
        SkipReason::MalformedCrossReference,
        SkipReason::UnresolvedReference,
        SkipReason::Ignored,
        SkipReason::DuplicateRestriction,
        SkipReason::VacuousRestriction,
        SkipReason::ForeignClass,
        SkipReason::MissingAttachment,
    ] {
        let count = report.skipped_for(reason).count();
        if count > 0 {
            eprintln!("    {:<26} {}", format!("{reason:?}"), count);
        }
    }
}
