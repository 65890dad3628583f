//! coalesce - contact list cleanup from the command line
//!
//! Subcommands cover the pipeline stages individually (analyze,
//! match-columns, find-duplicates) plus a one-shot `clean` that runs the
//! whole thing and an `init-schema` to write a starting schema file.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use coalesce_core::export::{write_audit, AuditReport, CsvWriter};
use coalesce_core::{
    CleanPipeline, ColumnMatcher, CsvReader, MatchConfig, MergeStrategy, SchemaDetector,
};
use coalesce_domain::{default_contact_schema, CanonicalSchema};

#[derive(Parser)]
#[command(name = "coalesce", version, about = "Clean and deduplicate contact lists")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Profile the columns of an input file
    Analyze {
        /// Input CSV file
        input: PathBuf,
    },
    /// Show how input headers map onto the canonical schema
    MatchColumns {
        input: PathBuf,
        /// Schema TOML file; the built-in contact schema when omitted
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Minimum confidence for a fuzzy header match
        #[arg(long, default_value_t = 0.7)]
        threshold: f64,
    },
    /// List duplicate clusters without merging anything
    FindDuplicates {
        input: PathBuf,
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Overall score at or above which a pair counts as a duplicate
        #[arg(long, default_value_t = 0.8)]
        threshold: f64,
    },
    /// Run the full pipeline: map columns, deduplicate, merge, write output
    Clean {
        input: PathBuf,
        /// Cleaned CSV output path
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        schema: Option<PathBuf>,
        #[arg(long, default_value_t = 0.8)]
        threshold: f64,
        /// Default merge strategy (keep_first, keep_last, keep_longest,
        /// keep_most_complete, concatenate)
        #[arg(long, default_value = "keep_most_complete")]
        strategy: String,
        /// Also write a JSON audit report here
        #[arg(long)]
        audit: Option<PathBuf>,
    },
    /// Write the built-in contact schema as a TOML file to customize
    InitSchema {
        /// Output path for the schema file
        #[arg(default_value = "schema.toml")]
        output: PathBuf,
    },
}

fn load_schema(path: Option<&PathBuf>) -> Result<CanonicalSchema, Box<dyn Error>> {
    match path {
        Some(path) => Ok(CanonicalSchema::load(path)?),
        None => Ok(default_contact_schema()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { input } => {
            let batch = CsvReader::new().read_path(&input)?;
            let profiles = SchemaDetector::new().profile(&batch);
            println!("{} records, {} columns", batch.len(), batch.columns().len());
            for profile in profiles {
                println!(
                    "  {:<20} {:<8} fill {:>5.1}%  {} unique  e.g. {}",
                    profile.column,
                    format!("{:?}", profile.column_type).to_lowercase(),
                    profile.fill_rate * 100.0,
                    profile.unique_count,
                    profile.samples.first().map(String::as_str).unwrap_or("-"),
                );
            }
        }
        Command::MatchColumns {
            input,
            schema,
            threshold,
        } => {
            let batch = CsvReader::new().read_path(&input)?;
            let schema = load_schema(schema.as_ref())?;
            let matcher = ColumnMatcher::new(&schema)?;
            for m in matcher.match_all(batch.columns(), threshold) {
                match &m.canonical_column {
                    Some(canonical) => println!(
                        "  {:<20} -> {:<15} ({:?}, {:.2})",
                        m.source_column, canonical, m.kind, m.confidence
                    ),
                    None => {
                        let guess = m
                            .alternatives
                            .first()
                            .map(|(name, score)| format!("closest: {name} ({score:.2})"))
                            .unwrap_or_else(|| "no candidates".to_string());
                        println!("  {:<20} -> unmatched, {guess}", m.source_column);
                    }
                }
            }
        }
        Command::FindDuplicates {
            input,
            schema,
            threshold,
        } => {
            let batch = CsvReader::new().read_path(&input)?;
            let schema = load_schema(schema.as_ref())?;
            let config = MatchConfig {
                duplicate_threshold: threshold,
                ..MatchConfig::default()
            };
            let pipeline = CleanPipeline::new(schema, config)?;
            let report = pipeline.run(&batch);

            println!("{} duplicate clusters", report.clusters.len());
            for cluster in &report.clusters {
                println!(
                    "  cluster {} ({:.2}): records {:?}",
                    cluster.cluster_id, cluster.confidence, cluster.record_indices
                );
            }
        }
        Command::Clean {
            input,
            output,
            schema,
            threshold,
            strategy,
            audit,
        } => {
            let batch = CsvReader::new().read_path(&input)?;
            let schema = load_schema(schema.as_ref())?;
            let config = MatchConfig {
                duplicate_threshold: threshold,
                ..MatchConfig::default()
            };
            let pipeline = CleanPipeline::new(schema, config)?
                .with_default_strategy(MergeStrategy::parse(&strategy));
            let report = pipeline.run(&batch);

            CsvWriter::new().write_path(&report.batch, &output)?;
            if let Some(audit_path) = audit {
                let audit_report = AuditReport {
                    input_records: report.input_records,
                    output_records: report.batch.len(),
                    clusters: &report.clusters,
                    merges: &report.merges,
                };
                write_audit(&audit_report, &audit_path)?;
            }
            info!(
                input = report.input_records,
                output = report.batch.len(),
                "clean finished"
            );
            println!(
                "{} records in, {} out ({} merged away)",
                report.input_records,
                report.batch.len(),
                report.records_merged_away()
            );
        }
        Command::InitSchema { output } => {
            let schema = default_contact_schema();
            schema.save(&output)?;
            println!("wrote {} ({} columns)", output.display(), schema.columns.len());
        }
    }

    Ok(())
}
