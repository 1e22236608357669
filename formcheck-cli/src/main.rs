use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Import from formcheck-core
use formcheck_core::{
    CommandBackend, DocumentProcessor, PolicyConfig, PolicySource, ValidationReport,
};

// Import CLI utilities
use formcheck::{collect_inputs, render_failure, render_json, render_text, use_colour};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "formcheck")]
#[command(about = "Check academic documents against the institutional formatting policy")]
struct Args {
    /// Documents (.tex, .pdf, .json page dumps, .docx) or directories of them
    #[arg(required_unless_present = "show_config")]
    inputs: Vec<PathBuf>,

    /// Path to custom policy file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Console output: text report or JSON
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    output_format: OutputFormat,

    /// Also write the JSON report array to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Command that reads PDF bytes on stdin and prints a JSON page dump
    #[arg(long)]
    pdf_extractor: Option<String>,

    /// Record per-phase timings in every report
    #[arg(long)]
    profile: bool,

    /// Print the effective policy as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Log progress (same as RUST_LOG=info)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let (config, policy_source) = PolicyConfig::load_reporting_source(args.config.as_deref());

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let text_output = matches!(args.output_format, OutputFormat::Text);
    if text_output {
        println!("📐 Formcheck Document Validator");
        match &policy_source {
            PolicySource::File(path) => println!("📋 Loaded policy from: {path}"),
            PolicySource::Fallback { path, error } => {
                println!("⚠️  Could not load policy from {path} ({error}), using default policy")
            }
            PolicySource::Default => println!("📋 Using default policy"),
        }
    }

    let mut processor = DocumentProcessor::new(config).with_profiling(args.profile);
    if let Some(command) = &args.pdf_extractor {
        match CommandBackend::from_command_line(command) {
            Some(backend) => processor = processor.with_pdf_backend(Box::new(backend)),
            None => tracing::warn!("empty --pdf-extractor command ignored"),
        }
    }

    let files = collect_inputs(&args.inputs, args.output.as_deref())?;
    let colour = text_output && use_colour();
    let mut reports: Vec<ValidationReport> = Vec::new();
    let mut failed = false;

    for file in &files {
        match processor.validate_file(file) {
            Ok(report) => {
                failed |= !report.passed();
                if text_output {
                    print!("{}", render_text(&report, colour));
                }
                reports.push(report);
            }
            Err(e) => {
                failed = true;
                tracing::warn!(file = %file.display(), error = %e, "document could not be checked");
                if text_output {
                    print!("{}", render_failure(&file.display().to_string(), &e, colour));
                } else {
                    eprintln!("❌ {}: {e:#}", file.display());
                }
            }
        }
    }

    if !text_output {
        println!("{}", render_json(&reports)?);
    }

    if let Some(output) = &args.output {
        std::fs::write(output, render_json(&reports)?)?;
        if text_output {
            println!("💾 Report saved to: {}", output.display());
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
