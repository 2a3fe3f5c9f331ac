//! Scores a customer CSV without the dashboard.
//!
//! Reads the input table, appends `Probabilidad_Churn` and `Nivel_Riesgo`,
//! writes the result and prints a tier summary.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin score-csv -- <input.csv> [--output <file>] [--model-dir <dir>]
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use churnlens::adapters::csv_io::{read_table_from_path, write_table_to_path};
use churnlens::adapters::LoadOptions;
use churnlens::application::batch::DEFAULT_OUTPUT_FILE;
use churnlens::application::{score_table, ChurnModelContext, ScoringService};
use churnlens::config::AppConfig;
use churnlens::RiskTier;

const TOP_ROWS: usize = 5;

fn usage() -> String {
    "Usage: score-csv <input.csv> [--output <file>] [--model-dir <dir>]".to_string()
}

struct Args {
    input: PathBuf,
    output: PathBuf,
    model_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut model_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                output = Some(PathBuf::from(args.next().ok_or_else(|| anyhow!(usage()))?));
            }
            "--model-dir" => {
                model_dir = Some(PathBuf::from(args.next().ok_or_else(|| anyhow!(usage()))?));
            }
            "-h" | "--help" => return Err(anyhow!(usage())),
            _ => {
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else {
                    return Err(anyhow!(usage()));
                }
            }
        }
    }

    Ok(Args {
        input: input.ok_or_else(|| anyhow!(usage()))?,
        output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        model_dir,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let mut config = AppConfig::from_env_or_default();
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }

    let options = LoadOptions {
        require_manifest: config.require_manifest,
    };
    let context = ChurnModelContext::load(&config.model_dir, &options)
        .with_context(|| format!("loading model from {:?}", config.model_dir))?;
    let service = ScoringService::new(Arc::new(context));

    let table = read_table_from_path(&args.input)
        .with_context(|| format!("reading {:?}", args.input))?;
    let scored = score_table(&service, &table)?;
    write_table_to_path(&args.output, &scored.table)
        .with_context(|| format!("writing {:?}", args.output))?;

    let summary = scored.summary(TOP_ROWS);
    println!("Clientes procesados: {}", summary.total);
    println!("Probabilidad media:  {:.1}%", summary.mean_probability * 100.0);
    for tier in [RiskTier::Alto, RiskTier::Medio, RiskTier::Bajo] {
        println!(
            "  {:<6} {:>6} ({:.1}%)",
            tier.to_string(),
            summary.count(tier),
            summary.percentage(tier)
        );
    }
    if !summary.top.is_empty() {
        println!("Mayor riesgo:");
        for (row, p) in &summary.top {
            println!("  fila {:<5} {:.1}%", row + 1, p * 100.0);
        }
    }
    println!("Resultado guardado en {}", args.output.display());
    Ok(())
}
