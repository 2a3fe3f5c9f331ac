//! Writes `manifest.json` for a model directory.
//!
//! The manifest binds each of the four artifacts to its SHA-256 digest.
//! Once present, every load verifies it, and `CHURNLENS_REQUIRE_MANIFEST=1`
//! refuses directories without one.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin seal-artifacts -- [--model-dir <dir>] [--check]
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use churnlens::adapters::artifacts::{build_manifest, load_artifacts, MANIFEST_FILE};
use churnlens::adapters::LoadOptions;
use churnlens::config::AppConfig;

fn usage() -> String {
    "Usage: seal-artifacts [--model-dir <dir>] [--check]".to_string()
}

struct Args {
    model_dir: PathBuf,
    check_only: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut model_dir: Option<PathBuf> = None;
    let mut check_only = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model-dir" => {
                let v = args.next().ok_or_else(usage)?;
                model_dir = Some(PathBuf::from(v));
            }
            "--check" => check_only = true,
            "-h" | "--help" => return Err(usage()),
            _ => return Err(usage()),
        }
    }

    Ok(Args {
        model_dir: model_dir.unwrap_or_else(|| AppConfig::from_env_or_default().model_dir),
        check_only,
    })
}

fn main() -> Result<(), String> {
    let args = parse_args()?;
    let dir = args.model_dir;

    if args.check_only {
        let options = LoadOptions {
            require_manifest: true,
        };
        load_artifacts(&dir, &options).map_err(|e| format!("{dir:?}: {e}"))?;
        println!("{} verified in {}", MANIFEST_FILE, dir.display());
        return Ok(());
    }

    // Refuse to seal artifacts that would not load.
    let options = LoadOptions {
        require_manifest: false,
    };
    let artifacts = load_artifacts(&dir, &options).map_err(|e| format!("{dir:?}: {e}"))?;

    let manifest = build_manifest(&dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize manifest: {e}"))?;

    let path = dir.join(MANIFEST_FILE);
    fs::write(&path, json).map_err(|e| format!("Failed to write {path:?}: {e}"))?;

    println!(
        "Wrote {} ({} files, {} features)",
        path.display(),
        manifest.files.len(),
        artifacts.feature_order.len()
    );
    for (name, digest) in &manifest.files {
        println!("  {digest}  {name}");
    }
    Ok(())
}
