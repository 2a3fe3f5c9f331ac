//! Artifact adapter: Loads the fitted model, encoder and feature layout.
//!
//! A model directory holds four JSON artifacts:
//!
//! - `churn_model.json`: logistic regression parameters
//! - `ohe_encoder.json`: fitted one-hot encoder
//! - `feature_names.json`: feature order the model was fitted on
//! - `categorical_columns.json`: raw fields routed through the encoder
//!
//! Loading is all or nothing. An optional `manifest.json` binds every
//! artifact to its SHA-256 digest; when present it is always verified.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::logistic::{ExportedLogisticModel, LogisticModel, ModelError};
use crate::adapters::one_hot::{EncoderSpecError, ExportedEncoder, OneHotEncoder};
use crate::domain::REQUIRED_FIELDS;
use crate::ports::CategoricalEncoder;

pub const MODEL_FILE: &str = "churn_model.json";
pub const ENCODER_FILE: &str = "ohe_encoder.json";
pub const FEATURES_FILE: &str = "feature_names.json";
pub const CATEGORICAL_FILE: &str = "categorical_columns.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// The four artifacts, in manifest order.
pub const ARTIFACT_FILES: [&str; 4] = [CATEGORICAL_FILE, MODEL_FILE, FEATURES_FILE, ENCODER_FILE];

const MANIFEST_VERSION: u32 = 1;

/// Allowed clock skew for manifest timestamps.
const MAX_CLOCK_SKEW_SECS: i64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {0:?}")]
    Missing(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("invalid encoder: {0}")]
    Encoder(#[from] EncoderSpecError),

    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("hash mismatch for {0}")]
    HashMismatch(String),
}

/// Integrity manifest written by `seal-artifacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// File name relative to the model directory -> lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Refuse to load a directory without `manifest.json`.
    pub require_manifest: bool,
}

/// Everything inference needs, loaded together.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub model: LogisticModel,
    pub encoder: OneHotEncoder,
    pub feature_order: Vec<String>,
    pub categorical_fields: Vec<String>,
    /// Whether a manifest was present and verified.
    pub verified: bool,
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactLoadError> {
    if !path.exists() {
        return Err(ArtifactLoadError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ArtifactLoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Verify `manifest.json` in `dir` if present.
///
/// Returns `Ok(false)` when there is no manifest and none is required.
///
/// # Errors
/// Returns `ArtifactLoadError::Manifest` for a malformed or incomplete
/// manifest and `ArtifactLoadError::HashMismatch` when a file differs.
pub fn verify_manifest(dir: &Path, options: &LoadOptions) -> Result<bool, ArtifactLoadError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        if options.require_manifest {
            tracing::error!("Manifest required but not found at {:?}", manifest_path);
            return Err(ArtifactLoadError::Manifest(format!(
                "{MANIFEST_FILE} is required but missing"
            )));
        }
        tracing::warn!("No {MANIFEST_FILE} in {:?}; artifacts are not integrity-checked", dir);
        return Ok(false);
    }

    let manifest: ArtifactManifest = read_json(&manifest_path)?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactLoadError::Manifest(format!(
            "unsupported manifest version: {}",
            manifest.version
        )));
    }

    if manifest.created_at > Utc::now() + Duration::seconds(MAX_CLOCK_SKEW_SECS) {
        return Err(ArtifactLoadError::Manifest(
            "manifest created_at is in the future".into(),
        ));
    }

    let unbound: Vec<&str> = ARTIFACT_FILES
        .iter()
        .copied()
        .filter(|f| !manifest.files.contains_key(*f))
        .collect();
    if !unbound.is_empty() {
        return Err(ArtifactLoadError::Manifest(format!(
            "manifest does not cover: {}",
            unbound.join(", ")
        )));
    }

    for (rel, expected_hex) in &manifest.files {
        let bytes = read_bytes(&dir.join(rel))?;
        if !sha256_hex(&bytes).eq_ignore_ascii_case(expected_hex) {
            tracing::error!("Hash mismatch for {rel} in {:?}", dir);
            return Err(ArtifactLoadError::HashMismatch(rel.clone()));
        }
    }

    tracing::debug!("Manifest verified ({} files)", manifest.files.len());
    Ok(true)
}

/// Hash the artifacts in `dir` into a fresh manifest.
///
/// # Errors
/// Returns `ArtifactLoadError` if an artifact is missing or unreadable.
pub fn build_manifest(dir: &Path) -> Result<ArtifactManifest, ArtifactLoadError> {
    let mut files = BTreeMap::new();
    for name in ARTIFACT_FILES {
        let bytes = read_bytes(&dir.join(name))?;
        files.insert(name.to_string(), sha256_hex(&bytes));
    }

    Ok(ArtifactManifest {
        version: MANIFEST_VERSION,
        created_at: Utc::now(),
        files,
    })
}

/// Load and cross-check all four artifacts from `dir`.
///
/// # Errors
/// Returns `ArtifactLoadError` if any artifact is missing, malformed, fails
/// its manifest digest, or disagrees with the others.
pub fn load_artifacts(dir: &Path, options: &LoadOptions) -> Result<ModelArtifacts, ArtifactLoadError> {
    tracing::info!("Loading model artifacts from {:?}", dir);

    let verified = verify_manifest(dir, options)?;

    let feature_order: Vec<String> = read_json(&dir.join(FEATURES_FILE))?;
    let categorical_fields: Vec<String> = read_json(&dir.join(CATEGORICAL_FILE))?;
    let exported_model: ExportedLogisticModel = read_json(&dir.join(MODEL_FILE))?;
    let exported_encoder: ExportedEncoder = read_json(&dir.join(ENCODER_FILE))?;

    let model = LogisticModel::from_exported(exported_model, feature_order.clone())?;
    let encoder = OneHotEncoder::from_exported(exported_encoder)?;

    check_consistency(&feature_order, &categorical_fields, &encoder)?;

    tracing::info!(
        "Loaded model from {:?} (n_features={}, categorical_fields={}, encoded_columns={}, verified={})",
        dir,
        feature_order.len(),
        categorical_fields.len(),
        encoder.output_feature_names().len(),
        verified
    );

    Ok(ModelArtifacts {
        model,
        encoder,
        feature_order,
        categorical_fields,
        verified,
    })
}

fn check_consistency(
    feature_order: &[String],
    categorical_fields: &[String],
    encoder: &OneHotEncoder,
) -> Result<(), ArtifactLoadError> {
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = feature_order.iter().find(|f| !seen.insert(f.as_str())) {
        return Err(ArtifactLoadError::Inconsistent(format!(
            "feature '{dup}' appears twice in {FEATURES_FILE}"
        )));
    }

    if let Some(unknown) = categorical_fields
        .iter()
        .find(|f| !REQUIRED_FIELDS.contains(&f.as_str()))
    {
        return Err(ArtifactLoadError::Inconsistent(format!(
            "categorical field '{unknown}' is not a customer field"
        )));
    }

    let fitted = encoder.input_fields();
    if fitted.len() != categorical_fields.len()
        || fitted.iter().zip(categorical_fields).any(|(a, b)| a != b)
    {
        return Err(ArtifactLoadError::Inconsistent(format!(
            "encoder fields [{}] differ from {CATEGORICAL_FILE} [{}]",
            fitted.join(", "),
            categorical_fields.join(", ")
        )));
    }

    // Features the pipeline can never produce are always zero; legal, but worth knowing.
    let encoded = encoder.output_feature_names();
    for feature in feature_order {
        let numeric = REQUIRED_FIELDS.contains(&feature.as_str())
            && !categorical_fields.iter().any(|c| c == feature);
        if !numeric && !encoded.contains(feature) {
            tracing::warn!("Feature '{feature}' is never produced by the encoder; it will be zero");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).expect("write artifact");
    }

    fn write_minimal_artifacts(dir: &Path) {
        write(dir, FEATURES_FILE, r#"["tenure", "Contract_Two year", "Contract_One year"]"#);
        write(dir, CATEGORICAL_FILE, r#"["Contract"]"#);
        write(
            dir,
            MODEL_FILE,
            r#"{"model_type": "logistic_regression", "coefficients": [-0.03, -0.7, -0.1], "intercept": 0.2}"#,
        );
        write(
            dir,
            ENCODER_FILE,
            r#"{"fields": [{"name": "Contract", "categories": ["Month-to-month", "One year", "Two year"]}]}"#,
        );
    }

    fn seal(dir: &Path) {
        let manifest = build_manifest(dir).expect("manifest builds");
        let json = serde_json::to_string_pretty(&manifest).expect("manifest serializes");
        write(dir, MANIFEST_FILE, &json);
    }

    #[test]
    fn test_load_unsealed_directory() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());

        let artifacts = load_artifacts(dir.path(), &LoadOptions::default()).expect("loads");
        assert_eq!(artifacts.feature_order.len(), 3);
        assert_eq!(artifacts.categorical_fields, vec!["Contract".to_string()]);
        assert!(!artifacts.verified);
    }

    #[test]
    fn test_missing_artifact_fails_whole_load() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());
        fs::remove_file(dir.path().join(ENCODER_FILE)).expect("remove");

        let err = load_artifacts(dir.path(), &LoadOptions::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactLoadError::Missing(p) if p.ends_with(ENCODER_FILE)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());
        write(dir.path(), MODEL_FILE, "{not json");

        assert!(matches!(
            load_artifacts(dir.path(), &LoadOptions::default()),
            Err(ArtifactLoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_coefficient_count_must_match_features() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());
        write(dir.path(), FEATURES_FILE, r#"["tenure"]"#);

        assert!(matches!(
            load_artifacts(dir.path(), &LoadOptions::default()),
            Err(ArtifactLoadError::Model(ModelError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_encoder_fields_must_match_categorical_list() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());
        write(dir.path(), CATEGORICAL_FILE, r#"["PaymentMethod"]"#);

        assert!(matches!(
            load_artifacts(dir.path(), &LoadOptions::default()),
            Err(ArtifactLoadError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_manifest_verified() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());
        seal(dir.path());

        let options = LoadOptions { require_manifest: true };
        let artifacts = load_artifacts(dir.path(), &options).expect("sealed load");
        assert!(artifacts.verified);
    }

    #[test]
    fn test_tampered_artifact_rejected() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());
        seal(dir.path());
        write(
            dir.path(),
            MODEL_FILE,
            r#"{"model_type": "logistic_regression", "coefficients": [9.0, 9.0, 9.0], "intercept": 0.2}"#,
        );

        let err = load_artifacts(dir.path(), &LoadOptions::default()).expect_err("tampered");
        assert!(matches!(err, ArtifactLoadError::HashMismatch(f) if f == MODEL_FILE));
    }

    #[test]
    fn test_required_manifest_missing() {
        let dir = tempdir().expect("tempdir");
        write_minimal_artifacts(dir.path());

        let options = LoadOptions { require_manifest: true };
        assert!(matches!(
            load_artifacts(dir.path(), &options),
            Err(ArtifactLoadError::Manifest(_))
        ));
    }

    #[test]
    fn test_shipped_models_directory_loads() {
        let options = LoadOptions { require_manifest: true };
        let artifacts = load_artifacts(Path::new("models"), &options).expect("shipped artifacts load");
        assert_eq!(artifacts.feature_order.len(), 46);
        assert_eq!(artifacts.categorical_fields.len(), 16);
        assert!(artifacts.verified);
    }
}
