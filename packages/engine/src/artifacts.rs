//! Download-if-missing for the persisted artifacts.
//!
//! Deployments that do not ship the well-network and forest artifacts
//! with the binary can point `artifacts.bundle_url` at a `.tar.gz`
//! containing both files; the bundle is fetched once and unpacked next
//! to the configured paths.

use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::config::EngineConfig;

/// Errors from fetching or unpacking the artifact bundle.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// An artifact is missing and no bundle URL is configured.
    #[error("artifact {path} missing and no bundle_url configured")]
    NoBundleUrl {
        /// The missing artifact.
        path: String,
    },

    /// Bundle download failed.
    #[error("failed to download artifact bundle: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure while unpacking.
    #[error("failed to unpack artifact bundle into {path}: {source}")]
    Unpack {
        /// Target directory.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bundle did not contain an expected artifact.
    #[error("artifact {path} still missing after unpacking bundle")]
    StillMissing {
        /// The artifact that never appeared.
        path: String,
    },
}

/// Ensures both artifacts exist, fetching the bundle when they do not.
///
/// Returns `true` when a bundle was downloaded, `false` when both
/// artifacts were already present.
///
/// # Errors
///
/// Returns [`ArtifactError`] when an artifact is missing and cannot be
/// produced from the configured bundle.
pub async fn ensure_artifacts(config: &EngineConfig) -> Result<bool, ArtifactError> {
    let well_network = &config.artifacts.well_network;
    let forest = &config.artifacts.forest;

    let missing: Vec<&Path> = [well_network.as_path(), forest.as_path()]
        .into_iter()
        .filter(|p| !p.exists())
        .collect();
    if missing.is_empty() {
        log::debug!("artifacts already present, nothing to fetch");
        return Ok(false);
    }

    let Some(url) = config.artifacts.bundle_url.as_deref() else {
        return Err(ArtifactError::NoBundleUrl {
            path: missing[0].display().to_string(),
        });
    };

    let target_dir = well_network
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    log::info!(
        "fetching artifact bundle from {url} into {}",
        target_dir.display()
    );

    let bytes = reqwest::get(url).await?.error_for_status()?.bytes().await?;
    unpack_gz(&bytes, target_dir)?;

    for path in missing {
        if !path.exists() {
            return Err(ArtifactError::StillMissing {
                path: path.display().to_string(),
            });
        }
    }
    log::info!("artifact bundle unpacked successfully");
    Ok(true)
}

fn unpack_gz(bytes: &[u8], target_dir: &Path) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Unpack {
        path: target_dir.display().to_string(),
        source,
    };
    std::fs::create_dir_all(target_dir).map_err(io_err)?;
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive.unpack(target_dir).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "aquifer-map-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn bundle_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn config_for(dir: &Path, bundle_url: Option<String>) -> EngineConfig {
        let mut config = EngineConfig::embedded_default();
        config.artifacts.well_network = dir.join("well_network.json");
        config.artifacts.forest = dir.join("depth_forest.json");
        config.artifacts.bundle_url = bundle_url;
        config
    }

    #[tokio::test]
    async fn present_artifacts_are_left_alone() {
        let dir = scratch_dir("present");
        let config = config_for(&dir, None);
        std::fs::write(&config.artifacts.well_network, "{}").unwrap();
        std::fs::write(&config.artifacts.forest, "{}").unwrap();

        assert!(!ensure_artifacts(&config).await.unwrap());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_artifact_without_bundle_url_is_an_error() {
        let dir = scratch_dir("no-url");
        let config = config_for(&dir, None);
        assert!(matches!(
            ensure_artifacts(&config).await,
            Err(ArtifactError::NoBundleUrl { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unpack_extracts_bundle_entries() {
        let dir = scratch_dir("unpack");
        let bundle = bundle_with(&[
            ("well_network.json", r#"{"wells": []}"#),
            ("depth_forest.json", r#"{"feature_names": [], "trees": []}"#),
        ]);
        unpack_gz(&bundle, &dir).unwrap();
        assert!(dir.join("well_network.json").exists());
        assert!(dir.join("depth_forest.json").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unpack_rejects_garbage() {
        let dir = scratch_dir("garbage");
        let err = unpack_gz(b"not a gzip stream", &dir).unwrap_err();
        assert!(matches!(err, ArtifactError::Unpack { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
