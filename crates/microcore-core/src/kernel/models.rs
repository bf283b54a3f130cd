//! Capture of domain model files as registry metadata.
use std::path::Path;

use serde_json::Value;

use crate::registry::Registry;
use crate::utils::fs::{find_files, subdirectories};

/// Sub-directory of a domain whose files are captured.
pub const MODELS_DIR: &str = "models";

/// Prefix of the metadata key a model file is stored under.
pub const MODEL_KEY_PREFIX: &str = "model_";

/// One captured model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    pub domain: String,
    pub key: String,
    pub content: String,
}

/// Read every file under `<root>/<domain>/models/`. Unreadable files and
/// domains are logged and skipped.
pub fn scan_models(root: &Path) -> Vec<ModelFile> {
    let domains = match subdirectories(root) {
        Ok(domains) => domains,
        Err(e) => {
            log::warn!("Cannot list domains under {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut models = Vec::new();
    for domain_dir in domains {
        let Some(domain) = domain_dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let files = match find_files(domain_dir.join(MODELS_DIR), &|_: &Path| true) {
            Ok(files) => files,
            Err(e) => {
                log::warn!("Cannot scan models of domain '{}': {}", domain, e);
                continue;
            }
        };
        for file in files {
            let Some(file_name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            match std::fs::read_to_string(&file) {
                Ok(content) => models.push(ModelFile {
                    domain: domain.clone(),
                    key: format!("{}{}", MODEL_KEY_PREFIX, file_name),
                    content,
                }),
                Err(e) => log::warn!("Skipping model file {}: {}", file.display(), e),
            }
        }
    }
    models
}

/// Publish the models found under `root` into the registry. Returns how many were stored.
pub fn capture_models(root: &Path, registry: &Registry) -> usize {
    let models = scan_models(root);
    for model in &models {
        log::debug!("Captured model '{}' of domain '{}'", model.key, model.domain);
        registry.register_domain_metadata(&model.domain, &model.key, Value::String(model.content.clone()));
    }
    models.len()
}
