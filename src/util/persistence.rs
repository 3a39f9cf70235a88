//! On-disk policy table, so the reclassification rule set can change
//! per deployment without a rebuild.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use tracing::warn;

use crate::domain::policy::EnginePolicy;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FreightRateEngine";
const APP_NAME: &str = "FreightRateEngine";

fn policy_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("policy.json"))
}

/// Loads the deployment policy table, falling back to the built-in
/// defaults when the file is absent or unreadable.
pub fn load_policy() -> EnginePolicy {
    let Some(path) = policy_file() else {
        return EnginePolicy::default();
    };
    let Ok(data) = fs::read_to_string(&path) else {
        return EnginePolicy::default();
    };
    match serde_json::from_str(&data) {
        Ok(policy) => policy,
        Err(err) => {
            warn!(
                "failed to parse {}: {err}; using default policy",
                path.display()
            );
            EnginePolicy::default()
        }
    }
}

pub fn save_policy(policy: &EnginePolicy) -> Result<(), PolicyStoreError> {
    let path = policy_file().ok_or(PolicyStoreError::StorageUnavailable)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(policy)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyStoreError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
