use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Serialize;
use serde_json::{self, Error as SerdeError};

use crate::models::ConfigDocument;

pub const CONFIG_DIR_NAME: &str = "data";
pub const CONFIG_FILE_NAME: &str = "timers_config.json";

/// Resolve `data/timers_config.json` under `base`, falling back to the
/// platform data directory when the local `data` directory can't be created.
pub fn resolve_config_path(base: &Path) -> PathBuf {
    let local_dir = base.join(CONFIG_DIR_NAME);
    match fs::create_dir_all(&local_dir) {
        Ok(()) => local_dir.join(CONFIG_FILE_NAME),
        Err(err) => {
            log::warn!(
                "Unable to create {} ({}); using the platform data directory",
                local_dir.display(),
                err
            );
            if let Some(dirs) = ProjectDirs::from("com", "CountdownWidget", "CountdownWidget") {
                let dir = dirs.data_dir();
                fs::create_dir_all(dir).ok();
                dir.join(CONFIG_FILE_NAME)
            } else {
                log::warn!("Unable to resolve project directory; using current dir for config");
                PathBuf::from(CONFIG_FILE_NAME)
            }
        }
    }
}

/// Strict load: a missing file is the empty document, anything else that
/// goes wrong is an error.
pub fn read_document(path: &Path) -> Result<ConfigDocument> {
    if !path.exists() {
        return Ok(ConfigDocument::default());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read timers from {}", path.display()))?;
    let document = serde_json::from_str(&data).map_err(|err| map_deser_error(err, path))?;
    Ok(document)
}

/// Startup load. Unreadable or malformed files degrade to an empty document.
pub fn load_document(path: &Path) -> ConfigDocument {
    match read_document(path) {
        Ok(document) => {
            log::info!(
                "Loaded {} timer(s) from {}",
                document.timers.len(),
                path.display()
            );
            document
        }
        Err(err) => {
            log::warn!("Starting with an empty timer list: {err:?}");
            ConfigDocument::default()
        }
    }
}

pub fn save_document(path: &Path, document: &ConfigDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }
    }

    let data = to_pretty_json(document)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write timers to {}", path.display()))?;
    Ok(())
}

/// Four-space indented JSON, matching files written by earlier versions.
fn to_pretty_json(document: &ConfigDocument) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .context("failed to serialize timers")?;
    Ok(buffer)
}

fn map_deser_error(err: SerdeError, path: &Path) -> anyhow::Error {
    anyhow::Error::new(err).context(format!(
        "failed to deserialize timers from {}",
        path.display()
    ))
}
