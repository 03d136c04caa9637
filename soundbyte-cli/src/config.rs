//! Settings file loading and saving.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use soundbyte_core::TunerSettings;

/// Loads settings from a JSON file, or the defaults when no path is given.
///
/// Missing fields in the file keep their default values.
pub fn load_settings(path: Option<&Path>) -> Result<TunerSettings> {
    let Some(path) = path else {
        return Ok(TunerSettings::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings: TunerSettings = serde_json::from_str(&data)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}

/// Saves settings to a JSON file, pretty-printed.
pub fn save_settings(settings: &TunerSettings, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(settings)?;
    fs::write(path, json_string)
        .with_context(|| format!("writing settings to {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(load_settings(None).unwrap(), TunerSettings::default());
    }

    #[test]
    fn save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let settings = TunerSettings {
            reference_a4: 415.0,
            sample_rate: 48000,
            ..TunerSettings::default()
        };
        save_settings(&settings, file.path()).unwrap();
        assert_eq!(load_settings(Some(file.path())).unwrap(), settings);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "{ not json").unwrap();
        let err = load_settings(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("parsing settings"));
    }
}
