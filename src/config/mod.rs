use crate::models::{Settings, parse_keywords};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ini::Ini;

/// Manager for the INI-backed settings store.
///
/// All user-tunable values live in a single `nifbatch.ini` next to the
/// executable. The file is created with defaults on first run, loaded at
/// startup, and written back after each successful scan (source folder) or
/// apply (shader targets).
#[derive(Debug, Clone)]
pub struct SettingsManager {
    ini_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Create a manager for the given INI file path.
    ///
    /// If the file does not exist yet it is created immediately with default
    /// values, so a fresh install leaves an editable template behind.
    pub fn new<P: AsRef<Utf8Path>>(ini_path: P) -> Result<Self> {
        let manager = Self {
            ini_path: ini_path.as_ref().to_path_buf(),
        };

        if !manager.ini_path.exists() {
            tracing::info!("Settings file {} not found, creating defaults", manager.ini_path);
            manager.save(&Settings::default())?;
        }

        Ok(manager)
    }

    /// Load settings from the INI file.
    ///
    /// Missing keys fall back to their defaults; unparseable numeric values
    /// are logged and replaced by defaults rather than failing the load.
    pub fn load(&self) -> Result<Settings> {
        let ini = Ini::load_from_file(self.ini_path.as_std_path())
            .with_context(|| format!("Failed to read settings file: {}", self.ini_path))?;

        let defaults = Settings::default();

        let get = |section: &str, key: &str| ini.get_from(Some(section), key);

        let settings = Settings {
            source_folder: get("files", "source_folder").unwrap_or("").to_string(),
            soft_limit: parse_or(get("files", "soft_limit"), defaults.soft_limit, "soft_limit"),
            keywords: get("nif", "keywords")
                .map(parse_keywords)
                .unwrap_or(defaults.keywords),
            glossiness: parse_or(get("nif", "glossiness"), defaults.glossiness, "glossiness"),
            specular_strength: parse_or(
                get("nif", "specular_strength"),
                defaults.specular_strength,
                "specular_strength",
            ),
            log_enabled: parse_or(get("log", "enabled"), defaults.log_enabled, "log enabled"),
            log_level: get("log", "level").unwrap_or(&defaults.log_level).to_string(),
        };

        tracing::info!("Loaded settings from {}", self.ini_path);
        Ok(settings)
    }

    /// Write settings back to the INI file.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let mut ini = Ini::new();

        ini.with_section(Some("files"))
            .set("source_folder", settings.source_folder.clone())
            .set("soft_limit", settings.soft_limit.to_string());

        ini.with_section(Some("nif"))
            .set("keywords", settings.keywords_string())
            .set("glossiness", settings.glossiness.to_string())
            .set("specular_strength", settings.specular_strength.to_string());

        ini.with_section(Some("log"))
            .set("enabled", settings.log_enabled.to_string())
            .set("level", settings.log_level.clone());

        ini.write_to_file(self.ini_path.as_std_path())
            .with_context(|| format!("Failed to write settings file: {}", self.ini_path))?;

        tracing::info!("Saved settings to {}", self.ini_path);
        Ok(())
    }

    /// Load, mutate and save in one step.
    ///
    /// The file is the source of truth, so writers that only touch a couple of
    /// keys (scan saves the source folder, apply saves the shader targets) use
    /// this to avoid clobbering values edited by hand in the meantime.
    pub fn update<F>(&self, mutate: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load()?;
        mutate(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Get the settings file path.
    pub fn ini_path(&self) -> &Utf8Path {
        &self.ini_path
    }
}

/// Parse an optional INI value, logging and defaulting on failure.
fn parse_or<T: std::str::FromStr + Copy>(raw: Option<&str>, default: T, key: &str) -> T {
    match raw {
        None => default,
        Some(text) => match text.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value {:?} for {}, using default", text, key);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in_temp_dir() -> (SettingsManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let ini_path =
            Utf8PathBuf::try_from(temp_dir.path().join("nifbatch.ini")).unwrap();
        let manager = SettingsManager::new(&ini_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_creates_default_file_on_first_run() {
        let (manager, _temp_dir) = manager_in_temp_dir();
        assert!(manager.ini_path().exists());

        let settings = manager.load().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (manager, _temp_dir) = manager_in_temp_dir();

        let mut settings = Settings::default();
        settings.source_folder = "/mods/meshes".to_string();
        settings.glossiness = 320.5;
        settings.specular_strength = 1.25;
        settings.keywords = vec!["UUNP".to_string(), "Feet".to_string()];

        manager.save(&settings).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_update_touches_only_requested_keys() {
        let (manager, _temp_dir) = manager_in_temp_dir();

        manager
            .update(|s| s.source_folder = "/somewhere".to_string())
            .unwrap();
        manager.update(|s| s.glossiness = 99.0).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.source_folder, "/somewhere");
        assert_eq!(loaded.glossiness, 99.0);
    }

    #[test]
    fn test_invalid_numeric_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let ini_path =
            Utf8PathBuf::try_from(temp_dir.path().join("nifbatch.ini")).unwrap();
        std::fs::write(
            &ini_path,
            "[nif]\nglossiness=not-a-number\nspecular_strength=2.5\n",
        )
        .unwrap();

        let manager = SettingsManager::new(&ini_path).unwrap();
        let settings = manager.load().unwrap();

        assert_eq!(settings.glossiness, Settings::default().glossiness);
        assert_eq!(settings.specular_strength, 2.5);
    }
}
