/// Typed view of the `nifbatch.ini` settings file.
///
/// The INI layer in [`crate::config::SettingsManager`] maps sections and keys
/// onto this struct; everything else in the application works with these typed
/// values only.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Last folder scanned for `.nif` files ([files] source_folder).
    pub source_folder: String,

    /// Queue size above which the apply action asks for confirmation
    /// ([files] soft_limit).
    pub soft_limit: usize,

    /// Node-name keywords a file must carry to be accepted ([nif] keywords).
    pub keywords: Vec<String>,

    /// Target glossiness value ([nif] glossiness).
    pub glossiness: f32,

    /// Target specular strength value ([nif] specular_strength).
    pub specular_strength: f32,

    /// Whether file logging is active at all ([log] enabled).
    pub log_enabled: bool,

    /// Log level name, e.g. "INFO" or "DEBUG" ([log] level).
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_folder: String::new(),
            soft_limit: 100,
            keywords: parse_keywords("UUNP, FemaleHead, Hands, Feet, CL0, CL1"),
            glossiness: 450.0,
            specular_strength: 3.5,
            log_enabled: true,
            log_level: "INFO".to_string(),
        }
    }
}

impl Settings {
    /// Render the keyword list back into the comma-separated INI form.
    pub fn keywords_string(&self) -> String {
        self.keywords.join(", ")
    }
}

/// Parse a comma-separated keyword list.
///
/// Whitespace around entries is stripped and empty entries are dropped, so
/// `"UUNP, , Hands"` yields `["UUNP", "Hands"]`.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.soft_limit, 100);
        assert_eq!(settings.glossiness, 450.0);
        assert_eq!(settings.specular_strength, 3.5);
        assert!(settings.log_enabled);
        assert_eq!(settings.keywords.len(), 6);
        assert!(settings.keywords.contains(&"FemaleHead".to_string()));
    }

    #[test]
    fn test_parse_keywords_strips_whitespace() {
        let keywords = parse_keywords("  UUNP ,FemaleHead,  Hands  ");
        assert_eq!(keywords, vec!["UUNP", "FemaleHead", "Hands"]);
    }

    #[test]
    fn test_parse_keywords_drops_empties() {
        let keywords = parse_keywords("UUNP,, ,Feet");
        assert_eq!(keywords, vec!["UUNP", "Feet"]);
    }

    #[test]
    fn test_keywords_round_trip() {
        let settings = Settings::default();
        let rendered = settings.keywords_string();
        assert_eq!(parse_keywords(&rendered), settings.keywords);
    }
}
