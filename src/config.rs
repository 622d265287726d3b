//! Settings file support (`settings.conf`, `key = value` lines).

use crate::api::DEFAULT_BASE_URL;

/// User-tunable settings with sensible defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the facts API, no trailing slash.
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `<config-dir>/settings.conf`; a missing file
    /// yields the defaults.
    #[must_use]
    pub fn load() -> Self {
        let path = crate::util::config_dir().join("settings.conf");
        match std::fs::read_to_string(&path) {
            Ok(body) => Self::parse(&body),
            Err(_) => Self::default(),
        }
    }

    /// What: Parse `key = value` lines into settings.
    ///
    /// Inputs:
    /// - `body`: File contents; `#` starts a comment line
    ///
    /// Output:
    /// - Settings with recognized keys applied over the defaults; unknown
    ///   keys are ignored.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let mut settings = Self::default();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key == "api_base_url" && !value.is_empty() {
                settings.api_base_url = value.trim_end_matches('/').to_string();
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Defaults apply for empty, commented, or malformed input
    ///
    /// - Input: Comments, blank lines, a line without '='
    /// - Output: Default settings
    fn defaults_survive_noise() {
        let s = Settings::parse("# a comment\n\nnot a pair\n");
        assert_eq!(s, Settings::default());
    }

    #[test]
    /// What: The base URL key is recognized and normalized
    ///
    /// - Input: An override with a trailing slash and surrounding spaces
    /// - Output: Trimmed URL without the trailing slash
    fn base_url_override() {
        let s = Settings::parse("api_base_url =  https://example.test/api/ \n");
        assert_eq!(s.api_base_url, "https://example.test/api");
    }

    #[test]
    /// What: Unknown keys are ignored
    ///
    /// - Input: A recognized key plus an unknown one
    /// - Output: Only the recognized key takes effect
    fn unknown_keys_are_ignored() {
        let s = Settings::parse("theme = dark\napi_base_url = http://localhost:8080\n");
        assert_eq!(s.api_base_url, "http://localhost:8080");
    }
}
