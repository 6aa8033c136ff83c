use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Contents of `releases.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleasesConfig {
    #[serde(default)]
    pub languages: IndexMap<String, LanguageSpec>,
    /// Language key to the versions to fetch; both levels are fetched in file order.
    #[serde(default)]
    pub releases: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageSpec {
    pub name: String,
    #[serde(default)]
    pub url_template: Option<String>,
    /// Explicit version to URL mapping; takes precedence over the template.
    #[serde(default)]
    pub releases: Option<IndexMap<String, String>>,
}

impl ReleasesConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl LanguageSpec {
    pub fn release_url(&self, version: &str) -> Option<String> {
        if let Some(mapping) = &self.releases {
            return mapping.get(version).cloned();
        }
        self.url_template
            .as_deref()
            .map(|template| expand_template(template, version))
    }
}

/// Substitute `{version}` and `{version_nodots}` in a URL template.
pub fn expand_template(template: &str, version: &str) -> String {
    template
        .replace("{version_nodots}", &version.replace('.', ""))
        .replace("{version}", version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_placeholders_are_expanded() {
        assert_eq!(
            expand_template("https://x.example/{version}/v{version_nodots}.htm", "19.0"),
            "https://x.example/19.0/v190.htm"
        );
    }

    #[test]
    fn explicit_mapping_wins_over_template() {
        let spec = LanguageSpec {
            name: "Lang".to_string(),
            url_template: Some("https://t.example/{version}".to_string()),
            releases: Some(IndexMap::from([(
                "1.0".to_string(),
                "https://m.example/one".to_string(),
            )])),
        };
        assert_eq!(spec.release_url("1.0").as_deref(), Some("https://m.example/one"));
        assert_eq!(spec.release_url("2.0"), None);
    }

    #[test]
    fn config_parses_both_language_shapes() {
        let config = ReleasesConfig::from_json(
            r#"{
                "languages": {
                    "j": {"name": "J", "url_template": "https://code.jsoftware.com/wiki/System/ReleaseNotes/J{version}"},
                    "dyalog": {"name": "Dyalog APL", "releases": {"20.0": "https://docs.dyalog.com/20.0/release-notes/"}}
                },
                "releases": {"j": ["9.5", "9.6"], "dyalog": ["20.0"]}
            }"#,
        )
        .unwrap();
        assert_eq!(config.releases["j"], vec!["9.5", "9.6"]);
        assert_eq!(
            config.languages["j"].release_url("9.6").as_deref(),
            Some("https://code.jsoftware.com/wiki/System/ReleaseNotes/J9.6")
        );
        assert_eq!(config.languages["dyalog"].name, "Dyalog APL");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ReleasesConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
