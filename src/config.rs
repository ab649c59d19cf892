use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable that overrides `media.base_url`
pub const MEDIA_URL_ENV: &str = "RICHTEXT_MEDIA_URL";

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub media: MediaConfig,
    pub links: LinksConfig,
    pub page: PageConfig,
    pub font: FontConfig,
    pub typst: TypstConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// CMS origin that relative upload paths are resolved against
    pub base_url: String,
    pub resolve: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337".to_string(),
            resolve: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub color: String,
    pub underline: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            color: "#1a4f8b".to_string(),
            underline: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PageConfig {
    pub numbers: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FontConfig {
    pub sans: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TypstConfig {
    /// Emit `#image(..)` calls. Off by default since the compiler cannot
    /// fetch remote CMS uploads; alt text is emitted instead.
    pub images: bool,
}

impl Config {
    /// The config bundled with the crate (`src/default_config.toml`).
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return the compiled default if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::compiled_default()),
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(MEDIA_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.media.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_matches_struct_defaults() {
        let config = Config::compiled_default();
        assert_eq!(config.media.base_url, "http://localhost:1337");
        assert!(config.media.resolve);
        assert_eq!(config.links.color, "#1a4f8b");
        assert!(config.links.underline);
        assert!(!config.page.numbers);
        assert!(!config.font.sans);
        assert!(!config.typst.images);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [media]
            base_url = "https://cms.example.org"

            [page]
            numbers = true
            "#,
        )
        .unwrap();
        assert_eq!(config.media.base_url, "https://cms.example.org");
        assert!(config.media.resolve);
        assert!(config.page.numbers);
        assert_eq!(config.links.color, "#1a4f8b");
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = Config::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config.media.base_url, "http://localhost:1337");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("richtext-bad-{}.toml", std::process::id()));
        fs::write(&path, "[media\nbase_url = 1").unwrap();
        let result = Config::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn env_overrides_media_url() {
        let mut config = Config::default();
        config.apply_env_from(|key| (key == MEDIA_URL_ENV).then(|| "https://env.cms".to_string()));
        assert_eq!(config.media.base_url, "https://env.cms");

        let mut config = Config::default();
        config.apply_env_from(|_| Some("  ".to_string()));
        assert_eq!(config.media.base_url, "http://localhost:1337");
    }
}
