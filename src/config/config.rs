use crate::data::data_exporter::ExportFormat;
use crate::view::search::SearchMode;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub search: SearchConfig,
    pub export: ExportConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows per page
    pub page_size: usize,

    /// Text shown for null or missing cells
    pub placeholder: String,

    /// Text shown when the current page has no rows
    pub empty_message: String,

    /// Width of the page-number strip before ellipses are used
    pub max_visible_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before the term is applied
    pub debounce_ms: u64,

    /// Fuzzy instead of substring matching
    pub fuzzy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Base of the suggested file name; the date and extension are appended
    pub file_name: String,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Environment variable holding the bearer token
    pub token_env: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Preference file override (defaults to the data directory)
    pub preferences_file: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            placeholder: "-".to_string(),
            empty_message: "No data available".to_string(),
            max_visible_pages: 5,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: crate::debouncer::DEFAULT_SEARCH_DEBOUNCE_MS,
            fuzzy: false,
        }
    }
}

impl SearchConfig {
    pub fn mode(&self) -> SearchMode {
        if self.fuzzy {
            SearchMode::Fuzzy
        } else {
            SearchMode::Substring
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "table-export".to_string(),
            format: ExportFormat::Csv,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            token_env: "TABLE_VIEW_TOKEN".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Zero would make every page empty
        config.display.page_size = config.display.page_size.max(1);
        config.display.max_visible_pages = config.display.max_visible_pages.max(1);

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("table-view").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# table-view configuration file
# Location: ~/.config/table-view/config.toml (Linux)
#           ~/Library/Application Support/table-view/config.toml (macOS)
#           %APPDATA%\table-view\config.toml (Windows)

[display]
# Rows per page
page_size = 10

# Shown in place of null or missing values
placeholder = "-"

# Shown when there is nothing to list
empty_message = "No data available"

# Page numbers shown before the pager collapses into ellipses
max_visible_pages = 5

[search]
# Milliseconds to wait after the last keystroke before searching
debounce_ms = 800

# Fuzzy matching instead of plain substring matching
fuzzy = false

[export]
# Exported files are named <file_name>-<YYYY-MM-DD>.<ext>
file_name = "table-export"

# "csv" or "json"
format = "csv"

[api]
base_url = "http://localhost:8080/api"

# Environment variable holding the bearer token
token_env = "TABLE_VIEW_TOKEN"

[storage]
# Column preferences file (leave commented to use the data directory)
# preferences_file = "/path/to/preferences.json"
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("table-view configuration setup");
        println!("==============================");

        let mut config = Config::default();

        print!("Rows per page [{}]: ", config.display.page_size);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if let Ok(size) = input.trim().parse::<usize>() {
            config.display.page_size = size.max(1);
        }

        print!("Use fuzzy search? (y/n) [n]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        config.search.fuzzy = input.trim().eq_ignore_ascii_case("y");

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.page_size, 10);
        assert_eq!(config.display.placeholder, "-");
        assert_eq!(config.search.debounce_ms, 800);
        assert_eq!(config.search.mode(), SearchMode::Substring);
        assert_eq!(config.export.file_name, "table-export");
    }

    #[test]
    fn test_commented_template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.display.page_size, defaults.display.page_size);
        assert_eq!(parsed.display.empty_message, defaults.display.empty_message);
        assert_eq!(parsed.export.format, ExportFormat::Csv);
        assert_eq!(parsed.api.token_env, defaults.api.token_env);
        assert!(parsed.storage.preferences_file.is_none());
    }

    #[test]
    fn test_partial_file_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\npage_size = 0\n[search]\nfuzzy = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.display.page_size, 1);
        assert_eq!(config.display.placeholder, "-");
        assert_eq!(config.search.mode(), SearchMode::Fuzzy);

        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert!(reloaded.search.fuzzy);
    }
}
