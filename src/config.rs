/// Application configuration and logging bootstrap
///
/// Configuration is resolved once at startup from the platform data directory
/// and a handful of environment overrides:
/// - `CATALOG_EDITOR_DATA_DIR` - where the key/value database lives
/// - `CATALOG_EDITOR_LOG` - default tracing filter (`RUST_LOG` still wins)
/// - `CATALOG_EDITOR_LEGACY_CBM` - `1` makes missing CBM cells default to 0.0148
/// - `CATALOG_EDITOR_IMAGE_WIDTH` - max width of compressed product images

use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::media::compress::DEFAULT_MAX_WIDTH;
use crate::transfer::rows::ImportOptions;

const APP_DIR: &str = "catalog-editor";
const DB_FILE: &str = "catalog_editor.db";
const DEFAULT_LOG_FILTER: &str = "catalog_editor=info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the key/value database
    pub data_dir: PathBuf,
    /// Default tracing filter directive
    pub log_filter: String,
    /// Column defaults used by spreadsheet and JSON import
    pub import: ImportOptions,
    /// Max width of compressed product images
    pub image_max_width: u32,
}

impl AppConfig {
    /// Resolve configuration from the environment
    ///
    /// Data directory by platform when not overridden:
    /// - Linux: ~/.local/share/catalog-editor
    /// - macOS: ~/Library/Application Support/catalog-editor
    /// - Windows: %APPDATA%\catalog-editor
    pub fn from_env() -> Self {
        let data_dir = env::var_os("CATALOG_EDITOR_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let log_filter = env::var("CATALOG_EDITOR_LOG")
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        let import = match env::var("CATALOG_EDITOR_LEGACY_CBM").as_deref() {
            Ok("1") | Ok("true") => ImportOptions::legacy(),
            _ => ImportOptions::default(),
        };

        let image_max_width = env::var("CATALOG_EDITOR_IMAGE_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_MAX_WIDTH);

        Self {
            data_dir,
            log_filter,
            import,
            image_max_width,
        }
    }

    /// Full path of the key/value database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    // A second init (e.g. from tests) is not an error worth failing over
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_is_inside_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/catalog"),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            import: ImportOptions::default(),
            image_max_width: DEFAULT_MAX_WIDTH,
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/catalog/catalog_editor.db"));
    }

    #[test]
    fn test_default_data_dir_ends_with_app_dir() {
        assert!(default_data_dir().ends_with(APP_DIR));
    }
}
