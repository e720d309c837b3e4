use crate::analysis::duplicates::ScanOptions;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_DB_PATH: &str = "crm_dedupe.db";
pub const DEFAULT_COUNTRY_PREFIX: &str = "+243";
pub const DEFAULT_NAME_SIMILARITY_THRESHOLD: f64 = 80.0;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db_path: String,
    /// Replaces a leading run of zeros in phone numbers.
    pub country_prefix: String,
    /// Percentage a name must strictly exceed to join a name cluster.
    pub name_similarity_threshold: f64,
    pub batch_size: usize,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            country_prefix: DEFAULT_COUNTRY_PREFIX.to_string(),
            name_similarity_threshold: DEFAULT_NAME_SIMILARITY_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            country_prefix: self.country_prefix.clone(),
            name_similarity_threshold: self.name_similarity_threshold,
            batch_size: self.batch_size.max(1),
        }
    }
}

/// Layered configuration: built-in defaults, then an optional `Config.*`
/// file, then `CRM_DEDUPE_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    build_configuration(Config::builder().add_source(ConfigFile::with_name("Config").required(false)))
}

fn build_configuration(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    Config::builder()
        .set_default("db_path", defaults.db_path)?
        .set_default("country_prefix", defaults.country_prefix)?
        .set_default("name_similarity_threshold", defaults.name_similarity_threshold)?
        .set_default("batch_size", defaults.batch_size as i64)?
        .set_default("page_size", defaults.page_size as i64)?
        .add_source(builder.build()?)
        .add_source(Environment::with_prefix("CRM_DEDUPE").try_parsing(true))
        .build()?
        .try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults_when_no_sources() {
        let config = build_configuration(Config::builder()).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.country_prefix, "+243");
        assert_eq!(config.page_size, 20);
        assert!((config.name_similarity_threshold - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let builder = Config::builder().add_source(config::File::from_str(
            "country_prefix = \"+33\"\npage_size = 50",
            FileFormat::Toml,
        ));
        let config = build_configuration(builder).unwrap();
        assert_eq!(config.country_prefix, "+33");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_scan_options_clamp_batch_size() {
        let config = AppConfig {
            batch_size: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.scan_options().batch_size, 1);
    }
}
