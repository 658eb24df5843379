use anyhow::Result;
use config::{Config, ConfigBuilder, FileFormat, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Name of the calendar created and activated at startup.
    pub default_name: String,
    /// IANA timezone name of the default calendar, e.g. `America/New_York`.
    pub default_timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// CSV destination. Written to stdout when absent.
    pub path: Option<String>,
}

impl Settings {
    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("calendar.default_name", "default")?
            .set_default("calendar.default_timezone", "UTC")?
            .set_default("logging.level", "debug")?)
    }

    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    ///
    /// Variables use the `KALENDS_` prefix and `__` between sections, e.g.
    /// `KALENDS_CALENDAR__DEFAULT_TIMEZONE`. Environment variables take precedence
    /// over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder_with_defaults()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("KALENDS")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds settings from a TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document is not valid TOML or does not deserialize.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(Self::builder_with_defaults()?
            .add_source(config::File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::trace!(error = %e, "No .env file loaded");
    }

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_defaults_apply_to_empty_document() {
        let settings = Settings::from_toml("").expect("defaults should deserialize");

        assert_eq!(settings.calendar.default_name, "default");
        assert_eq!(settings.calendar.default_timezone, "UTC");
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.export.path.is_none());
    }

    #[test]
    fn test_document_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            [calendar]
            default_name = "work"
            default_timezone = "Europe/Paris"

            [logging]
            level = "info"

            [export]
            path = "out.csv"
            "#,
        )
        .expect("document should deserialize");

        assert_eq!(settings.calendar.default_name, "work");
        assert_eq!(settings.calendar.default_timezone, "Europe/Paris");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.export.path.as_deref(), Some("out.csv"));
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let settings = Settings::from_toml("[logging]\nlevel = \"warn\"\n")
            .expect("document should deserialize");

        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.calendar.default_name, "default");
    }

    #[test]
    fn test_invalid_document_is_rejected() {
        assert!(Settings::from_toml("[calendar\n").is_err());
    }

    #[test]
    fn test_settings_debug() {
        let settings = Settings::from_toml("").expect("defaults should deserialize");

        let debug_str = format!("{settings:?}");
        assert!(debug_str.contains("Settings"));
        assert!(debug_str.contains("calendar"));
        assert!(debug_str.contains("logging"));
    }
}
