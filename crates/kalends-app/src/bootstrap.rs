//! Startup wiring between settings and the calendar engine.

use std::path::Path;

use anyhow::Context;
use kalends_core::config::Settings;
use kalends_engine::calendar::CalendarRegistry;
use kalends_engine::export::csv::to_csv;

/// ## Summary
/// Creates the configured default calendar and makes it active.
///
/// ## Errors
/// Returns an error if the configured name is blank or the timezone is unknown.
#[tracing::instrument(skip(settings))]
pub fn build_registry(settings: &Settings) -> anyhow::Result<CalendarRegistry> {
    let calendar = &settings.calendar;
    let mut registry = CalendarRegistry::new();
    registry
        .create_calendar(&calendar.default_name, &calendar.default_timezone)
        .with_context(|| format!("creating calendar '{}'", calendar.default_name))?;
    registry.use_calendar(calendar.default_name.trim())?;

    tracing::info!(
        name = %calendar.default_name,
        timezone = %calendar.default_timezone,
        "Default calendar ready"
    );
    Ok(registry)
}

/// ## Summary
/// Renders the active calendar as CSV.
///
/// ## Errors
/// Returns an error if no calendar is active.
pub fn export_active(registry: &CalendarRegistry) -> anyhow::Result<String> {
    let calendar = registry
        .active()
        .context("no calendar in use; nothing to export")?;
    let events = calendar.store().get_all();
    tracing::debug!(calendar = %calendar.name(), events = events.len(), "Exporting calendar");
    Ok(to_csv(events))
}

/// ## Summary
/// Writes `document` to `path`, or to stdout when no path is configured.
///
/// ## Errors
/// Returns an error if the file cannot be written.
pub fn write_export(document: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, document)
                .with_context(|| format!("writing export to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Export written");
        }
        None => print!("{document}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kalends_engine::Event;

    fn settings(toml: &str) -> Settings {
        Settings::from_toml(toml).expect("valid test settings")
    }

    #[test_log::test]
    fn test_build_registry_activates_default_calendar() {
        let registry = build_registry(&settings(
            "[calendar]\ndefault_name = \"work\"\ndefault_timezone = \"Europe/Paris\"\n",
        ))
        .unwrap();

        let active = registry.active().unwrap();
        assert_eq!(active.name(), "work");
        assert_eq!(active.timezone().name(), "Europe/Paris");
    }

    #[test]
    fn test_build_registry_rejects_unknown_timezone() {
        let result = build_registry(&settings(
            "[calendar]\ndefault_name = \"work\"\ndefault_timezone = \"Atlantis/Lost\"\n",
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_export_active_renders_events() {
        let mut registry = build_registry(&settings("")).unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 6, 10)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        let event = Event::new("Call", start, start + chrono::TimeDelta::hours(1)).unwrap();
        assert!(
            registry
                .active_mut()
                .unwrap()
                .store_mut()
                .create_event(event)
                .is_success()
        );

        let document = export_active(&registry).unwrap();
        let lines: Vec<&str> = document.split("\r\n").collect();
        assert!(lines[0].starts_with("Subject,Start Date"));
        assert_eq!(lines[1], "Call,2025/06/10,9:00 AM,2025/06/10,10:00 AM,False,,,False");
    }

    #[test]
    fn test_export_without_active_calendar_fails() {
        assert!(export_active(&CalendarRegistry::new()).is_err());
    }
}
