// ── Layout file ──
//
// The dashboard (pages and widget descriptors) stored as pretty JSON.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hearthdash_core::Dashboard;
use tracing::{debug, info};

use crate::{ConfigError, project_dirs};

/// `layout.json` in the platform data dir.
pub fn default_layout_path() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from("hearthdash-layout.json"),
        |dirs| dirs.data_dir().join("layout.json"),
    )
}

/// Read the dashboard from `path`. A missing file yields the default
/// dashboard (one page with a clock).
pub fn load_layout(path: &Path) -> Result<Dashboard, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no layout file, starting with the default dashboard");
            return Ok(Dashboard::default());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&raw).map_err(|source| ConfigError::Layout {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the dashboard to `path`, creating parent directories.
///
/// The file is written beside the target and renamed over it, so a
/// crash mid-write leaves the previous layout intact.
pub fn save_layout(path: &Path, dashboard: &Dashboard) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(dashboard)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), pages = dashboard.pages.len(), "layout saved");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use hearthdash_core::{DeviceId, LayoutRect, Page, WidgetDescriptor, WidgetKind};

    use super::*;

    #[test]
    fn missing_file_yields_default_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let dashboard = load_layout(&dir.path().join("layout.json")).unwrap();
        assert_eq!(dashboard.pages.len(), 1);
        assert_eq!(dashboard.pages[0].widgets[0].kind, WidgetKind::Clock);
    }

    #[test]
    fn saved_layout_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("layout.json");

        let mut dashboard = Dashboard::default();
        let mut page = Page::new();
        page.widgets.push(WidgetDescriptor::new(
            WidgetKind::Dimmer,
            Some(DeviceId::from("hall")),
            LayoutRect::new(0, 0, 4, 1),
        ));
        dashboard.pages.push(page);

        save_layout(&path, &dashboard).unwrap();
        assert_eq!(load_layout(&path).unwrap(), dashboard);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn hand_written_layout_without_ids_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(
            &path,
            r#"{ "pages": [ { "widgets": [
                { "type": "switch", "deviceId": "lamp", "layout": { "x": 0, "y": 0, "w": 2, "h": 2 } },
                { "type": "weather", "layout": { "x": 2, "y": 0, "w": 2, "h": 2 } }
            ] } ] }"#,
        )
        .unwrap();

        let dashboard = load_layout(&path).unwrap();
        let widgets = &dashboard.pages[0].widgets;
        assert_eq!(widgets[0].device_id, Some(DeviceId::from("lamp")));
        assert_eq!(widgets[1].kind, WidgetKind::Other("weather".into()));
        assert_ne!(widgets[0].id, widgets[1].id);
    }

    #[test]
    fn corrupt_layout_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_layout(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Layout { path: ref p, .. } if p == &path));
    }
}
