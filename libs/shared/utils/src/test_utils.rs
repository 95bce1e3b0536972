use std::path::PathBuf;
use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use shared_config::AppConfig;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness. `RUST_LOG` still applies.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An `AppConfig` whose data file lives in a private temp directory.
///
/// Keep the `TestConfig` alive for as long as the store is used; dropping it
/// removes the directory.
pub struct TestConfig {
    pub dir: TempDir,
    pub data_file: PathBuf,
}

impl TestConfig {
    pub fn new() -> Self {
        init_test_tracing();
        let dir = TempDir::new().expect("failed to create temp dir");
        let data_file = dir.path().join("data").join("doctors.json");
        Self { dir, data_file }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::with_data_file(&self.data_file)
    }

    /// Seed the data file with a raw JSON document.
    pub fn write_document(&self, document: &Value) {
        if let Some(parent) = self.data_file.parent() {
            std::fs::create_dir_all(parent).expect("failed to create data dir");
        }
        let body = serde_json::to_vec_pretty(document).expect("failed to encode document");
        std::fs::write(&self.data_file, body).expect("failed to write document");
    }

    pub fn read_document(&self) -> Value {
        let raw = std::fs::read(&self.data_file).expect("failed to read document");
        serde_json::from_slice(&raw).expect("document is not JSON")
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Admin form payload with both languages filled in.
pub fn doctor_payload(name_en: &str, title_en: &str, name_ar: &str, title_ar: &str) -> Value {
    json!({
        "name_en": name_en,
        "title_en": title_en,
        "description_en": format!("{} profile", name_en),
        "name_ar": name_ar,
        "title_ar": title_ar,
        "description_ar": format!("{} نبذة", name_ar),
        "image": format!("/images/{}.png", name_en.to_lowercase().replace([' ', '.'], ""))
    })
}

/// Same as [`doctor_payload`] with an availability map of `(day, start, end)`.
pub fn doctor_payload_with_availability(
    name_en: &str,
    name_ar: &str,
    availability: &[(&str, &str, &str)],
) -> Value {
    let mut payload = doctor_payload(name_en, "General Practice", name_ar, "طب عام");
    let windows: Map<String, Value> = availability
        .iter()
        .map(|(day, start, end)| (day.to_string(), json!({ "start": start, "end": end })))
        .collect();
    payload["availability"] = Value::Object(windows);
    payload
}

/// `NaiveDateTime` from `"YYYY-MM-DD"` and `"HH:MM"`.
pub fn local_time(date: &str, time: &str) -> NaiveDateTime {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("bad test date");
    let time = NaiveTime::parse_from_str(time, "%H:%M").expect("bad test time");
    date.and_time(time)
}
