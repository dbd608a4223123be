//! Output formatting for CLI

use lumen_core::QualityProfile;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Pretty JSON for `--format json`
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Tabled)]
struct QualityRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Bitrate")]
    bitrate: String,
    #[tabled(rename = "Selected")]
    selected: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// Quality ladder as a text table, marking the selected rung
pub fn quality_table(profiles: &[QualityProfile], selected: Option<&str>) -> String {
    let rows = profiles.iter().enumerate().map(|(i, p)| QualityRow {
        index: i + 1,
        label: p.label.clone(),
        resolution: if p.resolution.is_empty() {
            "-".to_string()
        } else {
            p.resolution.clone()
        },
        bitrate: format_bitrate(p.bitrate_bps),
        selected: if selected == Some(p.label.as_str()) { "*" } else { "" }.to_string(),
        source: p.source_url.clone(),
    });
    Table::new(rows).to_string()
}

fn format_bitrate(bps: u64) -> String {
    match bps {
        0 => "-".to_string(),
        b if b >= 1_000_000 => format!("{:.1} Mbps", b as f64 / 1_000_000.0),
        b => format!("{} kbps", b / 1000),
    }
}

/// Seconds as m:ss.s
pub fn format_time(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    format!("{}:{:02}.{}", tenths / 600, (tenths % 600) / 10, tenths % 10)
}
