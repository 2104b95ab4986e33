//! Certificate rendering
//!
//! A certificate is built from the snapshot the backend returns after a
//! registration or winner selection. `CertificateView` is the display
//! fragment: the TUI draws it in the certificate modal and a `Rasterizer`
//! turns it into a JPEG for download.

mod font;
pub mod raster;

pub use raster::{save_certificate, JpegRasterizer, Rasterizer};

use crate::api::models::timestamp_text;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subtitle used when the payload carries no event title
pub const DEFAULT_EVENT_TITLE: &str = "TARUNYAM - Tech Event 2025";

/// Snapshot passed from a registration or selection response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub issue_date: Option<Value>,
    #[serde(default)]
    pub certificate_id: Option<String>,
    #[serde(default)]
    pub certificate_type: Option<String>,
    #[serde(default)]
    pub event_title: Option<String>,
}

impl CertificateData {
    pub fn kind(&self) -> CertificateKind {
        match self.certificate_type.as_deref() {
            Some("winner") => CertificateKind::Winner,
            _ => CertificateKind::Participant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateKind {
    Participant,
    Winner,
}

impl CertificateKind {
    pub fn title(&self) -> &'static str {
        match self {
            CertificateKind::Participant => "CERTIFICATE OF PARTICIPATION",
            CertificateKind::Winner => "WINNER CERTIFICATE",
        }
    }

    /// Leading word of the download file name
    pub fn file_prefix(&self) -> &'static str {
        match self {
            CertificateKind::Participant => "participation",
            CertificateKind::Winner => "winner",
        }
    }
}

/// Treat empty strings like missing values
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Display fragment of a certificate with all placeholders resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateView {
    pub kind: CertificateKind,
    pub title: &'static str,
    pub event_title: String,
    pub name: String,
    pub college: String,
    pub event: String,
    pub achievement: &'static str,
    pub citation: &'static str,
    pub certificate_id: String,
    pub issue_date: String,
}

impl CertificateView {
    pub fn build(data: &CertificateData, now: DateTime<Local>) -> Self {
        let kind = data.kind();
        let issue_date = data
            .issue_date
            .as_ref()
            .and_then(issue_date_from)
            .unwrap_or_else(|| now.date_naive());

        Self {
            kind,
            title: kind.title(),
            event_title: present(&data.event_title)
                .unwrap_or(DEFAULT_EVENT_TITLE)
                .to_string(),
            name: present(&data.name).unwrap_or("Participant").to_string(),
            college: present(&data.college).unwrap_or("Institution").to_string(),
            event: present(&data.event).unwrap_or("Tech Event").to_string(),
            achievement: match kind {
                CertificateKind::Winner => "has WON",
                CertificateKind::Participant => "has successfully participated in",
            },
            citation: match kind {
                CertificateKind::Winner => {
                    "in recognition of outstanding performance and achievement"
                }
                CertificateKind::Participant => "demonstrating technical skills and innovation",
            },
            certificate_id: present(&data.certificate_id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("CERT-{}", now.timestamp_millis())),
            issue_date: format_issue_date(issue_date),
        }
    }

    /// Body lines in reading order, shared by the TUI and the rasterizer
    pub fn body(&self) -> Vec<(LineRole, String)> {
        vec![
            (LineRole::Title, self.title.to_string()),
            (LineRole::Subtitle, self.event_title.clone()),
            (LineRole::Body, "This is to certify that".to_string()),
            (LineRole::Name, self.name.clone()),
            (LineRole::Body, format!("from {}", self.college)),
            (LineRole::Body, self.achievement.to_string()),
            (LineRole::Event, self.event.clone()),
            (LineRole::Body, self.citation.to_string()),
        ]
    }
}

/// Visual weight of a certificate line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Title,
    Subtitle,
    Body,
    Name,
    Event,
}

/// Issue dates arrive as "yyyy-mm-dd hh:mm:ss" strings or epoch-millis beans
fn issue_date_from(value: &Value) -> Option<NaiveDate> {
    if let Value::String(s) = value {
        return s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    }
    let text = timestamp_text(value)?;
    NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
}

/// "January 5, 2025"
pub fn format_issue_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Lowercase and replace every whitespace run with a single hyphen
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut in_space = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}

/// Keep a slug inside the download directory: separators become hyphens
/// and dot runs shrink to one dot
fn file_component(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    for c in slug.chars() {
        match c {
            '/' | '\\' | '\0' => out.push('-'),
            '.' if out.ends_with('.') => {}
            c => out.push(c),
        }
    }
    out
}

/// `<type>-certificate-<name>-<event>-<yyyy-mm-dd>.jpg`
pub fn download_filename(data: &CertificateData, date: NaiveDate) -> String {
    let name = present(&data.name).unwrap_or("participant");
    let event = present(&data.event).unwrap_or("event");
    format!(
        "{}-certificate-{}-{}-{}.jpg",
        data.kind().file_prefix(),
        file_component(&slugify(name)),
        file_component(&slugify(event)),
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_winner_filename() {
        let data = CertificateData {
            name: Some("Jane Doe".to_string()),
            event: Some("Hack Night".to_string()),
            certificate_type: Some("winner".to_string()),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(
            download_filename(&data, date),
            "winner-certificate-jane-doe-hack-night-2025-01-05.jpg"
        );
    }

    #[test]
    fn test_filename_never_leaves_download_dir() {
        let data = CertificateData {
            name: Some("Jane Doe".to_string()),
            event: Some("AI/ML Workshop".to_string()),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            download_filename(&data, date),
            "participation-certificate-jane-doe-ai-ml-workshop-2026-10-18.jpg"
        );

        let data = CertificateData {
            name: Some("../..\\etc".to_string()),
            event: Some("Hack Night".to_string()),
            ..Default::default()
        };
        let filename = download_filename(&data, date);
        assert!(!filename.contains(['/', '\\']));
        assert!(!filename.contains(".."));
        assert_eq!(
            std::path::Path::new("/tmp/certs").join(&filename).parent(),
            Some(std::path::Path::new("/tmp/certs"))
        );
    }

    #[test]
    fn test_participation_filename_fallbacks() {
        let data = CertificateData::default();
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(
            download_filename(&data, date),
            "participation-certificate-participant-event-2025-03-09.jpg"
        );
    }

    #[test]
    fn test_slugify_collapses_whitespace_runs() {
        assert_eq!(slugify("Hack   Night\t2025"), "hack-night-2025");
        assert_eq!(slugify("ÉCOLE Day"), "école-day");
    }

    #[test]
    fn test_placeholders() {
        let view = CertificateView::build(&CertificateData::default(), now());
        assert_eq!(view.title, "CERTIFICATE OF PARTICIPATION");
        assert_eq!(view.name, "Participant");
        assert_eq!(view.event, "Tech Event");
        assert_eq!(view.college, "Institution");
        assert_eq!(view.event_title, DEFAULT_EVENT_TITLE);
        assert_eq!(
            view.certificate_id,
            format!("CERT-{}", now().timestamp_millis())
        );
        assert_eq!(view.issue_date, "January 5, 2025");
    }

    #[test]
    fn test_winner_view() {
        let data = CertificateData {
            name: Some("Jane Doe".to_string()),
            certificate_type: Some("winner".to_string()),
            certificate_id: Some("CERT-42".to_string()),
            issue_date: Some(json!("2024-11-30 09:15:00.0")),
            ..Default::default()
        };
        let view = CertificateView::build(&data, now());
        assert_eq!(view.title, "WINNER CERTIFICATE");
        assert_eq!(view.achievement, "has WON");
        assert_eq!(view.certificate_id, "CERT-42");
        assert_eq!(view.issue_date, "November 30, 2024");
        assert_eq!(view.body()[3], (LineRole::Name, "Jane Doe".to_string()));
    }

    #[test]
    fn test_empty_strings_use_placeholders() {
        let data = CertificateData {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(CertificateView::build(&data, now()).name, "Participant");
    }
}
