//! Summary artifact
//!
//! A 600x400 SVG with the country total, the five highest estimated GDPs and
//! the refresh time. Written after each committed refresh; failures are the
//! caller's to log.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::SummaryError;
use super::models::CountryRecord;

pub const TOP_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TopCountry {
    pub name: String,
    pub estimated_gdp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub total: usize,
    pub top: Vec<TopCountry>,
    pub refreshed_at: DateTime<Utc>,
}

impl SummaryReport {
    /// `records` must already be ordered by GDP, highest first
    pub fn from_ranked(total: usize, records: &[CountryRecord], refreshed_at: DateTime<Utc>) -> Self {
        let top = records
            .iter()
            .filter_map(|r| {
                r.estimated_gdp.map(|gdp| TopCountry {
                    name: r.name.clone(),
                    estimated_gdp: gdp,
                })
            })
            .take(TOP_COUNT)
            .collect();
        Self {
            total,
            top,
            refreshed_at,
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_svg(report: &SummaryReport) -> String {
    let mut svg = String::new();
    let mut line = |y: u32, x: u32, text: &str| {
        let _ = writeln!(
            svg,
            r#"  <text x="{x}" y="{y}" font-family="sans-serif" font-size="16" fill="black">{}</text>"#,
            escape_xml(text)
        );
    };

    line(30, 20, &format!("Total Countries: {}", report.total));
    line(70, 20, "Top 5 by GDP:");
    let mut y = 100;
    for c in &report.top {
        line(y, 40, &format!("- {}: {:.2}", c.name, c.estimated_gdp));
        y += 25;
    }
    line(
        y + 20,
        20,
        &format!(
            "Last updated: {}",
            report.refreshed_at.format("%Y-%m-%d %H:%M:%S")
        ),
    );

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"600\" height=\"400\" viewBox=\"0 0 600 400\">\n  <rect width=\"600\" height=\"400\" fill=\"white\"/>\n{svg}</svg>\n"
    )
}

/// Writes the rendered summary to a fixed path
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    path: PathBuf,
}

impl SummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, report: &SummaryReport) -> Result<(), SummaryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, render_svg(report)).await?;
        Ok(())
    }
}

/// MIME type for a summary artifact path
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
