use anyhow::Context;
use celib_reader_core::{DocumentRef, Entitlements, ViewerConfig};
use clap::{Parser, ValueEnum};
use iced::theme::Palette;
use iced::{Color, Theme};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "celib_reader=debug,celib_reader_core=debug,info";

#[derive(Parser, Debug, Clone)]
#[command(name = "celib-reader", version, about = "Dual-page PDF e-book reader")]
pub struct Args {
    /// PDF to open on start
    pub document: Option<PathBuf>,

    /// Title shown in the reader header (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Catalog id of the document (defaults to the file name)
    #[arg(long)]
    pub id: Option<String>,

    /// Price of the document; paid titles open only when purchased
    #[arg(long, default_value_t = 0)]
    pub price_cents: u64,

    /// Id of a purchased title (repeatable)
    #[arg(long = "purchased", value_name = "ID")]
    pub purchased: Vec<String>,

    /// JSON file with zoom limits and defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Theme for this run, instead of the saved preference
    #[arg(long, value_enum)]
    pub theme: Option<ReaderTheme>,

    /// Tracing filter, overridden by RUST_LOG
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Args {
    pub fn viewer_config(&self) -> anyhow::Result<ViewerConfig> {
        match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(ViewerConfig::default()),
        }
    }

    pub fn document_ref(&self) -> Option<DocumentRef> {
        let path = self.document.as_ref()?;
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string();
        let id = self.id.clone().unwrap_or_else(|| stem.clone());
        let title = self.title.clone().unwrap_or(stem);
        let locator = path.to_string_lossy().into_owned();
        Some(DocumentRef::new(id, title, locator).with_price(self.price_cents))
    }

    pub fn entitlements(&self) -> Entitlements {
        self.purchased.iter().cloned().collect()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderTheme {
    #[default]
    Dark,
    Light,
    Sepia,
}

impl ReaderTheme {
    pub const ALL: [ReaderTheme; 3] = [ReaderTheme::Dark, ReaderTheme::Light, ReaderTheme::Sepia];

    pub fn theme(self) -> Theme {
        match self {
            ReaderTheme::Dark => Theme::Dark,
            ReaderTheme::Light => Theme::Light,
            ReaderTheme::Sepia => Theme::custom(
                "Sepia".to_string(),
                Palette {
                    background: Color::from_rgb8(0xF4, 0xEC, 0xD8),
                    text: Color::from_rgb8(0x5B, 0x46, 0x36),
                    primary: Color::from_rgb8(0x8B, 0x5E, 0x3C),
                    success: Color::from_rgb8(0x5E, 0x7D, 0x4A),
                    danger: Color::from_rgb8(0xA8, 0x3B, 0x2F),
                },
            ),
        }
    }
}

impl fmt::Display for ReaderTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReaderTheme::Dark => "Dark",
            ReaderTheme::Light => "Light",
            ReaderTheme::Sepia => "Sepia",
        };
        f.write_str(name)
    }
}
