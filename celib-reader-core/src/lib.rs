//! # celib-reader-core
//!
//! The paginated dual-page viewer behind the CeLib reader.
//!
//! A [`ViewerShell`] opens a document through a [`DocumentDecoder`], keeps a
//! [`SpreadNavigator`] for it and routes input while it is open. The
//! navigator renders two pages side by side onto a [`SurfacePair`] and
//! allows at most one render in flight; commands issued meanwhile are
//! dropped.
//!
//! ```no_run
//! # async fn demo<D: celib_reader_core::DocumentDecoder>(decoder: D) {
//! use celib_reader_core::{DocumentRef, ViewerConfig, ViewerShell};
//!
//! let shell = ViewerShell::new(decoder, ViewerConfig::default());
//! shell.open_viewer(&DocumentRef::new("1", "Sample", "sample.pdf")).await;
//! shell.next().await;
//! println!("{}", shell.snapshot().indicator.unwrap().text);
//! # }
//! ```

pub mod access;
pub mod config;
pub mod decoder;
pub mod error;
pub mod input;
pub mod navigator;
pub mod session;
pub mod shell;
pub mod surface;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use access::{DocumentRef, Entitlements};
pub use config::ViewerConfig;
pub use decoder::{DecodedDocument, DecodedPage, DocumentDecoder};
pub use error::{Result, ViewerError};
pub use input::{InputEvent, InputRouter, Key, RoutedCommand, ToolbarButton};
pub use navigator::{
    Indicator, NavigationCommand, RenderPhase, SpreadNavigator, SpreadState, SpreadTarget,
    Transition,
};
pub use session::DocumentSession;
pub use shell::{ViewerShell, ViewerSnapshot, ViewerStatus};
pub use surface::{Side, Surface, SurfacePair};
