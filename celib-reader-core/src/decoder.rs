//! Seam to the external document-rendering library
//!
//! The viewer never parses document bytes itself. A decoder opens a locator
//! into a [`DecodedDocument`], which hands out pages that know their size and
//! can rasterize themselves at a given scale. Page indices are 1-based on
//! both sides of this seam.

use crate::error::Result;
use image::RgbaImage;
use std::future::Future;

/// Opens documents from a locator (path, URL or identifier).
pub trait DocumentDecoder {
    type Document: DecodedDocument;

    /// Fails with [`ViewerError::Load`](crate::ViewerError::Load) when the
    /// source is unreachable or the bytes are rejected.
    fn open(&self, locator: &str) -> impl Future<Output = Result<Self::Document>>;
}

/// An opened document. Read-only after open; concurrent page fetches on one
/// handle must be tolerated.
pub trait DecodedDocument {
    type Page: DecodedPage;

    fn page_count(&self) -> usize;

    /// Fails with [`ViewerError::PageFetch`](crate::ViewerError::PageFetch).
    fn get_page(&self, index: usize) -> impl Future<Output = Result<Self::Page>>;
}

pub trait DecodedPage {
    /// Page size in points at scale 1.0
    fn size(&self) -> (f32, f32);

    /// Fails with [`ViewerError::Render`](crate::ViewerError::Render).
    fn render(&self, scale: f32) -> impl Future<Output = Result<RgbaImage>>;
}

/// Pixel dimensions of a page at `scale`
pub fn page_dimensions(size: (f32, f32), scale: f32) -> (u32, u32) {
    let (width, height) = size;
    ((width * scale).floor() as u32, (height * scale).floor() as u32)
}
