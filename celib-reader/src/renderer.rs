use anyhow::Context;
use celib_reader_core::{
    DecodedDocument, DecodedPage, DocumentDecoder, Result, ViewerError,
};
use pdfium_render::prelude::*;

/// Document decoder backed by pdfium-render
pub struct PdfiumDecoder {
    pdfium: std::result::Result<&'static Pdfium, String>,
}

impl PdfiumDecoder {
    /// Bind to the PDFium library. A missing library is reported when a
    /// document is opened rather than here, so the viewer can show it inline.
    pub fn new() -> Self {
        let pdfium = bind_pdfium()
            .map(|pdfium| &*Box::leak(Box::new(pdfium)))
            .map_err(|e| {
                tracing::error!("{:#}", e);
                format!("{:#}", e)
            });
        Self { pdfium }
    }
}

fn bind_pdfium() -> anyhow::Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?;
    Ok(Pdfium::new(bindings))
}

impl DocumentDecoder for PdfiumDecoder {
    type Document = PdfiumDocument;

    async fn open(&self, locator: &str) -> Result<PdfiumDocument> {
        let pdfium = self
            .pdfium
            .as_ref()
            .map_err(|e| ViewerError::Load(e.clone()))?;

        let bytes = tokio::fs::read(locator)
            .await
            .map_err(|e| ViewerError::Load(format!("{}: {}", locator, e)))?;

        let inner = pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| ViewerError::Load(format!("{}: {}", locator, e)))?;

        Ok(PdfiumDocument { inner })
    }
}

pub struct PdfiumDocument {
    inner: PdfDocument<'static>,
}

// Manual Debug impl since PdfDocument contains pdfium types
impl std::fmt::Debug for PdfiumDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumDocument")
            .field("page_count", &self.page_count())
            .finish()
    }
}

impl DecodedDocument for PdfiumDocument {
    type Page = PdfiumPage;

    fn page_count(&self) -> usize {
        self.inner.pages().len() as usize
    }

    async fn get_page(&self, index: usize) -> Result<PdfiumPage> {
        let inner = self
            .inner
            .pages()
            .get(index.saturating_sub(1) as u16)
            .map_err(|e| ViewerError::PageFetch {
                page: index,
                reason: e.to_string(),
            })?;
        Ok(PdfiumPage { index, inner })
    }
}

pub struct PdfiumPage {
    index: usize,
    inner: PdfPage<'static>,
}

impl DecodedPage for PdfiumPage {
    fn size(&self) -> (f32, f32) {
        (self.inner.width().value, self.inner.height().value)
    }

    async fn render(&self, scale: f32) -> Result<image::RgbaImage> {
        let render_error = |reason: String| ViewerError::Render {
            page: self.index,
            reason,
        };

        let (width, height) = celib_reader_core::decoder::page_dimensions(self.size(), scale);
        let render_config = PdfRenderConfig::new()
            .set_target_width(width.max(1) as i32)
            .set_maximum_height(height.max(1) as i32)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = self
            .inner
            .render_with_config(&render_config)
            .map_err(|e| render_error(e.to_string()))?;

        // PDFium hands back BGRA
        let mut buffer = bitmap.as_raw_bytes().to_vec();
        for pixel in buffer.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }

        image::RgbaImage::from_raw(bitmap.width() as u32, bitmap.height() as u32, buffer)
            .ok_or_else(|| render_error("bitmap size does not match its dimensions".to_string()))
    }
}
