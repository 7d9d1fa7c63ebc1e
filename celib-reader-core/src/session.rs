use crate::decoder::{page_dimensions, DecodedDocument, DecodedPage, DocumentDecoder};
use crate::error::Result;
use crate::surface::Surface;

/// Owns an opened document handle and draws its pages onto surfaces
pub struct DocumentSession<D> {
    locator: String,
    document: D,
    page_count: usize,
}

impl<D: DecodedDocument> DocumentSession<D> {
    /// Open a document through the decoder
    pub async fn open<Dec>(decoder: &Dec, locator: &str) -> Result<Self>
    where
        Dec: DocumentDecoder<Document = D>,
    {
        let document = decoder.open(locator).await?;
        let page_count = document.page_count();
        tracing::debug!("Opened {} ({} pages)", locator, page_count);

        Ok(Self {
            locator: locator.to_string(),
            document,
            page_count,
        })
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Fetch, size and paint one page onto `surface`.
    ///
    /// An index outside `[1, page_count]` hides the surface instead of failing.
    pub async fn draw_page(&self, page_index: usize, scale: f32, surface: &mut Surface) -> Result<()> {
        if page_index == 0 || page_index > self.page_count {
            tracing::debug!("Page {} out of range, hiding surface", page_index);
            surface.hide();
            return Ok(());
        }

        let page = self.document.get_page(page_index).await?;
        let (width, height) = page_dimensions(page.size(), scale);
        let bitmap = page.render(scale).await?;

        surface.resize(width, height);
        surface.paint(page_index, bitmap);
        Ok(())
    }
}

impl<D> std::fmt::Debug for DocumentSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSession")
            .field("locator", &self.locator)
            .field("page_count", &self.page_count)
            .finish()
    }
}
