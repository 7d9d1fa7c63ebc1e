//! Drawable regions for the two halves of a spread

use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// A drawable region that receives one rasterized page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    bitmap: Option<RgbaImage>,
    page: Option<usize>,
    visible: bool,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    /// 1-based page currently shown, if any
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Resize the drawable area. Existing content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.bitmap = None;
    }

    /// Paint a rasterized page and make the surface visible.
    ///
    /// Bitmaps that do not match the surface size are scaled to fit.
    pub fn paint(&mut self, page: usize, bitmap: RgbaImage) {
        let bitmap = if bitmap.dimensions() == (self.width, self.height) || self.width == 0 {
            bitmap
        } else {
            image::imageops::resize(
                &bitmap,
                self.width,
                self.height.max(1),
                image::imageops::FilterType::Triangle,
            )
        };
        self.width = bitmap.width();
        self.height = bitmap.height();
        self.bitmap = Some(bitmap);
        self.page = Some(page);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Left and right surfaces of a spread
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfacePair {
    pub left: Surface,
    pub right: Surface,
}

impl SurfacePair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, side: Side) -> &Surface {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Surface {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn hide_all(&mut self) {
        self.left.hide();
        self.right.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_hidden_and_blank() {
        let surface = Surface::new();
        assert!(!surface.is_visible());
        assert!(surface.bitmap().is_none());
        assert_eq!(surface.page(), None);
    }

    #[test]
    fn paint_shows_page() {
        let mut surface = Surface::new();
        surface.resize(4, 6);
        surface.paint(3, RgbaImage::new(4, 6));

        assert!(surface.is_visible());
        assert_eq!(surface.page(), Some(3));
        assert_eq!((surface.width(), surface.height()), (4, 6));
    }

    #[test]
    fn paint_fits_bitmap_to_surface() {
        let mut surface = Surface::new();
        surface.resize(10, 20);
        surface.paint(1, RgbaImage::new(5, 10));

        assert_eq!(surface.bitmap().map(|b| b.dimensions()), Some((10, 20)));
    }

    #[test]
    fn hide_keeps_bitmap() {
        let mut surface = Surface::new();
        surface.resize(2, 2);
        surface.paint(1, RgbaImage::new(2, 2));
        surface.hide();

        assert!(!surface.is_visible());
        assert!(surface.bitmap().is_some());
    }

    #[test]
    fn pair_is_addressed_by_side() {
        let mut pair = SurfacePair::new();
        pair.get_mut(Side::Right).resize(7, 7);
        assert_eq!(pair.right.width(), 7);
        assert_eq!(pair.get(Side::Left).width(), 0);
    }
}
