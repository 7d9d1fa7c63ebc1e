//! In-memory decoder for exercising the viewer without a real PDF backend
//!
//! Pages are 100x200 points and rasterize to a solid colour. Individual pages
//! can be made to fail, and page fetches can be held behind a gate so a
//! render stays in flight until the test releases it.

use crate::decoder::{DecodedDocument, DecodedPage, DocumentDecoder};
use crate::error::{Result, ViewerError};
use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tokio::sync::Semaphore;

pub const PAGE_WIDTH: f32 = 100.0;
pub const PAGE_HEIGHT: f32 = 200.0;

#[derive(Debug, Default)]
struct Script {
    page_count: usize,
    unreachable: bool,
    failing_fetch: HashSet<usize>,
    failing_render: HashSet<usize>,
    gate: Option<Rc<Semaphore>>,
    opened: Vec<String>,
    fetched: Vec<usize>,
}

/// Cloning shares the script, so a test can keep a handle for inspection
/// after moving the decoder into a shell.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecoder {
    script: Rc<RefCell<Script>>,
}

impl ScriptedDecoder {
    pub fn with_pages(page_count: usize) -> Self {
        let decoder = Self::default();
        decoder.script.borrow_mut().page_count = page_count;
        decoder
    }

    pub fn unreachable() -> Self {
        let decoder = Self::default();
        decoder.script.borrow_mut().unreachable = true;
        decoder
    }

    pub fn failing_fetch(self, page: usize) -> Self {
        self.script.borrow_mut().failing_fetch.insert(page);
        self
    }

    pub fn failing_render(self, page: usize) -> Self {
        self.script.borrow_mut().failing_render.insert(page);
        self
    }

    /// Block subsequent page fetches until [`release`](Self::release) is called.
    pub fn hold(&self) {
        self.script.borrow_mut().gate = Some(Rc::new(Semaphore::new(0)));
    }

    /// Let `fetches` held page fetches proceed.
    pub fn release(&self, fetches: usize) {
        if let Some(gate) = &self.script.borrow().gate {
            gate.add_permits(fetches);
        }
    }

    /// Stop gating. Fetches already waiting stay blocked until released.
    pub fn open_gate(&self) {
        self.script.borrow_mut().gate = None;
    }

    pub fn opened(&self) -> Vec<String> {
        self.script.borrow().opened.clone()
    }

    pub fn fetched(&self) -> Vec<usize> {
        self.script.borrow().fetched.clone()
    }

    pub fn clear_fetched(&self) {
        self.script.borrow_mut().fetched.clear();
    }
}

impl DocumentDecoder for ScriptedDecoder {
    type Document = ScriptedDocument;

    async fn open(&self, locator: &str) -> Result<ScriptedDocument> {
        let mut script = self.script.borrow_mut();
        script.opened.push(locator.to_string());
        if script.unreachable {
            return Err(ViewerError::Load(format!("{} is unreachable", locator)));
        }
        Ok(ScriptedDocument {
            page_count: script.page_count,
            script: Rc::clone(&self.script),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedDocument {
    page_count: usize,
    script: Rc<RefCell<Script>>,
}

impl DecodedDocument for ScriptedDocument {
    type Page = ScriptedPage;

    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn get_page(&self, index: usize) -> Result<ScriptedPage> {
        let gate = self.script.borrow().gate.clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let mut script = self.script.borrow_mut();
        script.fetched.push(index);
        if script.failing_fetch.contains(&index) {
            return Err(ViewerError::PageFetch {
                page: index,
                reason: "scripted fetch failure".to_string(),
            });
        }
        Ok(ScriptedPage {
            index,
            fails: script.failing_render.contains(&index),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedPage {
    index: usize,
    fails: bool,
}

impl DecodedPage for ScriptedPage {
    fn size(&self) -> (f32, f32) {
        (PAGE_WIDTH, PAGE_HEIGHT)
    }

    async fn render(&self, scale: f32) -> Result<RgbaImage> {
        if self.fails {
            return Err(ViewerError::Render {
                page: self.index,
                reason: "scripted render failure".to_string(),
            });
        }
        let (width, height) = crate::decoder::page_dimensions(self.size(), scale);
        Ok(RgbaImage::from_pixel(
            width.max(1),
            height.max(1),
            Rgba([self.index as u8, 0, 0, 255]),
        ))
    }
}
