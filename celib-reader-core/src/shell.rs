//! Viewer lifecycle: open/close, loading and error states, input arming

use crate::access::{DocumentRef, Entitlements};
use crate::config::ViewerConfig;
use crate::decoder::DocumentDecoder;
use crate::error::ViewerError;
use crate::input::{InputEvent, InputRouter, RoutedCommand};
use crate::navigator::{Indicator, NavigationCommand, SpreadNavigator};
use crate::session::DocumentSession;
use crate::surface::SurfacePair;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    Closed,
    Loading,
    /// Open, showing an inline error instead of a spread
    Error(String),
    Ready,
}

/// Everything a front-end needs to draw the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSnapshot {
    pub status: ViewerStatus,
    pub title: Option<String>,
    pub indicator: Option<Indicator>,
    pub surfaces: SurfacePair,
    pub message: Option<String>,
    pub rendering: bool,
}

/// Owns the viewer lifecycle for one front-end
///
/// Lifecycle state sits behind `RefCell`s so the front-end can read the
/// status and route input while an open is still awaiting the decoder. No
/// borrow is held across an await.
pub struct ViewerShell<Dec: DocumentDecoder> {
    decoder: Dec,
    config: ViewerConfig,
    entitlements: Entitlements,
    status: RefCell<ViewerStatus>,
    title: RefCell<Option<String>>,
    navigator: RefCell<Option<Rc<SpreadNavigator<Dec::Document>>>>,
    router: RefCell<Option<InputRouter>>,
    /// Bumped on every close; an open that finds it changed is stale
    generation: Cell<u64>,
}

impl<Dec: DocumentDecoder> ViewerShell<Dec> {
    pub fn new(decoder: Dec, config: ViewerConfig) -> Self {
        Self {
            decoder,
            config,
            entitlements: Entitlements::new(),
            status: RefCell::new(ViewerStatus::Closed),
            title: RefCell::new(None),
            navigator: RefCell::new(None),
            router: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn with_entitlements(mut self, entitlements: Entitlements) -> Self {
        self.entitlements = entitlements;
        self
    }

    pub fn status(&self) -> ViewerStatus {
        self.status.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        *self.status.borrow() != ViewerStatus::Closed
    }

    pub fn title(&self) -> Option<String> {
        self.title.borrow().clone()
    }

    /// Shared handle to the active navigator, for hosts that run renders as
    /// separate tasks.
    pub fn navigator(&self) -> Option<Rc<SpreadNavigator<Dec::Document>>> {
        self.navigator.borrow().clone()
    }

    pub fn is_armed(&self) -> bool {
        self.router.borrow().is_some()
    }

    /// Open a document and render its first spread.
    ///
    /// Any previously open document is discarded first. The viewer reports
    /// `Loading` until the first spread is drawn, and only then arms input.
    /// Failures leave the viewer open in the error state. If the viewer is
    /// closed or reopened before this finishes, the result is discarded.
    pub async fn open_viewer(&self, document: &DocumentRef) {
        self.close_viewer();
        let generation = self.generation.get();
        tracing::info!("Opening \"{}\" from {}", document.title, document.locator);
        self.title.replace(Some(document.title.clone()));
        self.status.replace(ViewerStatus::Loading);

        if !self.entitlements.is_unlocked(document) {
            self.fail(ViewerError::Locked {
                title: document.title.clone(),
            });
            return;
        }

        let opened = DocumentSession::open(&self.decoder, &document.locator).await;
        if self.is_stale(generation, document) {
            return;
        }
        let session = match opened {
            Ok(session) => session,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        let navigator = Rc::new(SpreadNavigator::new(session, self.config));
        navigator.render_current().await;
        if self.is_stale(generation, document) {
            return;
        }
        self.navigator.replace(Some(navigator));
        self.status.replace(ViewerStatus::Ready);
        self.router.replace(Some(InputRouter::arm()));
    }

    fn is_stale(&self, generation: u64, document: &DocumentRef) -> bool {
        let stale = self.generation.get() != generation;
        if stale {
            tracing::debug!("Discarding superseded load of \"{}\"", document.title);
        }
        stale
    }

    fn fail(&self, error: ViewerError) {
        tracing::error!("{}", error);
        self.status.replace(ViewerStatus::Error(error.to_string()));
    }

    /// Disarm input and discard the document and spread state.
    pub fn close_viewer(&self) {
        if self.is_open() {
            tracing::info!("Closing viewer");
        }
        self.generation.set(self.generation.get().wrapping_add(1));
        self.router.replace(None);
        self.navigator.replace(None);
        self.title.replace(None);
        self.status.replace(ViewerStatus::Closed);
    }

    pub async fn command(&self, command: NavigationCommand) {
        if let Some(navigator) = self.navigator() {
            navigator.dispatch(command).await;
        }
    }

    pub async fn next(&self) {
        self.command(NavigationCommand::Next).await
    }

    pub async fn previous(&self) {
        self.command(NavigationCommand::Previous).await
    }

    pub async fn zoom_in(&self) {
        self.command(NavigationCommand::ZoomIn).await
    }

    pub async fn zoom_out(&self) {
        self.command(NavigationCommand::ZoomOut).await
    }

    pub async fn reset_zoom(&self) {
        self.command(NavigationCommand::ResetZoom).await
    }

    /// Translate a raw input event. Returns `None` while the viewer is not
    /// armed or the event has no binding.
    pub fn handle_input(&self, event: InputEvent) -> Option<RoutedCommand> {
        self.router.borrow().as_ref()?.route(event)
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let (indicator, surfaces, page_error, rendering) = match self.navigator() {
            Some(navigator) => (
                Some(navigator.indicator()),
                navigator.surfaces().clone(),
                navigator.last_error(),
                navigator.state().is_rendering(),
            ),
            None => (None, SurfacePair::new(), None, false),
        };
        let status = self.status();
        let message = match &status {
            ViewerStatus::Error(message) => Some(message.clone()),
            _ => page_error.map(|e| e.to_string()),
        };

        ViewerSnapshot {
            status,
            title: self.title(),
            indicator,
            surfaces,
            message,
            rendering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::test_support::ScriptedDecoder;

    fn book() -> DocumentRef {
        DocumentRef::new("b1", "Sample", "sample.pdf")
    }

    #[tokio::test]
    async fn open_renders_first_spread_and_arms_input() {
        let shell = ViewerShell::new(ScriptedDecoder::with_pages(10), ViewerConfig::default());
        shell.open_viewer(&book()).await;

        assert_eq!(shell.status(), ViewerStatus::Ready);
        assert!(shell.is_armed());
        assert_eq!(shell.title().as_deref(), Some("Sample"));

        let snapshot = shell.snapshot();
        assert_eq!(snapshot.surfaces.left.page(), Some(1));
        assert_eq!(snapshot.surfaces.right.page(), Some(2));
        assert_eq!(snapshot.indicator.unwrap().text, "Pages 1-2 of 10");
    }

    #[tokio::test]
    async fn load_failure_stays_open_with_message() {
        let shell = ViewerShell::new(ScriptedDecoder::unreachable(), ViewerConfig::default());
        shell.open_viewer(&book()).await;

        assert!(shell.is_open());
        assert!(!shell.is_armed());
        assert!(matches!(shell.status(), ViewerStatus::Error(_)));
        assert_eq!(
            shell.snapshot().message.as_deref(),
            Some("Failed to load document: sample.pdf is unreachable")
        );
    }

    #[tokio::test]
    async fn locked_title_is_not_decoded() {
        let decoder = ScriptedDecoder::with_pages(4);
        let script = decoder.clone();
        let shell = ViewerShell::new(decoder, ViewerConfig::default());

        shell.open_viewer(&book().with_price(999)).await;

        assert_eq!(shell.status(), ViewerStatus::Error("Sample is locked".to_string()));
        assert!(!shell.is_armed());
        assert!(script.opened().is_empty());
    }

    #[tokio::test]
    async fn purchased_title_opens() {
        let entitlements: Entitlements = ["b1"].into_iter().collect();
        let shell = ViewerShell::new(ScriptedDecoder::with_pages(4), ViewerConfig::default())
            .with_entitlements(entitlements);

        shell.open_viewer(&book().with_price(999)).await;
        assert_eq!(shell.status(), ViewerStatus::Ready);
    }

    #[tokio::test]
    async fn close_disarms_input_and_discards_state() {
        let shell = ViewerShell::new(ScriptedDecoder::with_pages(10), ViewerConfig::default());
        shell.open_viewer(&book()).await;
        assert!(shell.handle_input(InputEvent::Key(Key::ArrowRight)).is_some());

        shell.close_viewer();

        assert!(!shell.is_open());
        assert!(shell.navigator().is_none());
        assert!(shell.handle_input(InputEvent::Key(Key::ArrowRight)).is_none());
        assert_eq!(shell.snapshot().indicator, None);
    }

    #[tokio::test]
    async fn commands_without_document_do_nothing() {
        let decoder = ScriptedDecoder::with_pages(10);
        let script = decoder.clone();
        let shell = ViewerShell::new(decoder, ViewerConfig::default());

        shell.next().await;
        shell.zoom_in().await;

        assert!(script.fetched().is_empty());
    }
}
