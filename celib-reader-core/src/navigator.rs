//! Spread navigation state machine
//!
//! [`SpreadState`] is the pure part: it decides what a [`NavigationCommand`]
//! does and guards the single in-flight render with [`RenderPhase`].
//! [`SpreadNavigator`] drives the actual left/right page draws through a
//! [`DocumentSession`] and commits the result when both sides finish.
//!
//! Commands that arrive while a render is in flight are dropped, not queued.

use crate::config::ViewerConfig;
use crate::decoder::DecodedDocument;
use crate::error::ViewerError;
use crate::session::DocumentSession;
use crate::surface::SurfacePair;
use std::cell::{Ref, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationCommand {
    Next,
    Previous,
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

/// The spread a render is producing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadTarget {
    pub left_page: usize,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderPhase {
    Idle,
    Rendering(SpreadTarget),
}

/// What happened to a dispatched command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Accepted while idle but changes nothing; no render.
    NoOp,
    /// Arrived during an in-flight render and was discarded.
    Dropped,
    /// Accepted; a render of the target spread has started.
    Render(SpreadTarget),
}

/// Page/zoom indicator and control enablement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub text: String,
    pub zoom_label: String,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadState {
    left_page: usize,
    page_count: usize,
    scale: f32,
    phase: RenderPhase,
    config: ViewerConfig,
}

impl SpreadState {
    pub fn new(page_count: usize, config: ViewerConfig) -> Self {
        Self {
            left_page: 1,
            page_count,
            scale: config.default_scale,
            phase: RenderPhase::Idle,
            config,
        }
    }

    pub fn left_page(&self) -> usize {
        self.left_page
    }

    /// Derived, never stored: `min(left_page + 1, page_count)`
    pub fn right_page(&self) -> usize {
        (self.left_page + 1).min(self.page_count)
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn is_rendering(&self) -> bool {
        matches!(self.phase, RenderPhase::Rendering(_))
    }

    /// The spread `command` would produce from the current state, or `None`
    /// when it changes nothing.
    pub fn plan(&self, command: NavigationCommand) -> Option<SpreadTarget> {
        if self.page_count == 0 {
            return None;
        }

        let current = SpreadTarget {
            left_page: self.left_page,
            scale: self.scale,
        };
        match command {
            NavigationCommand::Next => {
                let candidate = self.left_page + 2;
                (candidate <= self.page_count).then_some(SpreadTarget {
                    left_page: candidate,
                    ..current
                })
            }
            NavigationCommand::Previous => {
                let candidate = self.left_page.saturating_sub(2).max(1);
                (candidate != self.left_page).then_some(SpreadTarget {
                    left_page: candidate,
                    ..current
                })
            }
            NavigationCommand::ZoomIn => self.rescale(self.scale + self.config.zoom_step),
            NavigationCommand::ZoomOut => self.rescale(self.scale - self.config.zoom_step),
            NavigationCommand::ResetZoom => self.rescale(self.config.default_scale),
        }
    }

    fn rescale(&self, scale: f32) -> Option<SpreadTarget> {
        let scale = self.config.clamp_scale(scale);
        ((scale - self.scale).abs() > f32::EPSILON).then_some(SpreadTarget {
            left_page: self.left_page,
            scale,
        })
    }

    /// Check the render guard and, if idle, start rendering the planned
    /// spread. Check and set happen without an intervening suspension point.
    pub fn dispatch(&mut self, command: NavigationCommand) -> Transition {
        if self.is_rendering() {
            return Transition::Dropped;
        }
        match self.plan(command) {
            Some(target) => {
                self.phase = RenderPhase::Rendering(target);
                Transition::Render(target)
            }
            None => Transition::NoOp,
        }
    }

    /// Start rendering the current spread (used right after open).
    pub fn begin_current(&mut self) -> Transition {
        if self.is_rendering() {
            return Transition::Dropped;
        }
        if self.page_count == 0 {
            return Transition::NoOp;
        }
        let target = SpreadTarget {
            left_page: self.left_page,
            scale: self.scale,
        };
        self.phase = RenderPhase::Rendering(target);
        Transition::Render(target)
    }

    /// Commit the in-flight target and return to idle.
    pub fn complete(&mut self) -> Option<SpreadTarget> {
        match self.phase {
            RenderPhase::Rendering(target) => {
                self.left_page = target.left_page;
                self.scale = target.scale;
                self.phase = RenderPhase::Idle;
                Some(target)
            }
            RenderPhase::Idle => None,
        }
    }

    pub fn indicator(&self) -> Indicator {
        let zoom_label = format!("{}%", (self.scale * 100.0).round() as i32);
        if self.page_count == 0 {
            return Indicator {
                text: "No pages".to_string(),
                zoom_label,
                previous_enabled: false,
                next_enabled: false,
            };
        }

        let (left, right, total) = (self.left_page, self.right_page(), self.page_count);
        let text = if left == right {
            format!("Page {} of {}", left, total)
        } else {
            format!("Pages {}-{} of {}", left, right, total)
        };
        Indicator {
            text,
            zoom_label,
            previous_enabled: left > 1,
            next_enabled: right < total,
        }
    }
}

/// Drives spread renders for one opened document
#[derive(Debug)]
pub struct SpreadNavigator<D> {
    session: DocumentSession<D>,
    state: RefCell<SpreadState>,
    surfaces: RefCell<SurfacePair>,
    last_error: RefCell<Option<ViewerError>>,
}

impl<D: DecodedDocument> SpreadNavigator<D> {
    pub fn new(session: DocumentSession<D>, config: ViewerConfig) -> Self {
        let state = SpreadState::new(session.page_count(), config);
        Self {
            session,
            state: RefCell::new(state),
            surfaces: RefCell::new(SurfacePair::new()),
            last_error: RefCell::new(None),
        }
    }

    pub fn session(&self) -> &DocumentSession<D> {
        &self.session
    }

    pub fn state(&self) -> SpreadState {
        self.state.borrow().clone()
    }

    pub fn surfaces(&self) -> Ref<'_, SurfacePair> {
        self.surfaces.borrow()
    }

    pub fn indicator(&self) -> Indicator {
        self.state.borrow().indicator()
    }

    /// Most recent page draw failure of the last completed render
    pub fn last_error(&self) -> Option<ViewerError> {
        self.last_error.borrow().clone()
    }

    /// Render the spread at the current position. A document with no pages
    /// hides both surfaces instead.
    pub async fn render_current(&self) -> Transition {
        let transition = self.state.borrow_mut().begin_current();
        self.run(transition).await
    }

    pub async fn dispatch(&self, command: NavigationCommand) -> Transition {
        let transition = self.state.borrow_mut().dispatch(command);
        match transition {
            Transition::Dropped => tracing::warn!("Dropped {:?}: render in flight", command),
            Transition::NoOp => tracing::debug!("{:?} is a no-op", command),
            Transition::Render(target) => tracing::debug!("{:?} -> {:?}", command, target),
        }
        self.run(transition).await
    }

    async fn run(&self, transition: Transition) -> Transition {
        match transition {
            Transition::Render(target) => self.render(target).await,
            Transition::NoOp if self.session.page_count() == 0 => {
                self.surfaces.borrow_mut().hide_all();
            }
            _ => {}
        }
        transition
    }

    async fn render(&self, target: SpreadTarget) {
        let (mut left, mut right) = {
            let surfaces = self.surfaces.borrow();
            (surfaces.left.clone(), surfaces.right.clone())
        };

        // The session hides the right surface when left_page is the last page.
        let (left_result, right_result) = tokio::join!(
            self.session.draw_page(target.left_page, target.scale, &mut left),
            self.session.draw_page(target.left_page + 1, target.scale, &mut right),
        );

        let mut failure = None;
        for (result, surface) in [(left_result, &mut left), (right_result, &mut right)] {
            if let Err(e) = result {
                tracing::warn!("{}", e);
                surface.hide();
                failure.get_or_insert(e);
            }
        }

        *self.surfaces.borrow_mut() = SurfacePair { left, right };
        *self.last_error.borrow_mut() = failure;
        if let Some(done) = self.state.borrow_mut().complete() {
            tracing::debug!(
                "Rendered spread at page {} ({:.2}x)",
                done.left_page,
                done.scale
            );
        }
    }
}
