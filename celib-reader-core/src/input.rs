//! Input handling for the spread viewer
//!
//! Translates keyboard keys, touch-zone taps and toolbar buttons into
//! [`NavigationCommand`]s. The router holds no state; it only exists while
//! the viewer is open (the shell drops it on close).

use crate::navigator::NavigationCommand;
use crate::surface::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarButton {
    Previous,
    Next,
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    /// Tap at horizontal position `x` inside a reading area `width` wide
    Tap { x: f32, width: f32 },
    /// Tap on one of the dedicated touch zones
    TouchZone(Side),
    Button(ToolbarButton),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedCommand {
    pub command: NavigationCommand,
    /// The host should suppress its default handling (page scroll).
    pub prevent_default: bool,
}

impl RoutedCommand {
    fn plain(command: NavigationCommand) -> Self {
        Self {
            command,
            prevent_default: false,
        }
    }

    fn consuming(command: NavigationCommand) -> Self {
        Self {
            command,
            prevent_default: true,
        }
    }
}

#[derive(Debug)]
pub struct InputRouter {
    _private: (),
}

impl InputRouter {
    pub(crate) fn arm() -> Self {
        tracing::debug!("Input router armed");
        Self { _private: () }
    }

    pub fn route(&self, event: InputEvent) -> Option<RoutedCommand> {
        use NavigationCommand::*;

        match event {
            InputEvent::Key(Key::ArrowLeft | Key::ArrowUp) => Some(RoutedCommand::plain(Previous)),
            InputEvent::Key(Key::ArrowRight) => Some(RoutedCommand::plain(Next)),
            InputEvent::Key(Key::ArrowDown | Key::Space) => Some(RoutedCommand::consuming(Next)),
            InputEvent::Key(Key::Other) => None,
            InputEvent::Tap { x, width } => {
                let side = if x < width / 2.0 { Side::Left } else { Side::Right };
                self.route(InputEvent::TouchZone(side))
            }
            InputEvent::TouchZone(Side::Left) => Some(RoutedCommand::plain(Previous)),
            InputEvent::TouchZone(Side::Right) => Some(RoutedCommand::plain(Next)),
            InputEvent::Button(button) => Some(RoutedCommand::plain(match button {
                ToolbarButton::Previous => Previous,
                ToolbarButton::Next => Next,
                ToolbarButton::ZoomIn => ZoomIn,
                ToolbarButton::ZoomOut => ZoomOut,
                ToolbarButton::ResetZoom => ResetZoom,
            })),
        }
    }
}

impl Drop for InputRouter {
    fn drop(&mut self) {
        tracing::debug!("Input router disarmed");
    }
}
