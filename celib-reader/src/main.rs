use celib_reader_core::{
    InputEvent, Key, Side, Surface, ToolbarButton, ViewerConfig, ViewerSnapshot, ViewerStatus,
};
use clap::Parser;
use iced::widget::{
    button, column, container, horizontal_space, image as img, mouse_area, pick_list, row,
    scrollable, text,
};
use iced::{keyboard, Element, Length, Subscription, Task, Theme};
use tracing_subscriber::EnvFilter;

mod cli;
mod pdf_viewer;
mod preferences;
mod renderer;

use cli::{Args, ReaderTheme};
use pdf_viewer::{Connection, Event, Request};
use preferences::Preferences;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)),
        )
        .init();

    let config = args.viewer_config()?;
    let theme = args.theme.unwrap_or_else(|| Preferences::load().theme);

    iced::application("CeLib Reader", Reader::update, Reader::view)
        .theme(Reader::theme)
        .subscription(Reader::subscription)
        .run_with(move || Reader::new(args, config, theme))?;
    Ok(())
}

#[derive(Debug, Clone)]
enum Message {
    Viewer(Event),
    OpenDocument,
    CloseDocument,
    Input(InputEvent),
    ThemeSelected(ReaderTheme),
}

/// A page image ready for display
struct PageImage {
    handle: img::Handle,
    width: u32,
}

impl PageImage {
    fn from_surface(surface: &Surface) -> Option<Self> {
        if !surface.is_visible() {
            return None;
        }
        let bitmap = surface.bitmap()?;
        Some(Self {
            handle: img::Handle::from_rgba(bitmap.width(), bitmap.height(), bitmap.as_raw().clone()),
            width: bitmap.width(),
        })
    }
}

struct Reader {
    args: Args,
    config: ViewerConfig,
    theme: ReaderTheme,
    connection: Option<Connection>,
    snapshot: Option<ViewerSnapshot>,
    left: Option<PageImage>,
    right: Option<PageImage>,
}

impl Reader {
    fn new(args: Args, config: ViewerConfig, theme: ReaderTheme) -> (Self, Task<Message>) {
        (
            Self {
                args,
                config,
                theme,
                connection: None,
                snapshot: None,
                left: None,
                right: None,
            },
            Task::none(),
        )
    }

    fn send(&self, request: Request) {
        match &self.connection {
            Some(connection) => connection.send(request),
            None => tracing::warn!("Viewer host not connected yet"),
        }
    }

    fn is_open(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.status != ViewerStatus::Closed)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Viewer(Event::Connected(connection)) => {
                tracing::debug!("Viewer host connected");
                self.connection = Some(connection);
                if self.args.document.is_some() {
                    return Task::done(Message::OpenDocument);
                }
            }
            Message::Viewer(Event::Updated(snapshot)) => {
                // Keep the uploaded images when only the status or indicator moved
                let surfaces_changed = self
                    .snapshot
                    .as_ref()
                    .map_or(true, |current| current.surfaces != snapshot.surfaces);
                if surfaces_changed {
                    self.left = PageImage::from_surface(&snapshot.surfaces.left);
                    self.right = PageImage::from_surface(&snapshot.surfaces.right);
                }
                self.snapshot = Some(*snapshot);
            }
            Message::OpenDocument => match self.args.document_ref() {
                Some(document) => self.send(Request::Open(document)),
                None => tracing::warn!("No document given on the command line"),
            },
            Message::CloseDocument => self.send(Request::Close),
            Message::Input(event) => {
                if self.is_open() {
                    self.send(Request::Input(event));
                }
            }
            Message::ThemeSelected(theme) => {
                tracing::debug!("Theme set to {}", theme);
                self.theme = theme;
                Preferences { theme }.save();
            }
        }
        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let host = Subscription::run_with_id(
            "viewer-host",
            pdf_viewer::connect(self.config, self.args.entitlements()),
        )
        .map(Message::Viewer);

        // Key listeners only exist while the viewer is open
        if self.is_open() {
            Subscription::batch([host, keyboard::on_key_press(key_press)])
        } else {
            host
        }
    }

    fn theme(&self) -> Theme {
        self.theme.theme()
    }

    fn view(&self) -> Element<Message> {
        let content: Element<Message> = match &self.snapshot {
            Some(snapshot) if snapshot.status != ViewerStatus::Closed => self.reader_view(snapshot),
            _ => self.welcome_view(),
        };

        container(content).padding(10).into()
    }

    fn welcome_view(&self) -> Element<Message> {
        let open = self.args.document_ref().map(|document| {
            button(text(format!("Read {}", document.title))).on_press(Message::OpenDocument)
        });

        let mut body = column![
            text("CeLib Reader").size(32),
            text("Open a PDF document to get started").size(16),
            self.theme_picker(),
        ]
        .spacing(20)
        .align_x(iced::Alignment::Center);
        if let Some(open) = open {
            body = body.push(open);
        }

        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn reader_view(&self, snapshot: &ViewerSnapshot) -> Element<Message> {
        let title = snapshot.title.clone().unwrap_or_default();
        let header = row![
            text(title).size(20),
            horizontal_space(),
            self.theme_picker(),
            button("Close").on_press(Message::CloseDocument),
        ]
        .spacing(10);

        let body: Element<Message> = match &snapshot.status {
            ViewerStatus::Loading => centered(text("Loading…").size(18)),
            ViewerStatus::Error(message) => centered(
                column![
                    text(message.clone()).color(iced::Color::from_rgb(0.85, 0.2, 0.2)),
                    button("Retry").on_press(Message::OpenDocument),
                ]
                .spacing(10)
                .align_x(iced::Alignment::Center),
            ),
            _ => self.spread_view(snapshot),
        };

        column![header, body].spacing(10).into()
    }

    fn theme_picker(&self) -> Element<Message> {
        pick_list(ReaderTheme::ALL, Some(self.theme), Message::ThemeSelected).into()
    }

    fn spread_view(&self, snapshot: &ViewerSnapshot) -> Element<Message> {
        let Some(indicator) = &snapshot.indicator else {
            return centered(text("No document loaded"));
        };

        let toolbar = row![
            button("−").on_press(button_press(ToolbarButton::ZoomOut)),
            text(indicator.zoom_label.clone()),
            button("+").on_press(button_press(ToolbarButton::ZoomIn)),
            button("Reset").on_press(button_press(ToolbarButton::ResetZoom)),
            horizontal_space(),
            text(indicator.text.clone()),
            button("◀").on_press_maybe(
                indicator
                    .previous_enabled
                    .then(|| button_press(ToolbarButton::Previous))
            ),
            button("▶").on_press_maybe(
                indicator
                    .next_enabled
                    .then(|| button_press(ToolbarButton::Next))
            ),
        ]
        .spacing(10)
        .padding(10);

        let spread = row![
            touch_zone(Side::Left, self.left.as_ref()),
            touch_zone(Side::Right, self.right.as_ref()),
        ]
        .spacing(4);

        let mut page = column![
            toolbar,
            scrollable(container(spread).center_x(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill),
        ];
        if let Some(message) = &snapshot.message {
            page = page.push(text(message.clone()).color(iced::Color::from_rgb(0.85, 0.2, 0.2)));
        }
        page.into()
    }
}

fn button_press(button: ToolbarButton) -> Message {
    Message::Input(InputEvent::Button(button))
}

/// One half of the spread; tapping it turns the page in that direction.
fn touch_zone(side: Side, page: Option<&PageImage>) -> Element<'static, Message> {
    let content: Element<'static, Message> = match page {
        Some(page) => img(page.handle.clone())
            .width(Length::Fixed(page.width as f32))
            .into(),
        None => horizontal_space().width(Length::Shrink).into(),
    };
    mouse_area(content)
        .on_press(Message::Input(InputEvent::TouchZone(side)))
        .into()
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn key_press(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    map_key(&key).map(|key| Message::Input(InputEvent::Key(key)))
}

fn map_key(key: &keyboard::Key) -> Option<Key> {
    use keyboard::key::Named;

    match key {
        keyboard::Key::Named(Named::ArrowLeft) => Some(Key::ArrowLeft),
        keyboard::Key::Named(Named::ArrowRight) => Some(Key::ArrowRight),
        keyboard::Key::Named(Named::ArrowUp) => Some(Key::ArrowUp),
        keyboard::Key::Named(Named::ArrowDown) => Some(Key::ArrowDown),
        keyboard::Key::Named(Named::Space) => Some(Key::Space),
        _ => None,
    }
}
