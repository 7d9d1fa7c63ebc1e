//! Hosts the viewer shell on its own single-threaded runtime
//!
//! PDFium handles are not `Send`, so the shell, its navigator and every
//! render live on one dedicated thread. The UI talks to it through a
//! [`Connection`] and receives [`ViewerSnapshot`]s back.

use crate::renderer::PdfiumDecoder;
use celib_reader_core::{
    DocumentDecoder, DocumentRef, Entitlements, InputEvent, NavigationCommand, SurfacePair,
    Transition, ViewerConfig, ViewerShell, ViewerSnapshot, ViewerStatus,
};
use iced::futures::{SinkExt, Stream};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum Request {
    Open(DocumentRef),
    Close,
    Input(InputEvent),
}

#[derive(Debug, Clone)]
pub enum Event {
    Connected(Connection),
    Updated(Box<ViewerSnapshot>),
}

#[derive(Debug, Clone)]
pub struct Connection(mpsc::UnboundedSender<Request>);

impl Connection {
    pub fn send(&self, request: Request) {
        if self.0.send(request).is_err() {
            tracing::warn!("Viewer host is gone, request ignored");
        }
    }
}

/// Start the viewer host and stream its events.
pub fn connect(config: ViewerConfig, entitlements: Entitlements) -> impl Stream<Item = Event> {
    iced::stream::channel(100, move |mut output| async move {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();

        let spawned = std::thread::Builder::new()
            .name("viewer-host".to_string())
            .spawn(move || host(config, entitlements, requests_rx, updates_tx));
        if let Err(e) = spawned {
            tracing::error!("Failed to start viewer host: {}", e);
            return;
        }

        if output.send(Event::Connected(Connection(requests_tx))).await.is_err() {
            return;
        }
        while let Some(snapshot) = updates_rx.recv().await {
            if output.send(Event::Updated(Box::new(snapshot))).await.is_err() {
                break;
            }
        }
    })
}

fn host(
    config: ViewerConfig,
    entitlements: Entitlements,
    requests: mpsc::UnboundedReceiver<Request>,
    updates: mpsc::UnboundedSender<ViewerSnapshot>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to build viewer runtime: {}", e);
            return;
        }
    };
    let shell = ViewerShell::new(PdfiumDecoder::new(), config).with_entitlements(entitlements);
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, serve(shell, requests, updates));
}

/// Serve requests until the UI side hangs up. Must run inside a `LocalSet`.
///
/// A snapshot is published after open and close, and after each command
/// that actually rendered. No-op and dropped commands publish nothing.
async fn serve<Dec>(
    shell: ViewerShell<Dec>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    updates: mpsc::UnboundedSender<ViewerSnapshot>,
) where
    Dec: DocumentDecoder + 'static,
    Dec::Document: 'static,
{
    let (rendered_tx, mut rendered_rx) = mpsc::unbounded_channel::<()>();
    let publish = |snapshot: ViewerSnapshot| {
        let _ = updates.send(snapshot);
    };

    loop {
        tokio::select! {
            request = requests.recv() => match request {
                None => break,
                Some(Request::Open(document)) => {
                    publish(loading(&document));
                    shell.open_viewer(&document).await;
                    publish(shell.snapshot());
                }
                Some(Request::Close) => {
                    shell.close_viewer();
                    publish(shell.snapshot());
                }
                Some(Request::Input(event)) => {
                    if let Some(routed) = shell.handle_input(event) {
                        if routed.prevent_default {
                            tracing::trace!("{:?} consumed", event);
                        }
                        spawn_command(&shell, routed.command, rendered_tx.clone());
                    }
                }
            },
            Some(()) = rendered_rx.recv() => publish(shell.snapshot()),
        }
    }
    tracing::debug!("Viewer host stopped");
}

/// Run a command as its own task so further input can reach the render guard
/// (and be dropped) while the render is in flight.
fn spawn_command<Dec>(
    shell: &ViewerShell<Dec>,
    command: NavigationCommand,
    rendered: mpsc::UnboundedSender<()>,
) where
    Dec: DocumentDecoder,
    Dec::Document: 'static,
{
    let Some(navigator) = shell.navigator() else {
        return;
    };
    tokio::task::spawn_local(async move {
        if let Transition::Render(_) = navigator.dispatch(command).await {
            let _ = rendered.send(());
        }
    });
}

fn loading(document: &DocumentRef) -> ViewerSnapshot {
    ViewerSnapshot {
        status: ViewerStatus::Loading,
        title: Some(document.title.clone()),
        indicator: None,
        surfaces: SurfacePair::new(),
        message: None,
        rendering: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celib_reader_core::test_support::ScriptedDecoder;
    use celib_reader_core::Key;
    use pretty_assertions::assert_eq;

    fn book() -> DocumentRef {
        DocumentRef::new("b1", "Sample", "sample.pdf")
    }

    #[tokio::test]
    async fn publishes_only_when_the_spread_changes() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let shell = ViewerShell::new(ScriptedDecoder::with_pages(4), ViewerConfig::default());
                let (requests_tx, requests_rx) = mpsc::unbounded_channel();
                let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
                let host = tokio::task::spawn_local(serve(shell, requests_rx, updates_tx));

                requests_tx.send(Request::Open(book())).unwrap();
                assert_eq!(updates_rx.recv().await.unwrap().status, ViewerStatus::Loading);
                assert_eq!(updates_rx.recv().await.unwrap().status, ViewerStatus::Ready);

                requests_tx.send(Request::Input(InputEvent::Key(Key::ArrowRight))).unwrap();
                let rendered = updates_rx.recv().await.unwrap();
                assert_eq!(rendered.indicator.unwrap().text, "Pages 3-4 of 4");

                // already on the last spread
                requests_tx.send(Request::Input(InputEvent::Key(Key::ArrowRight))).unwrap();
                requests_tx.send(Request::Close).unwrap();
                assert_eq!(updates_rx.recv().await.unwrap().status, ViewerStatus::Closed);

                drop(requests_tx);
                host.await.unwrap();
                assert!(updates_rx.recv().await.is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn input_before_open_publishes_nothing() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let shell = ViewerShell::new(ScriptedDecoder::with_pages(4), ViewerConfig::default());
                let (requests_tx, requests_rx) = mpsc::unbounded_channel();
                let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
                let host = tokio::task::spawn_local(serve(shell, requests_rx, updates_tx));

                requests_tx.send(Request::Input(InputEvent::Key(Key::Space))).unwrap();
                drop(requests_tx);
                host.await.unwrap();

                assert!(updates_rx.recv().await.is_none());
            })
            .await;
    }
}
