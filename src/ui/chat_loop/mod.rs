//! Main chat event loop.
//!
//! Terminal input is read on a blocking thread and forwarded over a channel.
//! Accepted submissions are completed on a spawned task so the loop keeps
//! drawing the pending indicator while the endpoint works.

pub mod lifecycle;

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tui_textarea::Input as TAInput;

use crate::core::config::Config;
use crate::core::endpoint::HttpEndpoint;
use crate::core::exchange::{ExchangeController, PendingExchange, SubmitOutcome};
use crate::core::transcript::TranscriptStore;
use crate::ui::fault_boundary::FaultBoundary;
use crate::ui::renderer::ChatView;
use crate::ui::theme::Theme;

use self::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

const TICK: Duration = Duration::from_millis(120);
const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    /// `None` when the exchange task died before producing an outcome.
    ExchangeFinished(Option<SubmitOutcome>),
}

/// What the loop should do after a key press.
pub enum KeyOutcome {
    Quit,
    Redraw,
    Submitted(PendingExchange),
    Ignored,
}

pub async fn run_chat(config: Config) -> Result<(), Box<dyn Error>> {
    let store = TranscriptStore::shared();
    let endpoint = HttpEndpoint::from_config(&config);
    info!(endpoint = endpoint.url(), "Starting chat session");
    let controller = ExchangeController::new(Arc::clone(&store), Arc::new(endpoint));
    let mut boundary = FaultBoundary::new(ChatView::new(config.title(), Theme::from_env()));

    let mut terminal = setup_terminal()?;

    let cancel = CancellationToken::new();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let reader = spawn_event_reader(event_tx.clone(), cancel.clone());

    let result = event_loop(
        &mut terminal,
        &mut boundary,
        &controller,
        event_tx,
        event_rx,
    )
    .await;

    cancel.cancel();
    let _ = reader.await;
    restore_terminal(&mut terminal)?;
    info!(messages = store.len(), "Chat session ended");
    result
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    boundary: &mut FaultBoundary<ChatView>,
    controller: &ExchangeController,
    event_tx: mpsc::UnboundedSender<UiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    let store = Arc::clone(controller.store());
    let mut tick = tokio::time::interval(TICK);
    let mut request_redraw = true;
    let mut drawn_pending = store.is_pending();

    loop {
        if request_redraw {
            terminal.draw(|f| boundary.draw(f, &store))?;
            drawn_pending = store.is_pending();
            request_redraw = false;
        }

        tokio::select! {
            maybe_event = event_rx.recv() => {
                let Some(ui_event) = maybe_event else {
                    return Ok(());
                };
                match ui_event {
                    UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        match handle_key(boundary, controller, key) {
                            KeyOutcome::Quit => return Ok(()),
                            KeyOutcome::Redraw => request_redraw = true,
                            KeyOutcome::Submitted(exchange) => {
                                spawn_exchange(exchange, event_tx.clone());
                                request_redraw = true;
                            }
                            KeyOutcome::Ignored => {}
                        }
                    }
                    UiEvent::Crossterm(Event::Paste(text)) => {
                        request_redraw = handle_paste(boundary, &store, &text);
                    }
                    UiEvent::Crossterm(Event::Resize(_, _)) => request_redraw = true,
                    UiEvent::Crossterm(_) => {}
                    UiEvent::ExchangeFinished(outcome) => {
                        debug!(?outcome, "Exchange finished");
                        request_redraw = true;
                    }
                }
            }
            _ = tick.tick() => {
                // Animate the indicator, and catch a pending flag released
                // by a task that never reported back.
                if store.is_pending() || store.is_pending() != drawn_pending {
                    request_redraw = true;
                }
            }
        }
    }
}

/// Route one key press to the surface or the exchange controller.
pub fn handle_key(
    boundary: &mut FaultBoundary<ChatView>,
    controller: &ExchangeController,
    key: KeyEvent,
) -> KeyOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d')) {
        return KeyOutcome::Quit;
    }

    // A faulted surface no longer accepts input.
    if boundary.is_faulted() {
        return KeyOutcome::Ignored;
    }

    let pending = controller.store().is_pending();
    let view = boundary.inner_mut();

    match key.code {
        KeyCode::PageUp => {
            let rows = view.page_rows();
            view.scroll_up(rows);
            KeyOutcome::Redraw
        }
        KeyCode::PageDown => {
            let rows = view.page_rows();
            view.scroll_down(rows);
            KeyOutcome::Redraw
        }
        KeyCode::End if ctrl => {
            view.scroll_to_bottom();
            KeyOutcome::Redraw
        }
        _ if pending => KeyOutcome::Ignored,
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
        {
            view.input_mut().insert_newline();
            KeyOutcome::Redraw
        }
        KeyCode::Enter => match controller.accept(&view.draft()) {
            Some(exchange) => {
                view.clear_draft();
                view.scroll_to_bottom();
                KeyOutcome::Submitted(exchange)
            }
            None => KeyOutcome::Ignored,
        },
        _ => {
            if view.input_mut().input(TAInput::from(key)) {
                KeyOutcome::Redraw
            } else {
                KeyOutcome::Ignored
            }
        }
    }
}

fn handle_paste(
    boundary: &mut FaultBoundary<ChatView>,
    store: &TranscriptStore,
    text: &str,
) -> bool {
    if boundary.is_faulted() || store.is_pending() {
        return false;
    }
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    boundary.inner_mut().input_mut().insert_str(normalized)
}

fn spawn_exchange(exchange: PendingExchange, event_tx: mpsc::UnboundedSender<UiEvent>) {
    tokio::spawn(async move {
        let outcome = match tokio::spawn(exchange.complete()).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                error!(error = %err, "Exchange task aborted");
                None
            }
        };
        let _ = event_tx.send(UiEvent::ExchangeFinished(outcome));
    });
}

fn spawn_event_reader(
    event_tx: mpsc::UnboundedSender<UiEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(err) => debug!(error = %err, "Failed to read terminal event"),
                },
                Ok(false) => {}
                Err(err) => {
                    error!(error = %err, "Terminal event polling failed");
                    break;
                }
            }
        }
    })
}
