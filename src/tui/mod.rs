//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the session
//! and translates keyboard events into controller calls.
//!
//! This is the only module that knows about ratatui and crossterm. Core never
//! produces markup; the front end reads `Session` snapshots and
//! `Session::affordance()` to decide what to draw.
//!
//! ## Exchanges
//!
//! `submit`/`confirm` run on a spawned tokio task so the event loop keeps
//! drawing. The result comes back over a `std::sync::mpsc` channel and is
//! drained once per loop iteration. Esc aborts the task; dropping the
//! controller future mid-await records nothing.
//!
//! ## Redraw Strategy
//!
//! - **Exchange in flight**: draws every ~80ms to animate the pending turn.
//! - **Idle**: sleeps up to 500ms, only redraws on events or finished exchanges.

mod component;
mod components;
mod event;
mod highlight;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::task::AbortHandle;

use crate::core::config::ResolvedConfig;
use crate::core::controller::{
    CONFIRM_MESSAGE, Choice, ConversationController, DECLINE_MESSAGE, Outcome, SubmitError,
};
use crate::core::session::{InputAffordance, Turn};
use crate::transport::HttpTransport;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ChoiceBar, ChoiceEvent, InputBox, InputEvent, TurnListState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const WAITING_STATUS: &str = "Waiting for server…";
const CANCELLED_STATUS: &str = "Cancelled";
const COMPLETE_STATUS: &str = "Session complete";

type ExchangeResult = Result<Outcome, SubmitError>;

/// What the user asked the controller to do.
#[derive(Debug, Clone)]
enum Request {
    Submit(String),
    Confirm(Choice),
}

impl Request {
    /// Text shown as the provisional user turn while the request is in flight.
    fn pending_text(&self) -> &str {
        match self {
            Request::Submit(text) => text,
            Request::Confirm(Choice::Yes) => CONFIRM_MESSAGE,
            Request::Confirm(Choice::No) => DECLINE_MESSAGE,
        }
    }
}

/// TUI-specific presentation state (not part of the conversation core)
pub struct TuiState {
    pub turn_list: TurnListState,
    pub input_box: InputBox,
    pub choice_bar: ChoiceBar,
    /// User turn of the exchange in flight
    pub pending: Option<Turn>,
    pub status: String,
    pub pulse_value: f32,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            turn_list: TurnListState::new(),
            input_box: InputBox::new(),
            choice_bar: ChoiceBar::new(),
            pending: None,
            status: String::new(),
            pulse_value: 0.0,
        }
    }

    fn set_busy(&mut self, busy: bool) {
        self.input_box.read_only = busy;
        self.choice_bar.read_only = busy;
    }
}

/// Status line text after an exchange finished.
fn status_for(result: &ExchangeResult) -> String {
    match result {
        Ok(Outcome::Replied { locked: true, .. }) => COMPLETE_STATUS.to_string(),
        Ok(Outcome::Replied { step, .. }) => format!("Step {step}"),
        Ok(Outcome::Failed(e)) => format!("Error: {e}"),
        Ok(Outcome::Declined) => String::new(),
        Err(e) => e.to_string(),
    }
}

/// An aborted exchange releases the controller only once its task is dropped,
/// so a fresh request waits for both the handle and the controller to be idle.
fn can_start_exchange(active: Option<&AbortHandle>, controller: &ConversationController) -> bool {
    active.is_none() && !controller.is_busy()
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol allows Shift+Enter detection; terminals
        // that lack it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let transport = Arc::new(HttpTransport::new(config.base_url.clone()));
    let controller = Arc::new(ConversationController::from_config(transport, &config));
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    info!("TUI started");

    // Finished exchanges from background tasks
    let (tx, rx) = mpsc::channel::<ExchangeResult>();
    let mut active_exchange: Option<AbortHandle> = None;

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        let session = controller.snapshot();
        let busy = !can_start_exchange(active_exchange.as_ref(), &controller);
        if busy || busy != tui.input_box.read_only {
            needs_redraw = true;
        }
        tui.set_busy(busy);

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 5.0).sin() * 0.5 + 0.5;
            terminal.draw(|f| ui::draw_ui(f, &session, &config, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if busy {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let request = match event {
                TuiEvent::Resize => None,
                TuiEvent::ForceQuit => {
                    should_quit = true;
                    break;
                }
                TuiEvent::Escape => {
                    if let Some(handle) = active_exchange.take() {
                        handle.abort();
                        info!("Exchange cancelled by user");
                        tui.pending = None;
                        tui.status = CANCELLED_STATUS.to_string();
                        // Inputs stay locked until the aborted task lets go of the controller
                        tui.set_busy(true);
                    }
                    None
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.turn_list.handle_event(&event);
                    None
                }
                _ => match session.affordance() {
                    InputAffordance::FreeText => match tui.input_box.handle_event(&event) {
                        Some(InputEvent::Submit(text)) => {
                            let text = text.trim();
                            (!text.is_empty()).then(|| Request::Submit(text.to_string()))
                        }
                        Some(InputEvent::ContentChanged) => {
                            controller.set_draft(tui.input_box.text());
                            None
                        }
                        None => None,
                    },
                    InputAffordance::YesNo => match tui.choice_bar.handle_event(&event) {
                        Some(ChoiceEvent::Confirm(choice)) => Some(Request::Confirm(choice)),
                        None => None,
                    },
                    InputAffordance::Disabled => None,
                },
            };

            if let Some(request) = request
                && can_start_exchange(active_exchange.as_ref(), &controller)
            {
                tui.pending = Some(Turn::user(request.pending_text()));
                tui.status = WAITING_STATUS.to_string();
                tui.turn_list.stick_to_bottom = true;
                tui.set_busy(true);
                active_exchange = Some(spawn_exchange(controller.clone(), request, tx.clone()));
            }
        }

        if should_quit {
            break;
        }

        while let Ok(result) = rx.try_recv() {
            needs_redraw = true;
            debug!("Exchange finished: {:?}", result);
            active_exchange = None;
            tui.pending = None;
            if matches!(result, Ok(Outcome::Replied { .. }) | Ok(Outcome::Declined)) {
                tui.choice_bar = ChoiceBar::new();
            }
            tui.input_box.set_text(controller.draft());
            tui.status = status_for(&result);
            tui.turn_list.stick_to_bottom = true;
        }
    }

    if let Some(handle) = active_exchange.take() {
        handle.abort();
    }
    info!("TUI shutting down");
    ratatui::restore();
    Ok(())
}

fn spawn_exchange(
    controller: Arc<ConversationController>,
    request: Request,
    tx: mpsc::Sender<ExchangeResult>,
) -> AbortHandle {
    info!("Spawning exchange: {:?}", request);
    let handle = tokio::spawn(async move {
        let result = match request {
            Request::Submit(text) => controller.submit(&text).await,
            Request::Confirm(choice) => controller.confirm(choice).await,
        };
        if tx.send(result).is_err() {
            warn!("Failed to deliver exchange result: receiver dropped");
        }
    });
    handle.abort_handle()
}
