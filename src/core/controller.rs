//! # Conversation Controller
//!
//! Owns the [`Session`], talks to the [`Transport`], and applies the step/lock
//! transitions:
//!
//! ```text
//!  (step, locked)       input           effect
//!  ───────────────      ─────           ──────
//!  (_, false)           submit(text)    transport(text, step) → step := reply.step,
//!                                       locked := reply has link
//!  (2, false)           confirm(Yes)    same as submit("YES")
//!  (2, false)           confirm(No)     local only: User("No") + ack, step := 1
//!  (_, true)            anything        rejected with SubmitError::Locked
//! ```
//!
//! One exchange runs at a time. A second call while the first awaits the
//! transport is rejected with [`SubmitError::Busy`]. The user turn and the
//! assistant turn are appended together, under one lock, after the transport
//! call has finished. If the `submit` future is dropped before that (task
//! aborted, caller gave up) nothing is appended and the busy flag is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::core::config::ResolvedConfig;
use crate::core::segment;
use crate::core::session::{CONFIRM_STEP, INITIAL_STEP, Session, Turn};
use crate::transport::{Transport, TransportError};

/// Message sent to the server when the user confirms.
pub const CONFIRM_MESSAGE: &str = "YES";
/// User turn recorded when the user declines.
pub const DECLINE_MESSAGE: &str = "No";
/// Assistant turn recorded when the user declines.
pub const DECLINE_ACKNOWLEDGEMENT: &str = "I understand. What else would you like to adjust?";
/// Assistant turn recorded when the transport fails.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Error connecting to the server.";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Answer to a Yes/No prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

/// Operations the controller refused to start. History is untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("the session is complete; no further input is accepted")]
    Locked,
    #[error("an exchange is already in progress")]
    Busy,
    #[error("no confirmation is pending (step {step})")]
    NotAwaitingConfirmation { step: i64 },
}

/// How an accepted operation ended.
#[derive(Debug)]
pub enum Outcome {
    /// The server replied; the session moved to `step` and may now be locked.
    Replied { step: i64, locked: bool },
    /// The transport failed; a fallback turn was recorded, step/lock unchanged.
    Failed(TransportError),
    /// The user declined locally; the session went back to the first step.
    Declined,
}

struct State {
    session: Session,
    draft: String,
}

/// Releases the in-flight flag when dropped, including on cancellation.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ConversationController {
    transport: Arc<dyn Transport>,
    state: Mutex<State>,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl ConversationController {
    pub fn new(transport: Arc<dyn Transport>, welcome: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            state: Mutex::new(State {
                session: Session::new(welcome),
                draft: String::new(),
            }),
            in_flight: AtomicBool::new(false),
            timeout,
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &ResolvedConfig) -> Self {
        Self::new(transport, config.welcome_message.clone(), config.timeout)
    }

    // The session is plain data and every mutation finishes under the lock,
    // so a poisoned mutex still holds a consistent value.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current session for rendering.
    pub fn snapshot(&self) -> Session {
        self.state().session.clone()
    }

    /// Whether an exchange is awaiting the transport right now.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn draft(&self) -> String {
        self.state().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state().draft = text.into();
    }

    /// Sends `text` to the service and records the exchange.
    ///
    /// Returns `Err` only when the call was refused up front. Transport
    /// failures are recovered into a fallback turn and reported as
    /// [`Outcome::Failed`].
    pub async fn submit(&self, text: &str) -> Result<Outcome, SubmitError> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            warn!("Submit rejected: exchange already in flight");
            return Err(SubmitError::Busy);
        };

        let step = {
            let state = self.state();
            if state.session.is_locked() {
                warn!("Submit rejected: session locked");
                return Err(SubmitError::Locked);
            }
            state.session.step()
        };

        Ok(self.exchange(text, step).await)
    }

    /// Answers the Yes/No prompt shown at the confirmation step.
    ///
    /// `Yes` goes through the transport exactly like `submit("YES")`. `No`
    /// never touches the network.
    pub async fn confirm(&self, choice: Choice) -> Result<Outcome, SubmitError> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            warn!("Confirm rejected: exchange already in flight");
            return Err(SubmitError::Busy);
        };

        let step = {
            let mut state = self.state();
            if state.session.is_locked() {
                return Err(SubmitError::Locked);
            }
            let step = state.session.step();
            if step != CONFIRM_STEP {
                warn!("Confirm rejected: step {} is not a confirmation step", step);
                return Err(SubmitError::NotAwaitingConfirmation { step });
            }
            if choice == Choice::No {
                state.session.record_exchange(
                    Turn::user(DECLINE_MESSAGE),
                    Turn::assistant_text(DECLINE_ACKNOWLEDGEMENT),
                );
                state.session.set_step(INITIAL_STEP);
                info!("User declined at step {}; back to step {}", step, INITIAL_STEP);
                return Ok(Outcome::Declined);
            }
            step
        };

        Ok(self.exchange(CONFIRM_MESSAGE, step).await)
    }

    /// Runs one transport round trip and commits its result.
    /// Callers must hold the in-flight flag.
    async fn exchange(&self, text: &str, step: i64) -> Outcome {
        debug!(
            "Exchange via {} at step {} ({} bytes)",
            self.transport.name(),
            step,
            text.len()
        );

        let result = match tokio::time::timeout(self.timeout, self.transport.send(text, step)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!("Transport timed out after {:?}", self.timeout);
                Err(TransportError::Timeout(self.timeout))
            }
        };

        let mut state = self.state();
        state.draft.clear();

        match result {
            Ok(reply) => {
                let completes = segment::contains_link(&reply.text);
                let segments = segment::parse(&reply.text);
                state
                    .session
                    .record_exchange(Turn::user(text), Turn::assistant_segments(segments));
                state.session.set_step(reply.step);
                if completes {
                    state.session.lock();
                }
                info!(
                    "Step {} -> {}{}",
                    step,
                    reply.step,
                    if completes { " (session complete)" } else { "" }
                );
                Outcome::Replied {
                    step: reply.step,
                    locked: completes,
                }
            }
            Err(e) => {
                warn!("Exchange failed at step {}: {}", step, e);
                state.session.record_exchange(
                    Turn::user(text),
                    Turn::assistant_text(TRANSPORT_FAILURE_MESSAGE),
                );
                Outcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::Segment;
    use crate::core::session::{InputAffordance, Speaker, TurnContent};
    use crate::test_support::{ScriptedTransport, controller_with};
    use crate::transport::Reply;

    fn reply(text: &str, step: i64) -> Result<Reply, TransportError> {
        Ok(Reply {
            text: text.to_string(),
            step,
        })
    }

    #[tokio::test]
    async fn submit_records_exchange_and_moves_step() {
        let transport = ScriptedTransport::new(vec![reply("Sounds good. Confirm?", 2)]);
        let controller = controller_with(transport.clone());

        let outcome = controller.submit("Build me a web app").await.unwrap();
        assert!(matches!(outcome, Outcome::Replied { step: 2, locked: false }));

        let session = controller.snapshot();
        let history = session.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], Turn::user("Build me a web app"));
        assert_eq!(
            history[2],
            Turn::assistant_segments(vec![Segment::TextLine {
                content: "Sounds good. Confirm?".to_string()
            }])
        );
        assert_eq!(session.step(), 2);
        assert!(!session.is_locked());
        assert_eq!(session.affordance(), InputAffordance::YesNo);
        assert_eq!(transport.calls(), vec![("Build me a web app".to_string(), 1)]);
    }

    #[tokio::test]
    async fn confirm_no_is_local_and_resets_step() {
        let transport = ScriptedTransport::new(vec![reply("Confirm?", 2)]);
        let controller = controller_with(transport.clone());
        controller.submit("idea").await.unwrap();

        let outcome = controller.confirm(Choice::No).await.unwrap();
        assert!(matches!(outcome, Outcome::Declined));

        let session = controller.snapshot();
        let history = session.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history[3], Turn::user(DECLINE_MESSAGE));
        assert_eq!(history[4], Turn::assistant_text(DECLINE_ACKNOWLEDGEMENT));
        assert_eq!(session.step(), INITIAL_STEP);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn confirm_yes_goes_through_transport() {
        let transport = ScriptedTransport::new(vec![
            reply("Confirm?", 2),
            reply("```yaml\nsrc:\n  - main.go\n```", 3),
        ]);
        let controller = controller_with(transport.clone());
        controller.submit("idea").await.unwrap();

        let outcome = controller.confirm(Choice::Yes).await.unwrap();
        assert!(matches!(outcome, Outcome::Replied { step: 3, locked: false }));
        assert_eq!(
            transport.calls()[1],
            (CONFIRM_MESSAGE.to_string(), CONFIRM_STEP)
        );

        let session = controller.snapshot();
        assert_eq!(session.history()[3], Turn::user(CONFIRM_MESSAGE));
        assert_eq!(session.affordance(), InputAffordance::FreeText);
    }

    #[tokio::test]
    async fn confirm_outside_confirmation_step_is_rejected() {
        let transport = ScriptedTransport::new(vec![]);
        let controller = controller_with(transport.clone());

        let err = controller.confirm(Choice::No).await.unwrap_err();
        assert_eq!(err, SubmitError::NotAwaitingConfirmation { step: 1 });
        assert_eq!(controller.snapshot().history().len(), 1);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn link_locks_the_session() {
        let transport = ScriptedTransport::new(vec![reply(
            "Created. <a href='http://x'>here</a>",
            4,
        )]);
        let controller = controller_with(transport.clone());

        let outcome = controller.submit("YES").await.unwrap();
        assert!(matches!(outcome, Outcome::Replied { step: 4, locked: true }));

        let session = controller.snapshot();
        assert!(session.is_locked());
        assert_eq!(session.affordance(), InputAffordance::Disabled);
        let TurnContent::Segments(segments) = &session.history()[2].content else {
            panic!("expected segmented assistant turn");
        };
        assert_eq!(
            segments.last(),
            Some(&Segment::Link {
                url: "http://x".to_string(),
                label: "here".to_string()
            })
        );
    }

    #[tokio::test]
    async fn locked_session_rejects_everything() {
        let transport = ScriptedTransport::new(vec![reply("<a href='http://x'>here</a>", 2)]);
        let controller = controller_with(transport.clone());
        controller.submit("go").await.unwrap();
        let before = controller.snapshot();

        assert_eq!(controller.submit("more").await.unwrap_err(), SubmitError::Locked);
        assert_eq!(controller.confirm(Choice::Yes).await.unwrap_err(), SubmitError::Locked);
        assert_eq!(controller.confirm(Choice::No).await.unwrap_err(), SubmitError::Locked);

        assert_eq!(controller.snapshot(), before);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_records_fallback_and_keeps_state() {
        let transport = ScriptedTransport::new(vec![
            reply("Confirm?", 2),
            Err(TransportError::Network("connection refused".to_string())),
        ]);
        let controller = controller_with(transport.clone());
        controller.submit("idea").await.unwrap();

        let outcome = controller.confirm(Choice::Yes).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(TransportError::Network(_))));

        let session = controller.snapshot();
        let history = session.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history[3], Turn::user(CONFIRM_MESSAGE));
        assert_eq!(history[4], Turn::assistant_text(TRANSPORT_FAILURE_MESSAGE));
        assert_eq!(session.step(), 2);
        assert!(!session.is_locked());
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn controller_is_usable_after_failure() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            reply("Better now", 2),
        ]);
        let controller = controller_with(transport.clone());

        assert!(matches!(
            controller.submit("first").await.unwrap(),
            Outcome::Failed(_)
        ));
        assert!(matches!(
            controller.submit("first").await.unwrap(),
            Outcome::Replied { step: 2, .. }
        ));
        assert_eq!(transport.calls(), vec![("first".to_string(), 1), ("first".to_string(), 1)]);
    }

    #[tokio::test]
    async fn draft_is_cleared_on_success_and_failure_but_not_on_rejection() {
        let transport = ScriptedTransport::new(vec![
            reply("ok", 1),
            Err(TransportError::Payload("bad".to_string())),
            reply("<a href='http://x'>done</a>", 1),
        ]);
        let controller = controller_with(transport);

        controller.set_draft("one");
        controller.submit("one").await.unwrap();
        assert_eq!(controller.draft(), "");

        controller.set_draft("two");
        controller.submit("two").await.unwrap();
        assert_eq!(controller.draft(), "");

        controller.submit("three").await.unwrap();
        controller.set_draft("four");
        controller.submit("four").await.unwrap_err();
        assert_eq!(controller.draft(), "four");
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected_as_busy() {
        let (transport, gate) = ScriptedTransport::gated(vec![reply("first", 2)]);
        let controller = controller_with(transport.clone());

        let mut first = tokio_test::task::spawn(controller.submit("first"));
        tokio_test::assert_pending!(first.poll());
        assert!(controller.is_busy());

        assert_eq!(controller.submit("second").await.unwrap_err(), SubmitError::Busy);
        assert_eq!(controller.confirm(Choice::No).await.unwrap_err(), SubmitError::Busy);
        assert_eq!(controller.snapshot().history().len(), 1);

        gate.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, Outcome::Replied { step: 2, .. }));
        assert!(!controller.is_busy());
        assert_eq!(controller.snapshot().history().len(), 3);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn dropped_submit_appends_nothing() {
        let (transport, _gate) = ScriptedTransport::gated(vec![reply("never", 2)]);
        let controller = controller_with(transport);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), controller.submit("hello")).await;
        assert!(abandoned.is_err());

        let session = controller.snapshot();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.step(), INITIAL_STEP);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn timeout_becomes_transport_failure() {
        let (transport, _gate) = ScriptedTransport::gated(vec![reply("late", 2)]);
        let controller = ConversationController::new(transport, "hi", Duration::from_millis(20));

        let outcome = controller.submit("hello").await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(TransportError::Timeout(_))));

        let session = controller.snapshot();
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[2].speaker, Speaker::Assistant);
        assert_eq!(session.history()[2], Turn::assistant_text(TRANSPORT_FAILURE_MESSAGE));
        assert_eq!(session.step(), INITIAL_STEP);
    }

    #[tokio::test]
    async fn reply_rendering_nothing_still_records_turn() {
        let transport = ScriptedTransport::new(vec![reply("   ", 1)]);
        let controller = controller_with(transport);

        controller.submit("hm").await.unwrap();
        let session = controller.snapshot();
        assert_eq!(session.history()[2], Turn::assistant_segments(vec![]));
    }
}
