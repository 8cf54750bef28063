//! The chat session state machine.
//!
//! ```text
//! Idle -> Sending -> Streaming -> Idle
//!            \           \
//!             `-----------`-> Errored -> Idle
//! ```
//!
//! One turn may be in flight per session. Every way out of a turn, including
//! dropping the `submit` future, goes through [`TurnGuard`], which resets the
//! turn and releases the in-flight flag.

use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use super::message::Message;
use super::observer::SessionObserver;
use super::router::{CommandRouter, Route};
use crate::agent::{Agent, AgentProfile, AgentRoster, Command};
use crate::error::{ChatError, Result};
use crate::transport::{ChatRequest, TransportClient, decode_stream};

/// Lifecycle position of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
    Streaming,
    Errored,
}

/// The turn currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub input_text: String,
    pub route: Route,
    pub accumulated_text: String,
    pub state: TurnState,
}

/// What `submit` did with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Another turn is in flight; nothing happened.
    Busy,
    /// The turn completed; the reply was appended.
    Replied(Message),
    /// The turn failed; the error entry was appended.
    Failed(Message),
}

struct ActiveTurn {
    turn: Turn,
    abort: CancellationToken,
}

/// A conversation with the configured agents.
///
/// Methods take `&self`, so the session can be shared (`Arc`) between the
/// task driving [`submit`](Self::submit) and a UI calling
/// [`cancel`](Self::cancel).
pub struct ChatSession {
    router: CommandRouter,
    transport: TransportClient,
    roster: Mutex<AgentRoster>,
    history: Mutex<Vec<Message>>,
    active: Mutex<Option<ActiveTurn>>,
    in_flight: AtomicBool,
    observers: Mutex<Vec<Arc<dyn SessionObserver>>>,
}

impl ChatSession {
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if an agent in the roster has no
    /// endpoint.
    pub fn new(
        router: CommandRouter,
        transport: TransportClient,
        roster: AgentRoster,
    ) -> Result<Self> {
        if let Some(agent) = roster
            .profiles()
            .iter()
            .find(|p| router.endpoints().get(&p.id).is_none())
        {
            return Err(ChatError::Config(format!(
                "agent '{}' has no endpoint",
                agent.id
            )));
        }

        Ok(Self {
            router,
            transport,
            roster: Mutex::new(roster),
            history: Mutex::new(Vec::new()),
            active: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
        })
    }

    /// Registers an observer for this session only.
    pub fn add_observer(&self, observer: Arc<dyn SessionObserver>) {
        lock(&self.observers).push(observer);
    }

    /// Runs one turn for `input`.
    ///
    /// Never fails: transport and decoding errors become an error entry in
    /// the transcript and [`TurnOutcome::Failed`].
    pub async fn submit(&self, input: &str) -> TurnOutcome {
        if input.trim().is_empty() {
            return TurnOutcome::Ignored;
        }
        // The flag flips and the turn becomes cancellable under one lock, so
        // `cancel` never sees an in-flight turn without its token.
        let (selected, route, abort) = {
            let mut active = lock(&self.active);
            if self
                .in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                tracing::debug!("turn in flight, submit rejected");
                return TurnOutcome::Busy;
            }

            let selected = self.selected_agent_id();
            let route = self.router.resolve(input, &selected);
            let abort = CancellationToken::new();
            if let Ok(route) = &route {
                *active = Some(ActiveTurn {
                    turn: Turn {
                        input_text: input.to_string(),
                        route: route.clone(),
                        accumulated_text: String::new(),
                        state: TurnState::Sending,
                    },
                    abort: abort.clone(),
                });
            }
            (selected, route, abort)
        };
        let guard = TurnGuard { session: self };

        let model_id = route
            .as_ref()
            .map_or_else(|_| selected.clone(), |r| r.agent_id.clone());

        self.append(Message::user(input, Some(model_id.clone())));

        let result = match route {
            Ok(route) => self.run_turn(input, &route, abort).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(content) => {
                let reply = Message::assistant(content, Some(model_id));
                self.append(reply.clone());
                drop(guard);

                tracing::info!(agent = ?reply.model_id(), chars = reply.content().len(), "turn completed");
                for observer in self.observers() {
                    observer.on_progress(reply.content(), true);
                    observer.on_complete(&reply);
                }
                TurnOutcome::Replied(reply)
            }
            Err(error) => {
                self.set_state(TurnState::Errored);
                let entry = Message::error(&error, Some(model_id));
                self.append(entry.clone());
                drop(guard);

                tracing::info!(%error, "turn failed");
                for observer in self.observers() {
                    observer.on_error(&error, &entry);
                }
                TurnOutcome::Failed(entry)
            }
        }
    }

    async fn run_turn(&self, input: &str, route: &Route, abort: CancellationToken) -> Result<String> {
        let request = ChatRequest {
            message: input.to_string(),
            model: route.agent_id.clone(),
            system_prompt: route.system_prompt.clone(),
        };
        tracing::debug!(endpoint = %route.endpoint, "sending");

        let response = self.transport.open(&route.endpoint, &request, abort).await?;
        let chunks = response
            .into_chunks()
            .inspect_ok(|_| self.set_state(TurnState::Streaming));
        let mut fragments = pin!(decode_stream(chunks));
        let mut accumulated = String::new();

        while let Some(fragment) = fragments.next().await {
            self.progress(&mut accumulated, &fragment?);
        }

        if accumulated.is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(accumulated)
    }

    fn progress(&self, accumulated: &mut String, fragment: &str) {
        accumulated.push_str(fragment);
        if let Some(active) = lock(&self.active).as_mut() {
            active.turn.accumulated_text.clone_from(accumulated);
        }
        for observer in self.observers() {
            observer.on_progress(accumulated, false);
        }
    }

    /// Aborts the turn in flight. Returns `false` if there is none.
    pub fn cancel(&self) -> bool {
        lock(&self.active).as_ref().is_some_and(|active| {
            active.abort.cancel();
            true
        })
    }

    /// Snapshot of the transcript, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.history).clone()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> TurnState {
        match lock(&self.active).as_ref() {
            Some(active) => active.turn.state,
            None if self.is_processing() => TurnState::Sending,
            None => TurnState::Idle,
        }
    }

    /// Copy of the turn in flight.
    pub fn current_turn(&self) -> Option<Turn> {
        lock(&self.active).as_ref().map(|active| active.turn.clone())
    }

    /// Text streamed so far in the turn in flight.
    pub fn partial_text(&self) -> Option<String> {
        lock(&self.active)
            .as_ref()
            .map(|active| active.turn.accumulated_text.clone())
    }

    pub fn agents(&self) -> Vec<Agent> {
        lock(&self.roster).agents()
    }

    pub fn selected_agent(&self) -> AgentProfile {
        lock(&self.roster).selected().clone()
    }

    fn selected_agent_id(&self) -> String {
        lock(&self.roster).selected_id().to_string()
    }

    /// Makes `id` the selected agent by replacing the roster snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::UnknownAgent`] if `id` is not in the roster.
    pub fn select_agent(&self, id: &str) -> Result<()> {
        let mut roster = lock(&self.roster);
        let next = roster.select(id)?;
        *roster = next;
        tracing::debug!(agent = %id, "agent selected");
        Ok(())
    }

    pub fn commands(&self) -> Vec<Command> {
        self.router.commands().iter().cloned().collect()
    }

    /// Palette suggestions for `term`.
    pub fn suggest(&self, term: &str) -> Vec<Command> {
        self.router
            .commands()
            .suggest(term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub const fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub const fn transport(&self) -> &TransportClient {
        &self.transport
    }

    fn append(&self, message: Message) {
        lock(&self.history).push(message);
    }

    fn set_state(&self, state: TurnState) {
        if let Some(active) = lock(&self.active).as_mut()
            && active.turn.state != state
        {
            tracing::debug!(from = ?active.turn.state, to = ?state, "turn state");
            active.turn.state = state;
        }
    }

    fn observers(&self) -> Vec<Arc<dyn SessionObserver>> {
        lock(&self.observers).clone()
    }
}

/// Resets the turn and releases the in-flight flag on drop.
struct TurnGuard<'a> {
    session: &'a ChatSession,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        let mut active = lock(&self.session.active);
        active.take();
        self.session.in_flight.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
