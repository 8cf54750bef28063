#![allow(clippy::unwrap_used)]
//! Session scenarios driven through the public API.
//!
//! A scripted backend stands in for the network so each test controls
//! exactly when chunks arrive and can count the requests made.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use agentchat::agent::{AgentRoster, prompts};
use agentchat::error::{ChatError, Result};
use agentchat::session::{
    ChatSession, CommandRouter, Role, SessionEvent, TurnOutcome, TurnState,
};
use agentchat::transport::{Backend, ByteStream, ChatRequest, TransportClient};

enum Reply {
    Chunks(Vec<&'static str>),
    Live(mpsc::UnboundedReceiver<Result<Bytes>>),
    Stalled,
    Status(u16, &'static str),
}

#[derive(Default)]
struct Scripted {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, ChatRequest)>>,
}

impl Scripted {
    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn calls(&self) -> Vec<(String, ChatRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for Scripted {
    async fn post(&self, endpoint: &str, request: &ChatRequest) -> Result<ByteStream> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), request.clone()));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Chunks(vec![]));

        match reply {
            Reply::Chunks(chunks) => {
                let chunks: Vec<Result<Bytes>> =
                    chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
                Ok(Box::pin(stream::iter(chunks)))
            }
            Reply::Live(rx) => Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            }))),
            Reply::Stalled => Ok(Box::pin(stream::pending::<Result<Bytes>>())),
            Reply::Status(status, body) => Err(ChatError::HttpStatus {
                status,
                body: body.to_string(),
            }),
        }
    }
}

fn setup() -> (Arc<ChatSession>, Arc<Scripted>) {
    let backend = Arc::new(Scripted::default());
    let transport = TransportClient::new(backend.clone());
    let session =
        ChatSession::new(CommandRouter::builtin(), transport, AgentRoster::builtin()).unwrap();
    (Arc::new(session), backend)
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_ioc_command_end_to_end() {
    let (session, backend) = setup();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    session.add_observer(Arc::new(events_tx));
    backend.push(Reply::Chunks(vec!["data: ## IOC\n", "data: ...\n"]));

    let outcome = session.submit("/ioc Emotet").await;

    let TurnOutcome::Replied(reply) = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert_eq!(reply.content(), "## IOC...");
    assert_eq!(reply.model_id(), Some("theta"));

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role(), Role::User);
    assert_eq!(messages[0].content(), "/ioc Emotet");
    assert_eq!(messages[1], reply);

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/theta");
    assert_eq!(calls[0].1.message, "/ioc Emotet");
    assert_eq!(calls[0].1.model, "theta");
    assert_eq!(calls[0].1.system_prompt.as_deref(), Some(prompts::IOC));

    let mut progress = Vec::new();
    while let Ok(event) = events.try_recv() {
        progress.push(event);
    }
    assert_eq!(
        progress,
        vec![
            SessionEvent::Progress {
                partial: "## IOC".to_string(),
                is_complete: false
            },
            SessionEvent::Progress {
                partial: "## IOC...".to_string(),
                is_complete: false
            },
            SessionEvent::Progress {
                partial: "## IOC...".to_string(),
                is_complete: true
            },
            SessionEvent::Completed(reply),
        ]
    );
}

#[tokio::test]
async fn test_submit_while_streaming_is_rejected() {
    let (session, backend) = setup();
    let (tx, rx) = mpsc::unbounded_channel();
    backend.push(Reply::Live(rx));
    tx.send(Ok(Bytes::from_static(b"data: ## IOC\n"))).unwrap();

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit("/ioc Emotet").await }
    });
    wait_for(|| session.partial_text().as_deref() == Some("## IOC")).await;

    assert!(session.is_processing());
    assert_eq!(session.state(), TurnState::Streaming);
    assert_eq!(session.submit("second question").await, TurnOutcome::Busy);
    assert_eq!(session.messages().len(), 1);
    assert_eq!(backend.calls().len(), 1);

    tx.send(Ok(Bytes::from_static(b"data: ...\n"))).unwrap();
    drop(tx);

    let outcome = first.await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Replied(ref m) if m.content() == "## IOC..."));
    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_empty_stream_is_an_error_entry() {
    let (session, backend) = setup();
    backend.push(Reply::Chunks(vec![": keep-alive\n", "event: ping\n\n"]));

    let outcome = session.submit("anything there?").await;

    let TurnOutcome::Failed(entry) = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert!(entry.is_error());
    assert_eq!(entry.content(), "Error: No response received from the model");

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert!(
        messages
            .iter()
            .all(|m| m.role() == Role::User || m.is_error())
    );
}

#[tokio::test(start_paused = true)]
async fn test_stalled_read_times_out() {
    let (session, backend) = setup();
    backend.push(Reply::Stalled);

    let outcome = session.submit("hello?").await;

    let TurnOutcome::Failed(entry) = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert_eq!(entry.content(), "Error: Request timed out after 5 minutes");
    assert!(!session.is_processing());
    assert_eq!(session.state(), TurnState::Idle);
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_timeout_is_honored() {
    let backend = Arc::new(Scripted::default());
    backend.push(Reply::Stalled);
    let transport = TransportClient::new(backend.clone()).with_timeout(Duration::from_secs(90));
    let session =
        ChatSession::new(CommandRouter::builtin(), transport, AgentRoster::builtin()).unwrap();

    let started = tokio::time::Instant::now();
    let outcome = session.submit("hello?").await;

    assert!(matches!(outcome, TurnOutcome::Failed(ref m) if m.content().ends_with("90s")));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(90) && elapsed < Duration::from_secs(91));
}

#[tokio::test]
async fn test_cancel_during_streaming() {
    let (session, backend) = setup();
    let (tx, rx) = mpsc::unbounded_channel();
    backend.push(Reply::Live(rx));
    tx.send(Ok(Bytes::from_static(b"data: partial answer\n")))
        .unwrap();

    let turn = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit("/pentest web app").await }
    });
    wait_for(|| session.partial_text().is_some_and(|t| !t.is_empty())).await;

    assert!(session.cancel());
    let outcome = turn.await.unwrap();

    let TurnOutcome::Failed(entry) = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert_eq!(entry.content(), "Error: Request was cancelled");
    assert_eq!(entry.model_id(), Some("epsilon"));
    assert!(!session.is_processing());
    assert!(!session.cancel());

    // Chunks sent after the cancel are never read.
    let _ = tx.send(Ok(Bytes::from_static(b"data: late\n")));
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_takes_effect_as_soon_as_a_turn_is_in_flight() {
    for _ in 0..50 {
        let (session, backend) = setup();
        backend.push(Reply::Stalled);

        let turn = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit("/exploitdb apache").await }
        });
        while !session.is_processing() {
            std::hint::spin_loop();
        }
        // The stalled reply never ends on its own, so the turn is still here.
        assert_eq!(session.current_turn().unwrap().route.agent_id, "darkbert");
        assert!(session.cancel());

        let outcome = turn.await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Failed(ref m) if m.content() == "Error: Request was cancelled"));
        assert!(!session.is_processing());
    }
}

#[tokio::test(start_paused = true)]
async fn test_huge_timeout_does_not_panic() {
    let backend = Arc::new(Scripted::default());
    backend.push(Reply::Stalled);
    let transport = TransportClient::new(backend.clone()).with_timeout(Duration::MAX);
    let session = Arc::new(
        ChatSession::new(CommandRouter::builtin(), transport, AgentRoster::builtin()).unwrap(),
    );

    let turn = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit("hello?").await }
    });
    wait_for(|| session.state() == TurnState::Sending && session.current_turn().is_some()).await;
    tokio::time::sleep(Duration::from_secs(7 * 24 * 60 * 60)).await;

    assert!(session.cancel());
    let outcome = turn.await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Failed(ref m) if m.content() == "Error: Request was cancelled"));
}

#[tokio::test]
async fn test_read_error_discards_unterminated_line() {
    let (session, backend) = setup();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    session.add_observer(Arc::new(events_tx));
    let (tx, rx) = mpsc::unbounded_channel();
    backend.push(Reply::Live(rx));
    tx.send(Ok(Bytes::from_static(b"data: done\ndata: half a li")))
        .unwrap();
    tx.send(Err(ChatError::StreamUnreadable("connection reset".to_string())))
        .unwrap();

    let outcome = session.submit("hello?").await;

    let TurnOutcome::Failed(entry) = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert!(entry.content().contains("connection reset"));
    let partials: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            SessionEvent::Progress { partial, .. } => Some(partial),
            _ => None,
        })
        .collect();
    assert_eq!(partials, vec!["done".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_submit_releases_the_session() {
    let (session, backend) = setup();
    backend.push(Reply::Stalled);

    let dropped = tokio::time::timeout(Duration::from_secs(1), session.submit("hello?")).await;
    assert!(dropped.is_err());
    assert!(!session.is_processing());
    assert_eq!(session.state(), TurnState::Idle);

    backend.push(Reply::Chunks(vec!["data: hi\n"]));
    let outcome = session.submit("hello again").await;
    assert!(matches!(outcome, TurnOutcome::Replied(ref m) if m.content() == "hi"));
}

#[tokio::test]
async fn test_http_status_becomes_error_entry() {
    let (session, backend) = setup();
    backend.push(Reply::Status(503, "upstream overloaded"));

    let outcome = session.submit("/search latest ransomware").await;

    let TurnOutcome::Failed(entry) = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert_eq!(
        entry.content(),
        "Error: Backend returned HTTP 503: upstream overloaded"
    );
    assert_eq!(entry.model_id(), Some("search"));
    assert_eq!(backend.calls()[0].0, "/search");
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_errors_reach_channel_observers() {
    let (session, backend) = setup();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    session.add_observer(Arc::new(events_tx));
    backend.push(Reply::Status(500, ""));

    session.submit("hi").await;

    match events.try_recv().unwrap() {
        SessionEvent::Failed { error, message } => {
            assert_eq!(error, "Backend returned HTTP 500");
            assert!(message.is_error());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_observers_are_per_session() {
    let (first, first_backend) = setup();
    let (second, second_backend) = setup();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    first.add_observer(Arc::new(events_tx));
    first_backend.push(Reply::Chunks(vec!["data: one\n"]));
    second_backend.push(Reply::Chunks(vec!["data: two\n"]));

    second.submit("to the second session").await;
    assert!(events.try_recv().is_err());

    first.submit("to the first session").await;
    assert!(events.try_recv().is_ok());
}

#[tokio::test]
async fn test_selection_routes_plain_text() {
    let (session, backend) = setup();
    backend.push(Reply::Chunks(vec!["data: ok\n"]));
    backend.push(Reply::Chunks(vec!["data: ok\n"]));

    session.select_agent("theta").unwrap();
    session.select_agent("epsilon").unwrap();

    let selected: Vec<String> = session
        .agents()
        .into_iter()
        .filter(|a| a.is_selected)
        .map(|a| a.id)
        .collect();
    assert_eq!(selected, vec!["epsilon".to_string()]);

    session.submit("/unknown-thing please").await;
    session.submit("/cve CVE-2023-4872").await;

    let calls = backend.calls();
    assert_eq!(calls[0].0, "/epsilon");
    assert_eq!(calls[0].1.model, "epsilon");
    assert!(calls[0].1.system_prompt.is_none());
    assert_eq!(calls[1].0, "/theta");
    assert_eq!(calls[1].1.system_prompt.as_deref(), Some(prompts::CVE));
}

#[tokio::test]
async fn test_select_unknown_agent_keeps_selection() {
    let (session, _backend) = setup();

    let err = session.select_agent("nobody").unwrap_err();

    assert!(matches!(err, ChatError::UnknownAgent(ref id) if id == "nobody"));
    assert_eq!(session.selected_agent().id, "theta");
}

#[tokio::test]
async fn test_blank_input_sends_nothing() {
    let (session, backend) = setup();

    assert_eq!(session.submit("   \n").await, TurnOutcome::Ignored);
    assert!(session.messages().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_multibyte_split_across_chunks() {
    let (session, backend) = setup();
    let (tx, rx) = mpsc::unbounded_channel();
    backend.push(Reply::Live(rx));
    let line = "data: naïve café ✓\n".as_bytes();
    for byte in line {
        tx.send(Ok(Bytes::copy_from_slice(&[*byte]))).unwrap();
    }
    drop(tx);

    let outcome = session.submit("unicode please").await;

    assert!(matches!(outcome, TurnOutcome::Replied(ref m) if m.content() == "naïve café ✓"));
}
