// End-to-end behaviour of the relay pipeline against in-memory fakes:
// history source, completion provider, and both responder kinds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use relaycord_agent::pipeline::{
    CommandOutcome, HistorySource, InboundMessage, InteractionResponder, MessageOutcome,
    MessageResponder, PipelineError, Relay, RelaySettings, ANALYSIS_HEADER, ANALYZE_ERROR_REPLY,
    MESSAGE_ERROR_REPLY, NOT_TEXT_CHANNEL_REPLY, NO_MESSAGES_REPLY, PONG_REPLY, RESET_REPLY,
};
use relaycord_agent::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};
use relaycord_agent::{CompletionClient, FALLBACK_REPLY};
use relaycord_core::{ChannelKey, HistoryMessage};

const CHANNEL: ChannelKey = ChannelKey(1234);

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct ProviderLog {
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ProviderLog {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

struct FakeProvider {
    log: ProviderLog,
    fail: bool,
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.log.calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .prompts
            .lock()
            .unwrap()
            .push(req.prompt.clone());
        if self.fail {
            return Err(ProviderError::Api {
                status: 503,
                message: "overloaded".into(),
            });
        }
        Ok(ChatResponse {
            content: "generated reply".into(),
            model: req.model.clone(),
            tokens_in: 10,
            tokens_out: 2,
            stop_reason: "STOP".into(),
        })
    }
}

/// Returns a fixed newest-first history, or an error.
struct FakeHistory {
    messages: Vec<HistoryMessage>,
    fail: bool,
    requested_limit: Mutex<Option<u8>>,
}

impl FakeHistory {
    fn newest_first(messages: &[(&str, &str)]) -> Self {
        Self {
            messages: messages
                .iter()
                .map(|(a, c)| HistoryMessage::new(*a, *c))
                .collect(),
            fail: false,
            requested_limit: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            messages: Vec::new(),
            fail: true,
            requested_limit: Mutex::new(None),
        }
    }
}

#[async_trait]
impl HistorySource for FakeHistory {
    async fn recent_messages(
        &self,
        _channel: ChannelKey,
        limit: u8,
    ) -> Result<Vec<HistoryMessage>, PipelineError> {
        *self.requested_limit.lock().unwrap() = Some(limit);
        if self.fail {
            return Err(PipelineError::History("missing access".into()));
        }
        Ok(self.messages.clone())
    }
}

#[derive(Default)]
struct RecordingResponder {
    events: Mutex<Vec<String>>,
    fail_sends: bool,
}

impl RecordingResponder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) -> Result<(), PipelineError> {
        self.events.lock().unwrap().push(event);
        if self.fail_sends {
            return Err(PipelineError::Platform("send failed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageResponder for RecordingResponder {
    async fn typing(&self) -> Result<(), PipelineError> {
        self.events.lock().unwrap().push("typing".into());
        Ok(())
    }

    async fn reply(&self, text: &str) -> Result<(), PipelineError> {
        self.push(format!("reply:{text}"))
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn reply(&self, text: &str) -> Result<(), PipelineError> {
        self.push(format!("reply:{text}"))
    }

    async fn defer(&self) -> Result<(), PipelineError> {
        self.events.lock().unwrap().push("defer".into());
        Ok(())
    }

    async fn edit(&self, text: &str) -> Result<(), PipelineError> {
        self.push(format!("edit:{text}"))
    }
}

fn relay(fail_completion: bool) -> (Relay, ProviderLog) {
    let log = ProviderLog::default();
    let provider = FakeProvider {
        log: log.clone(),
        fail: fail_completion,
    };
    let settings = RelaySettings {
        history_limit: 10,
        chat_persona: "CHAT PERSONA".into(),
        analyze_persona: "ANALYZE PERSONA".into(),
    };
    let relay = Relay::new(
        CompletionClient::new(Box::new(provider), "gemini-2.0-flash"),
        settings,
    );
    (relay, log)
}

fn message(content: &str) -> InboundMessage {
    InboundMessage {
        channel: CHANNEL,
        content: content.into(),
        author_is_bot: false,
    }
}

// ── Plain messages ───────────────────────────────────────────────────────────

#[tokio::test]
async fn message_runs_full_pipeline_oldest_first() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("B", "yo"), ("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay.on_message(&history, &responder, &message("yo")).await;

    assert_eq!(outcome, MessageOutcome::Replied);
    assert_eq!(provider.calls(), 1);
    assert_eq!(
        provider.last_prompt(),
        "[Weight: 1.0] A: hi\n[Weight: 1.5] B: yo\n\nCHAT PERSONA"
    );
    assert_eq!(responder.events(), vec!["typing", "reply:generated reply"]);
    assert_eq!(*history.requested_limit.lock().unwrap(), Some(10));
    assert_eq!(relay.flags().get(CHANNEL), Some(false));
}

#[tokio::test]
async fn empty_history_short_circuits_without_completion() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", ""), ("B", "  ")]);
    let responder = RecordingResponder::default();

    let outcome = relay.on_message(&history, &responder, &message("x")).await;

    assert_eq!(outcome, MessageOutcome::NoHistory);
    assert_eq!(provider.calls(), 0);
    assert_eq!(responder.events(), vec![format!("reply:{NO_MESSAGES_REPLY}")]);
    assert_eq!(relay.flags().get(CHANNEL), None);
}

#[tokio::test]
async fn completion_failure_replies_with_fallback() {
    let (relay, provider) = relay(true);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay.on_message(&history, &responder, &message("hi")).await;

    assert_eq!(outcome, MessageOutcome::Replied);
    assert_eq!(provider.calls(), 1);
    assert_eq!(
        responder.events(),
        vec!["typing".to_string(), format!("reply:{FALLBACK_REPLY}")]
    );
}

#[tokio::test]
async fn reset_trigger_sets_flag_and_replies_once() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_message(&history, &responder, &message("!ReSeT"))
        .await;

    assert_eq!(outcome, MessageOutcome::Reset);
    assert_eq!(relay.flags().get(CHANNEL), Some(true));
    assert_eq!(responder.events(), vec![format!("reply:{RESET_REPLY}")]);
    assert_eq!(provider.calls(), 0);
    assert_eq!(*history.requested_limit.lock().unwrap(), None);
}

#[tokio::test]
async fn bot_messages_are_ignored() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();
    let msg = InboundMessage {
        author_is_bot: true,
        ..message("!reset")
    };

    assert_eq!(
        relay.on_message(&history, &responder, &msg).await,
        MessageOutcome::IgnoredBot
    );
    assert!(responder.events().is_empty());
    assert_eq!(provider.calls(), 0);
    assert!(relay.flags().is_empty());
}

#[tokio::test]
async fn bot_authors_never_reach_history_or_completion() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::failing();
    let responder = RecordingResponder::default();
    let msg = InboundMessage {
        author_is_bot: true,
        ..message("what do you all think?")
    };

    let outcome = relay.on_message(&history, &responder, &msg).await;

    assert_eq!(outcome, MessageOutcome::IgnoredBot);
    assert!(responder.events().is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn history_failure_is_caught_and_apologised_for() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::failing();
    let responder = RecordingResponder::default();

    let outcome = relay.on_message(&history, &responder, &message("hi")).await;

    assert_eq!(outcome, MessageOutcome::Failed);
    assert_eq!(provider.calls(), 0);
    assert_eq!(responder.events(), vec![format!("reply:{MESSAGE_ERROR_REPLY}")]);
}

#[tokio::test]
async fn send_failure_does_not_escape() {
    let (relay, _provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder {
        fail_sends: true,
        ..Default::default()
    };

    let outcome = relay.on_message(&history, &responder, &message("hi")).await;

    assert_eq!(outcome, MessageOutcome::Failed);
    // reply attempt, then the apology attempt
    assert_eq!(
        responder.events(),
        vec![
            "typing".to_string(),
            "reply:generated reply".to_string(),
            format!("reply:{MESSAGE_ERROR_REPLY}"),
        ]
    );
}

// ── Slash commands ───────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_pongs_without_completion() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "ping", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::Pong);
    assert_eq!(responder.events(), vec![format!("reply:{PONG_REPLY}")]);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn reset_command_sets_flag() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "reset", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::Reset);
    assert_eq!(relay.flags().get(CHANNEL), Some(true));
    assert_eq!(responder.events(), vec![format!("reply:{RESET_REPLY}")]);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn analyze_defers_then_edits_with_header() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("B", "yo"), ("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "analyze", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::Analyzed);
    assert_eq!(provider.calls(), 1);
    assert!(provider.last_prompt().ends_with("\n\nANALYZE PERSONA"));
    assert_eq!(
        responder.events(),
        vec![
            "defer".to_string(),
            format!("edit:{ANALYSIS_HEADER}generated reply"),
        ]
    );
    // /analyze does not touch the flags
    assert_eq!(relay.flags().get(CHANNEL), None);
}

#[tokio::test]
async fn analyze_outside_text_channel() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "analyze", CHANNEL, false)
        .await;

    assert_eq!(outcome, CommandOutcome::NotTextChannel);
    assert_eq!(provider.calls(), 0);
    assert_eq!(
        responder.events(),
        vec!["defer".to_string(), format!("edit:{NOT_TEXT_CHANNEL_REPLY}")]
    );
}

#[tokio::test]
async fn analyze_with_empty_history() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "analyze", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::NoHistory);
    assert_eq!(provider.calls(), 0);
    assert_eq!(
        responder.events(),
        vec!["defer".to_string(), format!("edit:{NO_MESSAGES_REPLY}")]
    );
}

#[tokio::test]
async fn analyze_history_failure_edits_apology() {
    let (relay, _provider) = relay(false);
    let history = FakeHistory::failing();
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "analyze", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::Failed);
    assert_eq!(
        responder.events(),
        vec!["defer".to_string(), format!("edit:{ANALYZE_ERROR_REPLY}")]
    );
}

#[tokio::test]
async fn analyze_completion_failure_uses_fallback_text() {
    let (relay, _provider) = relay(true);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "analyze", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::Analyzed);
    assert_eq!(
        responder.events(),
        vec![
            "defer".to_string(),
            format!("edit:{ANALYSIS_HEADER}{FALLBACK_REPLY}"),
        ]
    );
}

#[tokio::test]
async fn unknown_command_is_ignored() {
    let (relay, provider) = relay(false);
    let history = FakeHistory::newest_first(&[("A", "hi")]);
    let responder = RecordingResponder::default();

    let outcome = relay
        .on_command(&history, &responder, "ask", CHANNEL, true)
        .await;

    assert_eq!(outcome, CommandOutcome::Unknown);
    assert!(responder.events().is_empty());
    assert_eq!(provider.calls(), 0);
}
