//! Chat submission controller
//!
//! Owns the prompt box, the message list, the conversation id and the
//! single-request gate. A submission is accepted only while idle; the gate
//! reopens in `finish` whatever the outcome was.

use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::client::{Backend, GenerateRequest, Outcome};
use crate::input::PromptInput;
use crate::state::{Content, ConversationId, MessageList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Messages,
}

/// Reply to an accepted submission, not yet awaited
pub type PendingReply = BoxFuture<'static, Outcome>;

pub struct ChatController<B> {
    backend: B,
    pub input: PromptInput,
    pub messages: MessageList,
    pub focus: Focus,
    chat_id: ConversationId,
    phase: Phase,
    placeholder: Option<usize>,
}

impl<B: Backend> ChatController<B> {
    pub fn new(backend: B, chat_id: ConversationId) -> Self {
        Self {
            backend,
            input: PromptInput::new(),
            messages: MessageList::new(),
            focus: Focus::Input,
            chat_id,
            phase: Phase::Idle,
            placeholder: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn chat_id(&self) -> &ConversationId {
        &self.chat_id
    }

    /// Submit whatever is in the prompt box.
    ///
    /// The box is left untouched when the submission is rejected.
    pub fn submit(&mut self) -> Option<PendingReply> {
        if self.is_busy() {
            debug!("submission ignored: a request is already in flight");
            return None;
        }
        if self.input.value().trim().is_empty() {
            return None;
        }

        let text = self.input.take();
        self.submit_prompt(&text)
    }

    /// Submit `prompt` directly. Returns the pending reply when the submission was accepted.
    pub fn submit_prompt(&mut self, prompt: &str) -> Option<PendingReply> {
        if self.is_busy() {
            debug!("submission ignored: a request is already in flight");
            return None;
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        self.phase = Phase::AwaitingResponse;
        self.input.disable();
        self.input.take();

        self.messages.push_user(prompt);
        self.placeholder = Some(self.messages.push_placeholder());

        let request = GenerateRequest {
            prompt: prompt.to_string(),
            chat_id: self.chat_id.as_str().to_string(),
        };
        info!(
            prompt_chars = prompt.chars().count(),
            chat_id = %self.chat_id.as_str(),
            "submitting prompt"
        );

        Some(self.backend.generate(request))
    }

    /// Settle the in-flight submission with its outcome and reopen the gate.
    pub fn finish(&mut self, outcome: Outcome) {
        if !self.is_busy() {
            warn!(?outcome, "reply arrived with no submission in flight");
            return;
        }

        let content = match &outcome {
            Outcome::Reply { text, chat_id } => {
                if self.chat_id.adopt(chat_id.as_deref()) {
                    info!(chat_id = %self.chat_id.as_str(), "conversation id assigned");
                }
                info!(reply_chars = text.chars().count(), "reply received");
                Content::Text(text.clone())
            }
            Outcome::DecodeError { status } => {
                warn!(status, "server response could not be decoded");
                Content::Error(outcome.display_text())
            }
            Outcome::ServerError { status, message } => {
                warn!(status, error = message.as_deref().unwrap_or(""), "server reported an error");
                Content::Error(outcome.display_text())
            }
            Outcome::TransportError { message } => {
                warn!(error = %message, "request did not reach the server");
                Content::Error(outcome.display_text())
            }
        };

        if let Some(index) = self.placeholder.take() {
            self.messages.resolve(index, content);
        }

        self.input.enable();
        self.focus = Focus::Input;
        self.phase = Phase::Idle;
        self.messages.scroll_to_bottom();
    }

    /// Submit and wait for the reply in place. Used outside the interactive loop.
    pub async fn ask(&mut self, prompt: &str) -> Option<Outcome> {
        let pending = self.submit_prompt(prompt)?;
        let outcome = pending.await;
        self.finish(outcome.clone());
        Some(outcome)
    }
}
