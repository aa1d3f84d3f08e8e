//! Career-coach chat seeded with the compacted analysis memory

use crate::error::Result;
use crate::llm::client::{GenerateRequest, GenerativeClient, Turn};
use crate::llm::prompts::PromptTemplates;
use crate::pipeline::memory::MemoryBank;
use log::debug;
use std::sync::Arc;

/// Returned instead of an empty model reply
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";

/// Replies longer than this that contain an Experience section count as a CV
const CV_MIN_CHARS: usize = 300;

/// What a model reply appears to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Cv,
    Chat,
}

/// Guess whether a reply is a full Markdown CV.
///
/// A reply is a CV when, after trimming, it starts with a level-1 heading
/// (`"# "`), or when it contains a `"## Experience"` heading and is longer
/// than 300 characters. This is a text heuristic, not a signal from the model.
pub fn classify_reply(text: &str) -> ReplyKind {
    let starts_with_title = text.trim().starts_with("# ");
    let long_with_experience =
        text.contains("## Experience") && text.chars().count() > CV_MIN_CHARS;

    if starts_with_title || long_with_experience {
        ReplyKind::Cv
    } else {
        ReplyKind::Chat
    }
}

/// A running conversation with the model.
///
/// The system instruction is fixed at creation from a snapshot of the memory
/// bank; later changes to the bank are not seen. The turn history is owned
/// here and replayed on every call.
pub struct ChatSession {
    client: Arc<dyn GenerativeClient>,
    system_instruction: String,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn create(
        client: Arc<dyn GenerativeClient>,
        prompts: &PromptTemplates,
        memory: &MemoryBank,
    ) -> Self {
        let system_instruction = prompts.render_career_coach(&memory.compacted_context());
        debug!("Chat session created ({} chars of instructions)", system_instruction.len());

        Self {
            client,
            system_instruction,
            history: Vec::new(),
        }
    }

    /// Send one user turn and wait for the reply.
    ///
    /// On failure or a blank reply the user turn is dropped from the history
    /// so the next call starts from the last complete exchange.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        self.history.push(Turn::user_text(text));

        let request = GenerateRequest {
            system_instruction: Some(self.system_instruction.clone()),
            turns: self.history.clone(),
            ..Default::default()
        };

        match self.client.generate(request).await {
            Ok(reply) if reply.trim().is_empty() => {
                debug!("Blank model reply; user turn not kept");
                self.history.pop();
                Ok(EMPTY_REPLY_FALLBACK.to_string())
            }
            Ok(reply) => {
                self.history.push(Turn::model_text(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Number of completed turns (user and model)
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}
