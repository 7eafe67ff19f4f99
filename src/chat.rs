// SPDX-License-Identifier: MPL-2.0
//! Placeholder assistant conversation.
//!
//! There is no model behind this yet: every user message gets the same canned
//! reply after a fixed delay.

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::auth::Session;

/// Delay before the placeholder reply appears. Not cancellable.
pub const BOT_REPLY_DELAY: Duration = Duration::from_secs(1);

pub const BOT_REPLY: &str = "Thank you for your question! This AI chatbot will be fully \
functional once integrated with Supabase backend. I would be able to provide personalized crop \
recommendations based on your location, soil type, and weather data.";

/// Quick prompts offered under the input box.
pub const SUGGESTIONS: [&str; 4] = [
    "Weather forecast",
    "Crop rotation tips",
    "Pest control",
    "Market prices",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

/// The bot's answer to a submitted message, not yet delivered.
#[derive(Debug)]
#[must_use = "the reply is only delivered once awaited and received"]
pub struct PendingReply {
    id: u64,
}

impl PendingReply {
    /// Waits out [`BOT_REPLY_DELAY`] and produces the reply.
    pub async fn wait(self) -> ChatMessage {
        tokio::time::sleep(BOT_REPLY_DELAY).await;
        ChatMessage {
            id: self.id,
            text: BOT_REPLY.to_string(),
            sender: Sender::Bot,
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Conversation {
    /// Opens with the assistant's greeting, addressed to the signed-in user
    /// when their name is known.
    pub fn new(session: Option<&Session>) -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        let text = greeting(
            session
                .and_then(|s| s.display_name.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        );
        conversation.push(Sender::Bot, text);
        conversation
    }

    /// Appends the user's message and returns the pending reply. Input that is
    /// empty after trimming is ignored.
    pub fn submit(&mut self, input: &str) -> Option<PendingReply> {
        if input.trim().is_empty() {
            return None;
        }
        self.push(Sender::User, input.to_string());
        let id = self.allocate_id();
        debug!("chat message submitted, reply {id} pending");
        Some(PendingReply { id })
    }

    pub fn receive(&mut self, reply: ChatMessage) {
        self.messages.push(reply);
    }

    /// Submits and waits for the reply in one step.
    pub async fn ask(&mut self, input: &str) -> Option<&ChatMessage> {
        let pending = self.submit(input)?;
        let reply = pending.wait().await;
        self.receive(reply);
        self.messages.last()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn push(&mut self, sender: Sender, text: String) {
        let id = self.allocate_id();
        self.messages.push(ChatMessage {
            id,
            text,
            sender,
            timestamp: Local::now(),
        });
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn greeting(name: Option<&str>) -> String {
    format!(
        "Hello {}! I'm your AgriSaathi AI assistant. I can help you with crop \
         recommendations, weather insights, and farming best practices. What would you \
         like to know?",
        name.unwrap_or("there")
    )
}
