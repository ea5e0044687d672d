use crate::error::Result;
use std::fmt;

pub mod console;

pub use console::ConsoleTransport;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Chat thread or group the command was issued in.
    ConversationId
);
string_id!(
    /// Sender of a message.
    UserId
);
string_id!(
    /// Transport-assigned message identifier.
    MessageId
);

/// A text message delivered to the bot.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub conversation: ConversationId,
    pub message_id: MessageId,
    pub sender: UserId,
    pub body: String,
    /// The message this one replies to, if any.
    pub reply_to: Option<MessageId>,
}

/// Outgoing side of the chat platform.
pub trait ChatTransport {
    /// Send `text` to a conversation, optionally as a reply, returning the id
    /// the platform assigned to the new message.
    fn send(
        &mut self,
        conversation: &ConversationId,
        text: &str,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageId>;

    /// Retract a message previously sent by the bot.
    fn unsend(&mut self, message: &MessageId) -> Result<()>;
}
