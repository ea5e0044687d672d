use crate::error::{Result, UpdaterError};
use crate::transport::{ChatTransport, ConversationId, MessageId};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Terminal stand-in for a chat platform: bot messages go to stdout and the
/// operator's replies are read from stdin.
pub struct ConsoleTransport {
    next_id: u64,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Prompt for a single reply line.
    pub fn read_reply(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt.bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTransport for ConsoleTransport {
    fn send(
        &mut self,
        conversation: &ConversationId,
        text: &str,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageId> {
        self.next_id += 1;
        let id = MessageId::new(format!("console-{}", self.next_id));
        debug!(%conversation, message = %id, reply_to = ?reply_to, "sending message");

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "\n{}", text)
            .and_then(|_| stdout.flush())
            .map_err(|e| UpdaterError::Transport(format!("Failed to write to console: {e}")))?;
        Ok(id)
    }

    fn unsend(&mut self, message: &MessageId) -> Result<()> {
        debug!(message = %message, "unsend requested; console output cannot be retracted");
        Ok(())
    }
}
