use crate::agents::planner::UpdatePlan;
use crate::transport::{ConversationId, IncomingMessage, MessageId, UserId};
use jiff::{SignedDuration, Timestamp};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const AFFIRMATIVE: &str = "yes";

/// An update offer waiting for its requester's answer.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub plan: UpdatePlan,
    pub full_update: bool,
    pub expected_requester: UserId,
    /// The offer message a reply must point at.
    pub offer_message: MessageId,
    pub offered_at: Timestamp,
}

#[derive(Debug)]
pub enum GateDecision {
    Confirmed(PendingConfirmation),
    Declined(PendingConfirmation),
    Expired(PendingConfirmation),
    /// The message is not an answer to an outstanding offer.
    Ignored,
}

/// Holds at most one pending offer per conversation.
///
/// Only a reply to the exact offer message from the requester who asked for
/// it resolves the offer; anything else leaves it untouched. A newer offer in
/// the same conversation replaces the older one.
pub struct ConfirmationGate {
    pending: HashMap<ConversationId, PendingConfirmation>,
    ttl: Option<SignedDuration>,
}

impl ConfirmationGate {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            pending: HashMap::new(),
            ttl: ttl.map(|ttl| SignedDuration::try_from(ttl).unwrap_or(SignedDuration::MAX)),
        }
    }

    /// Register an offer, returning the one it superseded.
    pub fn offer(
        &mut self,
        conversation: ConversationId,
        pending: PendingConfirmation,
    ) -> Option<PendingConfirmation> {
        let replaced = self.pending.insert(conversation.clone(), pending);
        if let Some(old) = &replaced {
            debug!(%conversation, superseded = %old.offer_message, "replacing pending update offer");
        }
        replaced
    }

    pub fn pending_for(&self, conversation: &ConversationId) -> Option<&PendingConfirmation> {
        self.pending.get(conversation)
    }

    pub fn resolve(&mut self, message: &IncomingMessage) -> GateDecision {
        self.resolve_at(message, Timestamp::now())
    }

    fn resolve_at(&mut self, message: &IncomingMessage, now: Timestamp) -> GateDecision {
        let Some(reply_to) = &message.reply_to else {
            return GateDecision::Ignored;
        };

        let matches = self.pending.get(&message.conversation).is_some_and(|pending| {
            &pending.offer_message == reply_to && pending.expected_requester == message.sender
        });
        if !matches {
            return GateDecision::Ignored;
        }

        let Some(pending) = self.pending.remove(&message.conversation) else {
            return GateDecision::Ignored;
        };

        if let Some(ttl) = self.ttl {
            if now.duration_since(pending.offered_at) > ttl {
                return GateDecision::Expired(pending);
            }
        }

        if Self::is_affirmative(&message.body) {
            GateDecision::Confirmed(pending)
        } else {
            GateDecision::Declined(pending)
        }
    }

    pub fn is_affirmative(body: &str) -> bool {
        body.trim().eq_ignore_ascii_case(AFFIRMATIVE)
    }
}
