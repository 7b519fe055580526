//! Per-tick invocation context handed to every callback.

use serde::{Deserialize, Serialize};

/// One inbound message: who sent it and its raw payload.
///
/// The machine never looks inside the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub sender: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            sender: sender.into(),
            payload: payload.into(),
        }
    }
}

/// Everything a callback may need besides the opaque state.
///
/// `env` is the caller's environment (persistence handle, message dispatch,
/// anything else); the machine only passes it through. Log output goes to the
/// ambient `tracing` subscriber, and every tick runs inside a `tick` span.
pub struct TickContext<'a, Env> {
    pub env: &'a Env,
    pub tick: u64,
    pub messages: &'a [InboundMessage],
    pub(crate) state: &'a str,
}

impl<'a, Env> TickContext<'a, Env> {
    pub fn new(env: &'a Env, tick: u64, messages: &'a [InboundMessage], state: &'a str) -> Self {
        Self {
            env,
            tick,
            messages,
            state,
        }
    }

    /// Name of the state the machine was in when this tick started.
    pub fn state(&self) -> &str {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_preserves_message_order() {
        let messages = vec![
            InboundMessage::new("bob", b"second".to_vec()),
            InboundMessage::new("alice", b"first".to_vec()),
        ];
        let ctx = TickContext::new(&(), 7, &messages, "init");

        let senders: Vec<&str> = ctx.messages.iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, vec!["bob", "alice"]);
        assert_eq!(ctx.tick, 7);
        assert_eq!(ctx.state(), "init");
    }

    #[test]
    fn message_serializes_correctly() {
        let message = InboundMessage::new("alice", vec![1, 2, 3]);
        let json = serde_json::to_string(&message).unwrap();
        let deserialized: InboundMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(message, deserialized);
    }
}
