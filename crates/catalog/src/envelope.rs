//! The result envelope returned by every public client operation.
//!
//! [`ResultEnvelope`] is the boolean-plus-messages contract consumed by the
//! presentation layer: no error type crosses the client surface, every failure
//! is expressed as `success = false` with at least one human-readable message.
//!
//! The module also holds the wire shape of the envelope some endpoints wrap
//! their payload in (`{success, data, message}`), used by
//! [`crate::normalize`].

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Outcome of one logical operation.
///
/// ## Invariants
///
/// - `success == false` ⇒ `data` is absent.
/// - `success == false` ⇒ `messages` is non-empty.
///
/// Both are enforced by the constructors; the fields are private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    messages: Vec<String>,
}

impl<T> ResultEnvelope<T> {
    /// A successful envelope carrying `data` and no messages.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Vec::new(),
        }
    }

    /// A successful envelope with optional data and informational messages,
    /// exactly as a wrapped upstream response reported it.
    pub fn success_with(data: Option<T>, messages: Vec<String>) -> Self {
        Self {
            success: true,
            data,
            messages,
        }
    }

    /// A failed envelope. An empty `messages` list is replaced by the
    /// [`ClientError::UpstreamRejected`] message.
    pub fn failure(messages: Vec<String>) -> Self {
        let messages = if messages.is_empty() {
            vec![ClientError::UpstreamRejected.to_string()]
        } else {
            messages
        };
        Self {
            success: false,
            data: None,
            messages,
        }
    }

    /// A failed envelope whose single message is the error's text.
    pub fn from_error(error: ClientError) -> Self {
        Self::failure(vec![error.to_string()])
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns the first message, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    /// Transforms the payload, keeping success flag and messages.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U> {
        ResultEnvelope {
            success: self.success,
            data: self.data.map(f),
            messages: self.messages,
        }
    }

    /// Returns the payload, or `T::default()` on failure or missing data.
    ///
    /// This is the substitution policy of the presentation layer: failures
    /// render as empty collections.
    pub fn data_or_default(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }
}

impl<T> From<ClientError> for ResultEnvelope<T> {
    fn from(error: ClientError) -> Self {
        Self::from_error(error)
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// The wrapped response shape, after key folding.
///
/// `success` is required; a body without a boolean `success` is not a wrapped
/// envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEnvelope<T> {
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    #[serde(default, alias = "messages")]
    pub(crate) message: Option<Vec<WireMessage>>,
}

impl<T> WireEnvelope<T> {
    /// Converts into a [`ResultEnvelope`], flattening the message groups in
    /// order and dropping any data on failure.
    pub(crate) fn into_envelope(self) -> ResultEnvelope<T> {
        let messages = flatten_messages(self.message.unwrap_or_default());
        if self.success {
            ResultEnvelope::success_with(self.data, messages)
        } else {
            ResultEnvelope::failure(messages)
        }
    }

    /// Keeps only the messages, as a failure of any payload type.
    pub(crate) fn into_failure<U>(self) -> ResultEnvelope<U> {
        ResultEnvelope::failure(flatten_messages(self.message.unwrap_or_default()))
    }
}

/// One message entry: `{text: [..]}` group or a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireMessage {
    Grouped {
        #[serde(default)]
        text: Option<TextLines>,
    },
    Plain(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TextLines {
    Many(Vec<String>),
    One(String),
}

fn flatten_messages(entries: Vec<WireMessage>) -> Vec<String> {
    let mut out = Vec::new();
    for entry in entries {
        match entry {
            WireMessage::Plain(line) => out.push(line),
            WireMessage::Grouped { text: Some(TextLines::One(line)) } => out.push(line),
            WireMessage::Grouped {
                text: Some(TextLines::Many(lines)),
            } => out.extend(lines),
            WireMessage::Grouped { text: None } => {}
        }
    }
    out.retain(|line| !line.trim().is_empty());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_never_carries_data_or_empty_messages() {
        let env: ResultEnvelope<Vec<u8>> = ResultEnvelope::failure(Vec::new());
        assert!(!env.is_success());
        assert!(env.data().is_none());
        assert_eq!(env.messages(), ["upstream reported failure"]);
    }

    #[test]
    fn test_wire_failure_drops_data() {
        let wire: WireEnvelope<Vec<u8>> = serde_json::from_str(
            r#"{"success":false,"data":[1,2],"message":[{"text":["denied"]}]}"#,
        )
        .unwrap();
        let env = wire.into_envelope();
        assert!(env.data().is_none());
        assert_eq!(env.messages(), ["denied"]);
    }

    #[test]
    fn test_wrapped_success_without_data_member() {
        let wire: WireEnvelope<Vec<u8>> =
            serde_json::from_str(r#"{"success":true,"message":["saved"]}"#).unwrap();
        let env = wire.into_envelope();
        assert!(env.is_success());
        assert!(env.data().is_none());
        assert_eq!(env.messages(), ["saved"]);
    }

    #[test]
    fn test_message_groups_flatten_in_order() {
        let wire: WireEnvelope<u8> = serde_json::from_str(
            r#"{"success":true,"data":1,"messages":[{"text":["a","b"]},"c",{"text":"d"},{}]}"#,
        )
        .unwrap();
        assert_eq!(wire.into_envelope().messages(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_data_or_default_substitutes_empty_collection() {
        let env: ResultEnvelope<Vec<u8>> = ClientError::ParseFailure.into();
        assert!(env.data_or_default().is_empty());
    }
}
