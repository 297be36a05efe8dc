use serde::{Deserialize, Serialize};

use crate::error::{EventError, Result};

/// Status carried by every notification.
///
/// Serialized as its numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum StatusCode {
    /// The operation completed.
    Ok,
    /// The operation was rejected or failed.
    Unavailable,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Unavailable => 503,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.as_u16()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = EventError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            200 => Ok(Self::Ok),
            503 => Ok(Self::Unavailable),
            other => Err(EventError::UnknownStatus(other)),
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Observability message emitted alongside every operation outcome.
///
/// Notifications are fire-and-forget: they never change what the caller
/// receives as the operation's result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "merchantId", default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    pub message: String,
    pub code: StatusCode,
}

impl Notification {
    /// A 200 notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            merchant_id: None,
            message: message.into(),
            code: StatusCode::Ok,
        }
    }

    /// A 503 notification.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            merchant_id: None,
            message: message.into(),
            code: StatusCode::Unavailable,
        }
    }

    /// Attach the merchant the notification is about.
    pub fn for_merchant(mut self, id: impl Into<String>) -> Self {
        self.merchant_id = Some(id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| EventError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| EventError::Serialization(e.to_string()))
    }
}

/// A named event as handed to a sink: the channel name plus opaque payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

impl EmittedEvent {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Decode the payload as a [`Notification`].
    pub fn notification(&self) -> Result<Notification> {
        Notification::from_bytes(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_is_numeric_on_the_wire() {
        let n = Notification::success("done");
        let value: serde_json::Value = serde_json::from_slice(&n.to_bytes().unwrap()).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["message"], "done");
        assert!(value.get("merchantId").is_none());
    }

    #[test]
    fn merchant_id_is_included_when_set() {
        let n = Notification::failure("m1 not Found.").for_merchant("m1");
        let value: serde_json::Value = serde_json::from_slice(&n.to_bytes().unwrap()).unwrap();
        assert_eq!(value["code"], 503);
        assert_eq!(value["merchantId"], "m1");
    }

    #[test]
    fn notification_decodes() {
        let n = Notification::success("created").for_merchant("m2");
        let decoded = Notification::from_bytes(&n.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, n);
        assert!(decoded.is_success());
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = Notification::from_bytes(br#"{"message":"x","code":418}"#).unwrap_err();
        assert!(matches!(err, EventError::Serialization(_)));
        assert!(matches!(
            StatusCode::try_from(404),
            Err(EventError::UnknownStatus(404))
        ));
    }

    #[test]
    fn status_code_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200");
        assert_eq!(StatusCode::Unavailable.to_string(), "503");
    }

    #[test]
    fn emitted_event_exposes_notification() {
        let n = Notification::failure("bad args");
        let event = EmittedEvent::new("errEvent", n.to_bytes().unwrap());
        assert_eq!(event.notification().unwrap(), n);
    }
}
