use super::frame::{decode_frame, encode_frame};
use crate::diagnostics::DiagnosticReport;
use crate::error::LinkError;
use serde::{Deserialize, Serialize};

/// Messages exchanged with the base bridge, one per frame, JSON encoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkMessage {
    Diagnostics {
        topic: String,
        report: DiagnosticReport,
    },
    SetDigitalOutputs {
        id: u32,
        service: String,
        outputs: [bool; 3],
    },
    SetOperationMode {
        id: u32,
        service: String,
        mode: u8,
    },
    Reply {
        id: u32,
        ok: bool,
        #[serde(default)]
        detail: Option<String>,
    },
}

impl LinkMessage {
    pub fn to_frame(&self) -> Result<Vec<u8>, LinkError> {
        let payload = serde_json::to_vec(self)?;
        Ok(encode_frame(&payload))
    }

    /// Parses a frame body; `encoded` excludes the trailing delimiter.
    pub fn from_encoded(encoded: &[u8]) -> Result<Self, LinkError> {
        let payload = decode_frame(encoded)?;
        Self::from_payload(&payload)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, LinkError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_tagged() {
        let message = LinkMessage::SetOperationMode {
            id: 7,
            service: "/turtlebot_node/set_operation_mode".into(),
            mode: 2,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "set_operation_mode");
        assert_eq!(json["mode"], 2);
    }

    #[test]
    fn reply_detail_is_optional() {
        let reply = LinkMessage::from_payload(br#"{"type":"reply","id":3,"ok":true}"#).unwrap();
        assert_eq!(
            reply,
            LinkMessage::Reply {
                id: 3,
                ok: true,
                detail: None
            }
        );
    }

    #[test]
    fn frame_carries_message() {
        let message = LinkMessage::SetDigitalOutputs {
            id: 1,
            service: "turtlebot_node/set_digital_outputs".into(),
            outputs: [true, false, true],
        };
        let frame = message.to_frame().unwrap();
        let body = &frame[..frame.len() - 1];
        assert_eq!(LinkMessage::from_encoded(body).unwrap(), message);
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(matches!(
            LinkMessage::from_payload(br#"{"type":"reboot"}"#),
            Err(LinkError::Json(_))
        ));
    }
}
