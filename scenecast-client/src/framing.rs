use crate::HandoffError;
use bytes::Bytes;
use scenecast_core::{
    HandoffMessage, ToHost, ToViewer, ViewerMessage, decode_viewer_message, encode_descriptor,
};

/// Decodes a render-host frame carrying a hand-off request (opcode 129, UTF-16LE JSON).
pub fn decode_handoff_frame(data: &[u8]) -> Result<HandoffMessage, HandoffError> {
    match decode_viewer_message(data)? {
        ViewerMessage::Text {
            op: ToViewer::CameraSwitchRequest,
            text,
        } => Ok(serde_json::from_str(&text)?),
        ViewerMessage::Text { op, .. }
        | ViewerMessage::Ownership { op, .. }
        | ViewerMessage::Raw { op, .. } => Err(HandoffError::UnexpectedFrame(op as u8)),
    }
}

/// Encodes a hand-off message for the render host as an opcode 101 descriptor.
pub fn encode_handoff_frame(msg: &HandoffMessage) -> Result<Bytes, HandoffError> {
    let json = serde_json::to_string(msg)?;
    Ok(encode_descriptor(ToHost::CameraSwitchResponse, &json)?)
}
