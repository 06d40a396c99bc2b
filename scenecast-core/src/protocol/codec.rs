use crate::protocol::{ProtocolError, ToHost, ToViewer};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Decoded host-to-viewer data-channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerMessage {
    Text { op: ToViewer, text: String },
    Ownership { op: ToViewer, owned: bool },
    Raw { op: ToViewer, payload: Bytes },
}

pub fn encode_utf16le(text: &str, buf: &mut BytesMut) {
    for unit in text.encode_utf16() {
        buf.put_u16_le(unit);
    }
}

fn decode_utf16le(mut payload: &[u8]) -> Result<String, ProtocolError> {
    if payload.len() % 2 != 0 {
        return Err(ProtocolError::InvalidText);
    }
    let mut units = Vec::with_capacity(payload.len() / 2);
    while payload.has_remaining() {
        units.push(payload.get_u16_le());
    }
    String::from_utf16(&units).map_err(|_| ProtocolError::InvalidText)
}

/// Single-byte control message, e.g. an I-frame request.
pub fn encode_control(op: ToHost) -> Bytes {
    Bytes::copy_from_slice(&[op as u8])
}

/// `[opcode][u16 LE length in UTF-16 units][UTF-16LE text]`.
pub fn encode_descriptor(op: ToHost, text: &str) -> Result<Bytes, ProtocolError> {
    let units = text.encode_utf16().count();
    let len = u16::try_from(units).map_err(|_| ProtocolError::Truncated {
        expected: u16::MAX as usize,
        actual: units,
    })?;

    let mut buf = BytesMut::with_capacity(3 + units * 2);
    buf.put_u8(op as u8);
    buf.put_u16_le(len);
    encode_utf16le(text, &mut buf);
    Ok(buf.freeze())
}

pub fn decode_descriptor(data: &[u8]) -> Result<(ToHost, String), ProtocolError> {
    let mut data = data;
    if !data.has_remaining() {
        return Err(ProtocolError::Empty);
    }
    let raw = data.get_u8();
    let op = ToHost::try_from(raw).map_err(ProtocolError::UnknownOpcode)?;

    if data.remaining() < 2 {
        return Err(ProtocolError::Truncated {
            expected: 2,
            actual: data.remaining(),
        });
    }
    let units = data.get_u16_le() as usize;
    if data.remaining() < units * 2 {
        return Err(ProtocolError::Truncated {
            expected: units * 2,
            actual: data.remaining(),
        });
    }
    let text = decode_utf16le(&data[..units * 2])?;
    Ok((op, text))
}

pub fn decode_viewer_message(data: &[u8]) -> Result<ViewerMessage, ProtocolError> {
    let Some((&raw, payload)) = data.split_first() else {
        return Err(ProtocolError::Empty);
    };
    let op = ToViewer::try_from(raw).map_err(ProtocolError::UnknownOpcode)?;

    match op {
        ToViewer::QualityControlOwnership | ToViewer::InputControlOwnership => {
            let Some(&flag) = payload.first() else {
                return Err(ProtocolError::Truncated {
                    expected: 1,
                    actual: 0,
                });
            };
            Ok(ViewerMessage::Ownership {
                op,
                owned: flag != 0,
            })
        }
        op if op.carries_text() => Ok(ViewerMessage::Text {
            op,
            text: decode_utf16le(payload)?,
        }),
        op => Ok(ViewerMessage::Raw {
            op,
            payload: Bytes::copy_from_slice(payload),
        }),
    }
}
