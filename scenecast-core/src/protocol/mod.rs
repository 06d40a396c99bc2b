mod codec;
mod envelope;
mod error;
mod handoff;
mod opcode;

pub use codec::{
    decode_descriptor, decode_viewer_message, encode_control, encode_descriptor, encode_utf16le,
    ViewerMessage,
};
pub use envelope::{Envelope, SceneListing, SceneSummary};
pub use error::ProtocolError;
pub use handoff::{HandoffMessage, HandoffResult, SceneTarget};
pub use opcode::{ToHost, ToViewer};
