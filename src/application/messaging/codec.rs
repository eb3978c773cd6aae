//! Wire codec - MessagePack commands in, plain text replies out
//!
//! Each command is one MessagePack map. The format is self-delimiting, so
//! the decoder buffers partial reads and yields commands as they complete.

use std::io::{Cursor, ErrorKind};

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::application::errors::CodecError;
use crate::domain::entities::RobotCommand;

/// Largest accepted command, and the size of a single reply read
pub const MAX_FRAME: usize = 1024;

const REPLY_PREFIX: &str = "Server got ran command";

/// Encode a command as a MessagePack map with string keys
pub fn encode(command: &RobotCommand) -> Result<Vec<u8>, CodecError> {
    let bytes = rmp_serde::to_vec_named(command)?;
    if bytes.len() > MAX_FRAME {
        return Err(CodecError::FrameTooLarge { limit: MAX_FRAME });
    }
    Ok(bytes)
}

/// Decode exactly one command from a complete frame
pub fn decode(bytes: &[u8]) -> Result<RobotCommand, CodecError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Reply text the server sends once a command has been handled
pub fn reply_for(command: &RobotCommand, detail: Option<&str>) -> String {
    reply_for_type(command.type_name(), detail)
}

/// Reply text for a command known only by its `type` tag
pub fn reply_for_type(kind: &str, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{} {}: {}", REPLY_PREFIX, kind, detail),
        None => format!("{} {}", REPLY_PREFIX, kind),
    }
}

/// One complete MessagePack value taken off the stream
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Command(RobotCommand),
    /// A well-formed value that is not a valid command. `kind` is its
    /// `type` tag when it has one.
    Rejected { kind: String, reason: String },
}

/// Just the tag of a map, whatever else it holds
#[derive(Deserialize)]
struct TypeTag {
    #[serde(rename = "type")]
    kind: Option<String>,
}

const UNKNOWN_TYPE: &str = "unknown";

/// Incremental decoder for a byte stream of commands
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the socket
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes received but not yet consumed
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Take the next complete frame off the buffer.
    ///
    /// Returns `Ok(None)` while the buffered bytes are only a prefix of a
    /// value. A complete value that does not decode as a command comes back
    /// as `Frame::Rejected` and the stream stays usable; only bytes that are
    /// not MessagePack at all, or an over-long frame, are an error.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, CodecError> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(self.buf.as_slice());
        let consumed = match rmp_serde::from_read::<_, IgnoredAny>(&mut cursor) {
            Ok(_) => cursor.position() as usize,
            Err(e) if is_incomplete(&e) => {
                if self.buf.len() > MAX_FRAME {
                    return Err(CodecError::FrameTooLarge { limit: MAX_FRAME });
                }
                return Ok(None);
            }
            Err(e) => {
                self.buf.clear();
                return Err(e.into());
            }
        };

        let frame: Vec<u8> = self.buf.drain(..consumed).collect();
        match decode(&frame) {
            Ok(command) => Ok(Some(Frame::Command(command))),
            Err(e) => {
                let kind = rmp_serde::from_slice::<TypeTag>(&frame)
                    .ok()
                    .and_then(|tag| tag.kind)
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string());
                Ok(Some(Frame::Rejected { kind, reason: e.to_string() }))
            }
        }
    }
}

fn is_incomplete(err: &rmp_serde::decode::Error) -> bool {
    use rmp_serde::decode::Error;

    match err {
        Error::InvalidMarkerRead(io) | Error::InvalidDataRead(io) => {
            io.kind() == ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_a_string_keyed_map() {
        let bytes = encode(&RobotCommand::forward(0.5, true)).unwrap();
        // fixmap with three entries
        assert_eq!(bytes[0], 0x83);
        let as_json: serde_json::Value = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(as_json["type"], "forward");
        assert_eq!(as_json["distance"], 0.5);
        assert_eq!(as_json["block"], true);
    }

    #[test]
    fn test_decode_accepts_integer_fields() {
        // What a dynamically typed client sends for `listen(3, playback=True)`
        let value = serde_json::json!({
            "type": "listen",
            "duration": 3,
            "channels": [0, 0, 1, 0],
            "playback": true
        });
        let bytes = rmp_serde::to_vec(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), RobotCommand::listen(3.0, true));
    }

    #[test]
    fn test_decoder_waits_for_complete_frame() {
        let bytes = encode(&RobotCommand::say("I am going North")).unwrap();
        let (head, tail) = bytes.split_at(bytes.len() / 2);

        let mut decoder = FrameDecoder::new();
        decoder.extend(head);
        assert!(decoder.next_frame().unwrap().is_none());

        decoder.extend(tail);
        assert_eq!(
            decoder.next_frame().unwrap(),
            Some(Frame::Command(RobotCommand::say("I am going North")))
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_decoder_splits_back_to_back_frames() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encode(&RobotCommand::Stand).unwrap());
        decoder.extend(&encode(&RobotCommand::turn(-1.5, true)).unwrap());

        assert_eq!(decoder.next_frame().unwrap(), Some(Frame::Command(RobotCommand::Stand)));
        assert_eq!(decoder.next_frame().unwrap(), Some(Frame::Command(RobotCommand::turn(-1.5, true))));
        assert_eq!(decoder.next_frame().unwrap(), None);
    }

    #[test]
    fn test_unknown_type_is_rejected_and_stream_continues() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&rmp_serde::to_vec(&serde_json::json!({"type": "dance"})).unwrap());
        decoder.extend(&encode(&RobotCommand::Stand).unwrap());

        match decoder.next_frame().unwrap() {
            Some(Frame::Rejected { kind, reason }) => {
                assert_eq!(kind, "dance");
                assert!(reason.contains("dance"), "reason: {}", reason);
            }
            other => panic!("expected a rejected frame, got {:?}", other),
        }
        assert_eq!(decoder.next_frame().unwrap(), Some(Frame::Command(RobotCommand::Stand)));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_missing_parameter_keeps_type_in_rejection() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&rmp_serde::to_vec(&serde_json::json!({"type": "forward", "block": true})).unwrap());

        let Some(Frame::Rejected { kind, reason }) = decoder.next_frame().unwrap() else {
            panic!("forward without a distance must be rejected");
        };
        assert_eq!(kind, "forward");
        assert!(reason.contains("distance"), "reason: {}", reason);
    }

    #[test]
    fn test_value_without_tag_is_rejected() {
        let mut decoder = FrameDecoder::new();
        // a bare integer is a complete value but not a command map
        decoder.extend(&[0x07]);
        assert!(matches!(
            decoder.next_frame().unwrap(),
            Some(Frame::Rejected { kind, .. }) if kind == "unknown"
        ));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_decoder_fails_on_bytes_that_are_not_msgpack() {
        let mut decoder = FrameDecoder::new();
        // 0xc1 is a reserved marker
        decoder.extend(&[0xc1, 0x00]);
        assert!(decoder.next_frame().is_err());
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_missing_block_decodes_as_non_blocking() {
        let bytes = rmp_serde::to_vec(&serde_json::json!({"type": "forward", "distance": 0.5})).unwrap();
        assert_eq!(decode(&bytes).unwrap(), RobotCommand::forward(0.5, false));

        let bytes = rmp_serde::to_vec(&serde_json::json!({"type": "turn", "angle": 1})).unwrap();
        assert_eq!(decode(&bytes).unwrap(), RobotCommand::turn(1.0, false));
    }

    #[test]
    fn test_oversized_command_rejected() {
        let sentence = "a".repeat(MAX_FRAME);
        assert!(matches!(
            encode(&RobotCommand::say(sentence)),
            Err(CodecError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(reply_for(&RobotCommand::Stand, None), "Server got ran command stand");
        let touched = RobotCommand::Touched { sensor: "Head".into() };
        assert_eq!(reply_for(&touched, Some("true")), "Server got ran command touched: true");
        assert_eq!(reply_for_type("dance", Some("error: nope")), "Server got ran command dance: error: nope");
    }
}
