use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default listen duration in seconds
pub const DEFAULT_LISTEN_SECS: f64 = 3.0;

/// Default microphone selection (front microphone only)
pub const DEFAULT_CHANNELS: [u8; 4] = [0, 0, 1, 0];

/// A single robot command as it travels over the wire.
///
/// Encoded as a flat map: a `type` tag plus the variant's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RobotCommand {
    Say {
        sentence: String,
    },
    Forward {
        #[serde(deserialize_with = "lenient_f64")]
        distance: f64,
        #[serde(default, deserialize_with = "lenient_bool")]
        block: bool,
    },
    /// Turn around the vertical axis, angle in radians counter-clockwise.
    Turn {
        #[serde(deserialize_with = "lenient_f64")]
        angle: f64,
        #[serde(default, deserialize_with = "lenient_bool")]
        block: bool,
    },
    Move {
        #[serde(deserialize_with = "lenient_f64")]
        x: f64,
        #[serde(deserialize_with = "lenient_f64")]
        y: f64,
        #[serde(deserialize_with = "lenient_f64")]
        theta: f64,
        #[serde(default, deserialize_with = "lenient_bool")]
        block: bool,
    },
    Stand,
    Shutdown,
    Listen {
        #[serde(default = "default_duration", deserialize_with = "lenient_f64")]
        duration: f64,
        #[serde(default = "default_channels")]
        channels: Vec<u8>,
        #[serde(default, deserialize_with = "lenient_bool")]
        playback: bool,
    },
    Touched {
        sensor: String,
    },
}

impl RobotCommand {
    pub fn say(sentence: impl Into<String>) -> Self {
        RobotCommand::Say { sentence: sentence.into() }
    }

    pub fn forward(distance: f64, block: bool) -> Self {
        RobotCommand::Forward { distance, block }
    }

    pub fn turn(angle: f64, block: bool) -> Self {
        RobotCommand::Turn { angle, block }
    }

    pub fn listen(duration: f64, playback: bool) -> Self {
        RobotCommand::Listen {
            duration,
            channels: DEFAULT_CHANNELS.to_vec(),
            playback,
        }
    }

    /// The `type` tag used on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            RobotCommand::Say { .. } => "say",
            RobotCommand::Forward { .. } => "forward",
            RobotCommand::Turn { .. } => "turn",
            RobotCommand::Move { .. } => "move",
            RobotCommand::Stand => "stand",
            RobotCommand::Shutdown => "shutdown",
            RobotCommand::Listen { .. } => "listen",
            RobotCommand::Touched { .. } => "touched",
        }
    }

    /// Whether the server finishes the command before replying.
    ///
    /// Speech always runs in the background.
    pub fn is_blocking(&self) -> bool {
        match self {
            RobotCommand::Say { .. } => false,
            RobotCommand::Forward { block, .. }
            | RobotCommand::Turn { block, .. }
            | RobotCommand::Move { block, .. } => *block,
            RobotCommand::Stand
            | RobotCommand::Shutdown
            | RobotCommand::Listen { .. }
            | RobotCommand::Touched { .. } => true,
        }
    }
}

impl fmt::Display for RobotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotCommand::Say { sentence } => write!(f, "say {:?}", sentence),
            RobotCommand::Forward { distance, block } => {
                write!(f, "forward {:.3}m{}", distance, if *block { " (block)" } else { "" })
            }
            RobotCommand::Turn { angle, block } => {
                write!(f, "turn {:.3}rad{}", angle, if *block { " (block)" } else { "" })
            }
            RobotCommand::Move { x, y, theta, block } => write!(
                f,
                "move x={:.3} y={:.3} theta={:.3}{}",
                x,
                y,
                theta,
                if *block { " (block)" } else { "" }
            ),
            RobotCommand::Stand => write!(f, "stand"),
            RobotCommand::Shutdown => write!(f, "shutdown"),
            RobotCommand::Listen { duration, channels, playback } => write!(
                f,
                "listen {}s channels={:?}{}",
                duration,
                channels,
                if *playback { " (playback)" } else { "" }
            ),
            RobotCommand::Touched { sensor } => write!(f, "touched {}", sensor),
        }
    }
}

fn default_duration() -> f64 {
    DEFAULT_LISTEN_SECS
}

fn default_channels() -> Vec<u8> {
    DEFAULT_CHANNELS.to_vec()
}

/// Accepts any numeric value and widens it to `f64`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or float")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_f32<E: de::Error>(self, v: f32) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

/// Accepts a bool, or an integer where non-zero means true.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a bool or integer")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(RobotCommand::say("hi").type_name(), "say");
        assert_eq!(RobotCommand::forward(0.5, true).type_name(), "forward");
        assert_eq!(RobotCommand::Stand.type_name(), "stand");
        assert_eq!(RobotCommand::listen(3.0, false).type_name(), "listen");
    }

    #[test]
    fn test_blocking_follows_flag() {
        assert!(RobotCommand::forward(0.5, true).is_blocking());
        assert!(!RobotCommand::turn(1.0, false).is_blocking());
        assert!(!RobotCommand::say("hello").is_blocking());
        assert!(RobotCommand::Stand.is_blocking());
    }

    #[test]
    fn test_json_shape_is_flat() {
        let value = serde_json::to_value(RobotCommand::forward(0.5, true)).unwrap();
        assert_eq!(value, serde_json::json!({"type": "forward", "distance": 0.5, "block": true}));
    }

    #[test]
    fn test_lenient_numbers_and_flags() {
        let cmd: RobotCommand =
            serde_json::from_str(r#"{"type": "turn", "angle": 2, "block": 1}"#).unwrap();
        assert_eq!(cmd, RobotCommand::turn(2.0, true));
    }

    #[test]
    fn test_listen_defaults() {
        let cmd: RobotCommand = serde_json::from_str(r#"{"type": "listen"}"#).unwrap();
        assert_eq!(
            cmd,
            RobotCommand::Listen { duration: 3.0, channels: vec![0, 0, 1, 0], playback: false }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<RobotCommand, _> = serde_json::from_str(r#"{"type": "dance"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_for_logs() {
        assert_eq!(RobotCommand::forward(0.5, true).to_string(), "forward 0.500m (block)");
        assert_eq!(RobotCommand::turn(-1.0, false).to_string(), "turn -1.000rad");
        assert_eq!(RobotCommand::say("hi").to_string(), "say \"hi\"");
    }
}
