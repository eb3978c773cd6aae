//! Console parser - Parses typed lines into robot commands

use crate::domain::entities::{degrees_to_radians, RobotCommand, DEFAULT_CHANNELS, DEFAULT_LISTEN_SECS};

/// Result of parsing one console line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Command(RobotCommand),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Parses console input such as `forward 0.5 block` into commands
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn usage() -> &'static str {
        "Available commands:\n\
         \x20 say <text>\n\
         \x20 forward <meters> [block]\n\
         \x20 turn <degrees> [block]\n\
         \x20 move <x> <y> <degrees> [block]\n\
         \x20 stand\n\
         \x20 shutdown\n\
         \x20 listen [seconds] [playback]\n\
         \x20 touched <sensor>\n\
         \x20 help\n\
         \x20 quit"
    }

    /// Parse a single line
    pub fn parse(&self, line: &str) -> ParsedLine {
        let line = line.trim();
        let line = line.strip_prefix(self.command_prefix.as_str()).unwrap_or(line).trim_start();
        if line.is_empty() {
            return ParsedLine::Empty;
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let result = match name.to_lowercase().as_str() {
            "help" | "?" => return ParsedLine::Help,
            "quit" | "exit" => return ParsedLine::Quit,
            "say" if !rest.is_empty() => Ok(RobotCommand::say(rest)),
            "say" => Err("say needs a sentence".to_string()),
            "forward" => Self::parse_forward(&args),
            "turn" => Self::parse_turn(&args),
            "move" => Self::parse_move(&args),
            "stand" => Ok(RobotCommand::Stand),
            "shutdown" => Ok(RobotCommand::Shutdown),
            "listen" => Self::parse_listen(&args),
            "touched" if !rest.is_empty() => Ok(RobotCommand::Touched { sensor: rest.to_string() }),
            "touched" => Err("touched needs a sensor name".to_string()),
            other => Err(format!("Unknown command: {}", other)),
        };

        match result {
            Ok(command) => ParsedLine::Command(command),
            Err(msg) => ParsedLine::Invalid(msg),
        }
    }

    fn parse_forward(args: &[&str]) -> Result<RobotCommand, String> {
        let (values, block) = Self::split_flag(args, "block");
        match values.as_slice() {
            [distance] => Ok(RobotCommand::forward(Self::number(distance)?, block)),
            _ => Err("usage: forward <meters> [block]".to_string()),
        }
    }

    fn parse_turn(args: &[&str]) -> Result<RobotCommand, String> {
        let (values, block) = Self::split_flag(args, "block");
        match values.as_slice() {
            [degrees] => Ok(RobotCommand::turn(degrees_to_radians(Self::number(degrees)?), block)),
            _ => Err("usage: turn <degrees> [block]".to_string()),
        }
    }

    fn parse_move(args: &[&str]) -> Result<RobotCommand, String> {
        let (values, block) = Self::split_flag(args, "block");
        match values.as_slice() {
            [x, y, theta] => Ok(RobotCommand::Move {
                x: Self::number(x)?,
                y: Self::number(y)?,
                theta: degrees_to_radians(Self::number(theta)?),
                block,
            }),
            _ => Err("usage: move <x> <y> <degrees> [block]".to_string()),
        }
    }

    fn parse_listen(args: &[&str]) -> Result<RobotCommand, String> {
        let (values, playback) = Self::split_flag(args, "playback");
        let duration = match values.as_slice() {
            [] => DEFAULT_LISTEN_SECS,
            [secs] => Self::number(secs)?,
            _ => return Err("usage: listen [seconds] [playback]".to_string()),
        };
        Ok(RobotCommand::Listen {
            duration,
            channels: DEFAULT_CHANNELS.to_vec(),
            playback,
        })
    }

    /// Separate a trailing keyword flag from positional values
    fn split_flag<'a>(args: &[&'a str], flag: &str) -> (Vec<&'a str>, bool) {
        let present = args.iter().any(|a| a.eq_ignore_ascii_case(flag));
        let values = args.iter().copied().filter(|a| !a.eq_ignore_ascii_case(flag)).collect();
        (values, present)
    }

    fn number(s: &str) -> Result<f64, String> {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("not a number: {}", s))
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new("")
    }
}
