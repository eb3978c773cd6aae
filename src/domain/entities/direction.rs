//! Plan action labels and the compass headings they map to.
//!
//! Headings follow the level coordinate system: east is 0 degrees and
//! angles grow counter-clockwise, with north facing the board.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::application::errors::PlanError;

/// Compass heading of the robot on the level grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub fn degrees(&self) -> i32 {
        match self {
            Heading::East => 0,
            Heading::North => 90,
            Heading::West => 180,
            Heading::South => 270,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Heading::North => "North",
            Heading::East => "East",
            Heading::South => "South",
            Heading::West => "West",
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "N" => Some(Heading::North),
            "E" => Some(Heading::East),
            "S" => Some(Heading::South),
            "W" => Some(Heading::West),
            _ => None,
        }
    }
}

/// A single plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Heading),
    /// Push a box; agent and box travel the same way.
    Push(Heading),
}

impl Action {
    /// Parse a planner label such as `Move(N)` or `Push(E,E)`.
    ///
    /// Pushes where the agent and box directions differ have no entry in
    /// the direction table and are rejected.
    pub fn parse(label: &str) -> Result<Self, PlanError> {
        let unknown = || PlanError::UnknownAction(label.to_string());
        let trimmed = label.trim();

        let (kind, rest) = trimmed.split_once('(').ok_or_else(unknown)?;
        let args = rest.strip_suffix(')').ok_or_else(unknown)?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        match (kind, args.as_slice()) {
            ("Move", [dir]) => Heading::from_letter(dir).map(Action::Move).ok_or_else(unknown),
            ("Push", [agent, boxed]) if agent == boxed => {
                Heading::from_letter(agent).map(Action::Push).ok_or_else(unknown)
            }
            _ => Err(unknown()),
        }
    }

    pub fn heading(&self) -> Heading {
        match self {
            Action::Move(h) | Action::Push(h) => *h,
        }
    }

    pub fn is_push(&self) -> bool {
        matches!(self, Action::Push(_))
    }

    /// Sentence the robot says before performing the action
    pub fn announcement(&self) -> String {
        match self {
            Action::Move(h) => format!("I am going {}", h.name()),
            Action::Push(h) => format!("I am pushing {}", h.name()),
        }
    }
}

impl FromStr for Action {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::parse(s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = &self.heading().name()[..1];
        match self {
            Action::Move(_) => write!(f, "Move({})", letter),
            Action::Push(_) => write!(f, "Push({},{})", letter, letter),
        }
    }
}

/// Signed turn in degrees taking the shortest way round, in [-180, 180).
pub fn shortest_turn(current: i32, target: i32) -> i32 {
    (target - current + 540).rem_euclid(360) - 180
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}
