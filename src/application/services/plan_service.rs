//! Plan execution - turns planner action labels into robot commands

use std::time::Duration;

use crate::application::errors::{PlanError, RelayError};
use crate::domain::entities::{degrees_to_radians, shortest_turn, Action, Heading, RobotCommand};
use crate::domain::traits::CommandSink;
use crate::infrastructure::config::{MotionConfig, SpeechConfig};

/// Service compiling plans into command sequences and running them
pub struct PlanService {
    motion: MotionConfig,
    speech: SpeechConfig,
    opening_pause: Duration,
}

impl PlanService {
    pub fn new(motion: MotionConfig, speech: SpeechConfig) -> Self {
        Self {
            motion,
            speech,
            opening_pause: Duration::from_secs(4),
        }
    }

    /// Time to wait after the opening line so speech finishes before the robot moves
    pub fn with_opening_pause(mut self, pause: Duration) -> Self {
        self.opening_pause = pause;
        self
    }

    /// Heading the robot faces before the first action
    pub fn start_heading(&self) -> Result<Heading, PlanError> {
        Ok(Action::parse(&self.motion.start_heading)?.heading())
    }

    /// Parse planner labels, rejecting an empty plan
    pub fn parse_plan<S: AsRef<str>>(labels: &[S]) -> Result<Vec<Action>, PlanError> {
        if labels.is_empty() {
            return Err(PlanError::Empty);
        }
        labels.iter().map(|l| Action::parse(l.as_ref())).collect()
    }

    /// Commands for the actions themselves, without opening or closing lines.
    ///
    /// Every action is announced, then the robot turns the short way to the
    /// action's heading and steps forward one cell. A push overshoots into
    /// the box's cell and backs off again.
    pub fn compile_actions(&self, actions: &[Action], start: Heading) -> Vec<RobotCommand> {
        let mut commands = Vec::with_capacity(actions.len() * 4);
        let mut current = start;

        for action in actions {
            commands.push(RobotCommand::say(action.announcement()));

            let target = action.heading();
            let turn = shortest_turn(current.degrees(), target.degrees());
            commands.push(RobotCommand::turn(degrees_to_radians(turn as f64), true));
            if current != target {
                commands.push(RobotCommand::forward(self.motion.base_correction, true));
            }
            current = target;

            if action.is_push() {
                commands.push(RobotCommand::forward(self.motion.push_distance, true));
                commands.push(RobotCommand::forward(-self.motion.push_back, true));
            } else {
                commands.push(RobotCommand::forward(self.motion.cell_distance, true));
            }
        }

        commands
    }

    /// Run a plan through `sink`, returning how many commands were sent
    pub async fn execute<S, L>(&self, sink: &mut S, labels: &[L]) -> Result<usize, RelayError>
    where
        S: CommandSink,
        L: AsRef<str> + Sync,
    {
        let actions = Self::parse_plan(labels)?;
        let commands = self.compile_actions(&actions, self.start_heading()?);
        let mut sent = 0;

        if let Some(line) = &self.speech.opening_line {
            sink.send(RobotCommand::say(line.clone())).await?;
            sent += 1;
            tokio::time::sleep(self.opening_pause).await;
        }

        tracing::info!("Executing plan of {} actions ({} commands)", actions.len(), commands.len());
        for (i, command) in commands.into_iter().enumerate() {
            tracing::debug!("step {}: {}", i, command);
            let reply = sink.send(command).await?;
            tracing::trace!("reply: {}", reply);
            sent += 1;
        }

        if let Some(line) = &self.speech.closing_line {
            sink.send(RobotCommand::say(line.clone())).await?;
            sent += 1;
        }
        sink.send(RobotCommand::Stand).await?;
        sent += 1;

        Ok(sent)
    }
}
