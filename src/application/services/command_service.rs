use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::RobotError;
use crate::domain::entities::{RobotCommand, TouchSensor};
use crate::domain::traits::RobotSdk;
use crate::infrastructure::config::{Config, ListenConfig};

const DEFAULT_LANGUAGE: &str = "English";

/// Service executing decoded commands against a robot
pub struct CommandService {
    robot: Arc<dyn RobotSdk>,
    posture_speed: f64,
    language: Option<String>,
    listen: ListenConfig,
}

impl CommandService {
    pub fn new(robot: Arc<dyn RobotSdk>, config: &Config) -> Self {
        let language = Some(config.speech.language.clone())
            .filter(|l| l != DEFAULT_LANGUAGE);

        Self {
            robot,
            posture_speed: config.motion.posture_speed,
            language,
            listen: config.listen.clone(),
        }
    }

    pub fn robot(&self) -> &Arc<dyn RobotSdk> {
        &self.robot
    }

    /// Get the robot ready to take motion commands.
    ///
    /// External collision protection stops the base near walls and boxes,
    /// so it is switched off before waking up and standing.
    pub async fn prepare(&self) -> Result<(), RobotError> {
        self.robot.set_collision_protection("Move", false).await?;
        self.robot.set_collision_protection("Arms", false).await?;
        self.robot.wake_up().await?;
        self.robot.go_to_posture("Stand", self.posture_speed).await
    }

    /// Execute one command, returning extra reply detail if the command
    /// produces a value
    pub async fn handle(&self, command: &RobotCommand) -> Result<Option<String>, RobotError> {
        match command {
            RobotCommand::Say { sentence } => {
                let robot = Arc::clone(&self.robot);
                let sentence = sentence.clone();
                let language = self.language.clone();
                self.spawn("say", async move { robot.say(&sentence, language.as_deref()).await });
            }
            RobotCommand::Forward { distance, block } => {
                self.motion("forward", *distance, 0.0, 0.0, *block).await?;
            }
            RobotCommand::Turn { angle, block } => {
                self.motion("turn", 0.0, 0.0, *angle, *block).await?;
            }
            RobotCommand::Move { x, y, theta, block } => {
                self.motion("move", *x, *y, *theta, *block).await?;
            }
            RobotCommand::Stand => {
                self.robot.go_to_posture("Stand", self.posture_speed).await?;
            }
            RobotCommand::Shutdown => {
                self.robot.shutdown().await?;
            }
            RobotCommand::Listen { duration, channels, playback } => {
                self.listen(*duration, channels, *playback).await?;
            }
            RobotCommand::Touched { sensor } => {
                let touched = self.sensor_touched(sensor).await?;
                return Ok(Some(touched.to_string()));
            }
        }
        Ok(None)
    }

    /// Whether the named touch sensor is currently pressed
    pub async fn sensor_touched(&self, name: &str) -> Result<bool, RobotError> {
        let sensor = TouchSensor::from_name(name)
            .ok_or_else(|| RobotError::UnknownSensor(name.to_string()))?;

        let status = self.robot.touch_status().await?;
        status
            .get(sensor.index())
            .map(|s| s.touched)
            .ok_or_else(|| RobotError::SensorUnavailable {
                sensor: sensor.to_string(),
                index: sensor.index(),
            })
    }

    async fn motion(&self, label: &'static str, x: f64, y: f64, theta: f64, block: bool) -> Result<(), RobotError> {
        if block {
            return self.robot.move_to(x, y, theta).await;
        }
        let robot = Arc::clone(&self.robot);
        self.spawn(label, async move { robot.move_to(x, y, theta).await });
        Ok(())
    }

    /// Record from the microphones, optionally play it back, then pull the
    /// recording off the robot
    async fn listen(&self, duration: f64, channels: &[u8], playback: bool) -> Result<PathBuf, RobotError> {
        let cfg = &self.listen;

        self.robot
            .start_recording(&cfg.remote_path, &cfg.format, cfg.sample_rate, channels)
            .await?;
        tracing::info!("Started recording for {}s", duration);

        let wait = Duration::try_from_secs_f64(duration.max(0.0)).unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        self.robot.stop_recording().await?;
        tracing::info!("Done recording");

        let file_id = self.robot.load_audio(&cfg.remote_path).await?;
        if playback {
            tracing::info!("Playing recording back");
            self.robot.play_audio(file_id).await?;
        }

        let local = self.robot.download_file(&cfg.remote_path, &cfg.download_dir).await?;
        tracing::info!("Recording {} downloaded to {}", cfg.remote_path, local.display());
        Ok(local)
    }

    /// Run a robot call in the background; failures are only logged
    fn spawn<F>(&self, label: &'static str, call: F)
    where
        F: std::future::Future<Output = Result<(), RobotError>> + Send + 'static,
    {
        tokio::spawn(async move {
            if let Err(e) = call.await {
                tracing::warn!("Background {} failed: {}", label, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::application::messaging::codec::reply_for;
    use crate::domain::entities::SensorStatus;
    use crate::domain::traits::RobotInfo;
    use crate::infrastructure::robot::{RobotCall, SimulatedRobot};

    fn service(robot: Arc<SimulatedRobot>, config: &Config) -> CommandService {
        CommandService::new(robot, config)
    }

    /// Backend whose every call fails
    #[derive(Default)]
    struct FailingRobot {
        attempts: AtomicUsize,
    }

    impl FailingRobot {
        fn fail<T>(&self, call: &str) -> Result<T, RobotError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(RobotError::CallFailed { call: call.to_string(), reason: "motors off".to_string() })
        }
    }

    #[async_trait]
    impl RobotSdk for FailingRobot {
        async fn say(&self, _: &str, _: Option<&str>) -> Result<(), RobotError> { self.fail("say") }
        async fn move_to(&self, _: f64, _: f64, _: f64) -> Result<(), RobotError> { self.fail("move_to") }
        async fn go_to_posture(&self, _: &str, _: f64) -> Result<(), RobotError> { self.fail("go_to_posture") }
        async fn wake_up(&self) -> Result<(), RobotError> { self.fail("wake_up") }
        async fn set_collision_protection(&self, _: &str, _: bool) -> Result<(), RobotError> {
            self.fail("set_collision_protection")
        }
        async fn shutdown(&self) -> Result<(), RobotError> { self.fail("shutdown") }
        async fn touch_status(&self) -> Result<Vec<SensorStatus>, RobotError> { self.fail("touch_status") }
        async fn start_recording(&self, _: &str, _: &str, _: u32, _: &[u8]) -> Result<(), RobotError> {
            self.fail("start_recording")
        }
        async fn stop_recording(&self) -> Result<(), RobotError> { self.fail("stop_recording") }
        async fn load_audio(&self, _: &str) -> Result<u32, RobotError> { self.fail("load_audio") }
        async fn play_audio(&self, _: u32) -> Result<(), RobotError> { self.fail("play_audio") }
        async fn download_file(&self, _: &str, _: &Path) -> Result<PathBuf, RobotError> {
            self.fail("download_file")
        }
        fn robot_info(&self) -> RobotInfo {
            RobotInfo { ip: "127.0.0.1".to_string(), name: "failing".to_string() }
        }
    }

    #[tokio::test]
    async fn test_prepare_sequence() {
        let robot = Arc::new(SimulatedRobot::new("127.0.0.1"));
        service(robot.clone(), &Config::default()).prepare().await.unwrap();

        assert_eq!(
            robot.calls(),
            vec![
                RobotCall::CollisionProtection { chain: "Move".into(), enabled: false },
                RobotCall::CollisionProtection { chain: "Arms".into(), enabled: false },
                RobotCall::WakeUp,
                RobotCall::Posture { name: "Stand".into(), speed: 0.5 },
            ]
        );
    }

    #[tokio::test]
    async fn test_blocking_motion_maps_to_move_to() {
        let robot = Arc::new(SimulatedRobot::new("127.0.0.1"));
        let svc = service(robot.clone(), &Config::default());

        svc.handle(&RobotCommand::forward(0.5, true)).await.unwrap();
        svc.handle(&RobotCommand::turn(1.57, true)).await.unwrap();
        svc.handle(&RobotCommand::Move { x: 0.1, y: 0.2, theta: 0.3, block: true }).await.unwrap();

        assert_eq!(
            robot.calls(),
            vec![
                RobotCall::MoveTo { x: 0.5, y: 0.0, theta: 0.0 },
                RobotCall::MoveTo { x: 0.0, y: 0.0, theta: 1.57 },
                RobotCall::MoveTo { x: 0.1, y: 0.2, theta: 0.3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_non_blocking_motion_returns_before_completion() {
        let robot = Arc::new(SimulatedRobot::new("127.0.0.1").with_motion_delay(Duration::from_millis(200)));
        let svc = service(robot.clone(), &Config::default());

        svc.handle(&RobotCommand::forward(0.5, false)).await.unwrap();
        assert!(robot.calls().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(robot.calls(), vec![RobotCall::MoveTo { x: 0.5, y: 0.0, theta: 0.0 }]);
    }

    #[tokio::test]
    async fn test_say_passes_language_only_when_not_default() {
        let robot = Arc::new(SimulatedRobot::new("127.0.0.1"));
        let mut config = Config::default();
        config.speech.language = "Danish".to_string();
        let svc = service(robot.clone(), &config);

        svc.handle(&RobotCommand::say("Hej")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            robot.calls(),
            vec![RobotCall::Say { sentence: "Hej".into(), language: Some("Danish".into()) }]
        );
    }

    #[tokio::test]
    async fn test_listen_records_plays_and_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let robot = Arc::new(SimulatedRobot::new("127.0.0.1"));
        let mut config = Config::default();
        config.listen.download_dir = dir.path().to_path_buf();
        let svc = service(robot.clone(), &config);

        let cmd = RobotCommand::Listen { duration: 0.01, channels: vec![1, 1, 1, 1], playback: true };
        let detail = svc.handle(&cmd).await.unwrap();

        // the recording path stays server-side; only `touched` carries a detail
        assert_eq!(detail, None);
        assert!(dir.path().join("test.wav").exists());
        assert_eq!(
            robot.calls(),
            vec![
                RobotCall::StartRecording { path: "/home/nao/test.wav".into(), channels: vec![1, 1, 1, 1] },
                RobotCall::StopRecording,
                RobotCall::LoadAudio("/home/nao/test.wav".into()),
                RobotCall::PlayAudio(1),
                RobotCall::Download("/home/nao/test.wav".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_background_failure_still_gets_plain_reply() {
        let robot = Arc::new(FailingRobot::default());
        let svc = CommandService::new(robot.clone(), &Config::default());

        let cmd = RobotCommand::forward(0.5, false);
        let detail = svc.handle(&cmd).await.unwrap();
        assert_eq!(detail, None);
        assert_eq!(reply_for(&cmd, detail.as_deref()), "Server got ran command forward");

        let detail = svc.handle(&RobotCommand::say("hello")).await.unwrap();
        assert_eq!(detail, None);

        // the spawned calls did run, and failed
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(robot.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blocking_failure_is_returned() {
        let robot = Arc::new(FailingRobot::default());
        let svc = CommandService::new(robot, &Config::default());

        assert!(matches!(
            svc.handle(&RobotCommand::forward(0.5, true)).await,
            Err(RobotError::CallFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_sensor_touched() {
        let robot = Arc::new(SimulatedRobot::new("127.0.0.1"));
        robot.touch(TouchSensor::BumperBack);
        let svc = service(robot.clone(), &Config::default());

        assert!(svc.sensor_touched("Bumper/Back").await.unwrap());
        assert!(!svc.sensor_touched("Head").await.unwrap());
        assert!(matches!(svc.sensor_touched("Tail").await, Err(RobotError::UnknownSensor(_))));
    }
}
