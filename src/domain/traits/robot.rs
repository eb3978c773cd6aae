use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::domain::entities::SensorStatus;
use crate::application::errors::RobotError;

/// Robot SDK trait - abstraction over the vendor proxies (speech, motion,
/// posture, touch, audio)
#[async_trait]
pub trait RobotSdk: Send + Sync {
    /// Speak a sentence; `None` uses the robot's current language
    async fn say(&self, sentence: &str, language: Option<&str>) -> Result<(), RobotError>;

    /// Move relative to the current pose; returns once the motion is done
    async fn move_to(&self, x: f64, y: f64, theta: f64) -> Result<(), RobotError>;

    async fn go_to_posture(&self, posture: &str, speed: f64) -> Result<(), RobotError>;

    /// Power the motors and leave rest mode
    async fn wake_up(&self) -> Result<(), RobotError>;

    /// Toggle external collision protection for a body chain ("Move", "Arms")
    async fn set_collision_protection(&self, chain: &str, enabled: bool) -> Result<(), RobotError>;

    async fn shutdown(&self) -> Result<(), RobotError>;

    /// Touch status list, ordered as `TouchSensor::index`
    async fn touch_status(&self) -> Result<Vec<SensorStatus>, RobotError>;

    async fn start_recording(
        &self,
        path: &str,
        format: &str,
        sample_rate: u32,
        channels: &[u8],
    ) -> Result<(), RobotError>;

    async fn stop_recording(&self) -> Result<(), RobotError>;

    /// Load an audio file into the player, returning its file id
    async fn load_audio(&self, path: &str) -> Result<u32, RobotError>;

    async fn play_audio(&self, file_id: u32) -> Result<(), RobotError>;

    /// Copy a file off the robot into `local_dir`
    async fn download_file(&self, remote: &str, local_dir: &Path) -> Result<PathBuf, RobotError>;

    /// Get robot info
    fn robot_info(&self) -> RobotInfo;
}

/// Robot information
#[derive(Debug, Clone)]
pub struct RobotInfo {
    pub ip: String,
    pub name: String,
}
