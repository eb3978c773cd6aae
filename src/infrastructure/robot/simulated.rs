//! Simulated robot for dry runs and tests

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::errors::RobotError;
use crate::domain::entities::{SensorStatus, TouchSensor};
use crate::domain::traits::{RobotInfo, RobotSdk};

/// A call made against the robot, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum RobotCall {
    Say { sentence: String, language: Option<String> },
    MoveTo { x: f64, y: f64, theta: f64 },
    Posture { name: String, speed: f64 },
    WakeUp,
    CollisionProtection { chain: String, enabled: bool },
    Shutdown,
    StartRecording { path: String, channels: Vec<u8> },
    StopRecording,
    LoadAudio(String),
    PlayAudio(u32),
    Download(String),
}

/// Robot that logs and records every call instead of driving hardware
pub struct SimulatedRobot {
    info: RobotInfo,
    calls: Mutex<Vec<RobotCall>>,
    touched: Mutex<Vec<TouchSensor>>,
    motion_delay: Duration,
}

impl SimulatedRobot {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            info: RobotInfo {
                ip: ip.into(),
                name: "simulated".to_string(),
            },
            calls: Mutex::new(Vec::new()),
            touched: Mutex::new(Vec::new()),
            motion_delay: Duration::ZERO,
        }
    }

    /// Make every motion take this long, so blocking behaviour is observable
    pub fn with_motion_delay(mut self, delay: Duration) -> Self {
        self.motion_delay = delay;
        self
    }

    /// Mark a sensor as currently touched
    pub fn touch(&self, sensor: TouchSensor) {
        if let Ok(mut touched) = self.touched.lock() {
            touched.push(sensor);
        }
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> Vec<RobotCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: RobotCall) -> Result<(), RobotError> {
        tracing::debug!("[{}] {:?}", self.info.ip, call);
        let mut calls = self.calls.lock().map_err(|_| RobotError::CallFailed {
            call: format!("{:?}", call),
            reason: "call log poisoned".to_string(),
        })?;
        calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl RobotSdk for SimulatedRobot {
    async fn say(&self, sentence: &str, language: Option<&str>) -> Result<(), RobotError> {
        tracing::info!("[{}] says: {}", self.info.ip, sentence);
        self.record(RobotCall::Say {
            sentence: sentence.to_string(),
            language: language.map(str::to_string),
        })
    }

    async fn move_to(&self, x: f64, y: f64, theta: f64) -> Result<(), RobotError> {
        if !self.motion_delay.is_zero() {
            tokio::time::sleep(self.motion_delay).await;
        }
        self.record(RobotCall::MoveTo { x, y, theta })
    }

    async fn go_to_posture(&self, posture: &str, speed: f64) -> Result<(), RobotError> {
        self.record(RobotCall::Posture { name: posture.to_string(), speed })
    }

    async fn wake_up(&self) -> Result<(), RobotError> {
        self.record(RobotCall::WakeUp)
    }

    async fn set_collision_protection(&self, chain: &str, enabled: bool) -> Result<(), RobotError> {
        self.record(RobotCall::CollisionProtection { chain: chain.to_string(), enabled })
    }

    async fn shutdown(&self) -> Result<(), RobotError> {
        self.record(RobotCall::Shutdown)
    }

    async fn touch_status(&self) -> Result<Vec<SensorStatus>, RobotError> {
        let touched = self.touched.lock().map(|t| t.clone()).unwrap_or_default();
        Ok(TouchSensor::ALL
            .iter()
            .map(|s| SensorStatus::new(s.name(), touched.contains(s)))
            .collect())
    }

    async fn start_recording(
        &self,
        path: &str,
        _format: &str,
        _sample_rate: u32,
        channels: &[u8],
    ) -> Result<(), RobotError> {
        self.record(RobotCall::StartRecording { path: path.to_string(), channels: channels.to_vec() })
    }

    async fn stop_recording(&self) -> Result<(), RobotError> {
        self.record(RobotCall::StopRecording)
    }

    async fn load_audio(&self, path: &str) -> Result<u32, RobotError> {
        self.record(RobotCall::LoadAudio(path.to_string()))?;
        Ok(1)
    }

    async fn play_audio(&self, file_id: u32) -> Result<(), RobotError> {
        self.record(RobotCall::PlayAudio(file_id))
    }

    async fn download_file(&self, remote: &str, local_dir: &Path) -> Result<PathBuf, RobotError> {
        self.record(RobotCall::Download(remote.to_string()))?;

        let file_name = Path::new(remote)
            .file_name()
            .ok_or_else(|| RobotError::CallFailed {
                call: "download_file".to_string(),
                reason: format!("no file name in {}", remote),
            })?;
        tokio::fs::create_dir_all(local_dir).await?;
        let local = local_dir.join(file_name);
        tokio::fs::write(&local, b"").await?;
        Ok(local)
    }

    fn robot_info(&self) -> RobotInfo {
        self.info.clone()
    }
}
