//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Robot to drive when none is given on the command line
    pub robot_ip: Option<String>,
    pub server: ServerConfig,
    pub robots: Vec<RobotEndpoint>,
    pub motion: MotionConfig,
    pub speech: SpeechConfig,
    pub listen: ListenConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address the server binds and the client connects to
    pub host: String,
    /// Overrides the per-robot port table when set
    pub port: Option<u16>,
    /// Keep accepting clients after the first one disconnects
    pub accept_forever: bool,
}

/// Robot IP and the relay port reserved for it
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RobotEndpoint {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MotionConfig {
    /// Forward distance for one grid cell, meters
    pub cell_distance: f64,
    /// Forward distance when pushing a box into the next cell
    pub push_distance: f64,
    /// Backing off after a push so the box stays in its cell
    pub push_back: f64,
    /// Small step after turning to re-center the base
    pub base_correction: f64,
    pub posture_speed: f64,
    /// Action label whose heading the robot faces at the start of a plan
    pub start_heading: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpeechConfig {
    pub language: String,
    pub opening_line: Option<String>,
    pub closing_line: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListenConfig {
    /// Recording path on the robot
    pub remote_path: String,
    pub format: String,
    pub sample_rate: u32,
    /// Local directory recordings are downloaded into
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    /// Prefix typed before console commands, e.g. "/"
    pub command_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robot_ip: None,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: None,
                accept_forever: false,
            },
            robots: vec![
                RobotEndpoint { ip: "192.168.1.102".to_string(), port: 5001 },
                RobotEndpoint { ip: "192.168.1.105".to_string(), port: 5010 },
                RobotEndpoint { ip: "192.168.1.106".to_string(), port: 5020 },
                RobotEndpoint { ip: "192.168.1.108".to_string(), port: 5030 },
            ],
            motion: MotionConfig {
                cell_distance: 0.50,
                push_distance: 0.55,
                push_back: 0.07,
                base_correction: 0.03,
                posture_speed: 0.5,
                start_heading: "Move(S)".to_string(),
            },
            speech: SpeechConfig {
                language: "English".to_string(),
                opening_line: Some("I am executing plan. Please watch out!".to_string()),
                closing_line: Some("I am done executing the plan. Thank you for watching!".to_string()),
            },
            listen: ListenConfig {
                remote_path: "/home/nao/test.wav".to_string(),
                format: "wav".to_string(),
                sample_rate: 16000,
                download_dir: PathBuf::from("tmp"),
            },
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Apply `RELAY_HOST`, `RELAY_PORT` and `ROBOT_IP` overrides
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("RELAY_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("RELAY_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = Some(port),
                Err(_) => tracing::warn!("Ignoring invalid RELAY_PORT: {}", port),
            }
        }

        if let Ok(ip) = std::env::var("ROBOT_IP") {
            if !ip.is_empty() {
                self.robot_ip = Some(ip);
            }
        }
    }

    /// Robot IP from the command line, falling back to `robot-ip` / `ROBOT_IP`
    pub fn resolve_robot_ip(&self, explicit: Option<String>) -> Result<String, ConfigError> {
        explicit
            .or_else(|| self.robot_ip.clone())
            .ok_or_else(|| ConfigError::MissingField("robot-ip (argument or ROBOT_IP)".to_string()))
    }

    /// Relay port for a robot: explicit override first, then the robot table
    pub fn port_for(&self, robot_ip: &str) -> Result<u16, ConfigError> {
        if let Some(port) = self.server.port {
            return Ok(port);
        }
        self.robots
            .iter()
            .find(|r| r.ip == robot_ip)
            .map(|r| r.port)
            .ok_or_else(|| ConfigError::UnknownRobot(robot_ip.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let motion = &self.motion;
        for (name, value) in [
            ("motion.cell-distance", motion.cell_distance),
            ("motion.push-distance", motion.push_distance),
            ("motion.push-back", motion.push_back),
            ("motion.base-correction", motion.base_correction),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue(format!("{} must be a non-negative distance", name)));
            }
        }
        if !(motion.posture_speed > 0.0 && motion.posture_speed <= 1.0) {
            return Err(ConfigError::InvalidValue("motion.posture-speed must be in (0, 1]".to_string()));
        }
        if self.listen.sample_rate == 0 {
            return Err(ConfigError::InvalidValue("listen.sample-rate must be positive".to_string()));
        }
        if self.server.host.is_empty() {
            return Err(ConfigError::MissingField("server.host".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_port_table() {
        let config = Config::default();
        assert_eq!(config.port_for("192.168.1.102").unwrap(), 5001);
        assert_eq!(config.port_for("192.168.1.108").unwrap(), 5030);
        assert!(matches!(config.port_for("10.0.0.1"), Err(ConfigError::UnknownRobot(_))));
    }

    #[test]
    fn test_port_override_wins() {
        let mut config = Config::default();
        config.server.port = Some(6000);
        assert_eq!(config.port_for("10.0.0.1").unwrap(), 6000);
    }

    #[test]
    fn test_load_roundtrips_default_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("cell-distance"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.robots, Config::default().robots);
        assert_eq!(loaded.motion.push_distance, 0.55);
    }

    #[test]
    fn test_load_rejects_bad_speed() {
        let mut config = Config::default();
        config.motion.posture_speed = 2.0;
        let yaml = serde_yaml::to_string(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        assert!(matches!(Config::load(file.path()), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_env_overrides() {
        // all env handling in one test so parallel tests never see half-set variables
        std::env::set_var("RELAY_HOST", "10.0.0.7");
        std::env::set_var("RELAY_PORT", "6100");
        std::env::set_var("ROBOT_IP", "192.168.1.105");

        let config = Config::load_env();
        assert_eq!(config.server.host, "10.0.0.7");
        assert_eq!(config.port_for("anything").unwrap(), 6100);
        assert_eq!(config.resolve_robot_ip(None).unwrap(), "192.168.1.105");
        assert_eq!(config.resolve_robot_ip(Some("192.168.1.108".into())).unwrap(), "192.168.1.108");

        std::env::set_var("RELAY_PORT", "not-a-port");
        assert_eq!(Config::load_env().server.port, None);

        std::env::remove_var("RELAY_HOST");
        std::env::remove_var("RELAY_PORT");
        std::env::remove_var("ROBOT_IP");

        let config = Config::load_env();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(matches!(config.resolve_robot_ip(None), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_console_prefix_from_yaml() {
        let mut config = Config::default();
        config.console.command_prefix = "/".to_string();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("command-prefix"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.console.command_prefix, "/");
    }

    #[test]
    fn test_console_section_is_optional() {
        let mut value = serde_yaml::to_value(Config::default()).unwrap();
        let mapping = value.as_mapping_mut().unwrap();
        mapping.remove("console");
        mapping.remove("robot-ip");
        let yaml = serde_yaml::to_string(&value).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.console.command_prefix, "");
        assert_eq!(loaded.robot_ip, None);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(Config::load("/nonexistent/relay.yaml"), Err(ConfigError::Parse(_))));
    }
}
