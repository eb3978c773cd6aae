use clap::{Parser, Subcommand};
use std::sync::Arc;

use pepper_relay::application::errors::RelayError;
use pepper_relay::application::services::{CommandService, PlanService};
use pepper_relay::domain::traits::RobotSdk;
use pepper_relay::infrastructure::adapters::console::ConsoleAdapter;
use pepper_relay::infrastructure::adapters::tcp::{RelayServer, RobotClient};
use pepper_relay::infrastructure::config::Config;
use pepper_relay::infrastructure::robot::SimulatedRobot;

#[derive(Parser)]
#[command(name = "pepper-relay")]
#[command(about = "Relay movement and speech commands from a planner to a robot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "relay.yaml", global = true)]
    config: String,

    /// Relay port (overrides the per-robot port table)
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the robot-side server
    Serve {
        /// IP address of the robot (default: `robot-ip` / ROBOT_IP)
        robot_ip: Option<String>,
    },
    /// Execute a plan, e.g. `plan --robot-ip 192.168.1.102 'Move(W)' 'Push(S,S)'`
    Plan {
        /// IP address of the robot
        #[arg(long)]
        robot_ip: Option<String>,
        /// Action labels in execution order
        #[arg(required = true)]
        actions: Vec<String>,
    },
    /// Drive the robot interactively
    Console {
        /// IP address of the robot (default: `robot-ip` / ROBOT_IP)
        robot_ip: Option<String>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { robot_ip } => {
            with_runtime(serve(load_config(&cli.config, cli.port), robot_ip))
        }
        Commands::Plan { robot_ip, actions } => {
            with_runtime(run_plan(load_config(&cli.config, cli.port), robot_ip, actions))
        }
        Commands::Console { robot_ip } => {
            with_runtime(run_console(load_config(&cli.config, cli.port), robot_ip))
        }
        Commands::Version => {
            println!("pepper-relay v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn with_runtime<F>(task: F) -> Result<(), RelayError>
where
    F: std::future::Future<Output = Result<(), RelayError>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(task)
}

fn load_config(path: &str, port_override: Option<u16>) -> Config {
    let mut config = if std::path::Path::new(path).exists() {
        match Config::load(path) {
            Ok(mut config) => {
                config.apply_env();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    };

    if port_override.is_some() {
        config.server.port = port_override;
    }
    config
}

/// Backend for the robot at `robot_ip`.
///
/// Only the simulated backend ships with the relay; a vendor SDK binding
/// plugs in here by implementing `RobotSdk`.
fn robot_backend(robot_ip: &str) -> Arc<dyn RobotSdk> {
    tracing::info!("Using simulated robot backend for {}", robot_ip);
    Arc::new(SimulatedRobot::new(robot_ip))
}

async fn serve(config: Config, robot_ip: Option<String>) -> Result<(), RelayError> {
    let robot_ip = config.resolve_robot_ip(robot_ip)?;
    let port = config.port_for(&robot_ip)?;

    let commands = CommandService::new(robot_backend(&robot_ip), &config);
    commands.prepare().await?;
    let info = commands.robot().robot_info();
    tracing::info!("Robot {} ({}) ready", info.ip, info.name);

    RelayServer::bind(&config.server.host, port, Arc::new(commands))
        .await?
        .accept_forever(config.server.accept_forever)
        .run()
        .await
}

async fn run_plan(config: Config, robot_ip: Option<String>, actions: Vec<String>) -> Result<(), RelayError> {
    let robot_ip = config.resolve_robot_ip(robot_ip)?;
    let port = config.port_for(&robot_ip)?;
    let plans = PlanService::new(config.motion.clone(), config.speech.clone());

    // Reject a bad plan before touching the robot
    PlanService::parse_plan(&actions)?;

    let mut client = RobotClient::connect(&config.server.host, port).await?;
    let sent = plans.execute(&mut client, &actions).await?;
    tracing::info!("Plan finished, {} commands sent to {}", sent, client.peer());

    client.close().await
}

async fn run_console(config: Config, robot_ip: Option<String>) -> Result<(), RelayError> {
    let robot_ip = config.resolve_robot_ip(robot_ip)?;
    let port = config.port_for(&robot_ip)?;
    let mut client = RobotClient::connect(&config.server.host, port).await?;

    let console = ConsoleAdapter::new(config.console.command_prefix.clone());
    let sent = console.run(&mut client).await?;
    tracing::info!("Console closed after {} commands", sent);

    client.close().await
}

fn init_config() -> Result<(), RelayError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| pepper_relay::application::errors::ConfigError::Parse(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to relay.yaml and adjust as needed.");
    Ok(())
}
