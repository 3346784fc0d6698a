//! `roverd` – the rover teleoperation daemon.
//!
//! This binary wires the full stack together:
//!
//! 1. Loads `~/.rover/config.toml` (writing defaults on first run) and applies
//!    `ROVER_*` environment overrides.
//! 2. Builds the shared [`ServerContext`] queues, the hardware gateway, the
//!    command dispatcher and the camera capture worker.
//! 3. Serves the cockpit (control page, WebSocket, video stream) until
//!    **Ctrl-C**, then stops the motors before exiting.

mod config;

use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info, warn};

use rover_cockpit::{AllowAll, AuthGate, RoverServer, SharedToken};
use rover_hal::{HardwareGateway, SimGateway};
use rover_middleware::ServerContext;
use rover_runtime::{CaptureWorker, CommandDispatcher};
use rover_types::{Command, MotorAction};

#[tokio::main]
async fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set ROVER_LOG_FORMAT=json to emit newline-delimited JSON logs suitable
    // for log aggregators.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("ROVER_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };
    info!(config = ?cfg, "starting roverd");

    // ── Wiring ────────────────────────────────────────────────────────────
    let ctx = Arc::new(ServerContext::new());
    let gateway: Arc<dyn HardwareGateway> = Arc::new(SimGateway::new());

    let dispatcher = CommandDispatcher::new(gateway.clone());
    tokio::spawn(dispatcher.run(ctx.clone()));

    let capture = CaptureWorker::new(gateway.clone()).with_period(cfg.capture_period());
    tokio::spawn(capture.run(ctx.clone()));

    let auth: Arc<dyn AuthGate> = if cfg.auth_token.is_empty() {
        warn!("no auth token configured; cockpit is open to any client");
        Arc::new(AllowAll)
    } else {
        Arc::new(SharedToken::new(cfg.auth_token.clone()))
    };

    let server = RoverServer::new(ctx, gateway.clone())
        .with_port(cfg.port)
        .with_auth(auth)
        .with_video_idle_timeout(cfg.video_idle_timeout());

    println!(
        "  Cockpit on {}\n",
        format!("http://0.0.0.0:{}/", cfg.port).bold().cyan()
    );

    // ── Run until Ctrl-C ──────────────────────────────────────────────────
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "server exited with error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "⚠  Ctrl-C received – initiating graceful shutdown …".yellow().bold());
        }
    }

    // Halt the drivetrain before the process goes away.
    match gateway.execute(Command::Motors(MotorAction::Stop)).await {
        Ok(()) => println!("{}", "  ✓ Motors stopped.".green()),
        Err(e) => error!(error = %e, "failed to stop motors on shutdown"),
    }
    println!("{}", "  ✓ Exiting roverd.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___  ____ _  _________"#.bold().cyan());
    println!("{}", r#"  / _ \/ __ \ |/ / __/ _ \"#.bold().cyan());
    println!("{}", r#" / , _/ /_/ /    / _// , _/"#.bold().cyan());
    println!("{}", r#"/_/|_|\____/|___/___/_/|_|"#.bold().cyan());
    println!();
    println!("  {} {}",
        "roverd".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Realtime Robot Teleoperation Server");
    println!();
}
