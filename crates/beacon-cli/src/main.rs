//! `beacon-cli` – runs the beacon seeker on the simulated rig.
//!
//! 1. Loads `~/.beacon/config.toml` (or `--config <path>`), falling back to
//!    defaults when it is absent.
//! 2. Builds a simulated rig whose start signal is stdin: type the start
//!    token (`n` by default) and press Enter.
//! 3. Runs the controller until Ctrl-C, then stops both wheels. A second
//!    Ctrl-C exits at once, since IDLE may be blocked reading stdin.

mod config;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use beacon_hal::ByteStreamStart;
use beacon_hal::sim::SimRig;
use beacon_kernel::{CollisionMonitor, ConfigVerifier, NoCollisions, SimBumper};
use beacon_runtime::{Controller, Strategies};
use colored::Colorize;
use tracing::{info, warn};

fn main() -> ExitCode {
    let _guard = beacon_runtime::init_tracing("beacon");

    print_banner();

    let path = match config_arg(std::env::args().skip(1)) {
        Ok(p) => p.unwrap_or_else(config::config_path),
        Err(e) => {
            println!("{}: {}", "Usage error".red(), e);
            return ExitCode::from(2);
        }
    };

    let cfg = match config::load(&path) {
        Ok(loaded) => {
            if loaded.from_file {
                println!("  Config loaded from {}", path.display().to_string().bold());
            } else {
                println!("  No config at {}; using defaults.", path.display().to_string().dimmed());
            }
            loaded.config
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = ConfigVerifier::standard().verify(&cfg.controller) {
        println!("{}: {}", "Config error".red(), e);
        return ExitCode::FAILURE;
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if shutdown_handler.swap(true, Ordering::SeqCst) {
            println!("{}", "  Forced exit.".red().bold());
            std::process::exit(130);
        }
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after this cycle …".yellow().bold());
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    let controller_cfg = &cfg.controller;
    let rig = match SimRig::new()
        .with_start_signal(Box::new(ByteStreamStart::new(
            io::stdin(),
            controller_cfg.start_token as u8,
        )))
        .build(controller_cfg)
    {
        Ok(rig) => rig,
        Err(e) => {
            println!("{}: {}", "Rig error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let monitor: Box<dyn CollisionMonitor> = if cfg.sim_collision_rate > 0.0 {
        Box::new(SimBumper::new(cfg.sim_collision_rate))
    } else {
        Box::new(NoCollisions)
    };

    let mut controller = match Controller::new(controller_cfg, rig, monitor, Strategies::default())
    {
        Ok(c) => c,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "\n  Send {} on stdin to start. Ctrl-C to stop.\n",
        controller_cfg.start_token.to_string().bold().cyan()
    );

    match controller.run_until(&shutdown) {
        Ok(cycles) => {
            info!(cycles, state = %controller.context().current_state(), "controller stopped");
            println!("{}", "  ✓ Wheels stopped. Exiting.".green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Controller fault".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Extract `--config <path>` from the arguments.
fn config_arg(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>, String> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or("--config needs a path")?;
                path = Some(PathBuf::from(value));
            }
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    Ok(path)
}

fn print_banner() {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║            Beacon Seeker             ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!(
        "  {}",
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}
