use crate::config::{build_config, Args, NagtrapConfig};
use clap::{CommandFactory, Parser};
use log::*;
use nagtrap_common_api::TrapError;
use nagtrap_common_logger::setup_logger;
use nagtrap_sender::config::{EnvironmentOverrides, HOSTNAME_ENV_VAR, NNMS_ENV_VAR};
use nagtrap_sender::TrapSender;
use std::process::ExitCode;

mod config;
mod manual;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if prints_usage(&err) {
                let _ = Args::command().print_help();
                eprintln!();
            }
            eprintln!("nagtrap: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// The invalid input is reported before the configuration is read.
async fn run(args: &Args) -> Result<(), TrapError> {
    if args.man {
        print!("{}", manual::MANUAL);
        return Ok(());
    }

    let environment = EnvironmentOverrides::from_process_env();

    if args.version {
        let config = load_config(&args.config_dir)?;
        let sender = TrapSender::new(config.sender.clone(), environment.clone());
        print!("{}", version_report(&args.config_dir, &config, &environment, &sender));
        return Ok(());
    }

    let event = args.to_event()?;
    let config = load_config(&args.config_dir)?;

    let _guard = setup_logger(&config.logger)
        .map_err(|err| TrapError::ConfigurationError { message: format!("{}", err) })?;

    let sender = TrapSender::new(config.sender, environment);
    sender.send(&event, args.hostname.as_deref()).await?;
    info!("Trap for service [{}] sent", event.service);
    Ok(())
}

fn prints_usage(err: &TrapError) -> bool {
    matches!(err, TrapError::UsageError { .. } | TrapError::ValidationError { .. })
}

fn load_config(config_dir: &str) -> Result<NagtrapConfig, TrapError> {
    build_config(config_dir).map_err(|err| TrapError::ConfigurationError {
        message: format!("Cannot load the configuration from [{}]: {}", config_dir, err),
    })
}

fn version_report(
    config_dir: &str,
    config: &NagtrapConfig,
    environment: &EnvironmentOverrides,
    sender: &TrapSender,
) -> String {
    let not_set = "<not set>".to_owned();
    let mut report = format!("nagtrap {}\n", env!("CARGO_PKG_VERSION"));
    report.push_str(&format!("os: {}, arch: {}\n", std::env::consts::OS, std::env::consts::ARCH));
    report.push_str(&format!("config dir: {}\n", config_dir));
    report.push_str(&format!("nnm config file: {}\n", config.sender.nnm_config_path));
    report.push_str(&format!(
        "{}: {}\n",
        NNMS_ENV_VAR,
        environment.destination.as_ref().unwrap_or(&not_set)
    ));
    report.push_str(&format!(
        "{}: {}\n",
        HOSTNAME_ENV_VAR,
        environment.hostname.as_ref().unwrap_or(&not_set)
    ));
    report.push_str("transports:\n");
    for (transport, available) in sender.transports_report() {
        let availability = if available { "available" } else { "not available" };
        report.push_str(&format!("  [{}] {}\n", availability, transport));
    }
    report
}
