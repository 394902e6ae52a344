use crate::config::NNMS_ENV_VAR;
use log::*;
use nagtrap_common_api::TrapError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The keyword of the NNM config file entry holding the destination.
pub const NNMS_CONFIG_KEYWORD: &str = "NNMS";

/// Resolves the address of the NNM receiving the trap.
/// The explicit destination wins over the environment, which wins over the config file.
pub fn resolve_destination(
    explicit: Option<&str>,
    environment: Option<&str>,
    config_path: &Path,
) -> Result<String, TrapError> {
    if let Some(destination) = explicit {
        debug!("Destination [{}] explicitly provided", destination);
        return Ok(destination.to_owned());
    }

    if let Some(destination) = environment {
        debug!("Destination [{}] read from the {} environment variable", destination, NNMS_ENV_VAR);
        return Ok(destination.to_owned());
    }

    match read_destination_from_file(config_path)? {
        Some(destination) => {
            debug!("Destination [{}] read from [{}]", destination, config_path.display());
            Ok(destination)
        }
        None => Err(TrapError::ConfigurationError {
            message: format!(
                "No {} entry found in [{}]. {}",
                NNMS_CONFIG_KEYWORD,
                config_path.display(),
                resolution_hint(config_path)
            ),
        }),
    }
}

/// Returns the value of the first `NNMS <host>` line of the file.
/// The file is closed before returning, whether a match was found or not.
pub fn read_destination_from_file(config_path: &Path) -> Result<Option<String>, TrapError> {
    let file = File::open(config_path).map_err(|err| TrapError::ConfigurationError {
        message: format!(
            "Cannot open [{}]: {}. {}",
            config_path.display(),
            err,
            resolution_hint(config_path)
        ),
    })?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| TrapError::ConfigurationError {
            message: format!(
                "Cannot read [{}]: {}. {}",
                config_path.display(),
                err,
                resolution_hint(config_path)
            ),
        })?;
        if let Some(destination) = parse_nnms_line(&line) {
            return Ok(Some(destination.to_owned()));
        }
    }

    Ok(None)
}

fn parse_nnms_line(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(NNMS_CONFIG_KEYWORD), Some(destination)) => Some(destination.trim_end()),
        _ => None,
    }
}

fn resolution_hint(config_path: &Path) -> String {
    format!(
        "The destination can be set with the --destination option, the {} environment variable or a '{} <host>' line in [{}]",
        NNMS_ENV_VAR,
        NNMS_CONFIG_KEYWORD,
        config_path.display()
    )
}
