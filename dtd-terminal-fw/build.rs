//! Build script for dtd-terminal-fw
//!
//! - Sets up linker search paths for memory.x
//! - Validates terminal.toml at compile time

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Most detectors one terminal tracks
const MAX_DEVICES: usize = 10;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate terminal.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=terminal.toml");

    let config_path = Path::new("terminal.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: terminal.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds terminal.toml as its default configuration. ║\n\
            ║  Please create one in the dtd-terminal-fw directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read terminal.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in terminal.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_keys(&config, &mut errors);
    validate_radio(&config, &mut errors);
    validate_retry(&config, &mut errors);
    report("Invalid terminal configuration", &errors);

    println!("cargo:warning=terminal.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Keys the firmware's own parser accepts, per section
fn allowed_keys(section: &str) -> Option<&'static [&'static str]> {
    match section {
        "radio" => Some(&[
            "device_ids",
            "poll_period_ms",
            "reply_timeout_ms",
            "simulate",
            "rng_seed",
            "retry",
        ]),
        "radio.retry" => Some(&[
            "max_attempts",
            "timeout_base_ms",
            "timeout_multiplier_x100",
            "backoff_enabled",
            "backoff_ms",
        ]),
        "watchdog" => Some(&["enabled", "timeout_ms"]),
        "stats" => Some(&["enabled", "interval_ms"]),
        "main" => Some(&["debug"]),
        _ => None,
    }
}

/// Reject unknown sections and keys; the on-target parser would too
fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        if name == "version" {
            continue;
        }
        let Some(keys) = allowed_keys(name) else {
            errors.push(format!("unknown section or key '{}'", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
        if let Some(toml::Value::Table(retry)) = table.get("retry") {
            let Some(retry_keys) = allowed_keys("radio.retry") else {
                continue;
            };
            for key in retry.keys() {
                if !retry_keys.contains(&key.as_str()) {
                    errors.push(format!("[radio.retry] unknown key '{}'", key));
                }
            }
        }
    }
}

/// Validate the [radio] section
fn validate_radio(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(radio) = config.get("radio") else {
        return;
    };

    match radio.get("device_ids") {
        Some(toml::Value::Array(ids)) => {
            if ids.is_empty() {
                errors.push("[radio] device_ids cannot be empty".to_string());
            }
            if ids.len() > MAX_DEVICES {
                errors.push(format!("[radio] at most {} device_ids", MAX_DEVICES));
            }
            let mut seen = HashSet::new();
            for id in ids {
                match id.as_integer() {
                    Some(n) if (0..=255).contains(&n) => {
                        if !seen.insert(n) {
                            errors.push(format!("[radio] duplicate device id {}", n));
                        }
                    }
                    _ => errors.push(format!("[radio] device id {} must be 0-255", id)),
                }
            }
        }
        Some(_) => errors.push("[radio] device_ids must be an array".to_string()),
        None => {}
    }

    for key in ["poll_period_ms", "reply_timeout_ms"] {
        if let Some(value) = radio.get(key) {
            match value.as_integer() {
                Some(n) if n > 0 => {}
                _ => errors.push(format!("[radio] {} must be a positive integer", key)),
            }
        }
    }

    if let Some(value) = radio.get("simulate") {
        if !value.is_bool() {
            errors.push("[radio] simulate must be true or false".to_string());
        }
    }
}

/// Validate the [radio.retry] section
fn validate_retry(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(retry) = config.get("radio").and_then(|r| r.get("retry")) else {
        return;
    };

    if let Some(value) = retry.get("max_attempts") {
        match value.as_integer() {
            Some(n) if (1..=255).contains(&n) => {}
            _ => errors.push("[radio.retry] max_attempts must be 1-255".to_string()),
        }
    }

    if let Some(value) = retry.get("timeout_multiplier_x100") {
        match value.as_integer() {
            Some(n) if (100..=1000).contains(&n) => {}
            _ => errors.push(
                "[radio.retry] timeout_multiplier_x100 must be 100-1000".to_string(),
            ),
        }
    }

    if let Some(toml::Value::Integer(base)) = retry.get("timeout_base_ms") {
        if *base < 100 {
            println!(
                "cargo:warning=[radio.retry] timeout_base_ms {} is below 100 ms",
                base
            );
        }
    }
}
