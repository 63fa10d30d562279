//! Minimal TOML reader for the terminal configuration
//!
//! Handles only the subset `terminal.toml` uses:
//! - `[section]` and `[section.subsection]` headers
//! - `key = value` with integers, booleans and flat integer arrays
//! - `#` comments, whole-line or trailing
//!
//! Keys not listed below are rejected so typos surface at load time.
//!
//! ```toml
//! [radio]
//! device_ids = [1, 2, 3, 4, 5]
//! poll_period_ms = 1500
//! reply_timeout_ms = 500
//! simulate = true
//! rng_seed = 12345
//!
//! [radio.retry]
//! max_attempts = 3
//! timeout_base_ms = 500
//! timeout_multiplier_x100 = 150
//! backoff_enabled = true
//! backoff_ms = 100
//!
//! [watchdog]
//! enabled = true
//! timeout_ms = 30000
//!
//! [stats]
//! enabled = true
//! interval_ms = 30000
//!
//! [main]
//! debug = false
//! ```

use heapless::Vec;

use super::types::TerminalConfig;
use crate::device::MAX_DEVICES;

/// Parse error, with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection(u16),
    /// Line is neither a header nor `key = value`
    InvalidLine(u16),
    /// Key not valid in its section
    UnknownKey(u16),
    /// Value of the wrong type or out of range
    InvalidValue(u16),
    /// More device ids than the terminal can track
    TooManyItems(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Radio,
    Retry,
    Watchdog,
    Stats,
    Main,
}

/// Parse TOML text into a terminal configuration
///
/// Missing keys keep their default value.
pub fn parse_terminal_config(input: &str) -> Result<TerminalConfig, ParseError> {
    let mut config = TerminalConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = (index + 1).min(u16::MAX as usize) as u16;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection(line_no))?;
            section = parse_section_header(header).ok_or(ParseError::InvalidSection(line_no))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine(line_no))?;
        apply_value(&mut config, section, key, value, line_no)?;
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "radio" => Some(Section::Radio),
        "radio.retry" => Some(Section::Retry),
        "watchdog" => Some(Section::Watchdog),
        "stats" => Some(Section::Stats),
        "main" => Some(Section::Main),
        _ => None,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_int<T: core::str::FromStr>(value: &str, line: u16) -> Result<T, ParseError> {
    // Integer literals may use `_` separators (`30_000`)
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue(line))?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue(line))
}

fn parse_bool(value: &str, line: u16) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue(line)),
    }
}

fn parse_id_list(value: &str, line: u16) -> Result<Vec<u8, MAX_DEVICES>, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue(line))?;

    let mut ids = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        let id: u8 = parse_int(item, line)?;
        ids.push(id).map_err(|_| ParseError::TooManyItems(line))?;
    }
    Ok(ids)
}

fn apply_value(
    config: &mut TerminalConfig,
    section: Section,
    key: &str,
    value: &str,
    line: u16,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Root, "version") => config.version = parse_int(value, line)?,

        (Section::Radio, "device_ids") => config.device_ids = parse_id_list(value, line)?,
        (Section::Radio, "poll_period_ms") => config.poll_period_ms = parse_int(value, line)?,
        (Section::Radio, "reply_timeout_ms") => {
            config.reply_timeout_ms = parse_int(value, line)?
        }
        (Section::Radio, "simulate") => config.simulate = parse_bool(value, line)?,
        (Section::Radio, "rng_seed") => config.rng_seed = parse_int(value, line)?,

        (Section::Retry, "max_attempts") => config.retry.max_attempts = parse_int(value, line)?,
        (Section::Retry, "timeout_base_ms") => {
            config.retry.timeout_base_ms = parse_int(value, line)?
        }
        (Section::Retry, "timeout_multiplier_x100") => {
            config.retry.timeout_multiplier_x100 = parse_int(value, line)?
        }
        (Section::Retry, "backoff_enabled") => {
            config.retry.backoff_enabled = parse_bool(value, line)?
        }
        (Section::Retry, "backoff_ms") => config.retry.backoff_ms = parse_int(value, line)?,

        (Section::Watchdog, "enabled") => config.watchdog.enabled = parse_bool(value, line)?,
        (Section::Watchdog, "timeout_ms") => config.watchdog.timeout_ms = parse_int(value, line)?,

        (Section::Stats, "enabled") => config.stats.enabled = parse_bool(value, line)?,
        (Section::Stats, "interval_ms") => config.stats.interval_ms = parse_int(value, line)?,

        (Section::Main, "debug") => config.debug = parse_bool(value, line)?,

        _ => return Err(ParseError::UnknownKey(line)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Test terminal
version = 1

[radio]
device_ids = [3, 1, 2]   # display order
poll_period_ms = 2_000
reply_timeout_ms = 400
simulate = false
rng_seed = 42

[radio.retry]
max_attempts = 4
timeout_base_ms = 300
timeout_multiplier_x100 = 200
backoff_enabled = false
backoff_ms = 50

[watchdog]
enabled = true
timeout_ms = 60000

[stats]
enabled = false
interval_ms = 10000

[main]
debug = true
"#;

    #[test]
    fn test_parse_full_sample() {
        let cfg = parse_terminal_config(SAMPLE).unwrap();
        assert_eq!(&cfg.device_ids[..], &[3, 1, 2]);
        assert_eq!(cfg.poll_period_ms, 2000);
        assert_eq!(cfg.reply_timeout_ms, 400);
        assert!(!cfg.simulate);
        assert_eq!(cfg.rng_seed, 42);
        assert_eq!(cfg.retry.max_attempts, 4);
        assert_eq!(cfg.retry.timeout_base_ms, 300);
        assert_eq!(cfg.retry.timeout_multiplier_x100, 200);
        assert!(!cfg.retry.backoff_enabled);
        assert_eq!(cfg.retry.backoff_ms, 50);
        assert_eq!(cfg.watchdog.timeout_ms, 60_000);
        assert!(!cfg.stats.enabled);
        assert_eq!(cfg.stats.interval_ms, 10_000);
        assert!(cfg.debug);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_terminal_config("").unwrap(), TerminalConfig::default());
        assert_eq!(
            parse_terminal_config("# nothing\n\n").unwrap(),
            TerminalConfig::default()
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_terminal_config("[radio]\npoll_period_ms = fast\n"),
            Err(ParseError::InvalidValue(2))
        );
        assert_eq!(
            parse_terminal_config("[display]\n"),
            Err(ParseError::InvalidSection(1))
        );
        assert_eq!(
            parse_terminal_config("[radio]\nbaud = 9600\n"),
            Err(ParseError::UnknownKey(2))
        );
        assert_eq!(
            parse_terminal_config("[radio]\nsimulate\n"),
            Err(ParseError::InvalidLine(2))
        );
        assert_eq!(
            parse_terminal_config("[radio\n"),
            Err(ParseError::InvalidSection(1))
        );
    }

    #[test]
    fn test_id_list_bounds() {
        assert_eq!(
            parse_terminal_config("[radio]\ndevice_ids = [1,2,3,4,5,6,7,8,9,10,11]\n"),
            Err(ParseError::TooManyItems(2))
        );
        assert_eq!(
            parse_terminal_config("[radio]\ndevice_ids = [1, 256]\n"),
            Err(ParseError::InvalidValue(2))
        );
        let cfg = parse_terminal_config("[radio]\ndevice_ids = []\n").unwrap();
        assert!(cfg.device_ids.is_empty());
        let cfg = parse_terminal_config("[radio]\ndevice_ids = [7, 8,]\n").unwrap();
        assert_eq!(&cfg.device_ids[..], &[7, 8]);
    }

    #[test]
    fn test_key_in_wrong_section() {
        assert_eq!(
            parse_terminal_config("[watchdog]\nmax_attempts = 3\n"),
            Err(ParseError::UnknownKey(2))
        );
    }
}
