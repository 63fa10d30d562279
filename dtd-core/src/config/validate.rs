//! Startup validation of the terminal configuration
//!
//! Every problem is reported, not just the first. Critical issues stop
//! the terminal from starting; warnings are logged and tolerated.

use heapless::Vec;

use super::types::TerminalConfig;

/// Minimum sensible first-attempt timeout
pub const MIN_TIMEOUT_BASE_MS: u32 = 100;

/// Minimum sensible watchdog timeout
pub const MIN_WATCHDOG_TIMEOUT_MS: u32 = 5000;

/// Upper bound on reported issues
pub const MAX_ISSUES: usize = 8;

/// Reported issues
pub type Issues = Vec<ConfigIssue, MAX_ISSUES>;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    Warning,
    Critical,
}

/// One configuration problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIssue {
    /// No devices to poll
    NoDevices,
    /// The same id listed twice
    DuplicateDevice(u8),
    /// Retry policy allows no attempt at all
    ZeroAttempts,
    /// Single replies may take longer than a polling sweep period
    ReplyTimeoutTooLong { reply_timeout_ms: u32, poll_period_ms: u32 },
    /// First-attempt timeout below the radio's turnaround time
    TimeoutBaseTooShort(u32),
    /// Watchdog would reset during normal start-up jitter
    WatchdogTooShort(u32),
    /// A blocking sweep of every device can outlast the watchdog
    WatchdogBelowWorstCase { timeout_ms: u32, worst_case_ms: u32 },
}

impl ConfigIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoDevices | Self::DuplicateDevice(_) | Self::ZeroAttempts => Severity::Critical,
            _ => Severity::Warning,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::Critical
    }
}

/// Check a configuration
///
/// Returns `Err` with every issue found, critical or not.
pub fn validate(config: &TerminalConfig) -> Result<(), Issues> {
    let mut issues = Issues::new();
    // Overflowing MAX_ISSUES drops the surplus warnings
    let mut report = |issue: ConfigIssue| {
        let _ = issues.push(issue);
    };

    if config.device_ids.is_empty() {
        report(ConfigIssue::NoDevices);
    }

    for (i, id) in config.device_ids.iter().enumerate() {
        if config.device_ids[..i].contains(id) {
            report(ConfigIssue::DuplicateDevice(*id));
        }
    }

    if config.retry.max_attempts == 0 {
        report(ConfigIssue::ZeroAttempts);
    }

    if config.reply_timeout_ms >= config.poll_period_ms {
        report(ConfigIssue::ReplyTimeoutTooLong {
            reply_timeout_ms: config.reply_timeout_ms,
            poll_period_ms: config.poll_period_ms,
        });
    }

    if config.retry.timeout_base_ms < MIN_TIMEOUT_BASE_MS {
        report(ConfigIssue::TimeoutBaseTooShort(config.retry.timeout_base_ms));
    }

    if config.watchdog.enabled {
        if config.watchdog.timeout_ms < MIN_WATCHDOG_TIMEOUT_MS {
            report(ConfigIssue::WatchdogTooShort(config.watchdog.timeout_ms));
        }

        // The simulated link never blocks for a full retry sequence
        let worst_case_ms = config.worst_case_sweep_ms();
        if !config.simulate && config.watchdog.timeout_ms <= worst_case_ms {
            report(ConfigIssue::WatchdogBelowWorstCase {
                timeout_ms: config.watchdog.timeout_ms,
                worst_case_ms,
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Whether any reported issue prevents start-up
pub fn has_critical(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_critical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RetryPolicy;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate(&TerminalConfig::default()), Ok(()));

        let physical = TerminalConfig {
            simulate: false,
            ..TerminalConfig::default()
        };
        assert_eq!(validate(&physical), Ok(()));
    }

    #[test]
    fn test_critical_issues() {
        let mut cfg = TerminalConfig::default();
        cfg.device_ids.clear();
        cfg.retry.max_attempts = 0;

        let issues = validate(&cfg).unwrap_err();
        assert!(issues.contains(&ConfigIssue::NoDevices));
        assert!(issues.contains(&ConfigIssue::ZeroAttempts));
        assert!(has_critical(&issues));
    }

    #[test]
    fn test_duplicate_reported_once_per_repeat() {
        let mut cfg = TerminalConfig::default();
        cfg.device_ids = Vec::from_slice(&[1, 2, 1]).unwrap();
        let issues = validate(&cfg).unwrap_err();
        assert_eq!(&issues[..], &[ConfigIssue::DuplicateDevice(1)]);
    }

    #[test]
    fn test_warnings_only() {
        let mut cfg = TerminalConfig::default();
        cfg.reply_timeout_ms = 2000;
        cfg.retry.timeout_base_ms = 50;
        cfg.watchdog.timeout_ms = 1000;

        let issues = validate(&cfg).unwrap_err();
        assert_eq!(issues.len(), 3);
        assert!(!has_critical(&issues));
        assert!(issues.contains(&ConfigIssue::TimeoutBaseTooShort(50)));
        assert!(issues.contains(&ConfigIssue::WatchdogTooShort(1000)));
    }

    #[test]
    fn test_watchdog_below_worst_case_sweep() {
        let cfg = TerminalConfig {
            simulate: false,
            retry: RetryPolicy {
                max_attempts: 5,
                timeout_base_ms: 1000,
                timeout_multiplier_x100: 200,
                backoff_enabled: true,
                backoff_ms: 500,
            },
            ..TerminalConfig::default()
        };
        let issues = validate(&cfg).unwrap_err();
        assert!(matches!(
            issues[0],
            ConfigIssue::WatchdogBelowWorstCase { timeout_ms: 30_000, .. }
        ));

        let disabled = TerminalConfig {
            watchdog: crate::config::WatchdogConfig {
                enabled: false,
                timeout_ms: 30_000,
            },
            ..cfg
        };
        assert_eq!(validate(&disabled), Ok(()));
    }
}
