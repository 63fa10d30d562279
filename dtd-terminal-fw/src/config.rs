//! Configuration persistence
//!
//! Loads the terminal configuration from flash storage. The caller falls
//! back to the embedded `terminal.toml` and then to built-in defaults.

use core::str;
use defmt::*;

use dtd_core::config::{parse_terminal_config, ParseError, TerminalConfig, CONFIG_VERSION};
use dtd_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use dtd_hal_rp2040::FlashStorageTrait;

/// Maximum serialized config size (binary)
const MAX_CONFIG_SIZE: usize = 256;

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 1536;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, Format)]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// TOML parsing failed
    TomlParse(ParseError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// Config version mismatch
    VersionMismatch,
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

/// Configuration persistence manager
pub struct ConfigPersistence<'d> {
    storage: Rp2040FlashStorage<'d>,
}

impl<'d> ConfigPersistence<'d> {
    pub fn new(storage: Rp2040FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Load configuration from flash
    ///
    /// Tries the TOML copy first, then the binary postcard copy.
    pub async fn load(&mut self) -> Result<TerminalConfig, ConfigError> {
        info!("Loading configuration from flash...");

        match self.load_toml().await {
            Ok(config) => {
                info!("Loaded configuration from TOML");
                return Ok(config);
            }
            Err(ConfigError::Flash(FlashError::NotFound)) => {
                debug!("No TOML config found, trying binary format");
            }
            Err(e) => {
                warn!("Failed to load TOML config: {:?}, trying binary", e);
            }
        }

        self.load_binary().await
    }

    async fn load_toml(&mut self) -> Result<TerminalConfig, ConfigError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self
            .storage
            .read(StorageKey::TerminalConfigToml, &mut buffer)
            .await?;

        debug!("Read {} bytes of TOML from flash", len);

        let toml_str = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;
        let config = parse_terminal_config(toml_str).map_err(ConfigError::TomlParse)?;

        log_config_summary(&config);
        Ok(config)
    }

    async fn load_binary(&mut self) -> Result<TerminalConfig, ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = self
            .storage
            .read(StorageKey::TerminalConfig, &mut buffer)
            .await?;

        debug!("Read {} bytes of binary config from flash", len);

        let config: TerminalConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            warn!(
                "Config version mismatch: found {}, expected {}",
                config.version, CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }

        log_config_summary(&config);
        Ok(config)
    }
}

/// Log a summary of the loaded configuration
pub fn log_config_summary(config: &TerminalConfig) {
    debug!("  devices: {=[u8]}", &config.device_ids[..]);
    debug!(
        "  poll {} ms, reply timeout {} ms, simulate={}",
        config.poll_period_ms, config.reply_timeout_ms, config.simulate
    );
    debug!("  retry: {}", config.retry);
    debug!("  watchdog: {}", config.watchdog);
}
