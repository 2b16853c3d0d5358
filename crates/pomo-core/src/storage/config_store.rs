use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use log::{error, info, warn};

use super::eeprom::Eeprom;
use crate::app_state::AppError;
use crate::config::{Brightness, Config, ConfigV1};
use crate::constants::{CONFIG_ADDR, CONFIG_BLOCK_LEN, CONFIG_SIGNATURE, CONFIG_VERSION};

/// How the configuration came out of storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLoad {
    /// Signature missing: storage was uninitialized, defaults written
    Fresh,
    /// Older layout converted and written back
    Migrated { from: u8 },
    /// Current layout read as-is
    Loaded,
}

/// Reads the configuration record, initializing or migrating it as needed.
///
/// The transient mute flag always comes back cleared.
pub fn load<S, D>(eeprom: &mut Eeprom<S, D>) -> Result<(Config, ConfigLoad), AppError>
where
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    let mut block = [0u8; CONFIG_BLOCK_LEN];
    eeprom.read_block(CONFIG_ADDR, &mut block)?;

    if block[0] != CONFIG_SIGNATURE {
        info!("No configuration found, writing defaults");
        let config = Config::default();
        save(eeprom, &config)?;
        return Ok((config, ConfigLoad::Fresh));
    }

    let version = block[1];
    let payload = &block[2..];
    let (mut config, outcome) = match version {
        CONFIG_VERSION => match postcard::from_bytes::<Config>(payload) {
            Ok(config) => (config, ConfigLoad::Loaded),
            Err(e) => {
                warn!("Configuration payload unreadable ({:?}), using defaults", e);
                (Config::default(), ConfigLoad::Migrated { from: version })
            }
        },
        1 => {
            let config = postcard::from_bytes::<ConfigV1>(payload)
                .map(Config::from)
                .unwrap_or_default();
            (config, ConfigLoad::Migrated { from: version })
        }
        other => {
            warn!("Unknown configuration version {}, using defaults", other);
            (Config::default(), ConfigLoad::Migrated { from: other })
        }
    };

    config.brightness = Brightness::new(config.brightness.level());
    config.mute = false;

    if let ConfigLoad::Migrated { from } = outcome {
        info!("Migrated configuration from version {} to {}", from, CONFIG_VERSION);
        save(eeprom, &config)?;
    }

    Ok((config, outcome))
}

/// Persists the configuration under the current signature and version.
pub fn save<S, D>(eeprom: &mut Eeprom<S, D>, config: &Config) -> Result<(), AppError>
where
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    let mut block = [0u8; CONFIG_BLOCK_LEN];
    block[0] = CONFIG_SIGNATURE;
    block[1] = CONFIG_VERSION;
    postcard::to_slice(config, &mut block[2..]).map_err(|e| {
        error!("Configuration does not fit its block: {:?}", e);
        AppError::Storage
    })?;
    eeprom.write_block(CONFIG_ADDR, &block)
}
