//! Detector identity resolution and persistence
//!
//! At boot the identifier comes from the first source that yields one:
//!
//! 1. the build-time configuration
//! 2. the identifier persisted by an earlier `SETID`
//! 3. the three strap pins, through a fixed code table
//! 4. [`FALLBACK_ID`]

use dtd_hal::{FlashError, FlashStorage, InputPin, StorageKey};
use dtd_protocol::{DetectorId, MAX_ID_LEN};

/// Identifier used when no other source provides one (`"01"`)
pub const FALLBACK_ID: u8 = 1;

/// Where the active identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdentitySource {
    Config,
    Storage,
    Straps,
    Fallback,
}

/// Identity persistence failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Storage medium refused the operation
    Io,
    /// A value is stored but is not a valid identifier
    Corrupted,
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        match e {
            FlashError::BufferTooSmall | FlashError::Corrupted => StoreError::Corrupted,
            _ => StoreError::Io,
        }
    }
}

/// Non-volatile home of the detector identifier
pub trait IdentityStore {
    /// Read the persisted identifier; `Ok(None)` if none was ever stored
    fn load(&mut self) -> Result<Option<DetectorId>, StoreError>;

    /// Replace the persisted identifier
    ///
    /// On error the previously stored value must be left intact.
    fn persist(&mut self, id: &DetectorId) -> Result<(), StoreError>;
}

/// [`IdentityStore`] on top of the flash key/value store
///
/// The async flash driver is driven to completion in place; identity
/// writes are rare and happen outside any timing-critical path.
pub struct FlashIdentityStore<F> {
    flash: F,
}

impl<F: FlashStorage> FlashIdentityStore<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    pub fn into_inner(self) -> F {
        self.flash
    }
}

impl<F: FlashStorage> IdentityStore for FlashIdentityStore<F> {
    fn load(&mut self) -> Result<Option<DetectorId>, StoreError> {
        let mut buf = [0u8; MAX_ID_LEN];
        match embassy_futures::block_on(self.flash.read(StorageKey::DetectorId, &mut buf)) {
            Ok(len) => DetectorId::from_bytes(&buf[..len])
                .map(Some)
                .ok_or(StoreError::Corrupted),
            Err(FlashError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&mut self, id: &DetectorId) -> Result<(), StoreError> {
        embassy_futures::block_on(self.flash.write(StorageKey::DetectorId, id.as_bytes()))
            .map_err(StoreError::from)
    }
}

/// Three identity strap inputs with pull-ups
///
/// A strap tied to ground reads as 0.
pub struct StrapPins<A, B, C> {
    bit0: A,
    bit1: B,
    bit2: C,
}

impl<A: InputPin, B: InputPin, C: InputPin> StrapPins<A, B, C> {
    pub fn new(bit0: A, bit1: B, bit2: C) -> Self {
        Self { bit0, bit1, bit2 }
    }

    /// Sample the straps as a 3-bit code
    pub fn read_code(&self) -> u8 {
        (u8::from(self.bit2.is_high()) << 2)
            | (u8::from(self.bit1.is_high()) << 1)
            | u8::from(self.bit0.is_high())
    }
}

/// Map a strap code to an identifier
///
/// Only codes 1..=5 are assigned; anything else yields `None` rather
/// than a default.
pub fn strap_code_to_id(code: u8) -> Option<DetectorId> {
    match code {
        1..=5 => Some(DetectorId::from_number(code)),
        _ => None,
    }
}

/// Pick the boot identifier
///
/// `read_straps` is only called when neither the configuration nor the
/// store provides an identifier. A store error counts as "nothing stored".
pub fn resolve_identity<S, R>(
    configured: Option<&DetectorId>,
    store: &mut S,
    read_straps: R,
) -> (DetectorId, IdentitySource)
where
    S: IdentityStore,
    R: FnOnce() -> u8,
{
    if let Some(id) = configured {
        return (id.clone(), IdentitySource::Config);
    }

    match store.load() {
        Ok(Some(id)) => return (id, IdentitySource::Storage),
        Ok(None) => {}
        Err(_e) => {
            warn!("identity: stored id unreadable: {:?}", _e);
        }
    }

    if let Some(id) = strap_code_to_id(read_straps()) {
        return (id, IdentitySource::Straps);
    }

    (DetectorId::from_number(FALLBACK_ID), IdentitySource::Fallback)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// In-memory store with switchable failures
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub stored: Option<DetectorId>,
        pub fail_load: bool,
        pub fail_persist: bool,
        pub writes: usize,
    }

    impl IdentityStore for MemoryStore {
        fn load(&mut self) -> Result<Option<DetectorId>, StoreError> {
            if self.fail_load {
                return Err(StoreError::Io);
            }
            Ok(self.stored.clone())
        }

        fn persist(&mut self, id: &DetectorId) -> Result<(), StoreError> {
            self.writes += 1;
            if self.fail_persist {
                return Err(StoreError::Io);
            }
            self.stored = Some(id.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MemoryStore;
    use super::*;
    use std::collections::HashMap;

    fn id(s: &str) -> DetectorId {
        DetectorId::new(s).unwrap()
    }

    struct Level(bool);

    impl InputPin for Level {
        fn is_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_strap_code_bits() {
        let straps = StrapPins::new(Level(true), Level(false), Level(true));
        assert_eq!(straps.read_code(), 0b101);
        let straps = StrapPins::new(Level(false), Level(false), Level(false));
        assert_eq!(straps.read_code(), 0);
    }

    #[test]
    fn test_strap_table() {
        assert_eq!(strap_code_to_id(0), None);
        assert_eq!(strap_code_to_id(1), Some(id("01")));
        assert_eq!(strap_code_to_id(5), Some(id("05")));
        assert_eq!(strap_code_to_id(6), None);
        assert_eq!(strap_code_to_id(7), None);
    }

    #[test]
    fn test_priority_order() {
        let mut store = MemoryStore {
            stored: Some(id("AB")),
            ..MemoryStore::default()
        };

        let configured = id("CFG");
        assert_eq!(
            resolve_identity(Some(&configured), &mut store, || 3),
            (configured.clone(), IdentitySource::Config)
        );
        assert_eq!(
            resolve_identity(None, &mut store, || 3),
            (id("AB"), IdentitySource::Storage)
        );

        store.stored = None;
        assert_eq!(
            resolve_identity(None, &mut store, || 3),
            (id("03"), IdentitySource::Straps)
        );
        assert_eq!(
            resolve_identity(None, &mut store, || 7),
            (id("01"), IdentitySource::Fallback)
        );
    }

    #[test]
    fn test_straps_not_read_when_stored() {
        let mut store = MemoryStore {
            stored: Some(id("AB")),
            ..MemoryStore::default()
        };
        let (_, source) = resolve_identity(None, &mut store, || panic!("straps sampled"));
        assert_eq!(source, IdentitySource::Storage);
    }

    #[test]
    fn test_store_failure_falls_through() {
        let mut store = MemoryStore {
            fail_load: true,
            ..MemoryStore::default()
        };
        assert_eq!(
            resolve_identity(None, &mut store, || 2),
            (id("02"), IdentitySource::Straps)
        );
    }

    /// Flash double keyed like the real store
    #[derive(Default)]
    struct MapFlash {
        data: HashMap<u8, std::vec::Vec<u8>>,
        fail_write: bool,
    }

    impl FlashStorage for MapFlash {
        async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
            let value = self.data.get(&key.as_u8()).ok_or(FlashError::NotFound)?;
            if buffer.len() < value.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..value.len()].copy_from_slice(value);
            Ok(value.len())
        }

        async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            if self.fail_write {
                return Err(FlashError::Storage);
            }
            self.data.insert(key.as_u8(), data.to_vec());
            Ok(())
        }

        async fn exists(&mut self, key: StorageKey) -> bool {
            self.data.contains_key(&key.as_u8())
        }

        async fn erase_all(&mut self) -> Result<(), FlashError> {
            self.data.clear();
            Ok(())
        }
    }

    #[test]
    fn test_flash_store_roundtrip() {
        let mut store = FlashIdentityStore::new(MapFlash::default());
        assert_eq!(store.load(), Ok(None));
        store.persist(&id("12345678")).unwrap();
        assert_eq!(store.load(), Ok(Some(id("12345678"))));

        let flash = store.into_inner();
        assert_eq!(flash.data.get(&StorageKey::DetectorId.as_u8()).unwrap(), b"12345678");
    }

    #[test]
    fn test_flash_store_errors() {
        let mut flash = MapFlash::default();
        flash.data.insert(StorageKey::DetectorId.as_u8(), b"bad id!!!".to_vec());
        flash.fail_write = true;

        let mut store = FlashIdentityStore::new(flash);
        assert_eq!(store.load(), Err(StoreError::Corrupted));
        assert_eq!(store.persist(&id("02")), Err(StoreError::Io));
    }
}
