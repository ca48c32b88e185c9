//! Snapshot persistence.
//!
//! A bank hands its [`ResourceBankState`] to a [`SaveHandler`] after every
//! successful mutation and asks it for the last snapshot once, when it is
//! built. Handlers either succeed or report an error; banks do not retry.

mod prefs;
mod state;

use std::marker::PhantomData;

pub use prefs::{FilePrefs, MemoryPrefs, Prefs};
pub use state::ResourceBankState;

use crate::error::SaveError;
use crate::kind::ResourceKind;

/// Load/save contract between a bank and its durable storage.
pub trait SaveHandler<T: ResourceKind> {
    fn save(&mut self, state: &ResourceBankState<T>) -> Result<(), SaveError>;

    /// The last saved snapshot, or `None` if nothing was ever saved.
    fn load(&mut self) -> Result<Option<ResourceBankState<T>>, SaveError>;
}

impl<T: ResourceKind, H: SaveHandler<T> + ?Sized> SaveHandler<T> for Box<H> {
    fn save(&mut self, state: &ResourceBankState<T>) -> Result<(), SaveError> {
        (**self).save(state)
    }

    fn load(&mut self) -> Result<Option<ResourceBankState<T>>, SaveError> {
        (**self).load()
    }
}

/// Key prefix shared by every family; the family name is appended.
pub const SAVE_KEY_PREFIX: &str = "ResourceBankSaveData_";

/// The save key used for family `T`.
pub fn save_key<T: ResourceKind>() -> String {
    format!("{SAVE_KEY_PREFIX}{}", T::FAMILY)
}

/// Default handler: the snapshot as JSON under [`save_key`] in a [`Prefs`]
/// store.
#[derive(Debug)]
pub struct PrefsSaveHandler<T, P = MemoryPrefs> {
    prefs: P,
    key: String,
    _family: PhantomData<fn() -> T>,
}

impl<T: ResourceKind> Default for PrefsSaveHandler<T, MemoryPrefs> {
    fn default() -> Self {
        Self::new(MemoryPrefs::new())
    }
}

impl<T: ResourceKind, P: Prefs> PrefsSaveHandler<T, P> {
    pub fn new(prefs: P) -> Self {
        Self {
            prefs,
            key: save_key::<T>(),
            _family: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }
}

impl<T: ResourceKind, P: Prefs> SaveHandler<T> for PrefsSaveHandler<T, P> {
    fn save(&mut self, state: &ResourceBankState<T>) -> Result<(), SaveError> {
        let json = serde_json::to_string(state)?;
        self.prefs.set_string(&self.key, json)
    }

    fn load(&mut self) -> Result<Option<ResourceBankState<T>>, SaveError> {
        match self.prefs.get_string(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
