//! Typed resource balances for game economies.
//!
//! A [`ResourceBank`] keeps one signed balance per variant of a closed enum
//! (currencies, shards, ...). The crate is split into small building blocks:
//!
//! * [`validation`]: amount classification shared by credit and debit.
//! * [`bimap`]: a two-way map used to attach stable string ids to variants.
//! * [`callbacks`]: synchronous collected/spent/changed channels.
//! * [`saving`]: the snapshot type, the [`SaveHandler`] contract and the
//!   default key/value backed handler.
//! * [`bank`]: the ledger itself.

pub mod bank;
pub mod bimap;
pub mod callbacks;
pub mod saving;
pub mod validation;

mod error;
mod kind;

pub use bank::{ResourceBank, ResourceIdMap};
pub use bimap::{BiMap, BiMapError};
pub use callbacks::{EventChannel, ResourceBankCallbacks, ResourceChange, SubscriptionId};
pub use error::{BankError, SaveError};
pub use kind::ResourceKind;
pub use saving::{
    FilePrefs, MemoryPrefs, Prefs, PrefsSaveHandler, ResourceBankState, SaveHandler,
};
pub use strum::IntoEnumIterator;
