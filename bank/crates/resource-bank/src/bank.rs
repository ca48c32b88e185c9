//! The resource ledger.
//!
//! Credit and debit order their side effects differently and that order is
//! part of the contract:
//!
//! * credit: update, notify (`collected`, `amount_changed`), save;
//! * debit: update, save, notify (`spent`, `amount_changed`).
//!
//! Listeners of a credit therefore see the new balance before it is saved.

use std::fmt;

use crate::bimap::BiMap;
use crate::callbacks::ResourceBankCallbacks;
use crate::error::BankError;
use crate::kind::ResourceKind;
use crate::saving::{PrefsSaveHandler, ResourceBankState, SaveHandler};
use crate::validation::{check_spend, validate_amount};

/// Stable string ids for the variants of a family.
pub type ResourceIdMap<T> = BiMap<String, T>;

pub struct ResourceBank<T: ResourceKind> {
    resource_id_map: ResourceIdMap<T>,
    callbacks: ResourceBankCallbacks<T>,
    state: ResourceBankState<T>,
    save_handler: Box<dyn SaveHandler<T>>,
}

impl<T: ResourceKind> fmt::Debug for ResourceBank<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBank")
            .field("family", &T::FAMILY)
            .field("state", &self.state)
            .field("resource_id_map", &self.resource_id_map)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl<T: ResourceKind> ResourceBank<T> {
    /// Build a bank, loading the last snapshot from `save_handler`.
    ///
    /// Without a handler the snapshot lives in an in-process
    /// [`crate::MemoryPrefs`]. Variants missing from the loaded snapshot
    /// start at zero.
    pub fn new(
        resource_id_map: Option<ResourceIdMap<T>>,
        save_handler: Option<Box<dyn SaveHandler<T>>>,
    ) -> Result<Self, BankError> {
        let mut save_handler: Box<dyn SaveHandler<T>> = match save_handler {
            Some(handler) => handler,
            None => Box::new(PrefsSaveHandler::<T>::default()),
        };

        let mut state = save_handler.load()?.unwrap_or_default();
        let added = state.check_type_changes();
        tracing::debug!(
            family = T::FAMILY,
            resources = state.amounts().len(),
            added,
            "resource bank loaded"
        );

        Ok(Self {
            resource_id_map: resource_id_map.unwrap_or_default(),
            callbacks: ResourceBankCallbacks::default(),
            state,
            save_handler,
        })
    }

    /// A bank with no id map that keeps its saves in memory.
    pub fn in_memory() -> Result<Self, BankError> {
        Self::new(None, None)
    }

    /// Shorthand for a bank persisting through `save_handler`.
    pub fn with_save_handler(
        save_handler: impl SaveHandler<T> + 'static,
    ) -> Result<Self, BankError> {
        Self::new(None, Some(Box::new(save_handler)))
    }

    pub fn callbacks(&self) -> &ResourceBankCallbacks<T> {
        &self.callbacks
    }

    pub fn resource_id_map(&self) -> &ResourceIdMap<T> {
        &self.resource_id_map
    }

    /// The external id of `resource`, if the id map names it.
    pub fn resource_id(&self, resource: T) -> Option<&str> {
        self.resource_id_map.get_by_right(&resource).map(String::as_str)
    }

    /// The variant behind an external id.
    pub fn resource_for_id(&self, id: &str) -> Option<T> {
        self.resource_id_map.get_by_left(id).copied()
    }

    /// Current balance. Every variant has one.
    pub fn balance(&self, resource: T) -> i64 {
        self.state.amount(resource)
    }

    pub fn state(&self) -> &ResourceBankState<T> {
        &self.state
    }

    /// Add `amount` to `resource`.
    ///
    /// Listeners are notified before the snapshot is saved. If the save fails
    /// the new balance stays in memory and the error is returned.
    pub fn credit(&mut self, resource: T, amount: i64, source: &str) -> Result<(), BankError> {
        validate_amount(amount)?;
        let balance = self
            .state
            .amount(resource)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;

        self.state.set_amount(resource, balance);
        tracing::debug!(%resource, amount, balance, source, "credit applied");

        self.callbacks
            .invoke_collected(resource, amount, balance, source);
        self.save()
    }

    /// Check whether `amount` could be debited from `resource` right now.
    pub fn can_spend(&self, resource: T, amount: i64) -> Result<(), BankError> {
        check_spend(self.state.amount(resource), amount)
    }

    /// Remove `amount` from `resource`.
    ///
    /// The snapshot is saved before listeners are notified; a failed save
    /// returns the error without notifying.
    pub fn debit(&mut self, resource: T, amount: i64, source: &str) -> Result<(), BankError> {
        self.debit_inner(resource, amount, source, false)
    }

    /// Like [`ResourceBank::debit`] but lets a zero amount through, e.g. to
    /// reset a balance that may already be empty.
    pub fn debit_allow_zero(
        &mut self,
        resource: T,
        amount: i64,
        source: &str,
    ) -> Result<(), BankError> {
        self.debit_inner(resource, amount, source, true)
    }

    fn debit_inner(
        &mut self,
        resource: T,
        amount: i64,
        source: &str,
        accept_zero_amount: bool,
    ) -> Result<(), BankError> {
        match self.can_spend(resource, amount) {
            Ok(()) => {}
            Err(BankError::ZeroAmount) if accept_zero_amount => {}
            Err(err) => return Err(err),
        }
        let balance = self
            .state
            .amount(resource)
            .checked_sub(amount)
            .ok_or(BankError::Overflow)?;

        self.state.set_amount(resource, balance);
        tracing::debug!(%resource, amount, balance, source, "debit applied");
        self.save()?;

        self.callbacks.invoke_spent(resource, amount, balance, source);
        Ok(())
    }

    fn save(&mut self) -> Result<(), BankError> {
        self.save_handler.save(&self.state).map_err(|err| {
            tracing::error!(family = T::FAMILY, error = %err, "failed to save resource bank");
            BankError::from(err)
        })
    }
}
