use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;

/// Persisted balances of one resource family.
///
/// Serializes as a plain map from variant name to balance, e.g.
/// `{"Coins":100,"Gems":0}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent, bound = "T: ResourceKind")]
pub struct ResourceBankState<T: ResourceKind> {
    resource_amount: BTreeMap<T, i64>,
}

impl<T: ResourceKind> Default for ResourceBankState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceKind> ResourceBankState<T> {
    /// A state with every variant at zero.
    pub fn new() -> Self {
        Self::from_amounts(BTreeMap::new())
    }

    /// Wrap saved amounts, filling in any variant they do not mention.
    pub fn from_amounts(resource_amount: BTreeMap<T, i64>) -> Self {
        let mut state = Self { resource_amount };
        state.check_type_changes();
        state
    }

    /// Add a zero balance for every variant missing from the table.
    ///
    /// Existing entries are never touched, so calling this again is a no-op.
    /// Returns how many variants were added.
    pub fn check_type_changes(&mut self) -> usize {
        let mut added = 0;
        for resource in T::iter() {
            if let std::collections::btree_map::Entry::Vacant(slot) =
                self.resource_amount.entry(resource)
            {
                slot.insert(0);
                added += 1;
            }
        }
        added
    }

    pub fn amount(&self, resource: T) -> i64 {
        self.resource_amount.get(&resource).copied().unwrap_or(0)
    }

    pub(crate) fn set_amount(&mut self, resource: T, amount: i64) {
        self.resource_amount.insert(resource, amount);
    }

    /// Balances in variant order.
    pub fn amounts(&self) -> &BTreeMap<T, i64> {
        &self.resource_amount
    }
}
