use std::fmt;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};
use strum::IntoEnumIterator;

/// A closed set of resource variants tracked by a [`crate::ResourceBank`].
///
/// Implement it on a fieldless enum deriving `strum::EnumIter`; the iterator
/// is what lets a bank fill in balances for variants added after a save was
/// written.
///
/// ```
/// use resource_bank::ResourceKind;
/// use serde::{Deserialize, Serialize};
/// use strum::{Display, EnumIter};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// #[derive(Serialize, Deserialize, EnumIter, Display)]
/// enum Shard {
///     Fire,
///     Ice,
/// }
///
/// impl ResourceKind for Shard {
///     const FAMILY: &'static str = "Shard";
/// }
/// ```
pub trait ResourceKind:
    Copy + Ord + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + IntoEnumIterator + 'static
{
    /// Name of the variant family. Distinct families get distinct save keys.
    const FAMILY: &'static str;
}
