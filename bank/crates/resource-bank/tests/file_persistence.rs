//! Banks persisted through `FilePrefs` on a real filesystem.

use resource_bank::{
    BankError, FilePrefs, Prefs, PrefsSaveHandler, ResourceBank, ResourceKind, SaveError,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tempfile::TempDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, EnumIter, Display)]
enum Currency {
    Coins,
    Gems,
}

impl ResourceKind for Currency {
    const FAMILY: &'static str = "Currency";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, EnumIter, Display)]
enum Shard {
    Fire,
    Ice,
    Storm,
}

impl ResourceKind for Shard {
    const FAMILY: &'static str = "Shard";
}

fn open_bank<T: ResourceKind>(path: &std::path::Path) -> ResourceBank<T> {
    let prefs = FilePrefs::open(path).unwrap();
    ResourceBank::with_save_handler(PrefsSaveHandler::<T, _>::new(prefs)).unwrap()
}

#[test]
fn balances_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let mut bank = open_bank::<Currency>(&path);
        bank.credit(Currency::Coins, 5, "chest").unwrap();
    }

    let mut bank = open_bank::<Currency>(&path);
    assert_eq!(bank.balance(Currency::Coins), 5);
    assert_eq!(bank.balance(Currency::Gems), 0);

    bank.debit(Currency::Coins, 5, "shop").unwrap();
    drop(bank);

    let bank = open_bank::<Currency>(&path);
    assert_eq!(bank.balance(Currency::Coins), 0);
}

#[test]
fn families_share_one_file_without_clobbering() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("prefs.json");

    let mut coins = open_bank::<Currency>(&path);
    coins.credit(Currency::Gems, 2, "reward").unwrap();
    drop(coins);

    let mut shards = open_bank::<Shard>(&path);
    shards.credit(Shard::Storm, 9, "hero").unwrap();
    drop(shards);

    let prefs = FilePrefs::open(&path).unwrap();
    assert!(prefs.has_key("ResourceBankSaveData_Currency").unwrap());
    assert!(prefs.has_key("ResourceBankSaveData_Shard").unwrap());

    assert_eq!(open_bank::<Currency>(&path).balance(Currency::Gems), 2);
    assert_eq!(open_bank::<Shard>(&path).balance(Shard::Storm), 9);
}

#[test]
fn live_families_on_one_file_keep_both_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    let mut coins = open_bank::<Currency>(&path);
    let mut shards = open_bank::<Shard>(&path);
    coins.credit(Currency::Coins, 100, "chest").unwrap();
    shards.credit(Shard::Fire, 7, "hero").unwrap();
    coins.debit(Currency::Coins, 30, "shop").unwrap();
    shards.credit(Shard::Ice, 2, "hero").unwrap();

    assert_eq!(open_bank::<Currency>(&path).balance(Currency::Coins), 70);
    let reopened = open_bank::<Shard>(&path);
    assert_eq!(reopened.balance(Shard::Fire), 7);
    assert_eq!(reopened.balance(Shard::Ice), 2);
}

#[test]
fn one_prefs_handle_shared_by_two_families() {
    let dir = TempDir::new().unwrap();
    let prefs = FilePrefs::open(dir.path().join("prefs.json")).unwrap();

    let mut coins =
        ResourceBank::with_save_handler(PrefsSaveHandler::<Currency, _>::new(prefs.clone()))
            .unwrap();
    let mut shards =
        ResourceBank::with_save_handler(PrefsSaveHandler::<Shard, _>::new(prefs.clone())).unwrap();
    coins.credit(Currency::Gems, 4, "reward").unwrap();
    shards.credit(Shard::Storm, 1, "hero").unwrap();

    assert!(prefs.has_key("ResourceBankSaveData_Currency").unwrap());
    assert!(prefs.has_key("ResourceBankSaveData_Shard").unwrap());
}

#[test]
fn tampered_file_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    let mut bank = open_bank::<Currency>(&path);
    bank.credit(Currency::Coins, 10, "chest").unwrap();
    drop(bank);

    let raw = std::fs::read_to_string(&path).unwrap();
    let edited = raw.replace(r#"\"Coins\":10"#, r#"\"Coins\":99999"#);
    assert_ne!(raw, edited, "fixture did not contain the balance");
    std::fs::write(&path, edited).unwrap();

    let err = FilePrefs::open(&path).unwrap_err();
    assert!(matches!(err, SaveError::Corrupt(_)));
}

#[test]
fn unparsable_save_fails_bank_construction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    let mut prefs = FilePrefs::open(&path).unwrap();
    prefs
        .set_string("ResourceBankSaveData_Currency", "[1, 2".into())
        .unwrap();

    let err = ResourceBank::<Currency>::with_save_handler(PrefsSaveHandler::<Currency, _>::new(prefs))
        .unwrap_err();
    assert!(matches!(err, BankError::Save(SaveError::Serialization(_))));
}
