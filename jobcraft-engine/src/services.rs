//! Narrow interfaces to collaborators outside the engine, with in-memory
//! implementations for tooling and tests.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Economy backend used to gate and charge special-order entry costs.
pub trait CurrencyService {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Player balance, or `None` when the currency is unknown.
    fn balance(&self, player: &str, currency: &str) -> Option<f64>;

    /// Debit `amount` from the player.
    ///
    /// # Errors
    ///
    /// Returns an error if the debit cannot be performed.
    fn take(&self, player: &str, currency: &str, amount: f64) -> Result<(), Self::Error>;
}

/// A category of in-game action that objectives score against.
pub trait WorkType {
    fn id(&self) -> &str;

    /// Whether `object` names something this work type can act on.
    fn parse_object(&self, object: &str) -> bool;
}

/// Lookup of registered work types, used while loading objectives.
pub trait WorkRegistry {
    fn work_type(&self, work_id: &str) -> Option<&dyn WorkType>;
}

/// Work type backed by a fixed object list; no list accepts any object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWork {
    id: String,
    objects: Option<BTreeSet<String>>,
}

impl CatalogWork {
    #[must_use]
    pub fn open(id: &str) -> Self {
        Self {
            id: id.to_lowercase(),
            objects: None,
        }
    }

    pub fn with_objects<I, S>(id: &str, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.to_lowercase(),
            objects: Some(
                objects
                    .into_iter()
                    .map(|object| object.as_ref().to_lowercase())
                    .collect(),
            ),
        }
    }
}

impl WorkType for CatalogWork {
    fn id(&self) -> &str {
        &self.id
    }

    fn parse_object(&self, object: &str) -> bool {
        self.objects
            .as_ref()
            .is_none_or(|known| known.contains(&object.to_lowercase()))
    }
}

/// In-memory work registry keyed by lowercase work id.
#[derive(Debug, Clone, Default)]
pub struct WorkCatalog {
    works: BTreeMap<String, CatalogWork>,
}

impl WorkCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, work: CatalogWork) -> Self {
        self.register(work);
        self
    }

    pub fn register(&mut self, work: CatalogWork) {
        self.works.insert(work.id.clone(), work);
    }

    /// Registry accepting the common action categories with any object.
    #[must_use]
    pub fn standard() -> Self {
        [
            "block_break",
            "block_place",
            "block_fertilize",
            "crafting",
            "enchanting",
            "fishing",
            "kill_entity",
            "breed_entity",
            "milk_entity",
            "shear_entity",
            "smelting",
            "brewing",
        ]
        .into_iter()
        .fold(Self::new(), |catalog, id| catalog.with(CatalogWork::open(id)))
    }
}

impl WorkRegistry for WorkCatalog {
    fn work_type(&self, work_id: &str) -> Option<&dyn WorkType> {
        self.works
            .get(&work_id.to_lowercase())
            .map(|work| work as &dyn WorkType)
    }
}

/// Errors raised by [`MemoryLedger`].
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("unknown currency '{0}'")]
    UnknownCurrency(String),
    #[error("insufficient {currency}: balance {balance:.2}, needed {needed:.2}")]
    InsufficientFunds {
        currency: String,
        balance: f64,
        needed: f64,
    },
}

/// Thread-safe in-memory balances per (player, currency).
#[derive(Debug, Default)]
pub struct MemoryLedger {
    currencies: BTreeSet<String>,
    balances: Mutex<HashMap<(String, String), f64>>,
}

impl MemoryLedger {
    pub fn new<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            currencies: currencies
                .into_iter()
                .map(|currency| currency.as_ref().to_lowercase())
                .collect(),
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Add `amount` to a balance, ignoring unknown currencies.
    pub fn deposit(&self, player: &str, currency: &str, amount: f64) {
        let currency = currency.to_lowercase();
        if !self.currencies.contains(&currency) {
            return;
        }
        let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        *balances.entry((player.to_string(), currency)).or_insert(0.0) += amount;
    }
}

impl CurrencyService for MemoryLedger {
    type Error = LedgerError;

    fn balance(&self, player: &str, currency: &str) -> Option<f64> {
        let currency = currency.to_lowercase();
        if !self.currencies.contains(&currency) {
            return None;
        }
        let balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        Some(
            balances
                .get(&(player.to_string(), currency))
                .copied()
                .unwrap_or(0.0),
        )
    }

    fn take(&self, player: &str, currency: &str, amount: f64) -> Result<(), Self::Error> {
        let currency = currency.to_lowercase();
        if !self.currencies.contains(&currency) {
            return Err(LedgerError::UnknownCurrency(currency));
        }
        let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        let balance = balances
            .entry((player.to_string(), currency.clone()))
            .or_insert(0.0);
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                currency,
                balance: *balance,
                needed: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_resolves_case_insensitively() {
        let catalog = WorkCatalog::new().with(CatalogWork::with_objects("Fishing", ["COD"]));
        let work = catalog.work_type("FISHING").expect("registered");
        assert!(work.parse_object("cod"));
        assert!(!work.parse_object("salmon"));
        assert!(catalog.work_type("mining").is_none());
    }

    #[test]
    fn ledger_debits_and_rejects_overdraft() {
        let ledger = MemoryLedger::new(["vault"]);
        ledger.deposit("steve", "Vault", 100.0);
        assert_eq!(ledger.balance("steve", "vault"), Some(100.0));
        assert!(ledger.take("steve", "vault", 40.0).is_ok());
        assert_eq!(ledger.balance("steve", "vault"), Some(60.0));
        assert!(matches!(
            ledger.take("steve", "vault", 80.0),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.balance("steve", "gems"), None);
    }

    #[test]
    fn deposits_accumulate() {
        let ledger = MemoryLedger::new(["vault"]);
        ledger.deposit("steve", "vault", 25.0);
        ledger.deposit("steve", "vault", 15.0);
        ledger.deposit("steve", "gems", 99.0);
        assert_eq!(ledger.balance("steve", "vault"), Some(40.0));
        assert_eq!(ledger.balance("steve", "gems"), None);
    }
}
