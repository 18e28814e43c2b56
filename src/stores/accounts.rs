use tracing::{debug, warn};

use super::KeyValueBackend;
use crate::id::IdGenerator;
use crate::{Account, Result};

/// The well-known slot the collection is persisted under.
pub const STORAGE_KEY: &str = "accounts_v1";

/// Which path [`AccountStore::load`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored (or an empty value); in-memory state left unchanged.
    Missing,
    /// Collection replaced by this many stored records.
    Loaded(usize),
    /// Stored data was unreadable or malformed; collection reset to empty.
    Recovered,
}

/// Ordered collection of accounts mirrored to a single backend slot.
///
/// Every mutation ends with a full persist of the collection, so once a
/// mutating call returns `Ok` the slot holds exactly what [`accounts`]
/// returns.
///
/// [`accounts`]: AccountStore::accounts
#[derive(Debug)]
pub struct AccountStore<B> {
    backend: B,
    key: String,
    accounts: Vec<Account>,
    ids: IdGenerator,
}

impl<B: KeyValueBackend> AccountStore<B> {
    /// Opens a store on the default key and performs the initial load.
    pub fn open(backend: B) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            accounts: Vec::new(),
            ids: IdGenerator::new(),
        };
        store.load();
        store
    }

    /// Re-reads the collection from storage.
    ///
    /// Recovery policy: data that cannot be read or does not parse as a list
    /// of accounts resets the collection to empty. This never returns an
    /// error and never writes back to storage.
    pub fn load(&mut self) -> LoadOutcome {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!(key = %self.key, "no stored accounts");
                return LoadOutcome::Missing;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read stored accounts, starting empty");
                self.accounts.clear();
                return LoadOutcome::Recovered;
            }
        };

        match serde_json::from_str::<Vec<Account>>(&raw) {
            Ok(accounts) => {
                debug!(key = %self.key, count = accounts.len(), "loaded accounts");
                self.accounts = accounts;
                LoadOutcome::Loaded(self.accounts.len())
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored accounts are malformed, starting empty");
                self.accounts.clear();
                LoadOutcome::Recovered
            }
        }
    }

    /// Writes the whole collection to the storage slot.
    pub fn persist(&mut self) -> Result<()> {
        let data = serde_json::to_string(&self.accounts)?;
        self.backend.set(&self.key, &data)?;
        debug!(key = %self.key, count = self.accounts.len(), bytes = data.len(), "persisted accounts");
        Ok(())
    }

    /// Appends a blank `ldap` account with a fresh id and returns a copy of it.
    pub fn add_empty(&mut self) -> Result<Account> {
        let id = loop {
            let candidate = self.ids.next_id();
            if self.position(&candidate).is_none() {
                break candidate;
            }
        };
        let account = Account::empty(id);
        self.accounts.push(account.clone());
        self.persist()?;
        Ok(account)
    }

    /// Removes the first account with this id. Persists even when nothing
    /// matched. Returns whether an account was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let removed = match self.position(id) {
            Some(idx) => {
                self.accounts.remove(idx);
                true
            }
            None => false,
        };
        self.persist()?;
        Ok(removed)
    }

    /// Replaces the account with the same id in place, or appends it.
    pub fn update(&mut self, account: Account) -> Result<()> {
        match self.position(&account.id) {
            Some(idx) => self.accounts[idx] = account,
            None => self.accounts.push(account),
        }
        self.persist()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryBackend;
    use crate::{AccountType, Error, Label};
    use std::collections::HashSet;

    fn persisted(store: &AccountStore<MemoryBackend>) -> Vec<Account> {
        serde_json::from_str(store.backend().raw(STORAGE_KEY).unwrap()).unwrap()
    }

    fn assert_in_sync(store: &AccountStore<MemoryBackend>) {
        assert_eq!(persisted(store), store.accounts());
    }

    fn account(id: &str, login: &str) -> Account {
        Account {
            login: login.to_string(),
            ..Account::empty(id)
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = AccountStore::open(MemoryBackend::new());
        assert!(store.is_empty());
        assert_eq!(store.key(), "accounts_v1");
        // Opening never writes.
        assert_eq!(store.backend().raw(STORAGE_KEY), None);
    }

    #[test]
    fn test_add_empty_defaults() {
        let mut store = AccountStore::open(MemoryBackend::new());
        let created = store.add_empty().unwrap();

        assert!(!created.id.is_empty());
        assert!(created.labels.is_empty());
        assert_eq!(created.labels_raw, "");
        assert_eq!(created.account_type, AccountType::Ldap);
        assert_eq!(created.login, "");
        assert_eq!(created.password, None);
        assert_eq!(store.accounts(), [created]);
        assert_in_sync(&store);
    }

    #[test]
    fn test_add_empty_returns_a_copy() {
        let mut store = AccountStore::open(MemoryBackend::new());
        let mut created = store.add_empty().unwrap();
        created.login = "changed".to_string();
        assert_eq!(store.accounts()[0].login, "");
    }

    #[test]
    fn test_add_empty_ids_are_unique() {
        let mut store = AccountStore::open(MemoryBackend::new());
        for _ in 0..200 {
            store.add_empty().unwrap();
        }
        let ids: HashSet<&str> = store.accounts().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 200);
        assert_in_sync(&store);
    }

    #[test]
    fn test_add_empty_appends_at_end() {
        let mut store = AccountStore::open(MemoryBackend::new());
        store.update(account("first", "a")).unwrap();
        let created = store.add_empty().unwrap();
        assert_eq!(store.accounts()[0].id, "first");
        assert_eq!(store.accounts()[1].id, created.id);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut store = AccountStore::open(MemoryBackend::new());
        store.update(account("a", "one")).unwrap();
        store.update(account("b", "two")).unwrap();
        store.update(account("c", "three")).unwrap();

        let replacement = Account {
            labels: vec![Label::new("x")],
            labels_raw: "x".to_string(),
            account_type: AccountType::Local,
            password: Some("pw".to_string()),
            ..account("b", "bob")
        };
        store.update(replacement.clone()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.accounts()[1], replacement);
        let ids: Vec<&str> = store.accounts().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_in_sync(&store);
    }

    #[test]
    fn test_update_unknown_id_appends() {
        let mut store = AccountStore::open(MemoryBackend::new());
        store.update(account("a", "one")).unwrap();
        store.update(account("zzz", "new")).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.accounts()[1], account("zzz", "new"));
        assert_in_sync(&store);
    }

    #[test]
    fn test_update_can_clear_password() {
        let mut store = AccountStore::open(MemoryBackend::new());
        let mut acc = Account {
            password: Some("pw".to_string()),
            ..account("a", "one")
        };
        store.update(acc.clone()).unwrap();
        acc.password = None;
        store.update(acc).unwrap();
        assert_eq!(store.get("a").unwrap().password, None);
        assert!(store.backend().raw(STORAGE_KEY).unwrap().contains("\"password\":null"));
    }

    #[test]
    fn test_remove_shifts_following_entries() {
        let mut store = AccountStore::open(MemoryBackend::new());
        for id in ["a", "b", "c"] {
            store.update(account(id, id)).unwrap();
        }
        assert!(store.remove("a").unwrap());
        let ids: Vec<&str> = store.accounts().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_in_sync(&store);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = AccountStore::open(MemoryBackend::new());
        let created = store.add_empty().unwrap();
        assert!(store.remove(&created.id).unwrap());
        assert!(!store.remove(&created.id).unwrap());
        assert!(store.is_empty());
        assert_in_sync(&store);
    }

    #[test]
    fn test_remove_unknown_id_still_persists() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw(STORAGE_KEY, "");
        let mut store = AccountStore::open(backend);
        assert!(!store.remove("missing").unwrap());
        assert_eq!(store.backend().raw(STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let mut backend = MemoryBackend::new();
        let stored = vec![account("s1", "x"), account("s2", "y")];
        backend.insert_raw(STORAGE_KEY, serde_json::to_string(&stored).unwrap());

        let mut store = AccountStore::open(backend);
        assert_eq!(store.accounts(), stored.as_slice());

        store.update(account("local", "z")).unwrap();
        assert_eq!(store.len(), 3);
        // Reloading from the slot gives exactly what was persisted last.
        assert_eq!(store.load(), LoadOutcome::Loaded(3));
        assert_eq!(store.accounts()[2].id, "local");
    }

    #[test]
    fn test_load_missing_keeps_memory() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("other", "[]");
        let mut store = AccountStore::open(backend);
        store.accounts.push(account("mem", "only"));

        assert_eq!(store.load(), LoadOutcome::Missing);
        assert_eq!(store.accounts(), [account("mem", "only")]);
    }

    #[test]
    fn test_load_empty_string_is_missing() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw(STORAGE_KEY, "");
        let mut store = AccountStore::open(backend);
        store.accounts.push(account("mem", "only"));
        assert_eq!(store.load(), LoadOutcome::Missing);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_malformed_resets_to_empty() {
        for raw in ["{not json", "null", "{\"id\":\"a\"}", "[{\"id\":1}]", "[{\"id\":\"a\"}]"] {
            let mut backend = MemoryBackend::new();
            backend.insert_raw(STORAGE_KEY, raw);
            let mut store = AccountStore::open(backend);
            assert!(store.is_empty(), "{raw:?} should load as empty");

            store.accounts.push(account("mem", "only"));
            assert_eq!(store.load(), LoadOutcome::Recovered);
            assert!(store.is_empty());
            // Recovery does not rewrite the slot.
            assert_eq!(store.backend().raw(STORAGE_KEY), Some(raw));
        }
    }

    struct FailingBackend;

    impl KeyValueBackend for FailingBackend {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(std::io::Error::other("read failed").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::other("quota exceeded").into())
        }
    }

    #[test]
    fn test_unreadable_backend_loads_empty() {
        let mut store = AccountStore::open(FailingBackend);
        assert!(store.is_empty());
        assert_eq!(store.load(), LoadOutcome::Recovered);
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let mut store = AccountStore::open(FailingBackend);
        assert!(matches!(store.add_empty(), Err(Error::Storage(_))));
        // The mutation itself has been applied.
        assert_eq!(store.len(), 1);
        assert!(matches!(store.remove("x"), Err(Error::Storage(_))));
        assert!(matches!(store.persist(), Err(Error::Storage(_))));
    }

    #[test]
    fn test_custom_key_is_used() {
        let mut store = AccountStore::with_key(MemoryBackend::new(), "accounts_test");
        store.add_empty().unwrap();
        assert!(store.backend().raw("accounts_test").is_some());
        assert!(store.backend().raw(STORAGE_KEY).is_none());
    }

    #[test]
    fn test_lifecycle_scenario() {
        let mut store = AccountStore::open(MemoryBackend::new());

        let created = store.add_empty().unwrap();
        assert_eq!(created, Account::empty(created.id.clone()));
        assert_eq!(store.len(), 1);

        store
            .update(Account {
                login: "alice".to_string(),
                ..created.clone()
            })
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.accounts()[0].login, "alice");
        assert_in_sync(&store);

        store.remove(&created.id).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.backend().raw(STORAGE_KEY), Some("[]"));
    }
}
