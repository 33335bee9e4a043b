use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use roster_core::{ContactNumber, ContactState, NumberId};
use roster_storage::RosterStore;

use crate::buddy::Buddy;
use crate::directory::{Credentials, DirectoryService};
use crate::error::EngineError;

struct Inner<S> {
    store: S,
    entries: HashMap<ContactNumber, Buddy>,
}

/// Owner-scoped roster cache: the in-memory view of one account's contact
/// records, backed by durable storage and reconciled against an external
/// directory. One mutex guards both the mapping and the storage session for
/// the lifetime of the cache; every operation locks it.
pub struct RosterCache<S, D> {
    owner_id: NumberId,
    owner_number: ContactNumber,
    directory: D,
    inner: Mutex<Inner<S>>,
}

impl<S: RosterStore, D: DirectoryService> RosterCache<S, D> {
    /// Resolve the owner's own identity (at state ACTIVE) and wrap the
    /// store. The cache starts empty; call [`load`](Self::load) to populate.
    pub fn open(mut store: S, directory: D, owner_number: ContactNumber) -> Result<Self, EngineError> {
        let owner_id = store.resolve_number(&owner_number, ContactState::ACTIVE)?;
        Ok(Self {
            owner_id,
            owner_number,
            directory,
            inner: Mutex::new(Inner {
                store,
                entries: HashMap::new(),
            }),
        })
    }

    pub fn owner_id(&self) -> NumberId {
        self.owner_id
    }

    pub fn owner_number(&self) -> &ContactNumber {
        &self.owner_number
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<S>>, EngineError> {
        self.inner.lock().map_err(|_| EngineError::Poisoned)
    }

    /// Clear the mapping and repopulate it from durable storage: all rows
    /// owned by this owner or the global owner 0 whose identity state is
    /// visible. When both have a record for one number, the owner-specific
    /// record wins. Returns the number of cached entries.
    pub fn load(&self) -> Result<usize, EngineError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        inner.entries.clear();
        // Global rows come first in the result; inserting in order lets the
        // owner's own row overwrite the global one.
        let rows = inner.store.load_roster(self.owner_id)?;
        for row in rows {
            let buddy = Buddy::from_row(self.owner_id, row);
            inner.entries.insert(buddy.number.clone(), buddy);
        }
        let count = inner.entries.len();
        debug!("loaded {} roster entries for {}", count, self.owner_number);
        Ok(count)
    }

    /// Update the record for `number`, creating it at state ACTIVE if it is
    /// not cached yet. A newly created record is inserted into the mapping.
    /// Atomic with respect to all other roster operations.
    pub fn update(
        &self,
        number: &ContactNumber,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<Buddy, EngineError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        if let Some(buddy) = inner.entries.get_mut(number) {
            buddy.update(&mut inner.store, nick, groups, image_hash)?;
            Ok(buddy.clone())
        } else {
            let buddy = Self::create_buddy(
                &mut inner.store,
                self.owner_id,
                number,
                nick,
                groups,
                ContactState::ACTIVE,
                image_hash,
            )?;
            inner.entries.insert(number.clone(), buddy.clone());
            Ok(buddy)
        }
    }

    /// Resolve the number identity at `state` and upsert a durable record
    /// for it. The mapping is deliberately not touched: records default to
    /// an invisible state and would vanish on the next `load` anyway.
    /// Callers that want the record cached insert the returned value
    /// themselves or go through [`update`](Self::update).
    pub fn add(
        &self,
        number: &ContactNumber,
        nick: &str,
        groups: &[String],
        state: ContactState,
        image_hash: &str,
    ) -> Result<Buddy, EngineError> {
        let mut guard = self.lock()?;
        Self::create_buddy(
            &mut guard.store,
            self.owner_id,
            number,
            nick,
            groups,
            state,
            image_hash,
        )
    }

    fn create_buddy(
        store: &mut S,
        owner_id: NumberId,
        number: &ContactNumber,
        nick: &str,
        groups: &[String],
        state: ContactState,
        image_hash: &str,
    ) -> Result<Buddy, EngineError> {
        let number_id = store.resolve_number(number, state)?;
        let buddy = Buddy::create(
            store,
            owner_id,
            number.clone(),
            number_id,
            state,
            nick,
            groups,
            image_hash,
        )?;
        Ok(buddy)
    }

    /// Remove `number` from the roster. An absent number is an absent
    /// result, not a fault. On success the durable row is deleted, the
    /// mapping entry evicted, and the record returned with its id cleared.
    pub fn remove(&self, number: &ContactNumber) -> Result<Option<Buddy>, EngineError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        match inner.entries.remove(number) {
            None => Ok(None),
            Some(mut buddy) => {
                buddy.delete(&mut inner.store)?;
                Ok(Some(buddy))
            }
        }
    }

    /// Delete every durable record owned by this owner. Identities are
    /// untouched, and so is the mapping: callers `load()` to resynchronize.
    /// Returns the deleted-row count.
    pub fn prune(&self) -> Result<usize, EngineError> {
        let mut guard = self.lock()?;
        let deleted = guard.store.delete_owner_buddies(self.owner_id)?;
        debug!("pruned {} roster records for {}", deleted, self.owner_number);
        Ok(deleted)
    }

    /// Reconcile identity state against the external directory. An empty
    /// roster returns 0 without an external call. Otherwise the full
    /// dialable number list goes out in one request and each returned
    /// entry's registration state is written back to the identity row,
    /// keyed by number value (so it affects every owner sharing that
    /// identity). Returns how many numbers the directory reports as
    /// registered.
    ///
    /// The directory round-trip happens with the roster mutex held: every
    /// other operation for this owner blocks until reconciliation finishes.
    /// Partial write-back is not rolled back when a later step faults.
    pub fn sync(&self, credentials: &Credentials) -> Result<u64, EngineError> {
        let mut guard = self.lock()?;

        let states = guard.store.roster_states(self.owner_id)?;
        if states.is_empty() {
            return Ok(0);
        }

        let numbers: Vec<String> = states.iter().map(|(n, _)| n.to_dialable()).collect();
        let response = self.directory.sync(credentials, &numbers)?;

        let mut registered = 0u64;
        for entry in &response.contacts {
            let number = ContactNumber::parse(&entry.number)?;
            let state = if entry.registered {
                ContactState::ACTIVE
            } else {
                ContactState::UNKNOWN
            };
            guard.store.set_number_state(&number, state)?;
            if entry.registered {
                registered += 1;
            }
        }
        debug!(
            "reconciled {} numbers for {}, {} registered",
            numbers.len(),
            self.owner_number,
            registered
        );
        Ok(registered)
    }

    /// Cached record for `number`, if any.
    pub fn get(&self, number: &ContactNumber) -> Result<Option<Buddy>, EngineError> {
        Ok(self.lock()?.entries.get(number).cloned())
    }

    /// Number of cached entries (not a durable count).
    pub fn len(&self) -> Result<usize, EngineError> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.lock()?.entries.is_empty())
    }

    /// Run `f` against the underlying store under the roster lock. Intended
    /// for diagnostics and tests that need to inspect durable state.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut S) -> T) -> Result<T, EngineError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard.store))
    }
}
