use roster_core::{BuddyId, ContactNumber, ContactState, NumberId};

use crate::error::StorageError;

/// One roster row as returned by [`RosterStore::load_roster`], joined with
/// the contact number identity backing it.
#[derive(Debug, Clone)]
pub struct BuddyRow {
    pub id: BuddyId,
    pub number_id: NumberId,
    pub number: ContactNumber,
    pub state: ContactState,
    pub nick: String,
    pub groups: Vec<String>,
    pub image_hash: String,
}

/// Durable storage for contact identities (`numbers`) and per-owner roster
/// records (`buddies`).
///
/// Identities are append-only reference data: `resolve_number` is the only
/// way rows enter the table, and nothing removes them. Roster records are
/// keyed by (owner, number identity) and are unique on that pair.
pub trait RosterStore {
    /// Return the durable id for (number, state), inserting the row if it
    /// does not exist yet. Idempotent: a second resolution of the same pair
    /// yields the same id, even from concurrent callers.
    fn resolve_number(
        &mut self,
        number: &ContactNumber,
        state: ContactState,
    ) -> Result<NumberId, StorageError>;

    /// Insert a roster record for (owner, number), fully replacing any
    /// existing record for that pair. The row id is preserved on replace.
    fn upsert_buddy(
        &mut self,
        owner: NumberId,
        number: NumberId,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<BuddyId, StorageError>;

    /// Conditional write-through update of an existing record. Returns
    /// `false` when no row matched (a silent no-op from the caller's side).
    fn update_buddy(
        &mut self,
        owner: NumberId,
        number: NumberId,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<bool, StorageError>;

    fn delete_buddy(&mut self, owner: NumberId, number: NumberId) -> Result<(), StorageError>;

    /// Delete every roster record owned by `owner`. Identities referenced
    /// by those records are untouched. Returns the deleted-row count.
    fn delete_owner_buddies(&mut self, owner: NumberId) -> Result<usize, StorageError>;

    /// All visible roster rows for `owner`, including rows of the global
    /// owner 0, restricted to identities with a visible state. Global rows
    /// are ordered first so that a mapping populated by insertion lets the
    /// owner-specific row win when both exist for one number.
    fn load_roster(&self, owner: NumberId) -> Result<Vec<BuddyRow>, StorageError>;

    /// Every (number, state) pair on this owner's own roster (global rows
    /// excluded). Input set for directory reconciliation.
    fn roster_states(
        &self,
        owner: NumberId,
    ) -> Result<Vec<(ContactNumber, ContactState)>, StorageError>;

    /// Bulk reconciliation write-back: set the state of every identity row
    /// matching `number`, regardless of owner or current state.
    fn set_number_state(
        &mut self,
        number: &ContactNumber,
        state: ContactState,
    ) -> Result<(), StorageError>;

    fn buddy_count(&self, owner: NumberId) -> Result<u64, StorageError>;
}
