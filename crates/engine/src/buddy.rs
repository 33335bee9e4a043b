use roster_core::{BuddyId, ContactNumber, ContactState, NumberId};
use roster_storage::{BuddyRow, RosterStore, StorageError};

/// One owner's relationship to one contact number, backed 1:1 by a durable
/// `buddies` row. `id` is `None` once the record has been deleted and must
/// not be reused after that.
#[derive(Debug, Clone)]
pub struct Buddy {
    pub id: Option<BuddyId>,
    pub owner: NumberId,
    pub number: ContactNumber,
    pub number_id: NumberId,
    pub state: ContactState,
    pub nick: String,
    pub groups: Vec<String>,
    pub image_hash: String,
}

impl Buddy {
    /// Upsert-by-replace into durable storage keyed on (owner, number
    /// identity); an existing record for the pair is fully replaced and its
    /// row id preserved. One committed write.
    #[allow(clippy::too_many_arguments)]
    pub fn create<S: RosterStore>(
        store: &mut S,
        owner: NumberId,
        number: ContactNumber,
        number_id: NumberId,
        state: ContactState,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<Self, StorageError> {
        let id = store.upsert_buddy(owner, number_id, nick, groups, image_hash)?;
        Ok(Self {
            id: Some(id),
            owner,
            number,
            number_id,
            state,
            nick: nick.to_string(),
            groups: groups.to_vec(),
            image_hash: image_hash.to_string(),
        })
    }

    pub fn from_row(owner: NumberId, row: BuddyRow) -> Self {
        Self {
            id: Some(row.id),
            owner,
            number: row.number,
            number_id: row.number_id,
            state: row.state,
            nick: row.nick,
            groups: row.groups,
            image_hash: row.image_hash,
        }
    }

    /// Overwrite nick and groups unconditionally; the avatar fingerprint
    /// only when a non-empty value is supplied (empty means "no change").
    /// The write-through is a conditional UPDATE and silently does nothing
    /// when the durable row no longer exists.
    pub fn update<S: RosterStore>(
        &mut self,
        store: &mut S,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<(), StorageError> {
        self.nick = nick.to_string();
        self.groups = groups.to_vec();
        if !image_hash.is_empty() {
            self.image_hash = image_hash.to_string();
        }
        store.update_buddy(
            self.owner,
            self.number_id,
            &self.nick,
            &self.groups,
            &self.image_hash,
        )?;
        Ok(())
    }

    /// Remove the durable row and clear the in-memory id.
    pub fn delete<S: RosterStore>(&mut self, store: &mut S) -> Result<(), StorageError> {
        store.delete_buddy(self.owner, self.number_id)?;
        self.id = None;
        Ok(())
    }
}
