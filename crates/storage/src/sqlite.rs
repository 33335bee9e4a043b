use rusqlite::Connection;

use roster_core::{BuddyId, ContactNumber, ContactState, NumberId};

use crate::error::StorageError;
use crate::traits::{BuddyRow, RosterStore};

/// Comma-joined durable encoding of group memberships. Group names must not
/// contain the delimiter; that is a caller precondition, not checked here.
fn join_groups(groups: &[String]) -> String {
    groups.join(",")
}

fn split_groups(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(',').map(str::to_string).collect()
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl RosterStore for SqliteStore {
    fn resolve_number(
        &mut self,
        number: &ContactNumber,
        state: ContactState,
    ) -> Result<NumberId, StorageError> {
        // DO UPDATE instead of DO NOTHING so RETURNING yields the existing
        // row on conflict; two racing resolutions get the same id.
        let id: i64 = self.conn.query_row(
            "INSERT INTO numbers (number, state) VALUES (?1, ?2)
             ON CONFLICT (number, state) DO UPDATE SET number = excluded.number
             RETURNING id",
            rusqlite::params![number.as_str(), state.as_raw()],
            |row| row.get(0),
        )?;
        Ok(NumberId::from_raw(id))
    }

    fn upsert_buddy(
        &mut self,
        owner: NumberId,
        number: NumberId,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<BuddyId, StorageError> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO buddies (owner_id, buddy_id, nick, groups, image_hash)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (owner_id, buddy_id) DO UPDATE SET
                nick = excluded.nick,
                groups = excluded.groups,
                image_hash = excluded.image_hash
             RETURNING id",
            rusqlite::params![
                owner.as_raw(),
                number.as_raw(),
                nick,
                join_groups(groups),
                image_hash,
            ],
            |row| row.get(0),
        )?;
        Ok(BuddyId::from_raw(id))
    }

    fn update_buddy(
        &mut self,
        owner: NumberId,
        number: NumberId,
        nick: &str,
        groups: &[String],
        image_hash: &str,
    ) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE buddies SET nick = ?1, groups = ?2, image_hash = ?3
             WHERE owner_id = ?4 AND buddy_id = ?5",
            rusqlite::params![
                nick,
                join_groups(groups),
                image_hash,
                owner.as_raw(),
                number.as_raw(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_buddy(&mut self, owner: NumberId, number: NumberId) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM buddies WHERE owner_id = ?1 AND buddy_id = ?2",
            rusqlite::params![owner.as_raw(), number.as_raw()],
        )?;
        Ok(())
    }

    fn delete_owner_buddies(&mut self, owner: NumberId) -> Result<usize, StorageError> {
        let deleted = self.conn.execute(
            "DELETE FROM buddies WHERE owner_id = ?1",
            rusqlite::params![owner.as_raw()],
        )?;
        Ok(deleted)
    }

    fn load_roster(&self, owner: NumberId) -> Result<Vec<BuddyRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, n.id, n.number, n.state, b.nick, b.groups, b.image_hash
             FROM buddies AS b
             JOIN numbers AS n ON b.buddy_id = n.id
             WHERE b.owner_id IN (?1, 0) AND n.state >= ?2
             ORDER BY b.owner_id ASC",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![owner.as_raw(), ContactState::ACTIVE.as_raw()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )?;

        let mut result = Vec::new();
        for row in rows {
            let (id, number_id, number, state, nick, groups, image_hash) = row?;
            result.push(BuddyRow {
                id: BuddyId::from_raw(id),
                number_id: NumberId::from_raw(number_id),
                number: ContactNumber::parse(&number)?,
                state: ContactState::from_raw(state),
                nick,
                groups: split_groups(&groups),
                image_hash,
            });
        }
        Ok(result)
    }

    fn roster_states(
        &self,
        owner: NumberId,
    ) -> Result<Vec<(ContactNumber, ContactState)>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT n.number, n.state
             FROM buddies AS b
             JOIN numbers AS n ON b.buddy_id = n.id
             WHERE b.owner_id = ?1",
        )?;
        let rows = stmt.query_map(rusqlite::params![owner.as_raw()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (number, state) = row?;
            result.push((ContactNumber::parse(&number)?, ContactState::from_raw(state)));
        }
        Ok(result)
    }

    fn set_number_state(
        &mut self,
        number: &ContactNumber,
        state: ContactState,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE numbers SET state = ?1 WHERE number = ?2",
            rusqlite::params![state.as_raw(), number.as_str()],
        )?;
        Ok(())
    }

    fn buddy_count(&self, owner: NumberId) -> Result<u64, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM buddies WHERE owner_id = ?1",
            rusqlite::params![owner.as_raw()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
