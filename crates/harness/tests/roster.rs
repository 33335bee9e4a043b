use roster_core::{ContactNumber, ContactState, NumberId};
use roster_engine::EngineError;
use roster_harness::TestAccount;
use roster_storage::{RosterStore, SqliteStore, StorageError};

fn number(raw: &str) -> ContactNumber {
    ContactNumber::parse(raw).unwrap()
}

// ============================================================================
// Cache mutation
// ============================================================================

#[test]
fn update_creates_and_caches_unknown_number() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");

    let buddy = account.roster.update(&contact, "Alice", &["Friends".into()], "")?;
    assert!(buddy.id.is_some());
    assert_eq!(buddy.state, ContactState::ACTIVE);

    // The new record is cached and durable.
    let cached = account.roster.get(&contact)?.unwrap();
    assert_eq!(cached.nick, "Alice");
    let owner = account.roster.owner_id();
    let count = account.roster.with_store(|s| s.buddy_count(owner))??;
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn repeated_update_keeps_one_record_per_number() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");

    let first = account.roster.update(&contact, "Alice", &[], "")?;
    let second = account.roster.update(&contact, "Alice Renamed", &[], "")?;
    assert_eq!(first.id, second.id);

    let owner = account.roster.owner_id();
    let count = account.roster.with_store(|s| s.buddy_count(owner))??;
    assert_eq!(count, 1);
    assert_eq!(account.roster.get(&contact)?.unwrap().nick, "Alice Renamed");
    Ok(())
}

#[test]
fn empty_fingerprint_means_no_avatar_change() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");

    let fp = roster_core::avatar::fingerprint(b"avatar-v1");
    account.roster.update(&contact, "Alice", &[], &fp)?;
    account.roster.update(&contact, "Alice", &["g2".into()], "")?;
    let cached = account.roster.get(&contact)?.unwrap();
    assert_eq!(cached.image_hash, fp);
    assert_eq!(cached.groups, vec!["g2".to_string()]);

    // Durable copy agrees after a full reload.
    account.roster.load()?;
    assert_eq!(account.roster.get(&contact)?.unwrap().image_hash, fp);

    account.roster.update(&contact, "Alice", &[], "Y")?;
    assert_eq!(account.roster.get(&contact)?.unwrap().image_hash, "Y");
    Ok(())
}

#[test]
fn remove_absent_number_is_none_not_fault() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    assert!(account.roster.remove(&number("490000000"))?.is_none());
    Ok(())
}

#[test]
fn remove_deletes_row_evicts_entry_and_clears_id() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");
    account.roster.update(&contact, "Alice", &[], "")?;

    let removed = account.roster.remove(&contact)?.unwrap();
    assert!(removed.id.is_none());
    assert_eq!(removed.nick, "Alice");

    assert!(account.roster.get(&contact)?.is_none());
    let owner = account.roster.owner_id();
    let count = account.roster.with_store(|s| s.buddy_count(owner))??;
    assert_eq!(count, 0);
    Ok(())
}

#[test]
fn add_writes_durably_without_caching() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");

    let buddy = account
        .roster
        .add(&contact, "Pending", &[], ContactState::UNKNOWN, "")?;
    assert!(buddy.id.is_some());
    assert!(account.roster.get(&contact)?.is_none());

    let owner = account.roster.owner_id();
    let count = account.roster.with_store(|s| s.buddy_count(owner))??;
    assert_eq!(count, 1);

    // State 0 is below the visibility threshold, so a reload hides it too.
    assert_eq!(account.roster.load()?, 0);
    Ok(())
}

// ============================================================================
// Load semantics
// ============================================================================

#[test]
fn load_prefers_owner_record_over_global() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000042")?;
    let contact = number("491234");

    account.roster.with_store(|store| {
        let id = store.resolve_number(&number("491234"), ContactState::ACTIVE)?;
        store.upsert_buddy(NumberId::GLOBAL, id, "Global", &[], "")?;
        Ok::<_, StorageError>(())
    })??;

    // Only the global record exists: the owner sees it.
    account.roster.load()?;
    assert_eq!(account.roster.get(&contact)?.unwrap().nick, "Global");

    // Owner-specific record wins once both exist. Created via add: an
    // update on the cached global record would write through to the
    // owner's (nonexistent) row and change nothing durably.
    account
        .roster
        .add(&contact, "Mine", &[], ContactState::ACTIVE, "")?;
    account.roster.load()?;
    assert_eq!(account.roster.get(&contact)?.unwrap().nick, "Mine");
    Ok(())
}

#[test]
fn load_resynchronizes_after_prune() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    account.roster.update(&number("491111111"), "Alice", &[], "")?;
    account.roster.update(&number("492222222"), "Bob", &[], "")?;
    assert_eq!(account.roster.len()?, 2);

    let deleted = account.roster.prune()?;
    assert_eq!(deleted, 2);
    // prune leaves the mapping stale on purpose; load clears it.
    assert_eq!(account.roster.len()?, 2);
    assert_eq!(account.roster.load()?, 0);
    Ok(())
}

#[test]
fn prune_keeps_identities_resolvable() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");
    account.roster.update(&contact, "Alice", &[], "")?;

    let before = account
        .roster
        .with_store(|s| s.resolve_number(&number("491111111"), ContactState::ACTIVE))??;
    account.roster.prune()?;
    let after = account
        .roster
        .with_store(|s| s.resolve_number(&number("491111111"), ContactState::ACTIVE))??;
    assert_eq!(before, after);

    let owner = account.roster.owner_id();
    let count = account.roster.with_store(|s| s.buddy_count(owner))??;
    assert_eq!(count, 0);
    Ok(())
}

#[test]
fn groups_survive_reload() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let contact = number("491111111");
    let groups = vec!["Friends".to_string(), "Work".to_string()];
    account.roster.update(&contact, "Alice", &groups, "")?;

    account.roster.load()?;
    assert_eq!(account.roster.get(&contact)?.unwrap().groups, groups);
    Ok(())
}

#[test]
fn roster_persists_across_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let (account, dir) = TestAccount::on_disk("490000001")?;
    account.roster.update(&number("491111111"), "Alice", &[], "")?;
    drop(account);

    let path = dir.path().join("roster.db");
    let store = SqliteStore::open(path.to_str().ok_or("non-utf8 temp path")?)?;
    let reopened = TestAccount::with_store(store, "490000001")?;
    assert_eq!(reopened.roster.load()?, 1);
    assert_eq!(
        reopened.roster.get(&number("491111111"))?.unwrap().nick,
        "Alice"
    );
    Ok(())
}

#[test]
fn owner_identity_resolved_at_open() -> Result<(), Box<dyn std::error::Error>> {
    let account = TestAccount::new("490000001")?;
    let resolved = account
        .roster
        .with_store(|s| s.resolve_number(&number("490000001"), ContactState::ACTIVE))??;
    assert_eq!(account.roster.owner_id(), resolved);
    assert_eq!(account.roster.owner_number().as_str(), "490000001");
    Ok(())
}

#[test]
fn invalid_owner_number_is_rejected() {
    let result = TestAccount::new("not a number");
    assert!(matches!(result, Err(EngineError::Core(_))));
}
