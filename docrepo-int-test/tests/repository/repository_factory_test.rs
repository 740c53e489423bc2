use super::{AuditEntry, TestEntity};
use docrepo::errors::ErrorKind;
use docrepo::repository::{Criteria, RepositoryFactory};
use docrepo_int_test::test_util::random_database;

fn connection() -> String {
    format!("memory://local/{}", random_database())
}

#[test]
fn test_factory_shares_repositories() {
    let factory = RepositoryFactory::new();
    let conn = connection();

    let first = factory.repository::<TestEntity>(&conn).unwrap();
    first.insert(TestEntity::new("shared", 1)).unwrap();

    let second = factory.repository::<TestEntity>(&conn).unwrap();
    assert_eq!(second.count(Criteria::All).unwrap(), 1);

    let audit = factory.repository::<AuditEntry>(&conn).unwrap();
    assert_eq!(audit.collection_name(), "audit_log");
    assert_eq!(audit.count(Criteria::All).unwrap(), 0);

    factory.context(&conn).unwrap().close().unwrap();
}

#[test]
fn test_factory_isolates_databases() {
    let factory = RepositoryFactory::new();
    let a = connection();
    let b = connection();

    factory
        .repository::<TestEntity>(&a)
        .unwrap()
        .insert(TestEntity::new("only in a", 1))
        .unwrap();

    let in_b = factory.repository::<TestEntity>(&b).unwrap();
    assert_eq!(in_b.count(Criteria::All).unwrap(), 0);
    assert!(!factory
        .context(&a)
        .unwrap()
        .same_context(&factory.context(&b).unwrap()));
}

#[test]
fn test_factory_contexts_share_memory_store_per_uri() {
    let first = RepositoryFactory::new();
    let second = RepositoryFactory::new();
    let conn = connection();

    first
        .repository::<TestEntity>(&conn)
        .unwrap()
        .insert(TestEntity::new("visible", 7))
        .unwrap();

    // separate factories open separate contexts over the same in-memory database
    let other = second.repository::<TestEntity>(&conn).unwrap();
    assert!(!first.context(&conn).unwrap().same_context(&second.context(&conn).unwrap()));
    assert_eq!(other.count(Criteria::All).unwrap(), 1);
}

#[test]
fn test_factory_rejects_bad_connection_strings() {
    let factory = RepositoryFactory::new();
    for bad in ["", "memory://local", "unknown://host/db"] {
        let err = factory.repository::<TestEntity>(bad).err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration, "{}", bad);
    }
}

#[test]
fn test_factory_clear() {
    let factory = RepositoryFactory::new();
    let conn = connection();
    let before = factory.context(&conn).unwrap();
    factory.clear();
    let after = factory.context(&conn).unwrap();
    assert!(!before.same_context(&after));
}
