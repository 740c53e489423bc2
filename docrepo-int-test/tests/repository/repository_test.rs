use super::{generate_people, AuditEntry, Person, TestEntity};
use docrepo::collection::ObjectId;
use docrepo::errors::ErrorKind;
use docrepo::filter::field;
use docrepo::repository::{Criteria, Repository};
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};
use std::collections::HashSet;

#[test]
fn test_collection_names_follow_convention() {
    run_test(
        || create_test_context(),
        |ctx| {
            let entities: Repository<TestEntity> = ctx.repository()?;
            let people: Repository<Person> = ctx.repository()?;
            let audit: Repository<AuditEntry> = ctx.repository()?;

            assert_eq!(entities.collection_name(), "testentities");
            assert_eq!(people.collection_name(), "people");
            assert_eq!(audit.collection_name(), "audit_log");

            let names = ctx.context().collection_names()?;
            assert!(names.contains("testentities"));
            assert!(names.contains("people"));
            assert!(names.contains("audit_log"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_insert_assigns_unique_ids() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            let mut seen = HashSet::new();

            for person in generate_people(50) {
                let stored = repo.insert(person)?;
                assert!(!stored.id.is_empty());
                assert!(seen.insert(stored.id));
            }

            let batch = repo.insert_many(generate_people(20))?;
            for person in &batch {
                assert!(!person.id.is_empty());
                assert!(seen.insert(person.id));
            }
            assert_eq!(repo.count(Criteria::All)?, 70);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_insert_overwrites_caller_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let preset = ObjectId::new();
            let mut entity = TestEntity::new("preset", 1);
            entity.id = preset;

            let stored = repo.insert(entity)?;
            assert_ne!(stored.id, preset);
            assert!(repo.find_by_id(&preset.to_string())?.is_none());
            assert_eq!(repo.find_by_id(&stored.id.to_string())?, Some(stored));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_with_and_without_predicate() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            repo.insert_many(vec![
                TestEntity::new("one", 1),
                TestEntity::new("two", 2),
                TestEntity::new("three", 3),
            ])?;

            let mut above_one = repo
                .query(Criteria::where_(|e: &TestEntity| e.int_field > 1))?
                .to_vec()?
                .into_iter()
                .map(|e| e.int_field)
                .collect::<Vec<_>>();
            above_one.sort();
            assert_eq!(above_one, vec![2, 3]);

            assert_eq!(repo.query(Criteria::All)?.size(), 3);
            assert_eq!(repo.query(Criteria::default())?.count(), 3);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_raw_filter_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            repo.insert_many(vec![
                TestEntity::new("alpha", 10),
                TestEntity::new("beta", 20),
                TestEntity::new("gamma", 30),
            ])?;

            let filter = field("int_field").gte(20).and(field("name").regex("^g")?);
            let found = repo.query_filter(filter)?.to_vec()?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].name, "gamma");

            let either = field("name").eq("alpha").or(field("name").eq("beta"));
            assert_eq!(repo.query_filter(either)?.size(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_find_single_and_multiple() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let stored = repo.insert(TestEntity::new("unique", 7))?;
            repo.insert(TestEntity::new("dup", 8))?;
            repo.insert(TestEntity::new("dup", 9))?;

            let found = repo.find(Criteria::where_(|e: &TestEntity| e.name == "unique"))?;
            assert_eq!(found, Some(stored));

            let none = repo.find(Criteria::where_(|e: &TestEntity| e.name == "missing"))?;
            assert!(none.is_none());

            let err = repo
                .find(Criteria::where_(|e: &TestEntity| e.name == "dup"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MultipleMatches);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_round_trip() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            let mut person = repo.insert(generate_people(1).remove(0))?;
            let id = person.id;

            person.city = Some("Reykjavik".to_string());
            person.age = 42;
            assert_eq!(repo.update(&person)?, 1);

            let found = repo.find_by_id(&id.to_string())?.unwrap();
            assert_eq!(found.id, id);
            assert_eq!(found.city.as_deref(), Some("Reykjavik"));
            assert_eq!(found.age, 42);
            assert_eq!(found, person);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_is_not_upsert() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let mut ghost = TestEntity::new("ghost", 1);
            ghost.id = ObjectId::new();

            assert_eq!(repo.update(&ghost)?, 0);
            assert_eq!(repo.update_many(&[ghost.clone()])?, 0);
            assert_eq!(repo.count(Criteria::All)?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_delete_is_idempotent() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let kept = repo.insert(TestEntity::new("kept", 1))?;
            let gone = repo.insert(TestEntity::new("gone", 2))?;
            let id = gone.id.to_string();

            assert_eq!(repo.delete_by_id(&id)?, 1);
            assert_eq!(repo.delete_by_id(&id)?, 0);
            assert_eq!(repo.delete(&gone)?, 0);
            assert_eq!(repo.query(Criteria::All)?.to_vec()?, vec![kept]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_delete_with_unparsable_id_is_silent() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            repo.insert(TestEntity::new("survivor", 1))?;

            for bad in ["", "not-an-id", "123", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
                assert_eq!(repo.delete_by_id(bad)?, 0);
            }
            assert_eq!(repo.count(Criteria::All)?, 1);

            let err = repo.find_by_id("not-an-id").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidIdentifierFormat);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_delete_many() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            let stored = repo.insert_many(generate_people(10))?;

            assert_eq!(repo.delete_many(&stored[..4])?, 4);
            assert_eq!(repo.count(Criteria::All)?, 6);
            assert_eq!(repo.delete_many(&stored[..4])?, 0);
            assert_eq!(repo.delete_many(&[])?, 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_custom_id_and_ignored_field() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<AuditEntry> = ctx.repository()?;
            let stored = repo.insert(AuditEntry {
                action: "login".to_string(),
                scratch: "not persisted".to_string(),
                ..Default::default()
            })?;
            assert!(!stored.entry_id.is_empty());

            let found = repo.find_by_id(&stored.entry_id.to_string())?.unwrap();
            assert_eq!(found.entry_id, stored.entry_id);
            assert_eq!(found.action, "login");
            assert_eq!(found.scratch, "");

            let by_field = repo.find_filter(field("action").eq("login"))?;
            assert_eq!(by_field.map(|e| e.entry_id), Some(stored.entry_id));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
