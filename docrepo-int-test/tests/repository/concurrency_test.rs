use super::{generate_person, Person, TestEntity};
use docrepo::repository::{Criteria, Repository};
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_first_access_creates_one_collection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let threads = 16;
            let barrier = Arc::new(Barrier::new(threads));

            let names = thread::scope(|scope| {
                let handles = (0..threads)
                    .map(|_| {
                        let barrier = barrier.clone();
                        let context = ctx.context();
                        scope.spawn(move || {
                            barrier.wait();
                            context.collection::<TestEntity>().map(|c| c.name().to_string())
                        })
                    })
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|h| h.join().expect("thread panicked"))
                    .collect::<Result<Vec<_>, _>>()
            })?;

            assert!(names.iter().all(|name| name == "testentities"));
            let stored = ctx.context().collection_names()?;
            assert_eq!(stored.iter().filter(|n| n.as_str() == "testentities").count(), 1);
            assert!(ctx.context().collection_exists::<TestEntity>()?);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_concurrent_inserts_get_distinct_ids() {
    run_test(
        || create_test_context(),
        |ctx| {
            let threads = 8;
            let per_thread = 25;

            let ids = thread::scope(|scope| {
                let handles = (0..threads)
                    .map(|_| {
                        let context = ctx.context();
                        scope.spawn(move || -> docrepo::errors::RepoResult<Vec<_>> {
                            let repo: Repository<Person> = context.repository()?;
                            let mut ids = Vec::with_capacity(per_thread);
                            for _ in 0..per_thread {
                                ids.push(repo.insert(generate_person())?.id);
                            }
                            Ok(ids)
                        })
                    })
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|h| h.join().expect("thread panicked"))
                    .collect::<Result<Vec<_>, _>>()
            })?;

            let unique = ids.iter().flatten().collect::<HashSet<_>>();
            assert_eq!(unique.len(), threads * per_thread);

            let repo: Repository<Person> = ctx.repository()?;
            assert_eq!(repo.count(Criteria::All)? as usize, threads * per_thread);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_concurrent_updates_on_distinct_entities() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let stored = repo.insert_many((0..20).map(|i| TestEntity::new("worker", i)).collect())?;

            thread::scope(|scope| {
                for entity in &stored {
                    let repo = repo.clone();
                    scope.spawn(move || {
                        let mut changed = entity.clone();
                        changed.int_field += 100;
                        assert_eq!(repo.update(&changed).unwrap(), 1);
                    });
                }
            });

            let values = repo
                .query(Criteria::All)?
                .to_vec()?
                .into_iter()
                .map(|e| e.int_field)
                .collect::<HashSet<_>>();
            assert_eq!(values, (100..120).collect::<HashSet<_>>());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
