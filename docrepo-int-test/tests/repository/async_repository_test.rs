use super::{generate_people, Person, TestEntity};
use docrepo::errors::{ErrorKind, RepoError};
use docrepo::filter::field;
use docrepo::repository::{Criteria, Repository};
use docrepo_int_test::test_util::{block_on, cleanup, create_test_context, run_test};
use tokio_util::sync::CancellationToken;

#[test]
fn test_async_crud_round_trip() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let token = CancellationToken::new();

            block_on(async {
                let mut stored = repo.insert_async(TestEntity::new("async", 1), &token).await?;
                assert!(!stored.id.is_empty());

                let id = stored.id.to_string();
                let found = repo.find_by_id_async(&id, &token).await?;
                assert_eq!(found.as_ref(), Some(&stored));

                stored.int_field = 2;
                assert_eq!(repo.update_async(&stored, &token).await?, 1);
                let found = repo
                    .find_async(Criteria::where_(|e: &TestEntity| e.int_field == 2), &token)
                    .await?;
                assert_eq!(found.map(|e| e.id), Some(stored.id));

                assert_eq!(repo.delete_by_id_async(&id, &token).await?, 1);
                assert_eq!(repo.delete_by_id_async(&id, &token).await?, 0);
                assert_eq!(repo.count_async(Criteria::All, &token).await?, 0);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_async_batches_and_queries() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<Person> = ctx.repository()?;
            let token = CancellationToken::new();

            block_on(async {
                let mut people = repo.insert_many_async(generate_people(12), &token).await?;
                assert_eq!(people.len(), 12);

                for person in people.iter_mut().take(5) {
                    person.city = Some("Lisbon".to_string());
                }
                assert_eq!(repo.update_many_async(&people, &token).await?, 12);

                let in_lisbon = repo
                    .query_filter_async(field("city").eq("Lisbon"), &token)
                    .await?
                    .to_vec()?;
                assert_eq!(in_lisbon.len(), 5);

                let all = repo.query_async(Criteria::All, &token).await?;
                assert_eq!(all.size(), 12);

                assert_eq!(repo.delete_async(&people[0], &token).await?, 1);
                assert_eq!(repo.delete_many_async(&people[1..5], &token).await?, 4);

                let remaining = repo
                    .find_filter_async(field("city").eq("Lisbon"), &token)
                    .await?;
                assert!(remaining.is_none());
                assert_eq!(repo.count_async(Criteria::All, &token).await?, 7);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_cancelled_operations_leave_store_untouched() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let stored = repo.insert(TestEntity::new("existing", 1))?;

            let cancelled = CancellationToken::new();
            cancelled.cancel();

            block_on(async {
                let err = repo
                    .insert_async(TestEntity::new("never", 2), &cancelled)
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);

                let err = repo
                    .insert_many_async(vec![TestEntity::new("never", 3)], &cancelled)
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);

                let mut changed = stored.clone();
                changed.name = "changed".to_string();
                let err = repo.update_async(&changed, &cancelled).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);

                let err = repo
                    .delete_by_id_async(&stored.id.to_string(), &cancelled)
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);

                let err = repo.query_async(Criteria::All, &cancelled).await.err().unwrap();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);
            })?;

            assert_eq!(repo.query(Criteria::All)?.to_vec()?, vec![stored]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_child_token_cancelled_by_parent() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repo: Repository<TestEntity> = ctx.repository()?;
            let parent = CancellationToken::new();
            let child = parent.child_token();

            block_on(async {
                repo.insert_async(TestEntity::new("before", 1), &child).await?;
                parent.cancel();
                let err = repo
                    .insert_async(TestEntity::new("after", 2), &child)
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);
                Ok::<_, RepoError>(())
            })??;

            assert_eq!(repo.count(Criteria::All)?, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
