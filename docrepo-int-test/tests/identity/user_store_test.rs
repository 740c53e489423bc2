use super::named_user;
use docrepo::errors::{ErrorKind, RepoError};
use docrepo::repository::Criteria;
use docrepo_identity::{
    Claim, IdentityRole, IdentityUserToken, RoleStore, UserLoginInfo, UserStore, INTERNAL_LOGIN_PROVIDER,
};
use docrepo_int_test::test_util::{block_on, cleanup, create_test_context, run_test};
use tokio_util::sync::CancellationToken;

#[test]
fn test_user_lifecycle() {
    run_test(
        || create_test_context(),
        |ctx| {
            let store = UserStore::new(&ctx.identity()?);
            let token = CancellationToken::new();

            block_on(async {
                let mut user = store.create(named_user("alice"), &token).await?;
                assert!(!user.id.is_empty());

                let by_name = store.find_by_name("ALICE", &token).await?;
                assert_eq!(by_name.as_ref().map(|u| u.id), Some(user.id));
                let by_email = store.find_by_email("ALICE@EXAMPLE.COM", &token).await?;
                assert_eq!(by_email.map(|u| u.id), Some(user.id));

                store.set_phone_number(&mut user, Some("+15550100"), &token)?;
                store.set_two_factor_enabled(&mut user, true, &token)?;
                let stamp = user.concurrency_stamp.clone();
                store.update(&mut user, &token).await?;
                assert_ne!(user.concurrency_stamp, stamp);

                let reloaded = store.find_by_id(&user.id.to_string(), &token).await?.unwrap();
                assert_eq!(reloaded, user);
                assert_eq!(store.get_phone_number(&reloaded, &token)?.as_deref(), Some("+15550100"));
                assert!(store.get_two_factor_enabled(&reloaded, &token)?);

                store.delete(&user, &token).await?;
                assert!(store.find_by_name("ALICE", &token).await?.is_none());
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_role_membership() {
    run_test(
        || create_test_context(),
        |ctx| {
            let identity = ctx.identity()?;
            let users = UserStore::new(&identity);
            let roles = RoleStore::new(&identity);
            let token = CancellationToken::new();

            block_on(async {
                roles.create(IdentityRole::new("Admin"), &token).await?;
                roles.create(IdentityRole::new("Auditor"), &token).await?;
                let bob = users.create(named_user("bob"), &token).await?;
                let carol = users.create(named_user("carol"), &token).await?;

                users.add_to_role(&bob, "ADMIN", &token).await?;
                users.add_to_role(&bob, "AUDITOR", &token).await?;
                users.add_to_role(&carol, "ADMIN", &token).await?;
                assert!(users.is_in_role(&bob, "ADMIN", &token).await?);

                let mut bob_roles = users.get_roles(&bob, &token).await?;
                bob_roles.sort();
                assert_eq!(bob_roles, vec!["Admin", "Auditor"]);

                let mut admins = users
                    .get_users_in_role("ADMIN", &token)
                    .await?
                    .into_iter()
                    .map(|u| u.user_name)
                    .collect::<Vec<_>>();
                admins.sort();
                assert_eq!(admins, vec!["bob", "carol"]);

                users.remove_from_role(&bob, "ADMIN", &token).await?;
                assert!(!users.is_in_role(&bob, "ADMIN", &token).await?);
                assert!(users.is_in_role(&carol, "ADMIN", &token).await?);
                assert!(!users.is_in_role(&bob, "MISSING", &token).await?);
                assert!(users.get_users_in_role("MISSING", &token).await?.is_empty());

                let err = users.add_to_role(&bob, "MISSING", &token).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::RoleNotFound);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_claims() {
    run_test(
        || create_test_context(),
        |ctx| {
            let identity = ctx.identity()?;
            let store = UserStore::new(&identity);
            let token = CancellationToken::new();

            block_on(async {
                let dave = store.create(named_user("dave"), &token).await?;
                let erin = store.create(named_user("erin"), &token).await?;

                let team = Claim::new("team", "blue");
                store
                    .add_claims(&dave, &[team.clone(), Claim::new("level", "3")], &token)
                    .await?;
                store.add_claims(&erin, &[team.clone()], &token).await?;
                assert_eq!(store.get_claims(&dave, &token).await?.len(), 2);
                assert_eq!(store.get_users_for_claim(&team, &token).await?.len(), 2);

                // replacing a claim the user does not hold changes nothing
                store
                    .replace_claim(&dave, &Claim::new("team", "red"), &Claim::new("team", "green"), &token)
                    .await?;
                let claims = store.get_claims(&dave, &token).await?;
                assert_eq!(claims.len(), 2);
                assert!(claims.contains(&team));

                store
                    .replace_claim(&dave, &team, &Claim::new("team", "green"), &token)
                    .await?;
                let claims = store.get_claims(&dave, &token).await?;
                assert!(claims.contains(&Claim::new("team", "green")));
                assert!(!claims.contains(&team));
                assert_eq!(store.get_users_for_claim(&team, &token).await?.len(), 1);

                store.remove_claims(&dave, &[Claim::new("level", "3")], &token).await?;
                assert_eq!(
                    store.get_claims(&dave, &token).await?,
                    vec![Claim::new("team", "green")]
                );
                assert_eq!(identity.user_claims().count(Criteria::All)?, 2);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_external_logins() {
    run_test(
        || create_test_context(),
        |ctx| {
            let store = UserStore::new(&ctx.identity()?);
            let token = CancellationToken::new();

            block_on(async {
                let frank = store.create(named_user("frank"), &token).await?;
                let login = UserLoginInfo::new("github", "gh-123", Some("GitHub"));
                store.add_login(&frank, &login, &token).await?;

                assert_eq!(store.get_logins(&frank, &token).await?, vec![login]);
                let owner = store.find_by_login("github", "gh-123", &token).await?;
                assert_eq!(owner.map(|u| u.id), Some(frank.id));
                assert!(store.find_by_login("github", "gh-999", &token).await?.is_none());

                store.remove_login(&frank, "github", "gh-123", &token).await?;
                assert!(store.get_logins(&frank, &token).await?.is_empty());
                assert!(store.find_by_login("github", "gh-123", &token).await?.is_none());
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_token_upsert_and_recovery_codes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let identity = ctx.identity()?;
            let store = UserStore::new(&identity);
            let token = CancellationToken::new();

            block_on(async {
                let grace = store.create(named_user("grace"), &token).await?;

                store
                    .add_user_token(IdentityUserToken::new(grace.id, "app", "refresh", Some("v1")), &token)
                    .await?;
                store
                    .add_user_token(IdentityUserToken::new(grace.id, "app", "refresh", Some("v2")), &token)
                    .await?;
                assert_eq!(store.get_token(&grace, "app", "refresh", &token).await?.as_deref(), Some("v2"));
                assert_eq!(identity.user_tokens().count(Criteria::All)?, 1);

                store.set_authenticator_key(&grace, "KEY", &token).await?;
                assert_eq!(store.get_authenticator_key(&grace, &token).await?.as_deref(), Some("KEY"));

                let codes = vec!["a1".to_string(), "b2".to_string(), "c3".to_string()];
                store.replace_codes(&grace, &codes, &token).await?;
                assert_eq!(store.count_codes(&grace, &token).await?, 3);
                assert!(store.redeem_code(&grace, "b2", &token).await?);
                assert!(!store.redeem_code(&grace, "b2", &token).await?);
                assert_eq!(store.count_codes(&grace, &token).await?, 2);

                let internal = store
                    .find_token(&grace, INTERNAL_LOGIN_PROVIDER, "RecoveryCodes", &token)
                    .await?
                    .and_then(|t| t.value);
                assert_eq!(internal.as_deref(), Some("a1;c3"));

                store.remove_token(&grace, "app", "refresh", &token).await?;
                assert!(store.get_token(&grace, "app", "refresh", &token).await?.is_none());
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_guards_run_before_store_calls() {
    run_test(
        || create_test_context(),
        |ctx| {
            let identity = ctx.identity()?;
            let store = UserStore::new(&identity);
            let token = CancellationToken::new();
            let cancelled = CancellationToken::new();
            cancelled.cancel();

            block_on(async {
                let err = store.create(named_user("henry"), &cancelled).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);
                assert_eq!(identity.users().count(Criteria::All)?, 0);

                let err = store.find_by_name("", &token).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::NullArgument);

                store.dispose();
                let err = store.find_by_name("", &token).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::UseAfterDispose);

                // cancellation wins over disposal
                let err = store.find_by_name("", &cancelled).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::Cancelled);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}
