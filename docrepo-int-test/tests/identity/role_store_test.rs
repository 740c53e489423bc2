use super::named_user;
use docrepo::errors::{ErrorKind, RepoError};
use docrepo::repository::Criteria;
use docrepo_identity::{Claim, ClaimStore, IdentityRole, RoleStore, UserStore};
use docrepo_int_test::test_util::{block_on, cleanup, create_test_context, run_test};
use tokio_util::sync::CancellationToken;

#[test]
fn test_role_lifecycle() {
    run_test(
        || create_test_context(),
        |ctx| {
            let roles = RoleStore::new(&ctx.identity()?);
            let token = CancellationToken::new();

            block_on(async {
                let mut role = roles.create(IdentityRole::new("Support"), &token).await?;
                assert_eq!(roles.get_normalized_role_name(&role, &token)?, "SUPPORT");
                assert_eq!(roles.get_role_id(&role, &token)?, role.id.to_string());

                roles.set_role_name(&mut role, "Helpdesk", &token)?;
                roles.set_normalized_role_name(&mut role, "HELPDESK", &token)?;
                roles.update(&mut role, &token).await?;

                assert!(roles.find_by_name("SUPPORT", &token).await?.is_none());
                let found = roles.find_by_id(&role.id.to_string(), &token).await?;
                assert_eq!(found, Some(role.clone()));

                roles.delete(&role, &token).await?;
                assert!(roles.find_by_name("HELPDESK", &token).await?.is_none());
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_role_claims_through_claim_store() {
    run_test(
        || create_test_context(),
        |ctx| {
            let identity = ctx.identity()?;
            let roles = RoleStore::new(&identity);
            let token = CancellationToken::new();

            block_on(async {
                let role = roles.create(IdentityRole::new("Billing"), &token).await?;
                let claims: &dyn ClaimStore<IdentityRole> = &roles;

                claims.add_claim(&role, &Claim::new("perm", "invoice.read"), &token).await?;
                claims.add_claim(&role, &Claim::new("perm", "invoice.write"), &token).await?;
                assert_eq!(claims.get_claims(&role, &token).await?.len(), 2);

                claims
                    .remove_claim(&role, &Claim::new("perm", "invoice.write"), &token)
                    .await?;
                assert_eq!(
                    claims.get_claims(&role, &token).await?,
                    vec![Claim::new("perm", "invoice.read")]
                );
                assert_eq!(identity.role_claims().count(Criteria::All)?, 1);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_deleting_role_does_not_cascade() {
    run_test(
        || create_test_context(),
        |ctx| {
            let identity = ctx.identity()?;
            let roles = RoleStore::new(&identity);
            let users = UserStore::new(&identity);
            let token = CancellationToken::new();

            block_on(async {
                let role = roles.create(IdentityRole::new("Temp"), &token).await?;
                let user = users.create(named_user("ivan"), &token).await?;
                users.add_to_role(&user, "TEMP", &token).await?;
                roles.add_claim(&role, &Claim::new("scope", "temp"), &token).await?;

                roles.delete(&role, &token).await?;
                assert!(!users.is_in_role(&user, "TEMP", &token).await?);
                assert!(users.get_roles(&user, &token).await?.is_empty());
                assert_eq!(identity.user_roles().count(Criteria::All)?, 1);
                assert_eq!(identity.role_claims().count(Criteria::All)?, 1);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_disposed_role_store() {
    run_test(
        || create_test_context(),
        |ctx| {
            let roles = RoleStore::new(&ctx.identity()?);
            let token = CancellationToken::new();

            block_on(async {
                let role = roles.create(IdentityRole::new("Gone"), &token).await?;
                roles.dispose();
                roles.dispose();
                assert!(roles.is_disposed());

                let err = roles.get_claims(&role, &token).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::UseAfterDispose);
                let err = roles.create(IdentityRole::new("Never"), &token).await.unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::UseAfterDispose);
                Ok::<_, RepoError>(())
            })?
        },
        |ctx| cleanup(ctx),
    )
}
