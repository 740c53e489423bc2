mod role_store_test;
mod user_store_test;

use docrepo_identity::IdentityUser;

pub fn named_user(name: &str) -> IdentityUser {
    let mut user = IdentityUser::new(name);
    user.normalized_user_name = name.to_uppercase();
    user.email = Some(format!("{}@example.com", name));
    user.normalized_email = Some(format!("{}@EXAMPLE.COM", name.to_uppercase()));
    user
}
