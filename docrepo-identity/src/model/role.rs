use docrepo::collection::ObjectId;
use docrepo_derive::{Convertible, Entity};

use super::user::new_stamp;

/// A named role users can be members of.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityRole {
    pub id: ObjectId,
    pub name: String,
    pub normalized_name: String,
    pub concurrency_stamp: String,
}

impl IdentityRole {
    pub fn new(name: &str) -> Self {
        IdentityRole {
            name: name.to_string(),
            normalized_name: name.to_uppercase(),
            concurrency_stamp: new_stamp(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_role_is_normalized() {
        let role = IdentityRole::new("Admin");
        assert_eq!(role.name, "Admin");
        assert_eq!(role.normalized_name, "ADMIN");
        assert!(!role.concurrency_stamp.is_empty());
    }
}
