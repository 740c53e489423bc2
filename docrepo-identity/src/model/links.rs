use docrepo::collection::ObjectId;
use docrepo_derive::{Convertible, Entity};

use super::claim::{Claim, UserLoginInfo};

/// A claim held by one user.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityUserClaim {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub claim_type: String,
    pub claim_value: String,
}

impl IdentityUserClaim {
    pub fn new(user_id: ObjectId, claim: &Claim) -> Self {
        let mut row = IdentityUserClaim {
            user_id,
            ..Default::default()
        };
        row.initialize_from_claim(claim);
        row
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(&self.claim_type, &self.claim_value)
    }

    pub fn initialize_from_claim(&mut self, claim: &Claim) {
        self.claim_type = claim.claim_type.clone();
        self.claim_value = claim.value.clone();
    }
}

/// A claim granted to every member of one role.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityRoleClaim {
    pub id: ObjectId,
    pub role_id: ObjectId,
    pub claim_type: String,
    pub claim_value: String,
}

impl IdentityRoleClaim {
    pub fn new(role_id: ObjectId, claim: &Claim) -> Self {
        let mut row = IdentityRoleClaim {
            role_id,
            ..Default::default()
        };
        row.initialize_from_claim(claim);
        row
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(&self.claim_type, &self.claim_value)
    }

    pub fn initialize_from_claim(&mut self, claim: &Claim) {
        self.claim_type = claim.claim_type.clone();
        self.claim_value = claim.value.clone();
    }
}

/// Membership of one user in one role.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityUserRole {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub role_id: ObjectId,
}

/// An external login linked to a user.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityUserLogin {
    pub id: ObjectId,
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: ObjectId,
}

impl IdentityUserLogin {
    pub fn new(user_id: ObjectId, login: &UserLoginInfo) -> Self {
        IdentityUserLogin {
            login_provider: login.login_provider.clone(),
            provider_key: login.provider_key.clone(),
            provider_display_name: login.provider_display_name.clone(),
            user_id,
            ..Default::default()
        }
    }

    pub fn to_login_info(&self) -> UserLoginInfo {
        UserLoginInfo {
            login_provider: self.login_provider.clone(),
            provider_key: self.provider_key.clone(),
            provider_display_name: self.provider_display_name.clone(),
        }
    }
}

/// A named token a provider issued for a user. Unique per
/// (user, provider, name).
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityUserToken {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub login_provider: String,
    pub name: String,
    pub value: Option<String>,
}

impl IdentityUserToken {
    pub fn new(user_id: ObjectId, login_provider: &str, name: &str, value: Option<&str>) -> Self {
        IdentityUserToken {
            user_id,
            login_provider: login_provider.to_string(),
            name: name.to_string(),
            value: value.map(str::to_string),
            ..Default::default()
        }
    }
}
