use std::fmt::{Display, Formatter};

/// A statement about a user or role, as a (type, value) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: &str, value: &str) -> Self {
        Claim {
            claim_type: claim_type.to_string(),
            value: value.to_string(),
        }
    }
}

impl Display for Claim {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.claim_type, self.value)
    }
}

/// An external login as seen by callers: provider, key and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
}

impl UserLoginInfo {
    pub fn new(login_provider: &str, provider_key: &str, provider_display_name: Option<&str>) -> Self {
        UserLoginInfo {
            login_provider: login_provider.to_string(),
            provider_key: provider_key.to_string(),
            provider_display_name: provider_display_name.map(str::to_string),
        }
    }
}
