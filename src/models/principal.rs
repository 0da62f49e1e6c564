use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::token::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Company => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "company" => Ok(Role::Company),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The actor behind the current session, derived from the token on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User { id: String, username: String },
    Company { id: String, username: String },
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Self {
        let id = claims.sub.clone();
        let username = claims.username.clone();
        match claims.role {
            Role::User => Principal::User { id, username },
            Role::Company => Principal::Company { id, username },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Principal::User { id, .. } | Principal::Company { id, .. } => id,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Principal::User { username, .. } | Principal::Company { username, .. } => username,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::User { .. } => Role::User,
            Principal::Company { .. } => Role::Company,
        }
    }
}
