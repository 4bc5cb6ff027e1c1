//! Provider profile: the claims the identity provider asserts for one end-user.
//!
//! Only a fixed set of claim names is recognized. Anything else the provider
//! sends is accepted and ignored, but still counts as "a claim was supplied",
//! which matters to the resolver's empty-profile rule.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Recognized claim names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Claim {
    /// Provider-issued unique subject identifier, e.g. `auth0|1111111`
    UserId,
    Email,
    Nickname,
    Name,
    Picture,
}

impl Claim {
    pub const ALL: [Claim; 5] = [
        Claim::UserId,
        Claim::Email,
        Claim::Nickname,
        Claim::Name,
        Claim::Picture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Claim::UserId => "user_id",
            Claim::Email => "email",
            Claim::Nickname => "nickname",
            Claim::Name => "name",
            Claim::Picture => "picture",
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Claim {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Claim::ALL
            .into_iter()
            .find(|claim| claim.as_str() == s)
            .ok_or(())
    }
}

/// Claims supplied by the provider.
///
/// A recognized claim can be absent, present with a value, or present but
/// null (`None`); the last two are both "supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Profile {
    claims: BTreeMap<Claim, Option<String>>,
    unrecognized: BTreeSet<String>,
}

impl Profile {
    /// A profile with no claims at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style helper to supply a claim with a value
    pub fn with_claim(mut self, claim: Claim, value: impl Into<String>) -> Self {
        self.claims.insert(claim, Some(value.into()));
        self
    }

    /// Builder-style helper to supply a claim as null
    pub fn with_null_claim(mut self, claim: Claim) -> Self {
        self.claims.insert(claim, None);
        self
    }

    /// Supply a claim by name. Unknown names are remembered but carry no value.
    pub fn insert(&mut self, name: &str, value: Option<String>) {
        match name.parse::<Claim>() {
            Ok(claim) => {
                self.claims.insert(claim, value);
            }
            Err(()) => {
                self.unrecognized.insert(name.to_string());
            }
        }
    }

    /// Build a profile from a user-info JSON document. Anything other than an
    /// object yields the empty profile.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from(map.clone()),
            _ => Self::empty(),
        }
    }

    /// True when no claim, recognized or not, was supplied
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty() && self.unrecognized.is_empty()
    }

    /// Whether the claim was supplied, even as null
    pub fn is_supplied(&self, claim: Claim) -> bool {
        self.claims.contains_key(&claim)
    }

    /// Value of a claim; `None` when absent or null
    pub fn get(&self, claim: Claim) -> Option<&str> {
        self.claims.get(&claim).and_then(|v| v.as_deref())
    }

    /// Value of a claim, treating the empty string like null
    pub fn non_empty(&self, claim: Claim) -> Option<&str> {
        self.get(claim).filter(|v| !v.is_empty())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(Claim::UserId)
    }

    pub fn email(&self) -> Option<&str> {
        self.get(Claim::Email)
    }

    pub fn nickname(&self) -> Option<&str> {
        self.get(Claim::Nickname)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(Claim::Name)
    }

    pub fn picture(&self) -> Option<&str> {
        self.get(Claim::Picture)
    }

    /// Names of the claims that were supplied but not recognized
    pub fn unrecognized(&self) -> impl Iterator<Item = &str> {
        self.unrecognized.iter().map(String::as_str)
    }
}

impl From<Map<String, Value>> for Profile {
    fn from(map: Map<String, Value>) -> Self {
        let mut profile = Profile::empty();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => Some(s),
                _ => None,
            };
            profile.insert(&name, value);
        }
        profile
    }
}
