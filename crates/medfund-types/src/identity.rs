use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters that may not appear in an application id.
///
/// `,` delimits composite sub-ledger keys and `#` qualifies the sub-ledger
/// namespace, so an id containing either could alias another record's key.
const FORBIDDEN_CHARS: &[char] = &[',', '#'];

/// Upper bound on id length in bytes.
const MAX_LEN: usize = 128;

/// Immutable ledger key of one crowdfunding application.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Validate and wrap an application id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(invalid(&id, "must not be empty"));
        }
        if id.len() > MAX_LEN {
            return Err(invalid(&id, &format!("longer than {MAX_LEN} bytes")));
        }
        if let Some(ch) = id
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
        {
            return Err(invalid(&id, &format!("contains forbidden character {ch:?}")));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(input: &str, reason: &str) -> TypeError {
    TypeError::InvalidApplicationId {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

impl FromStr for ApplicationId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ApplicationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApplicationId({})", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
