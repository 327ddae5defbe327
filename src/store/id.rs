use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Canonical identifier for every stored entity.
///
/// Every ownership comparison in the API goes through `Id` equality, so there
/// is exactly one comparison path regardless of where the id came from (path
/// parameter, token claim, or stored column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct Id(String);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(Id::new(), Id::new());
    }

    #[test]
    fn compares_on_string_form() {
        let id = Id::new();
        let same = Id::from(id.to_string());
        assert_eq!(id, same);
    }
}
