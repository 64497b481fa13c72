//! Identity provider wire types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activation state of an account, as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    /// Created but not yet activated (staff-initiated accounts start here).
    Invited,
    /// Activated and able to sign in.
    Enabled,
}

/// One identity record.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub email: String,
    pub state: AccountState,
}

/// Profile metadata attached to an identity at creation.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityMetadata<'a> {
    pub name: &'a str,
    pub phone: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_record_deserializes() {
        let json = r#"{
            "id": "7f3c9d54-2f41-4b77-9e1a-0db1f1b7a9c2",
            "email": "jane@example.com",
            "state": "invited"
        }"#;
        let record: IdentityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.email, "jane@example.com");
        assert_eq!(record.state, AccountState::Invited);
    }
}
