//! Account types recognized by the portal backend.
//! The wire value is a plain string and older payloads spell the field
//! `userType` instead of `type`, so the enum round-trips through `String`
//! and keeps unrecognized values intact rather than failing deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Shipper,
    Trucker,
    ShipperDriver,
    /// Any account type this client has no special handling for.
    Other(String),
}

impl AccountType {
    pub fn as_str(&self) -> &str {
        match self {
            AccountType::Shipper => "shipper",
            AccountType::Trucker => "trucker",
            AccountType::ShipperDriver => "shipper_driver",
            AccountType::Other(s) => s.as_str(),
        }
    }

    /// Types whose permissions are fetched and reconciled with the backend.
    pub fn tracks_permissions(&self) -> bool {
        matches!(
            self,
            AccountType::Shipper | AccountType::ShipperDriver | AccountType::Trucker
        )
    }

    /// Types whose sub-users are permission-gated at navigation time.
    pub fn gates_sub_users(&self) -> bool {
        matches!(self, AccountType::Shipper | AccountType::Trucker)
    }
}

impl From<String> for AccountType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "shipper" => AccountType::Shipper,
            "trucker" => AccountType::Trucker,
            "shipper_driver" => AccountType::ShipperDriver,
            _ => AccountType::Other(s),
        }
    }
}

impl From<AccountType> for String {
    fn from(at: AccountType) -> Self { at.as_str().to_string() }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
