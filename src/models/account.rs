use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::{Page, SortOrder};

pub const ADMIN_NIP_PREFIX: &str = "615";
pub const NURSE_NIP_PREFIX: &str = "303";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Nurse,
}

impl Role {
    /// Role implied by the NIP prefix alone. Pattern checks live in `validation`.
    pub fn from_nip_prefix(nip: &str) -> Option<Role> {
        if nip.starts_with(ADMIN_NIP_PREFIX) {
            Some(Role::Admin)
        } else if nip.starts_with(NURSE_NIP_PREFIX) {
            Some(Role::Nurse)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Nurse => "nurse",
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
        match s {
            "admin" => Ok(Role::Admin),
            "nurse" => Ok(Role::Nurse),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub nip: String,
    pub name: String,
    pub role: Role,

    pub password_hash: Option<String>,
    pub access: bool,
    pub identity_card_scan_img: Option<String>,

    /// sha256 of the only refresh token currently honored for this account.
    pub refresh_token_hash: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// A nurse is created inactive; access is granted in a separate step.
    pub fn can_log_in(&self) -> bool {
        self.access && self.password_hash.is_some()
    }

    pub fn nip_number(&self) -> i64 {
        self.nip.parse().unwrap_or_default()
    }
}

/// Payload of the access-grant event. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub id: Uuid,
    pub nip: String,
    pub name: String,
    pub role: Role,
    pub access: bool,
    pub identity_card_scan_img: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountSnapshot {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            nip: a.nip.clone(),
            name: a.name.clone(),
            role: a.role,
            access: a.access,
            identity_card_scan_img: a.identity_card_scan_img.clone(),
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub user_id: Option<Uuid>,
    pub name: Option<String>,
    pub nip_prefix: Option<String>,
    pub role: Option<Role>,
    pub page: Page,
    pub order: SortOrder,
}
