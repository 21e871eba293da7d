use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::validate::{optional_text, required_email, required_text};
use stockroom_core::{DomainError, DomainResult, Entity, Owned, PartyId, UserId};

/// Party kind: customer or distributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Distributor,
}

impl PartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyKind::Customer => "customer",
            PartyKind::Distributor => "distributor",
        }
    }

    /// Capitalised label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            PartyKind::Customer => "Customer",
            PartyKind::Distributor => "Distributor",
        }
    }
}

impl core::str::FromStr for PartyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(PartyKind::Customer),
            "distributor" => Ok(PartyKind::Distributor),
            other => Err(DomainError::validation(format!("unknown party kind '{other}'"))),
        }
    }
}

impl core::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer or distributor owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: PartyId,
    pub owner: UserId,
    pub kind: PartyKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Party {
    pub fn create(
        id: PartyId,
        owner: UserId,
        kind: PartyKind,
        draft: PartyDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            kind,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the contact details; kind and identity never change.
    pub fn revise(&mut self, draft: PartyDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.address = draft.address;
        self.updated_at = now;
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> PartyId {
        self.id
    }
}

impl Owned for Party {
    fn owner(&self) -> UserId {
        self.owner
    }
}

/// Unvalidated contact fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Contact fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl PartyInput {
    /// Name and email are required; empty phone/address are stored as absent.
    pub fn validate(self) -> DomainResult<PartyDraft> {
        Ok(PartyDraft {
            name: required_text("name", self.name.as_deref())?,
            email: required_email("email", self.email.as_deref())?,
            phone: optional_text(self.phone.as_deref()),
            address: optional_text(self.address.as_deref()),
        })
    }
}
