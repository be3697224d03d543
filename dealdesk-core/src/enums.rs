//! Enum types for DealDesk entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStatus {
    /// Every status, in pipeline order.
    pub fn all() -> &'static [LeadStatus] {
        &[
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Proposal,
            LeadStatus::Negotiation,
            LeadStatus::Won,
            LeadStatus::Lost,
        ]
    }

    /// Whether the deal is still being worked.
    pub fn is_open(&self) -> bool {
        !matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }
}

/// Channel an interaction happened over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Call,
    Email,
    Meeting,
    Note,
}

impl InteractionKind {
    pub fn all() -> &'static [InteractionKind] {
        &[
            InteractionKind::Call,
            InteractionKind::Email,
            InteractionKind::Meeting,
            InteractionKind::Note,
        ]
    }
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Proposal => "Proposal",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Won => "Won",
            LeadStatus::Lost => "Lost",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "proposal" | "proposalsent" => Ok(LeadStatus::Proposal),
            "negotiation" | "negotiating" => Ok(LeadStatus::Negotiation),
            "won" | "closedwon" => Ok(LeadStatus::Won),
            "lost" | "closedlost" => Ok(LeadStatus::Lost),
            _ => Err(format!("Invalid LeadStatus: {}", s)),
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            InteractionKind::Call => "Call",
            InteractionKind::Email => "Email",
            InteractionKind::Meeting => "Meeting",
            InteractionKind::Note => "Note",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "call" | "phone" => Ok(InteractionKind::Call),
            "email" | "mail" => Ok(InteractionKind::Email),
            "meeting" => Ok(InteractionKind::Meeting),
            "note" => Ok(InteractionKind::Note),
            _ => Err(format!("Invalid InteractionKind: {}", s)),
        }
    }
}
