//! Core entity structures

use crate::{
    CommentId, InteractionId, InteractionKind, LeadId, LeadStatus, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

/// Lightweight reference to a CRM user, as embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
}

/// Lead - a deal moving through the sales pipeline.
/// Leads are partitioned into open and closed by their status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: LeadId,
    pub title: String,
    pub company: Option<String>,
    pub contact_name: Option<String>,
    /// Expected deal value.
    pub amount: Option<f64>,
    /// Win probability in percent.
    pub probability: Option<u8>,
    pub status: LeadStatus,
    pub assignee: Option<UserRef>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Interaction - a call, email, meeting or note logged against a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: InteractionId,
    pub lead_id: LeadId,
    pub kind: InteractionKind,
    pub subject: String,
    pub assignee: Option<UserRef>,
    pub occurred_at: Timestamp,
}

/// Comment left on an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: CommentId,
    pub interaction_id: InteractionId,
    pub author: Option<UserRef>,
    pub body: String,
    pub created_at: Timestamp,
}
