//! The record abstraction the collection controller is generic over.
//!
//! The controller never looks inside a record beyond three things: its
//! stable id, the value of a named (possibly dotted) field used for
//! sorting, and whether the record is unassigned.

use crate::{Comment, CommentId, Interaction, InteractionId, Lead, LeadId};
use std::borrow::Cow;
use std::fmt;

/// Resolved value of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(Cow<'a, str>),
    Missing,
}

impl<'a> FieldValue<'a> {
    pub fn text(value: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }

    pub fn opt_text(value: Option<&'a str>) -> Self {
        value.map(Self::text).unwrap_or(FieldValue::Missing)
    }

    pub fn opt_number(value: Option<f64>) -> Self {
        value.map(FieldValue::Number).unwrap_or(FieldValue::Missing)
    }

    /// Numeric view of the value. Anything that is not a finite number
    /// (missing, unparsable text, NaN) coerces to `0`.
    pub fn as_number(&self) -> f64 {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            FieldValue::Missing => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }

    /// Lexical view of the value. Missing values are the empty string.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Missing => Cow::Borrowed(""),
        }
    }
}

/// An application entity that can be listed by the collection controller.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Clone + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Resolve a field by name. Nested fields use dotted paths such as
    /// `assignee.name`. Unknown fields resolve to [`FieldValue::Missing`].
    fn field(&self, path: &str) -> FieldValue<'_>;

    /// Whether nobody owns this record.
    fn is_unassigned(&self) -> bool;
}

impl Record for Lead {
    type Id = LeadId;

    fn id(&self) -> LeadId {
        self.lead_id
    }

    fn field(&self, path: &str) -> FieldValue<'_> {
        match path {
            "title" => FieldValue::text(&self.title),
            "company" => FieldValue::opt_text(self.company.as_deref()),
            "contact_name" => FieldValue::opt_text(self.contact_name.as_deref()),
            "amount" => FieldValue::opt_number(self.amount),
            "probability" => FieldValue::opt_number(self.probability.map(f64::from)),
            "status" => FieldValue::Text(Cow::Owned(self.status.to_string())),
            "assignee.name" => {
                FieldValue::opt_text(self.assignee.as_ref().map(|u| u.name.as_str()))
            }
            "assignee.email" => FieldValue::opt_text(
                self.assignee.as_ref().and_then(|u| u.email.as_deref()),
            ),
            "created_at" => FieldValue::Number(self.created_at.timestamp_millis() as f64),
            "updated_at" => FieldValue::Number(self.updated_at.timestamp_millis() as f64),
            _ => FieldValue::Missing,
        }
    }

    fn is_unassigned(&self) -> bool {
        self.assignee.is_none()
    }
}

impl Record for Interaction {
    type Id = InteractionId;

    fn id(&self) -> InteractionId {
        self.interaction_id
    }

    fn field(&self, path: &str) -> FieldValue<'_> {
        match path {
            "subject" => FieldValue::text(&self.subject),
            "kind" => FieldValue::Text(Cow::Owned(self.kind.to_string())),
            "assignee.name" => {
                FieldValue::opt_text(self.assignee.as_ref().map(|u| u.name.as_str()))
            }
            "occurred_at" => FieldValue::Number(self.occurred_at.timestamp_millis() as f64),
            _ => FieldValue::Missing,
        }
    }

    fn is_unassigned(&self) -> bool {
        self.assignee.is_none()
    }
}

impl Record for Comment {
    type Id = CommentId;

    fn id(&self) -> CommentId {
        self.comment_id
    }

    fn field(&self, path: &str) -> FieldValue<'_> {
        match path {
            "body" => FieldValue::text(&self.body),
            "author.name" => FieldValue::opt_text(self.author.as_ref().map(|u| u.name.as_str())),
            "created_at" => FieldValue::Number(self.created_at.timestamp_millis() as f64),
            _ => FieldValue::Missing,
        }
    }

    fn is_unassigned(&self) -> bool {
        self.author.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityIdType, LeadStatus, UserId, UserRef};
    use chrono::Utc;

    fn lead() -> Lead {
        Lead {
            lead_id: LeadId::now_v7(),
            title: "Renewal".to_string(),
            company: None,
            contact_name: Some("Ada".to_string()),
            amount: Some(1200.5),
            probability: Some(40),
            status: LeadStatus::Proposal,
            assignee: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_field_value_number_coercion() {
        assert_eq!(FieldValue::Number(3.5).as_number(), 3.5);
        assert_eq!(FieldValue::text(" 42 ").as_number(), 42.0);
        assert_eq!(FieldValue::text("n/a").as_number(), 0.0);
        assert_eq!(FieldValue::Missing.as_number(), 0.0);
        assert_eq!(FieldValue::Number(f64::NAN).as_number(), 0.0);
    }

    #[test]
    fn test_field_value_text_coercion() {
        assert_eq!(FieldValue::Missing.as_text(), "");
        assert_eq!(FieldValue::text("acme").as_text(), "acme");
        assert_eq!(FieldValue::Number(7.0).as_text(), "7");
    }

    #[test]
    fn test_lead_fields_resolve() {
        let mut lead = lead();
        assert_eq!(lead.field("amount"), FieldValue::Number(1200.5));
        assert_eq!(lead.field("probability"), FieldValue::Number(40.0));
        assert_eq!(lead.field("company"), FieldValue::Missing);
        assert_eq!(lead.field("assignee.name"), FieldValue::Missing);
        assert_eq!(lead.field("no_such_field"), FieldValue::Missing);
        assert!(lead.is_unassigned());

        lead.assignee = Some(UserRef {
            user_id: UserId::now_v7(),
            name: "Grace".to_string(),
            email: None,
        });
        assert_eq!(lead.field("assignee.name"), FieldValue::text("Grace"));
        assert!(!lead.is_unassigned());
    }
}
