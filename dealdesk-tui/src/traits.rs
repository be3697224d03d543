//! Common traits for list screens.

use crate::theme::{interaction_kind_color, lead_status_color, SynthBruteTheme};
use dealdesk_core::{Comment, Interaction, Lead, Record, SortKey, SortKind};
use ratatui::style::Color;

/// One table column. `field` doubles as the sort key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub field: &'static str,
    pub kind: SortKind,
    /// Width as a percentage of the table.
    pub width: u16,
}

impl Column {
    const fn lexical(title: &'static str, field: &'static str, width: u16) -> Self {
        Self {
            title,
            field,
            kind: SortKind::Lexical,
            width,
        }
    }

    const fn numeric(title: &'static str, field: &'static str, width: u16) -> Self {
        Self {
            title,
            field,
            kind: SortKind::Numeric,
            width,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey {
            field: self.field.to_string(),
            kind: self.kind,
        }
    }
}

/// A record that can be shown as a table row with a detail panel.
pub trait TableRow: Record {
    fn columns() -> &'static [Column];

    /// Cell text, one per column.
    fn cells(&self) -> Vec<String>;

    fn details(&self) -> Vec<(&'static str, String)>;

    /// Accent color for the row, if any.
    fn accent(&self, _theme: &SynthBruteTheme) -> Option<Color> {
        None
    }

    /// Every column is sortable.
    fn sort_keys() -> Vec<SortKey> {
        Self::columns().iter().map(Column::sort_key).collect()
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl TableRow for Lead {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::lexical("Title", "title", 26),
            Column::lexical("Company", "company", 18),
            Column::numeric("Amount", "amount", 12),
            Column::numeric("Prob", "probability", 8),
            Column::lexical("Status", "status", 12),
            Column::lexical("Assignee", "assignee.name", 14),
            Column::numeric("Updated", "updated_at", 10),
        ];
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            or_dash(self.company.as_deref()),
            self.amount.map_or_else(|| "-".to_string(), |a| format!("{:.2}", a)),
            self.probability.map_or_else(|| "-".to_string(), |p| format!("{}%", p)),
            self.status.to_string(),
            or_dash(self.assignee.as_ref().map(|u| u.name.as_str())),
            self.updated_at.format("%Y-%m-%d").to_string(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Lead ID", self.lead_id.to_string()),
            ("Title", self.title.clone()),
            ("Status", self.status.to_string()),
        ];
        if let Some(company) = &self.company {
            fields.push(("Company", company.clone()));
        }
        if let Some(contact) = &self.contact_name {
            fields.push(("Contact", contact.clone()));
        }
        if let Some(amount) = self.amount {
            fields.push(("Amount", format!("{:.2}", amount)));
        }
        if let Some(probability) = self.probability {
            fields.push(("Probability", format!("{}%", probability)));
        }
        match &self.assignee {
            Some(user) => {
                fields.push(("Assignee", user.name.clone()));
                if let Some(email) = &user.email {
                    fields.push(("Email", email.clone()));
                }
            }
            None => fields.push(("Assignee", "unassigned".to_string())),
        }
        fields.push(("Created", self.created_at.to_rfc3339()));
        fields.push(("Updated", self.updated_at.to_rfc3339()));
        fields
    }

    fn accent(&self, theme: &SynthBruteTheme) -> Option<Color> {
        Some(lead_status_color(self.status, theme))
    }
}

impl TableRow for Interaction {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::lexical("Subject", "subject", 45),
            Column::lexical("Kind", "kind", 12),
            Column::lexical("Assignee", "assignee.name", 20),
            Column::numeric("When", "occurred_at", 23),
        ];
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.subject.clone(),
            self.kind.to_string(),
            or_dash(self.assignee.as_ref().map(|u| u.name.as_str())),
            self.occurred_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Interaction ID", self.interaction_id.to_string()),
            ("Lead ID", self.lead_id.to_string()),
            ("Kind", self.kind.to_string()),
            ("Subject", self.subject.clone()),
            (
                "Assignee",
                self.assignee
                    .as_ref()
                    .map_or_else(|| "unassigned".to_string(), |u| u.name.clone()),
            ),
            ("Occurred", self.occurred_at.to_rfc3339()),
        ]
    }

    fn accent(&self, theme: &SynthBruteTheme) -> Option<Color> {
        Some(interaction_kind_color(self.kind, theme))
    }
}

impl TableRow for Comment {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::lexical("Comment", "body", 60),
            Column::lexical("Author", "author.name", 20),
            Column::numeric("Created", "created_at", 20),
        ];
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.body.lines().next().unwrap_or_default().to_string(),
            or_dash(self.author.as_ref().map(|u| u.name.as_str())),
            self.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Comment ID", self.comment_id.to_string()),
            ("Interaction ID", self.interaction_id.to_string()),
            (
                "Author",
                self.author
                    .as_ref()
                    .map_or_else(|| "anonymous".to_string(), |u| u.name.clone()),
            ),
            ("Created", self.created_at.to_rfc3339()),
            ("Body", self.body.clone()),
        ]
    }
}
