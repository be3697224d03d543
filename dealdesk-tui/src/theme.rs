//! SynthBrute theme and color utilities.

use dealdesk_core::{InteractionKind, LeadStatus, LoadStatus};
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct SynthBruteTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl SynthBruteTheme {
    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

pub fn lead_status_color(status: LeadStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        LeadStatus::New => theme.primary,
        LeadStatus::Contacted | LeadStatus::Qualified => theme.primary_dim,
        LeadStatus::Proposal | LeadStatus::Negotiation => theme.tertiary,
        LeadStatus::Won => theme.success,
        LeadStatus::Lost => theme.error,
    }
}

pub fn interaction_kind_color(kind: InteractionKind, theme: &SynthBruteTheme) -> Color {
    match kind {
        InteractionKind::Call => theme.primary,
        InteractionKind::Email => theme.secondary,
        InteractionKind::Meeting => theme.tertiary,
        InteractionKind::Note => theme.text_dim,
    }
}

pub fn load_status_color(status: LoadStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        LoadStatus::Idle => theme.text_dim,
        LoadStatus::Loading => theme.warning,
        LoadStatus::Loaded => theme.success,
        LoadStatus::Errored => theme.error,
    }
}
