//! Event types for the TUI event loop.

use crate::session::Outcome;
use crossterm::event::KeyEvent;
use dealdesk_core::{Comment, DealPartition, Interaction, Lead, SinglePartition};

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    Leads(Outcome<Lead, DealPartition>),
    Interactions(Outcome<Interaction, SinglePartition>),
    Comments(Outcome<Comment, SinglePartition>),
}
