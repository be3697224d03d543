//! Navigation between list screens.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Leads,
    Interactions,
    Comments,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Leads => "Leads",
            Screen::Interactions => "Interactions",
            Screen::Comments => "Comments",
        }
    }

    pub fn all() -> &'static [Screen] {
        &[Screen::Leads, Screen::Interactions, Screen::Comments]
    }

    pub fn index(&self) -> usize {
        Self::all()
            .iter()
            .position(|s| s == self)
            .unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Screen> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> Screen {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> Screen {
        let idx = self.index();
        let all = Self::all();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }

    /// The screen listing children of this screen's selected record.
    pub fn child(&self) -> Option<Screen> {
        match self {
            Screen::Leads => Some(Screen::Interactions),
            Screen::Interactions => Some(Screen::Comments),
            Screen::Comments => None,
        }
    }
}
