//! Reusable widget components.

pub mod detail;
pub mod filter;
pub mod modal;

pub use detail::DetailPanel;
pub use filter::{FilterBar, FilterOption};
pub use modal::{centered_rect, Modal};
