//! DealDesk TUI library exports.

pub mod api_client;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod logging;
pub mod nav;
pub mod notifications;
pub mod session;
pub mod theme;
pub mod traits;
pub mod views;
pub mod widgets;
