//! gift-dev-server — Server-rendered host for the gift shop client core
//!
//! Renders every view to HTML through gift-render-html and turns the
//! `data-a_click` posts of the page bootstrap into client actions.

pub mod action;
pub mod error;
pub mod server;

pub use server::{router, AppState};
