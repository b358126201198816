//! Terminal month-view calendar with account registration.

pub mod app;
pub mod calendar;
pub mod config;
pub mod register;
pub mod state;
pub mod theme;
pub mod ui;
pub mod validation;
