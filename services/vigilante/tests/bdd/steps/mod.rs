//! BDD step definitions for vigilante service

pub mod alert_steps;
pub mod round_steps;
