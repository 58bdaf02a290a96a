//! API handlers

pub mod chat;
pub mod documents;
pub mod health;
