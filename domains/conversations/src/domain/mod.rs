//! Conversations domain layer: entities, request validation, chat relay

pub mod entities;
pub mod relay;
pub mod validation;
