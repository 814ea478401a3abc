//! HTTP API integration tests
//!
//! Drive the fully composed router with `tower::ServiceExt::oneshot`, backed
//! by the in-memory store, so no database or network is needed.

mod common;

mod chat;
mod conversations;
mod health;
