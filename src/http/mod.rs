//! Minimal HTTP interface for snapping from scripts and other tools.
//!
//! `POST /snap/{action}` on the configured port queues one action.

pub mod listener;
pub mod request;
