//! mail-triage — message classification and reply suggestion service.

pub mod config;
pub mod error;
pub mod extract;
pub mod nlp;
pub mod pipeline;
pub mod reply;
pub mod server;
pub mod store;
