//! Clients for external services the API talks to directly.

pub mod github;
