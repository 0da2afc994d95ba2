//! Badge service API client.
//!
//! This crate is the single source of truth for the badge service wire
//! contract: token exchange plus the three versioned badgeData endpoints.
//!
//! No retries, no caching. One token, one upload, then the process exits.

mod client;

pub use client::{build_http, AccessToken, BadgeClient, BadgePayload, ServiceError};
