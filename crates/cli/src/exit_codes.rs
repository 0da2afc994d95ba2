//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; the badge upload runs
//! from cron and deployment scripts key off them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad flag combinations)  |
//! | 10-19   | config           | Properties file errors                   |
//! | 20-29   | input            | Badge/card input file errors             |
//! | 40-49   | service          | Badge service errors                     |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid flag combination (clap's code).
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (10-19)
// =============================================================================

/// Config file unreadable, malformed, or missing a required property.
pub const EXIT_CONFIG: u8 = 10;

// =============================================================================
// Input (20-29)
// =============================================================================

/// Malformed input: bad CSV, missing required column, invalid delete value.
pub const EXIT_INPUT_FORMAT: u8 = 20;

/// Cannot read the input file or write the dump file.
pub const EXIT_INPUT_IO: u8 = 21;

// =============================================================================
// Service (40-49)
// =============================================================================

/// Access token exchange failed (rejected or malformed response).
pub const EXIT_AUTH: u8 = 40;

/// Upload rejected by the service (non-2xx).
pub const EXIT_UPLOAD: u8 = 41;

/// Network error reaching the service.
pub const EXIT_NETWORK: u8 = 42;
