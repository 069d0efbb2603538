// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.

// =============================================================================
// Server defaults
// =============================================================================

/// Default listen address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

// =============================================================================
// Upstream defaults
// =============================================================================

/// Default upstream (image backend) timeout in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Configuration store defaults
// =============================================================================

/// Key under which the signing record is stored
pub const DEFAULT_CONFIG_KEY: &str = "config";

// =============================================================================
// Signing defaults
// =============================================================================

/// Default signature size in bytes (full HMAC-SHA256 digest)
pub const DEFAULT_SIGNATURE_SIZE: usize = 32;

/// Default separator between an option name and its arguments
pub const DEFAULT_ARGUMENTS_SEPARATOR: char = ':';
