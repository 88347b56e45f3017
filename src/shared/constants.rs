/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - curates the catalog, assigns agents, verifies and settles jobs
pub const ROLE_ADMIN: &str = "admin";

/// Agent role - accepts and performs jobs, uploads proof-of-work photos
pub const ROLE_AGENT: &str = "agent";

/// Client role - books services, cancels and rates completed jobs
pub const ROLE_CLIENT: &str = "client";

// =============================================================================
// PROOF PHOTOS
// =============================================================================

/// Maximum accepted size of a single proof-of-work photo
pub const MAX_PROOF_PHOTO_BYTES: usize = 8 * 1024 * 1024;

/// Image content types accepted as proof-of-work photos
pub const ALLOWED_PROOF_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/heic"];
