//! Shared constants for end-to-end tests
//!
//! When test data changes (login codes, catalog IDs, etc.), update only this file.

// ============================================================================
// Spotify application and users
// ============================================================================

pub const TEST_CLIENT_ID: &str = "test-client-id";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Redirect URI sent along with every login in the tests
pub const TEST_REDIRECT_URI: &str = "http://localhost:3000/callback";

/// Authorization code the fake accounts service accepts for the main test user
pub const TEST_USER_CODE: &str = "test-user-code";
pub const TEST_USER_ID: &str = "test-user";
pub const TEST_USER_NAME: &str = "Test User";
pub const TEST_USER_IMAGE: &str = "http://img.test/test-user.png";

/// Authorization code for a second user, who has no display name
pub const OTHER_USER_CODE: &str = "other-user-code";
pub const OTHER_USER_ID: &str = "other-user";

/// Authorization code the fake accounts service rejects
pub const REJECTED_CODE: &str = "rejected-code";

/// Access token the fake accounts service hands out for `code`
pub fn access_token_for(code: &str) -> String {
    format!("access-{}", code)
}

// ============================================================================
// Test Catalog IDs
// ============================================================================

/// Artist ID for "The Test Band"
pub const ARTIST_1_ID: &str = "artist-1";

/// Artist ID for "Jazz Ensemble"
pub const ARTIST_2_ID: &str = "artist-2";

/// Album ID for "First Album" by The Test Band, released 1999
pub const ALBUM_1_ID: &str = "album-1";

/// Album ID for "Jazz Collection" by Jazz Ensemble, released 2005
pub const ALBUM_2_ID: &str = "album-2";

/// Album ID for "Fresh Sounds", only listed among new releases
pub const ALBUM_3_ID: &str = "album-3";

/// Track ID for "Opening Track" on First Album
pub const TRACK_1_ID: &str = "track-1";

/// Track ID for "Second Song" on First Album
pub const TRACK_2_ID: &str = "track-2";

/// Track ID for "Jazz Piece" on Jazz Collection
pub const TRACK_3_ID: &str = "track-3";

/// ID that is in no catalog
pub const MISSING_ID: &str = "does-not-exist";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a test server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout of each request made by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// `max-age` configured for recommendations
pub const TEST_RECOMMENDED_CACHE_AGE_SEC: usize = 120;
