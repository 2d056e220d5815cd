//! api::endpoints
//!
//! Paths of the release service, relative to the API base URL.

/// Profile of the logged-in user. Used to verify a session token.
pub const USER_PROFILE: &str = "/auth/user-profile";

/// Signed upload URL for a session-authenticated publish.
pub const GENERATE_SIGNED_URL: &str = "/cli/gen-signed-url";

/// Signed upload URL for a CI-token publish.
pub const GENERATE_SIGNED_URL_WITH_CI_TOKEN: &str = "/cli/ci/gen-signed-url";

/// Promote an uploaded bundle to an app version.
pub const PROMOTE_BUNDLE: &str = "/cli/ci/promote";

/// Change an existing release.
pub const UPDATE_RELEASE: &str = "/cli/ci/update-release";

/// Header carrying the session token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Header carrying a CI token.
pub const CI_TOKEN_HEADER: &str = "x-ci-token";
