pub mod extractors;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::USERNAME_REGEX;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use password::CredentialService;
pub use token::{Claims, InvalidToken, TokenKind, TokenPair, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 50 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 8 characters long.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Payload for exchanging a refresh token for a new pair.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}
