use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    pub(crate) static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// The canonical user record as held by the store.
///
/// It deliberately does not implement `Serialize`: responses go through
/// [`PublicProfile`] or [`PrivateProfile`], so the password digest can never leak.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

/// Partial change set handed to the repository. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub hashed_password: Option<String>,
}

/// Criteria for looking up a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(i32),
    Username(String),
    Email(String),
}

/// Profile visible to any authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: i32,
    pub username: String,
}

/// Profile returned to the account holder after create/update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivateProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
        }
    }

    pub fn private_profile(&self) -> PrivateProfile {
        PrivateProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Payload for creating a user directly (and, via registration, for signing up).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UserInput {
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Partial profile update. Absent fields are preserved.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}

/// Pagination parameters for listing users.
///
/// Signed on purpose: negative values must reach the service so it can reject them
/// as a validation error instead of the extractor failing first.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}
