use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify};

/// Password hashing and verification backed by bcrypt.
///
/// Every digest embeds its own random salt, so hashing the same password twice
/// yields different strings that both verify.
#[derive(Debug, Clone)]
pub struct CredentialService {
    cost: u32,
    dummy_digest: String,
}

impl CredentialService {
    pub fn new(cost: u32) -> AppResult<Self> {
        let dummy_digest = hash("placeholder-password", cost)
            .map_err(|e| AppError::Internal(format!("Invalid bcrypt cost {}: {}", cost, e)))?;
        Ok(Self { cost, dummy_digest })
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Returns `false` for a wrong password and for a digest that cannot be parsed.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        verify(password, digest).unwrap_or(false)
    }

    /// A valid digest that matches no real password. Login verifies against it when
    /// the username is unknown, so both rejection paths cost one bcrypt run.
    pub fn dummy_digest(&self) -> &str {
        &self.dummy_digest
    }
}
