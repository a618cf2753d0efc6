use std::sync::Arc;

use crate::auth::{
    CredentialService, LoginRequest, RegisterRequest, TokenKind, TokenPair, TokenService,
};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserInput, UserLookup};
use crate::services::UserService;

/// Registration, login, token refresh and bearer-token identity resolution.
///
/// Every authentication failure on these paths is the same `AppError::Unauthorized`
/// value, whatever the cause, so responses cannot be used to probe which usernames
/// exist. Storage failures are not folded in and still surface as internal errors.
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: Arc<TokenService>,
    credentials: CredentialService,
}

impl AuthService {
    pub fn new(
        users: UserService,
        tokens: Arc<TokenService>,
        credentials: CredentialService,
    ) -> Self {
        Self {
            users,
            tokens,
            credentials,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates the account and logs it in straight away.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<TokenPair> {
        let user = self
            .users
            .create(UserInput {
                username: request.username,
                email: request.email,
                password: request.password,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        self.tokens.issue_pair(&user.id.to_string())
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenPair> {
        let user = match self
            .users
            .find(UserLookup::Username(request.username))
            .await
        {
            Ok(user) => Some(user),
            Err(AppError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        // Verify even when the user is unknown, against a digest nobody can match.
        let digest = user
            .as_ref()
            .map_or(self.credentials.dummy_digest(), |u| u.hashed_password.as_str());
        let verified = self.credentials.verify(&request.password, digest);

        match user {
            Some(user) if verified => {
                log::info!("User {} logged in", user.id);
                self.tokens.issue_pair(&user.id.to_string())
            }
            _ => {
                log::debug!("Rejected login attempt");
                Err(AppError::Unauthorized)
            }
        }
    }

    /// Exchanges a valid refresh token for a fresh pair. The old refresh token is
    /// not invalidated.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let user = self.resolve(refresh_token, TokenKind::Refresh).await?;
        self.tokens.issue_pair(&user.id.to_string())
    }

    /// Resolves a bearer access token to the user it was issued for.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<User> {
        self.resolve(access_token, TokenKind::Access).await
    }

    async fn resolve(&self, token: &str, expected: TokenKind) -> AppResult<User> {
        let claims = self.tokens.verify(token).map_err(|reason| {
            log::debug!("Rejected {:?} token: {}", expected, reason);
            AppError::Unauthorized
        })?;

        if claims.typ != expected {
            log::debug!("Rejected {:?} token used as {:?}", claims.typ, expected);
            return Err(AppError::Unauthorized);
        }

        let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;
        match self.users.get_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(AppError::NotFound(_)) => {
                log::debug!("Token subject {} no longer exists", user_id);
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }
}
