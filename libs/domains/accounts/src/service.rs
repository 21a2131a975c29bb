use rand::RngExt;
use rand::distr::Alphanumeric;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{AccountError, AccountResult};
use crate::events::{Event, EventBus, UserCreated};
use crate::models::{LoginRequest, NewUser, RegisterRequest, User};
use crate::notifier::ResetNotifier;
use crate::password::PasswordCodec;
use crate::repository::UserRepository;
use crate::token::SessionTokenIssuer;

/// Length of generated reset tokens
pub const RESET_TOKEN_LENGTH: usize = 15;

/// Registration, login and password reset.
pub struct CredentialService<R: UserRepository> {
    repository: Arc<R>,
    codec: PasswordCodec,
    tokens: SessionTokenIssuer,
    events: EventBus,
    notifier: Arc<dyn ResetNotifier>,
}

impl<R: UserRepository> CredentialService<R> {
    pub fn new(
        repository: R,
        tokens: SessionTokenIssuer,
        events: EventBus,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            codec: PasswordCodec::new(),
            tokens,
            events,
            notifier,
        }
    }

    /// Create an account and publish `user.created`.
    ///
    /// Listeners run before this returns.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> AccountResult<()> {
        if self.repository.find_by_email(&input.email).await?.is_some() {
            return Err(AccountError::Conflict(input.email));
        }

        let password_hash = self.codec.hash(&input.password)?;

        let user = self
            .repository
            .create(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                roles: vec![],
            })
            .await?;

        info!(user_id = user.id, "User registered");

        self.events
            .dispatch(&Event::UserCreated(UserCreated::from(&user)));

        Ok(())
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password both fail with `Unauthorized`.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> AccountResult<String> {
        let Some(user) = self.repository.find_by_email(&input.email).await? else {
            self.codec.verify_placeholder(&input.password);
            debug!("Login rejected");
            return Err(AccountError::Unauthorized);
        };

        if !self.codec.verify(&user.password_hash, &input.password) {
            debug!("Login rejected");
            return Err(AccountError::Unauthorized);
        }

        if self.codec.needs_rehash(&user.password_hash) {
            self.upgrade_password_hash(&user, &input.password).await;
        }

        let token = self.tokens.issue(user.id)?;

        info!(user_id = user.id, "User logged in");
        Ok(token)
    }

    /// Resolve a session token to its user.
    pub async fn authenticate(&self, token: &str) -> AccountResult<User> {
        let user_id = self.tokens.verify(token)?;

        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::Unauthorized)
    }

    /// Issue a fresh reset token, replacing any pending one, and hand it
    /// to the notifier. Delivery failures are logged, not returned.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> AccountResult<()> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        let token = generate_reset_token();

        let user = self
            .repository
            .update_reset_token(user.id, &token)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = user.id, "Password reset requested");

        if let Err(e) = self
            .notifier
            .send(std::slice::from_ref(&user.email), &token)
            .await
        {
            warn!(
                user_id = user.id,
                notifier = self.notifier.name(),
                error = %e,
                "Failed to deliver reset token"
            );
        }

        Ok(())
    }

    /// Consume a reset token and set a new password.
    ///
    /// The token is single-use: once consumed, any further attempt with it
    /// fails with `NotFound`.
    #[instrument(skip_all)]
    pub async fn complete_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> AccountResult<()> {
        if self.repository.find_by_reset_token(token).await?.is_none() {
            return Err(AccountError::NotFound);
        }

        let password_hash = self.codec.hash(new_password)?;

        // A concurrent completion may win between the lookup and here.
        let user = self
            .repository
            .update_password_and_clear_token(token, &password_hash)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = user.id, "Password reset completed");
        Ok(())
    }

    async fn upgrade_password_hash(&self, user: &User, password: &str) {
        let result = match self.codec.hash(password) {
            Ok(hash) => self
                .repository
                .update_password_hash(user.id, &hash)
                .await
                .map(|_| ()),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => info!(user_id = user.id, "Upgraded legacy password hash"),
            Err(e) => warn!(user_id = user.id, error = %e, "Failed to upgrade legacy password hash"),
        }
    }
}

/// Random alphanumeric reset token of [`RESET_TOKEN_LENGTH`] characters.
pub fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
