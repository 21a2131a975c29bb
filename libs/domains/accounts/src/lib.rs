//! Accounts Domain
//!
//! Registration, login and the two-step password reset flow, plus the
//! in-process event bus that reacts to account creation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │     Handlers     │  ← /login /register /reset-password /create-password /me
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐      ┌──────────────┐
//! │ CredentialService│ ───► │   EventBus   │ ──► listeners (welcome mail, audit)
//! └──┬─────┬─────┬───┘      └──────────────┘
//!    │     │     │
//!    │     │     └──► ResetNotifier (delivers reset tokens)
//!    │     └────────► PasswordCodec / SessionTokenIssuer
//!    ▼
//! ┌──────────────────┐
//! │  UserRepository  │  ← trait + in-memory implementation
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_accounts::{
//!     handlers, listeners, CredentialService, EventBus, InMemoryUserRepository,
//!     LogResetNotifier, SessionConfig, SessionTokenIssuer,
//! };
//!
//! let bus = EventBus::new();
//! listeners::register_default_listeners(&bus);
//!
//! let issuer = SessionTokenIssuer::new(&SessionConfig::new(
//!     "a-development-secret-of-at-least-32-chars",
//! ));
//! let service = CredentialService::new(
//!     InMemoryUserRepository::new(),
//!     issuer,
//!     bus,
//!     Arc::new(LogResetNotifier),
//! );
//!
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod events;
pub mod handlers;
pub mod listeners;
pub mod models;
pub mod notifier;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use error::{AccountError, AccountResult};
pub use events::{Event, EventBus, EventName, Listener, UserCreated};
pub use models::{
    CreatePasswordRequest, LoginRequest, LoginResponse, MessageResponse, NewUser, RegisterRequest,
    ResetPasswordRequest, Role, User, UserId, UserResponse,
};
pub use notifier::{LogResetNotifier, MockResetNotifier, ResetDelivery, ResetNotifier};
pub use password::{PasswordCodec, PasswordError};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::CredentialService;
pub use token::{SessionClaims, SessionConfig, SessionTokenIssuer, TokenError};
