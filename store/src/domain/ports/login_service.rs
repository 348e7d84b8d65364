//! Driven port for credential checks and account creation.
//!
//! The session service asks this port to turn credentials into a [`User`].
//! No real identity provider is wired yet, so [`FixtureLoginService`] keeps
//! a small in-memory directory seeded with a demo account.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{DomainError, LoginCredentials, Registration, User, UserId};

/// Authentication use-cases consumed by the session service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the matching user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, DomainError>;

    /// Create an account and return the new user.
    async fn register(&self, registration: &Registration) -> Result<User, DomainError>;
}

#[derive(Debug)]
struct Account {
    user: User,
    password: Zeroizing<String>,
}

/// In-memory authenticator used until an identity provider is wired.
///
/// Seeded with `demo@example.com` / `password`. New accounts receive the
/// next sequential id and live only as long as the service.
#[derive(Debug)]
pub struct FixtureLoginService {
    accounts: Mutex<Vec<Account>>,
}

impl FixtureLoginService {
    /// E-mail of the seeded demo account.
    pub const DEMO_EMAIL: &'static str = "demo@example.com";
    /// Password of the seeded demo account.
    pub const DEMO_PASSWORD: &'static str = "password";

    /// Build a directory holding only the demo account.
    pub fn new() -> Result<Self, DomainError> {
        let demo = User::try_from_strings("1", "demo", Self::DEMO_EMAIL)
            .map_err(|err| DomainError::internal(format!("invalid fixture user: {err}")))?;
        Ok(Self {
            accounts: Mutex::new(vec![Account {
                user: demo,
                password: Zeroizing::new(Self::DEMO_PASSWORD.to_owned()),
            }]),
        })
    }
}

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, DomainError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        accounts
            .iter()
            .find(|account| {
                account.user.email().as_ref() == credentials.email()
                    && account.password.as_str() == credentials.password()
            })
            .map(|account| account.user.clone())
            .ok_or_else(|| DomainError::unauthenticated("invalid email or password"))
    }

    async fn register(&self, registration: &Registration) -> Result<User, DomainError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        if accounts
            .iter()
            .any(|account| account.user.email() == registration.email())
        {
            return Err(DomainError::invalid_request("email is already taken"));
        }

        let id = UserId::new((accounts.len() + 1).to_string())
            .map_err(|err| DomainError::internal(format!("invalid generated user id: {err}")))?;
        let user = User::new(
            id,
            registration.username().clone(),
            registration.email().clone(),
        );
        accounts.push(Account {
            user: user.clone(),
            password: Zeroizing::new(registration.password().to_owned()),
        });
        Ok(user)
    }
}
