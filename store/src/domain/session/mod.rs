//! Session identity and the service that signs users in and out.
//!
//! [`SessionContext`] is the read-only view the record cache authorises
//! against. [`SessionService`] owns the mutable copy: it restores the
//! persisted user on start-up and keeps the snapshot store in step with
//! login, registration and logout.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use super::ports::{LoginService, SnapshotKey, SnapshotStore};
use super::status::OperationStatus;
use super::{DomainError, LoginCredentials, Registration, User};

/// Who, if anyone, is signed in.
///
/// # Examples
/// ```
/// use recipe_store::domain::{SessionContext, User};
///
/// let user = User::try_from_strings("u1", "chef", "chef@example.com").unwrap();
/// let session = SessionContext::signed_in(user);
/// assert!(session.is_authenticated());
/// assert!(!SessionContext::anonymous().is_authenticated());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<User>,
}

impl SessionContext {
    /// A session with no signed-in user.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session for `user`.
    #[must_use]
    pub const fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user, or [`ErrorCode::Unauthenticated`](super::ErrorCode::Unauthenticated).
    pub fn require_user(&self) -> Result<&User, DomainError> {
        self.current_user()
            .ok_or_else(|| DomainError::unauthenticated("sign in to manage recipes"))
    }
}

/// Session lifecycle: hydrate, login, register and logout.
pub struct SessionService<L: ?Sized, S: ?Sized> {
    login: Arc<L>,
    store: Arc<S>,
    context: RwLock<SessionContext>,
    status: OperationStatus,
}

impl<L: ?Sized, S: ?Sized> SessionService<L, S> {
    /// Create an anonymous session service over the given ports.
    #[must_use]
    pub fn new(login: Arc<L>, store: Arc<S>) -> Self {
        Self {
            login,
            store,
            context: RwLock::new(SessionContext::anonymous()),
            status: OperationStatus::default(),
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn context(&self) -> SessionContext {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any session operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Failure recorded by the most recent operation, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<DomainError> {
        self.status.last_error()
    }

    fn replace_context(&self, next: SessionContext) {
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl<L, S> SessionService<L, S>
where
    L: LoginService + ?Sized,
    S: SnapshotStore + ?Sized,
{
    /// Restore the persisted user, if any.
    ///
    /// A malformed session blob is discarded and the session stays
    /// anonymous.
    pub async fn hydrate(&self) -> Result<SessionContext, DomainError> {
        let _guard = self.status.begin();
        let result = self.perform_hydrate().await;
        self.status.record(result)
    }

    /// Authenticate and persist the signed-in user.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, DomainError> {
        let _guard = self.status.begin();
        let result = async {
            let user = self.login.authenticate(credentials).await?;
            self.sign_in(user).await
        }
        .await;
        self.status.record(result)
    }

    /// Create an account, then sign it in.
    pub async fn register(&self, registration: &Registration) -> Result<User, DomainError> {
        let _guard = self.status.begin();
        let result = async {
            let user = self.login.register(registration).await?;
            self.sign_in(user).await
        }
        .await;
        self.status.record(result)
    }

    /// Forget the signed-in user.
    ///
    /// The in-memory session is cleared even if the persisted copy cannot
    /// be removed; that failure is still reported.
    pub async fn logout(&self) -> Result<(), DomainError> {
        let _guard = self.status.begin();
        self.replace_context(SessionContext::anonymous());
        let result = self
            .store
            .remove(SnapshotKey::Session)
            .await
            .map_err(DomainError::from);
        debug!("signed out");
        self.status.record(result)
    }

    async fn perform_hydrate(&self) -> Result<SessionContext, DomainError> {
        let Some(blob) = self.store.load(SnapshotKey::Session).await? else {
            self.replace_context(SessionContext::anonymous());
            return Ok(SessionContext::anonymous());
        };

        let context = match serde_json::from_str::<User>(&blob) {
            Ok(user) => SessionContext::signed_in(user),
            Err(err) => {
                warn!(key = %SnapshotKey::Session, error = %err, "discarding malformed session snapshot");
                self.store.remove(SnapshotKey::Session).await?;
                SessionContext::anonymous()
            }
        };
        self.replace_context(context.clone());
        Ok(context)
    }

    async fn sign_in(&self, user: User) -> Result<User, DomainError> {
        let blob = serde_json::to_string(&user)
            .map_err(|err| DomainError::internal(format!("failed to encode session: {err}")))?;
        self.store.save(SnapshotKey::Session, &blob).await?;
        self.replace_context(SessionContext::signed_in(user.clone()));
        debug!(user_id = %user.id(), "signed in");
        Ok(user)
    }
}
