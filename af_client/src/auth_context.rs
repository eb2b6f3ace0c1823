//! Process-wide auth state for UI layers.
//!
//! [`AuthContext`] owns an [`AuthService`] and publishes `{user, loading}`
//! snapshots through a `watch` channel. Operations started by the user
//! return an [`AuthOutcome`] instead of an error.

use actsfile::auth::{ProfileUpdate, RegisterRequest, User};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::watch;

use crate::{
    auth_service::AuthService,
    diagnostics::{NetworkDiagnosis, NetworkDiagnostics},
    errors::ClientResult,
};

const PREFLIGHT_FAILED: &str =
    "Unable to connect to our servers. Please check your internet connection and try again.";

/// Snapshot of the auth state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True while a verification or credential exchange is in flight
    pub loading: bool,
}

/// `{success, error?}` result handed to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub error: Option<String>,
    /// The failure looks like a connection problem; offer [`AuthContext::diagnose`]
    pub suggest_diagnostics: bool,
}

impl AuthOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            suggest_diagnostics: false,
        }
    }
}

impl<T> From<ClientResult<T>> for AuthOutcome {
    fn from(result: ClientResult<T>) -> Self {
        match result {
            Ok(_) => AuthOutcome::ok(),
            Err(e) => AuthOutcome {
                success: false,
                suggest_diagnostics: e.is_network(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// Shared auth state plus the operations that change it
pub struct AuthContext {
    service: AuthService,
    diagnostics: NetworkDiagnostics,
    state: watch::Sender<AuthState>,
    in_flight: Mutex<usize>,
    initialized: AtomicBool,
}

impl AuthContext {
    pub fn new(service: AuthService) -> Self {
        let diagnostics = NetworkDiagnostics::new(service.api().clone());
        let (state, _) = watch::channel(AuthState::default());
        Self {
            service,
            diagnostics,
            state,
            in_flight: Mutex::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    /// Restore the session from the store. Runs once; later calls do nothing.
    ///
    /// A failed restore leaves the context logged out without reporting an error.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        self.refresh().await;
    }

    /// Verify the stored session again, e.g. before showing a protected view.
    ///
    /// The user is cleared whenever verification fails.
    pub async fn refresh(&self) -> Option<User> {
        let _busy = self.begin();
        let user = self.service.verify_session().await;
        self.set_user(user.clone());
        user
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let _busy = self.begin();
        let result = self.service.login(email, password).await;
        if let Ok(user) = &result {
            self.set_user(Some(user.clone()));
        }
        result.into()
    }

    /// Login preceded by a liveness probe; fails fast when the server is unreachable
    pub async fn login_with_preflight(&self, email: &str, password: &str) -> AuthOutcome {
        if !self.diagnostics.check_connectivity().await {
            return AuthOutcome {
                success: false,
                error: Some(PREFLIGHT_FAILED.to_string()),
                suggest_diagnostics: true,
            };
        }
        self.login(email, password).await
    }

    pub async fn register(&self, data: RegisterRequest) -> AuthOutcome {
        let _busy = self.begin();
        self.service.register(data).await.into()
    }

    /// Clear the stored session and the current user
    pub fn logout(&self) {
        if let Err(e) = self.service.logout() {
            log::warn!("Could not clear stored session: {}", e);
        }
        self.set_user(None);
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthOutcome {
        let result = self.service.update_profile(update).await;
        if let Ok(user) = &result {
            self.set_user(Some(user.clone()));
        }
        result.into()
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> AuthOutcome {
        self.service
            .change_password(current_password, new_password)
            .await
            .into()
    }

    pub async fn request_password_reset(&self, email: &str) -> AuthOutcome {
        self.service.request_password_reset(email).await.into()
    }

    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AuthOutcome {
        self.service
            .confirm_password_reset(token, new_password)
            .await
            .into()
    }

    pub async fn verify_email(&self, token: &str) -> AuthOutcome {
        self.service.verify_email(token).await.into()
    }

    pub async fn diagnose(&self) -> NetworkDiagnosis {
        self.diagnostics.diagnose().await
    }

    fn set_user(&self, user: Option<User>) {
        self.state.send_if_modified(|state| {
            if state.user == user {
                return false;
            }
            state.user = user;
            true
        });
    }

    fn begin(&self) -> InFlight<'_> {
        let mut count = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        self.state
            .send_if_modified(|state| !std::mem::replace(&mut state.loading, true));
        InFlight { context: self }
    }
}

/// Keeps `loading` set until the last in-flight exchange ends, even if its
/// future is dropped.
struct InFlight<'a> {
    context: &'a AuthContext,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut count = self
            .context
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.context
                .state
                .send_if_modified(|state| std::mem::replace(&mut state.loading, false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api_client::ApiClient,
        config::ClientConfig,
        errors::ClientError,
        session_store::{MemorySessionStore, SessionStore},
    };
    use actsfile::auth::Preferences;
    use chrono::Utc;
    use std::sync::Arc;

    fn sample_user() -> User {
        User {
            id: actsfile::auth::UserId::new_v4(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            phone: None,
            avatar: None,
            bio: None,
            location: None,
            join_date: Utc::now(),
            is_verified: true,
            preferences: Preferences::default(),
        }
    }

    fn offline_context(store: Arc<MemorySessionStore>) -> AuthContext {
        let api = ApiClient::new(&ClientConfig::new("http://127.0.0.1:1"));
        AuthContext::new(AuthService::new(api, store))
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: AuthOutcome = ClientResult::Ok(()).into();
        assert!(ok.success);

        let failed: AuthOutcome = ClientResult::<()>::Err(ClientError::InvalidCredentials).into();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Invalid email or password"));
        assert!(!failed.suggest_diagnostics);

        let offline: AuthOutcome = ClientResult::<()>::Err(ClientError::Timeout).into();
        assert!(offline.suggest_diagnostics);
    }

    #[tokio::test]
    async fn test_initialize_without_token_stays_logged_out() {
        let context = offline_context(Arc::new(MemorySessionStore::new()));
        let updates = context.subscribe();

        context.initialize().await;

        let state = context.snapshot();
        assert_eq!(state.user, None);
        assert!(!state.loading);
        assert!(updates.has_changed().unwrap());
    }

    #[test]
    fn test_loading_tracks_nested_exchanges() {
        let context = offline_context(Arc::new(MemorySessionStore::new()));

        let first = context.begin();
        let second = context.begin();
        assert!(context.snapshot().loading);

        drop(first);
        assert!(context.snapshot().loading, "still one exchange in flight");

        drop(second);
        assert!(!context.snapshot().loading);
    }

    #[tokio::test]
    async fn test_refresh_without_token_clears_user() {
        let store = Arc::new(MemorySessionStore::new());
        let context = offline_context(store.clone());
        context.set_user(Some(sample_user()));

        assert_eq!(context.refresh().await, None);
        assert_eq!(context.user(), None);
        assert!(!context.snapshot().loading);
    }

    #[tokio::test]
    async fn test_logout_clears_user_and_store() {
        let store = Arc::new(MemorySessionStore::with_token("abc"));
        let context = offline_context(store.clone());

        context.logout();

        assert_eq!(context.user(), None);
        assert_eq!(store.load().unwrap(), None);
    }
}
