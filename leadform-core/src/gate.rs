//! Admin access control: a single password-protected account with a
//! consecutive-failure lockout.
//!
//! Sessions are tracked by an epoch number. Tokens issued by the API carry the
//! epoch that was current at login; logging out or changing the password moves
//! the epoch forward, which invalidates every outstanding token at once.

use crate::storage::{AdminCredential, CredentialStore};
use chrono::Utc;
use shared_types::AdminStatusResponse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const ADMIN_USERNAME: &str = "admin";
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must have at least 6 characters")]
    PasswordTooShort,

    #[error("Password reset is disabled")]
    ResetDisabled,

    #[error("No admin password has been set")]
    NotConfigured,

    #[error("Invalid password ({remaining} attempts remaining)")]
    InvalidCredentials { remaining: u32 },

    #[error("Too many failed attempts, retry in {retry_after:?}")]
    Locked { retry_after: Duration },

    #[error("Credential backend error: {0}")]
    Backend(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// One-way password hashing primitive.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, GateError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, GateError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub max_attempts: u32,
    pub lockout: Duration,
    pub allow_password_reset: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout: Duration::from_secs(30),
            allow_password_reset: true,
        }
    }
}

pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Counts consecutive failed logins and holds the lockout deadline.
#[derive(Debug)]
pub struct LoginThrottle {
    max_attempts: u32,
    lockout: Duration,
    failed: u32,
    locked_until: Option<Instant>,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, lockout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lockout,
            failed: 0,
            locked_until: None,
        }
    }

    /// Returns the time left when locked. An expired lockout resets the counter.
    pub fn check(&mut self, now: Instant) -> Result<(), Duration> {
        if let Some(until) = self.locked_until {
            if now < until {
                return Err(until - now);
            }
            self.locked_until = None;
            self.failed = 0;
        }
        Ok(())
    }

    /// Returns the lockout duration when this failure starts one.
    pub fn record_failure(&mut self, now: Instant) -> Option<Duration> {
        self.failed += 1;
        if self.failed >= self.max_attempts {
            self.locked_until = Some(now + self.lockout);
            Some(self.lockout)
        } else {
            None
        }
    }

    pub fn record_success(&mut self) {
        self.failed = 0;
        self.locked_until = None;
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.failed)
    }
}

pub struct AdminGate {
    credentials: Arc<dyn CredentialStore>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
    throttle: Mutex<LoginThrottle>,
    epoch: AtomicU64,
    allow_password_reset: bool,
}

impl AdminGate {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: Arc<dyn CredentialHasher>,
        config: GateConfig,
    ) -> Self {
        Self::with_clock(credentials, hasher, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        credentials: Arc<dyn CredentialStore>,
        hasher: Arc<dyn CredentialHasher>,
        config: GateConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // Seeded from wall time so tokens from a previous run never match.
        let epoch = Utc::now().timestamp_millis().max(0) as u64;
        Self {
            credentials,
            hasher,
            clock,
            throttle: Mutex::new(LoginThrottle::new(config.max_attempts, config.lockout)),
            epoch: AtomicU64::new(epoch),
            allow_password_reset: config.allow_password_reset,
        }
    }

    fn throttle(&self) -> MutexGuard<'_, LoginThrottle> {
        self.throttle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn load_credential(&self) -> Result<Option<AdminCredential>, GateError> {
        self.credentials
            .load_credential()
            .await
            .map_err(|e| GateError::Backend(e.to_string()))
    }

    pub async fn status(&self) -> Result<AdminStatusResponse, GateError> {
        let first_access = self.load_credential().await?.is_none();
        let mut throttle = self.throttle();
        let retry_after = throttle.check(self.clock.now()).err();
        Ok(AdminStatusResponse {
            first_access,
            locked: retry_after.is_some(),
            retry_after_secs: retry_after.map(ceil_secs),
            failed_attempts: throttle.failed_attempts(),
        })
    }

    /// Creates or replaces the admin password. Replacing it without an
    /// authenticated session is the "forgot password" path and is only
    /// allowed when configured.
    pub async fn set_password(
        &self,
        new_password: &str,
        confirm_password: &str,
        authenticated: bool,
    ) -> Result<(), GateError> {
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(GateError::EmptyPassword);
        }
        if new_password != confirm_password {
            return Err(GateError::PasswordMismatch);
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(GateError::PasswordTooShort);
        }

        let existing = self.load_credential().await?;
        if existing.is_some() && !authenticated {
            if !self.allow_password_reset {
                return Err(GateError::ResetDisabled);
            }
            warn!("Admin password overwritten without an authenticated session");
        }

        let credential = AdminCredential {
            username: ADMIN_USERNAME.to_string(),
            password_hash: self.hasher.hash(new_password)?,
            updated_at: Utc::now(),
        };
        self.credentials
            .save_credential(&credential)
            .await
            .map_err(|e| GateError::Backend(e.to_string()))?;

        self.epoch.fetch_add(1, Ordering::SeqCst);
        info!(first_access = existing.is_none(), "Admin password set");
        Ok(())
    }

    /// Checks the password and returns the session epoch for the new token.
    pub async fn login(&self, password: &str) -> Result<u64, GateError> {
        if let Err(retry_after) = self.throttle().check(self.clock.now()) {
            warn!(retry_after_secs = ceil_secs(retry_after), "Login rejected during lockout");
            return Err(GateError::Locked { retry_after });
        }
        if password.is_empty() {
            return Err(GateError::EmptyPassword);
        }

        let credential = self.load_credential().await?.ok_or(GateError::NotConfigured)?;

        if !self.hasher.verify(password, &credential.password_hash)? {
            let mut throttle = self.throttle();
            if let Some(retry_after) = throttle.record_failure(self.clock.now()) {
                warn!(
                    failed_attempts = throttle.failed_attempts(),
                    "Admin locked out after repeated failures"
                );
                return Err(GateError::Locked { retry_after });
            }
            let remaining = throttle.remaining_attempts();
            warn!(remaining_attempts = remaining, "Rejected admin login");
            return Err(GateError::InvalidCredentials { remaining });
        }

        self.throttle().record_success();
        info!(username = ADMIN_USERNAME, "Admin logged in");
        Ok(self.epoch.load(Ordering::SeqCst))
    }

    pub fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        info!("Admin logged out");
    }

    pub fn is_current_session(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryKeyValueStore, LocalCredentialStore, StorageError};
    use async_trait::async_trait;

    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, GateError> {
            Ok(format!("plain:{}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, GateError> {
            Ok(hash == format!("plain:{}", password))
        }
    }

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl CredentialStore for UnreachableStore {
        async fn load_credential(&self) -> Result<Option<AdminCredential>, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn save_credential(&self, _: &AdminCredential) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    fn gate_with(config: GateConfig) -> (AdminGate, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let credentials = Arc::new(LocalCredentialStore::new(Arc::new(
            InMemoryKeyValueStore::new(),
        )));
        let gate = AdminGate::with_clock(credentials, Arc::new(PlainHasher), config, clock.clone());
        (gate, clock)
    }

    async fn configured_gate() -> (AdminGate, Arc<ManualClock>) {
        let (gate, clock) = gate_with(GateConfig::default());
        gate.set_password("secret1", "secret1", false).await.unwrap();
        (gate, clock)
    }

    #[tokio::test]
    async fn test_first_access() {
        let (gate, _) = gate_with(GateConfig::default());
        assert!(gate.status().await.unwrap().first_access);
        assert!(matches!(gate.login("anything").await, Err(GateError::NotConfigured)));

        gate.set_password("secret1", "secret1", false).await.unwrap();
        assert!(!gate.status().await.unwrap().first_access);
    }

    #[tokio::test]
    async fn test_password_rules() {
        let (gate, _) = gate_with(GateConfig::default());
        assert!(matches!(
            gate.set_password("", "", false).await,
            Err(GateError::EmptyPassword)
        ));
        assert!(matches!(
            gate.set_password("secret1", "secret2", false).await,
            Err(GateError::PasswordMismatch)
        ));
        assert!(matches!(
            gate.set_password("abc", "abc", false).await,
            Err(GateError::PasswordTooShort)
        ));
        assert!(gate.status().await.unwrap().first_access);
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (gate, _) = configured_gate().await;
        let epoch = gate.login("secret1").await.unwrap();
        assert!(gate.is_current_session(epoch));

        gate.logout();
        assert!(!gate.is_current_session(epoch));
    }

    #[tokio::test]
    async fn test_lockout_after_five_failures() {
        let (gate, clock) = configured_gate().await;

        for remaining in (1..=4).rev() {
            match gate.login("wrong").await {
                Err(GateError::InvalidCredentials { remaining: r }) => assert_eq!(r, remaining),
                other => panic!("expected invalid credentials, got {:?}", other),
            }
        }
        assert!(matches!(gate.login("wrong").await, Err(GateError::Locked { .. })));

        // Even the right password is rejected while locked.
        assert!(matches!(gate.login("secret1").await, Err(GateError::Locked { .. })));
        let status = gate.status().await.unwrap();
        assert!(status.locked);
        assert_eq!(status.retry_after_secs, Some(30));
        assert_eq!(status.failed_attempts, 5);

        clock.advance(Duration::from_secs(30));
        let status = gate.status().await.unwrap();
        assert!(!status.locked);
        assert_eq!(status.failed_attempts, 0);
        assert!(gate.login("secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_success_clears_counter() {
        let (gate, _) = configured_gate().await;
        gate.login("wrong").await.unwrap_err();
        gate.login("wrong").await.unwrap_err();
        assert_eq!(gate.status().await.unwrap().failed_attempts, 2);

        gate.login("secret1").await.unwrap();
        assert_eq!(gate.status().await.unwrap().failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_backend_errors_are_not_counted() {
        let gate = AdminGate::new(
            Arc::new(UnreachableStore),
            Arc::new(PlainHasher),
            GateConfig::default(),
        );
        for _ in 0..6 {
            assert!(matches!(gate.login("secret1").await, Err(GateError::Backend(_))));
        }
        assert_eq!(gate.throttle().failed_attempts(), 0);
    }

    #[tokio::test]
    async fn test_reset_can_be_disabled() {
        let (gate, _) = gate_with(GateConfig {
            allow_password_reset: false,
            ..Default::default()
        });
        gate.set_password("secret1", "secret1", false).await.unwrap();

        assert!(matches!(
            gate.set_password("other12", "other12", false).await,
            Err(GateError::ResetDisabled)
        ));
        gate.set_password("other12", "other12", true).await.unwrap();
        assert!(gate.login("other12").await.is_ok());
    }

    #[tokio::test]
    async fn test_password_change_invalidates_sessions() {
        let (gate, _) = configured_gate().await;
        let epoch = gate.login("secret1").await.unwrap();
        gate.set_password("newpass", "newpass", true).await.unwrap();
        assert!(!gate.is_current_session(epoch));
        assert!(matches!(
            gate.login("secret1").await,
            Err(GateError::InvalidCredentials { .. })
        ));
    }
}
