//! The session store: sole owner of the live session and its persisted mirror.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──init()──▶ restored (Some | None)
//!                      │  set(session) ─▶ Some(session)   notify(Some)
//!                      │  clear()      ─▶ None            notify(None) if it held one
//! ```
//!
//! Readers get cloned snapshots. Subscribers are called synchronously, once per
//! change, after both memory and storage reflect the new state.

use crate::constants::storage_keys;
use crate::state::{Credential, Session, User};
use crate::storage::SessionStorage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Callback invoked with the new session state after every change.
pub type Subscriber = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Why a persisted session was not restored.
#[derive(Debug)]
enum Restore {
    Absent,
    Valid(Session),
    Corrupt(String),
}

/// Session store.
///
/// Construct one per process, wrap it in an `Arc`, and hand it to every
/// consumer. Nothing else writes session data to storage.
///
/// # Examples
///
/// ```
/// # tokio_test::block_on(async {
/// use ipgate_auth::{Credential, Role, Session, SessionStore, User};
/// use ipgate_auth::storage::MemoryStorage;
///
/// let store = SessionStore::new(MemoryStorage::new());
/// assert!(store.init().await.is_none());
///
/// let user = User::new("Admin", "admin@test.com", Role::Admin);
/// let session = Session::bearer(Credential::new("abc").unwrap(), user);
/// store.set(session.clone()).await;
/// assert_eq!(store.current(), Some(session));
/// # });
/// ```
pub struct SessionStore<S> {
    storage: S,
    current: RwLock<Option<Session>>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
    restored: watch::Sender<bool>,
    /// Serializes every write so storage and memory never interleave.
    writes: tokio::sync::Mutex<()>,
}

impl<S: SessionStorage> std::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .field("restored", &self.is_restored())
            .finish_non_exhaustive()
    }
}

impl<S: SessionStorage> SessionStore<S> {
    /// Create a store over `storage`. Nothing is read until [`init`](Self::init).
    #[must_use]
    pub fn new(storage: S) -> Self {
        let (restored, _) = watch::channel(false);
        Self {
            storage,
            current: RwLock::new(None),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            restored,
            writes: tokio::sync::Mutex::new(()),
        }
    }

    /// Restore the persisted session.
    ///
    /// All three entries must be present and parse; otherwise storage is
    /// wiped and the store starts empty. Restoration is marked complete in
    /// every case. Calling `init` again, or after `set`/`clear`, is a no-op.
    ///
    /// Subscribers are not notified.
    pub async fn init(&self) -> Option<Session> {
        let _write = self.writes.lock().await;

        if self.is_restored() {
            return self.current();
        }

        match self.read_persisted().await {
            Restore::Valid(session) => {
                tracing::info!(
                    email = %session.user().email,
                    role = %session.role(),
                    "Restored session from storage"
                );
                *self.write_current() = Some(session);
            }
            Restore::Absent => {
                tracing::debug!("No persisted session");
            }
            Restore::Corrupt(reason) => {
                tracing::warn!(%reason, "Discarding persisted session");
                self.wipe_storage().await;
            }
        }

        self.restored.send_replace(true);
        self.current()
    }

    /// Replace the session in memory and storage, then notify subscribers.
    ///
    /// If storage cannot be written, the persisted entries are wiped so a
    /// restart never restores a stale or mixed session; the in-memory session
    /// is still replaced.
    pub async fn set(&self, session: Session) {
        let _write = self.writes.lock().await;
        self.set_locked(session).await;
    }

    /// Replace the session only if the held one still carries `expected`.
    ///
    /// Returns `false`, changing nothing, if the session was cleared or
    /// replaced by a different credential in the meantime.
    pub async fn replace_if(&self, expected: &Credential, session: Session) -> bool {
        let _write = self.writes.lock().await;
        if !self.holds(expected) {
            tracing::debug!("Held credential changed; skipping session refresh");
            return false;
        }
        self.set_locked(session).await;
        true
    }

    /// Remove the session from memory and storage. Idempotent.
    ///
    /// Subscribers are notified only if a session was actually held.
    pub async fn clear(&self) {
        let _write = self.writes.lock().await;
        self.clear_locked().await;
    }

    /// Clear the session only if the held one still carries `expected`.
    ///
    /// Returns `false`, changing nothing, if a different credential (or none)
    /// is held.
    pub async fn clear_if(&self, expected: &Credential) -> bool {
        let _write = self.writes.lock().await;
        if !self.holds(expected) {
            tracing::debug!("Held credential changed; ignoring stale rejection");
            return false;
        }
        self.clear_locked().await;
        true
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the current user.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current().map(|session| session.user().clone())
    }

    /// Returns `true` if a session is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns `true` once restoration has completed (or been superseded by
    /// `set`/`clear`).
    #[must_use]
    pub fn is_restored(&self) -> bool {
        *self.restored.borrow()
    }

    /// Wait until restoration has completed.
    pub async fn wait_restored(&self) {
        let mut rx = self.restored.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Receiver for the restoration flag.
    #[must_use]
    pub fn restoration(&self) -> watch::Receiver<bool> {
        self.restored.subscribe()
    }

    /// Register a callback for session changes.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock_subscribers().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock_subscribers();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    // ═══════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════

    async fn set_locked(&self, session: Session) {
        if let Err(e) = self.persist(&session).await {
            tracing::warn!(error = %e, "Failed to persist session; wiping persisted copy");
            self.wipe_storage().await;
        }

        *self.write_current() = Some(session.clone());
        self.restored.send_replace(true);

        tracing::info!(
            email = %session.user().email,
            role = %session.role(),
            "Session established"
        );
        self.notify(Some(&session));
    }

    async fn clear_locked(&self) {
        let previous = self.write_current().take();
        self.wipe_storage().await;
        self.restored.send_replace(true);

        if let Some(previous) = previous {
            tracing::info!(email = %previous.user().email, "Session cleared");
            self.notify(None);
        }
    }

    fn holds(&self, credential: &Credential) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|session| session.credential() == credential)
    }

    fn notify(&self, session: Option<&Session>) {
        // Callbacks run outside the lock so they may (un)subscribe.
        let subscribers: Vec<Subscriber> = self
            .lock_subscribers()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in subscribers {
            callback(session);
        }
    }

    async fn read_persisted(&self) -> Restore {
        let (credential, scheme, user) = match (
            self.storage.get(storage_keys::CREDENTIAL).await,
            self.storage.get(storage_keys::CREDENTIAL_SCHEME).await,
            self.storage.get(storage_keys::USER).await,
        ) {
            (Ok(credential), Ok(scheme), Ok(user)) => (credential, scheme, user),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                return Restore::Corrupt(e.to_string());
            }
        };

        match (credential, scheme, user) {
            (None, None, None) => Restore::Absent,
            (Some(credential), Some(scheme), Some(user)) => {
                Self::parse_persisted(credential, scheme, &user)
            }
            _ => Restore::Corrupt("incomplete session entries".to_string()),
        }
    }

    fn parse_persisted(credential: String, scheme: String, user: &str) -> Restore {
        let Some(credential) = Credential::new(credential) else {
            return Restore::Corrupt("blank credential".to_string());
        };
        if scheme.trim().is_empty() {
            return Restore::Corrupt("blank credential scheme".to_string());
        }
        let user: User = match serde_json::from_str(user) {
            Ok(user) => user,
            Err(e) => return Restore::Corrupt(format!("unreadable user: {e}")),
        };
        if !user.is_well_formed() {
            return Restore::Corrupt("user is missing username or email".to_string());
        }
        Restore::Valid(Session::new(credential, scheme, user))
    }

    /// The credential is removed first and written last, so an interrupted
    /// write never leaves a complete-looking triple behind.
    async fn persist(&self, session: &Session) -> crate::storage::StorageResult<()> {
        let user = serde_json::to_string(session.user())
            .map_err(|e| crate::storage::StorageError::Unavailable(e.to_string()))?;

        self.storage.remove(storage_keys::CREDENTIAL).await?;
        self.storage
            .set(storage_keys::CREDENTIAL_SCHEME, session.scheme())
            .await?;
        self.storage.set(storage_keys::USER, &user).await?;
        self.storage
            .set(storage_keys::CREDENTIAL, session.credential().expose())
            .await
    }

    async fn wipe_storage(&self) {
        for key in storage_keys::ALL {
            if let Err(e) = self.storage.remove(key).await {
                tracing::warn!(key, error = %e, "Failed to remove persisted session entry");
            }
        }
    }

    fn write_current(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Subscriber)>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
