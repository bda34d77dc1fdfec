//! The session store: single authoritative holder of the current identity.
//!
//! One logical writer, observers notified after every committed change, and
//! atomic replace-the-whole-identity semantics: mutations read the current
//! identity, build a new one, persist it, then swap it in under the lock.
//! Readers never observe a half-merged identity.
//!
//! Asynchronous paths (startup reconciliation, permission refresh) race with
//! user-initiated changes (logout, a second login). Every such path captures
//! the store epoch before its first await and re-checks it before committing;
//! `load`, `login`, and `logout` bump the epoch, so a stale response is
//! discarded instead of resurrecting a superseded session. Failures on these
//! paths are swallowed by policy — a permission refresh must never interrupt
//! the user's current session — but logged so the swallow stays visible.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::Error;
use crate::identity::{Identity, ProfileUpdate};
use crate::storage::{LocalStore, IDENTITY_SLOT, TOKEN_SLOT};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Process start; the persisted identity has not been looked at yet.
    Uninitialized,
    /// Persisted identity is being read. Entered once per process.
    Loading,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

type Subscriber = Box<dyn Fn(&SessionState) + Send + Sync>;

pub struct SessionStore {
    state: RwLock<SessionState>,
    store: Arc<dyn LocalStore>,
    client: ApiClient,
    subscribers: RwLock<Vec<(u64, Subscriber)>>,
    next_subscriber_id: AtomicU64,
    /// Bumped on load/login/logout; async commits compare against it.
    epoch: AtomicU64,
    /// One reconciliation per identity-load event.
    reconcile_spent: AtomicBool,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>, client: ApiClient) -> Self {
        Self {
            state: RwLock::new(SessionState::Uninitialized),
            store,
            client,
            subscribers: RwLock::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
            epoch: AtomicU64::new(0),
            reconcile_spent: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.read().identity().cloned()
    }

    /// Register an observer fired after every committed state change.
    pub fn subscribe(&self, f: impl Fn(&SessionState) + Send + Sync + 'static) -> u64 {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.write().retain(|(sid, _)| *sid != id);
    }

    /// Resolve the persisted identity: Uninitialized → Loading →
    /// {Authenticated, Anonymous}. A persisted identity that fails to parse
    /// is the malformed-persisted-identity outcome and resolves to
    /// Anonymous — fail open to logged-out, never an error to the caller.
    pub fn load(&self) {
        self.swap_state(SessionState::Loading);
        let resolved = match self.store.get(IDENTITY_SLOT) {
            Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => SessionState::Authenticated(identity),
                Err(e) => {
                    debug!(target: "drayline::session", "{}", Error::malformed_identity(e.to_string()));
                    SessionState::Anonymous
                }
            },
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                debug!(target: "drayline::session", "identity slot unreadable: {}", e);
                SessionState::Anonymous
            }
        };
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.reconcile_spent.store(false, Ordering::SeqCst);
        let authed = resolved.is_authenticated();
        self.swap_state(resolved);
        debug!(target: "drayline::session", "load resolved authenticated={}", authed);
    }

    /// Enter the authenticated state with an identity obtained from a prior
    /// auth round-trip. Persists the identity and, when present, its bearer
    /// token. No server call happens here.
    pub fn login(&self, identity: Identity) {
        match serde_json::to_string(&identity) {
            Ok(raw) => {
                if let Err(e) = self.store.set(IDENTITY_SLOT, &raw) {
                    warn!(target: "drayline::session", "persisting identity failed: {}", e);
                }
            }
            Err(e) => warn!(target: "drayline::session", "serializing identity failed: {}", e),
        }
        if let Some(token) = &identity.auth_token {
            if let Err(e) = self.store.set(TOKEN_SLOT, token) {
                warn!(target: "drayline::session", "persisting token failed: {}", e);
            }
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        debug!(target: "drayline::session", "login type={}", identity.account_type);
        self.swap_state(SessionState::Authenticated(identity));
    }

    /// Clear the identity and both persisted slots unconditionally.
    /// Irreversible except via a new `login`.
    pub fn logout(&self) {
        if let Err(e) = self.store.remove(IDENTITY_SLOT) {
            warn!(target: "drayline::session", "clearing identity slot failed: {}", e);
        }
        if let Err(e) = self.store.remove(TOKEN_SLOT) {
            warn!(target: "drayline::session", "clearing token slot failed: {}", e);
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        debug!(target: "drayline::session", "logout");
        self.swap_state(SessionState::Anonymous);
    }

    /// Merge a partial profile payload into the current identity. No-op when
    /// there is no current identity. Trucker permission sets go through the
    /// normalizer inside the merge.
    pub fn update_from_profile(&self, profile: ProfileUpdate) {
        let current = match self.identity() {
            Some(identity) => identity,
            None => return,
        };
        let mut next = current;
        next.apply_profile(profile);
        self.persist_identity(&next);
        self.swap_state(SessionState::Authenticated(next));
    }

    /// Fetch the generic permissions endpoint and merge the result.
    /// Silently no-ops without a stored token; network and server failures
    /// are swallowed. Concurrent calls are not deduplicated — each is
    /// idempotent, epoch-checked, and last-write-wins on the persisted copy.
    pub async fn refresh_permissions(&self) {
        let Some(token) = self.token() else {
            debug!(target: "drayline::session", "refresh skipped: {}", Error::NoAuthToken);
            return;
        };
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.client.my_permissions(&token).await {
            Ok(Some(update)) => {
                self.commit_profile(epoch, update);
            }
            Ok(None) => {}
            Err(e) => debug!(target: "drayline::session", "refresh failed: {}", e),
        }
    }

    /// Startup reconciliation: fetch authoritative permissions for a freshly
    /// loaded identity. For truckers the profile endpoint is the source of
    /// truth and the generic permissions endpoint is only a fallback when it
    /// yields no usable permission data. Runs at most once per load; a
    /// logout or re-login while a call is in flight discards the result.
    pub async fn reconcile(&self) {
        let account_type = match self.identity() {
            Some(identity) if identity.account_type.tracks_permissions() => identity.account_type,
            _ => return,
        };
        let Some(token) = self.token() else {
            debug!(target: "drayline::session", "reconcile skipped: {}", Error::NoAuthToken);
            return;
        };
        if self
            .reconcile_spent
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let epoch = self.epoch.load(Ordering::SeqCst);

        if account_type == crate::account::AccountType::Trucker {
            match self.client.trucker_profile(&token).await {
                Ok(Some(update)) => {
                    self.commit_profile(epoch, update);
                    return;
                }
                Ok(None) => {} // no usable permission data; fall back
                Err(e) => {
                    debug!(target: "drayline::session", "trucker profile failed: {}", e);
                    return;
                }
            }
        }

        match self.client.my_permissions(&token).await {
            Ok(Some(update)) => {
                self.commit_profile(epoch, update);
            }
            Ok(None) => {}
            Err(e) => debug!(target: "drayline::session", "reconcile failed: {}", e),
        }
    }

    fn token(&self) -> Option<String> {
        self.store.get(TOKEN_SLOT).ok().flatten()
    }

    /// Apply an async result if, and only if, the session it was fetched for
    /// is still the current one.
    fn commit_profile(&self, epoch: u64, update: ProfileUpdate) -> bool {
        let mut guard = self.state.write();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(target: "drayline::session", "stale permission result discarded");
            return false;
        }
        let SessionState::Authenticated(current) = &*guard else {
            return false;
        };
        let mut next = current.clone();
        next.apply_profile(update);
        self.persist_identity(&next);
        *guard = SessionState::Authenticated(next);
        let snapshot = guard.clone();
        drop(guard);
        self.notify(&snapshot);
        true
    }

    fn persist_identity(&self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => {
                if let Err(e) = self.store.set(IDENTITY_SLOT, &raw) {
                    warn!(target: "drayline::session", "persisting identity failed: {}", e);
                }
            }
            Err(e) => warn!(target: "drayline::session", "serializing identity failed: {}", e),
        }
    }

    fn swap_state(&self, next: SessionState) {
        {
            let mut guard = self.state.write();
            *guard = next;
        }
        let snapshot = self.state.read().clone();
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &SessionState) {
        let subs = self.subscribers.read();
        for (_, f) in subs.iter() {
            f(snapshot);
        }
    }
}
