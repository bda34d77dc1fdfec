//! End-to-end session store behavior against an in-process stub backend.
//! The stub serves the permission/profile/sub-user endpoints with canned
//! payloads so reconciliation preference, fallback, cancellation, and
//! rejection surfacing can be exercised over real HTTP.

use anyhow::Result;
use axum::extract::State;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

use drayline::{
    AccountType, ApiClient, ApiConfig, FileStore, Identity, LocalStore, MemoryStore, SessionState,
    SessionStore,
};

#[derive(Clone)]
struct StubState {
    /// Payload served by `GET my-permissions`.
    my_permissions: Arc<Value>,
    /// Payload served by `GET trucker` (the profile endpoint).
    trucker_profile: Arc<Value>,
    /// How often `my-permissions` was hit.
    permissions_hits: Arc<AtomicUsize>,
    /// Delay applied to `my-permissions`, for in-flight cancellation tests.
    permissions_delay: Duration,
}

impl StubState {
    fn new(my_permissions: Value, trucker_profile: Value) -> Self {
        Self {
            my_permissions: Arc::new(my_permissions),
            trucker_profile: Arc::new(trucker_profile),
            permissions_hits: Arc::new(AtomicUsize::new(0)),
            permissions_delay: Duration::ZERO,
        }
    }

    fn with_permissions_delay(mut self, delay: Duration) -> Self {
        self.permissions_delay = delay;
        self
    }
}

async fn my_permissions_handler(State(s): State<StubState>) -> Json<Value> {
    s.permissions_hits.fetch_add(1, Ordering::SeqCst);
    if !s.permissions_delay.is_zero() {
        tokio::time::sleep(s.permissions_delay).await;
    }
    Json((*s.my_permissions).clone())
}

async fn trucker_profile_handler(State(s): State<StubState>) -> Json<Value> {
    Json((*s.trucker_profile).clone())
}

async fn delete_sub_user_handler() -> Json<Value> {
    Json(json!({"success": false, "message": "sub-user has active loads"}))
}

async fn list_sub_users_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "subUsers": [
            {"subUserId": 1, "name": "Ana", "email": "ana@example.com", "permissions": {"dashboard": true}},
            {"subUserId": 2, "name": "Bo"}
        ]
    }))
}

/// Spin up the stub backend on an ephemeral port; returns its base URL.
/// Run with RUST_LOG=drayline=debug to watch the swallowed-error paths.
async fn spawn_stub(state: StubState) -> Result<String> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let app = Router::new()
        .route("/api/v1/shipper_driver/my-permissions", get(my_permissions_handler))
        .route("/api/v1/shipper_driver/trucker", get(trucker_profile_handler))
        .route("/api/v1/shipper_driver/my-sub-users", get(list_sub_users_handler))
        .route("/api/v1/shipper_driver/my-sub-users/{id}", delete(delete_sub_user_handler))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

fn session_store(base: &str, backing: Arc<dyn LocalStore>) -> SessionStore {
    let client = ApiClient::new(ApiConfig::new(base).unwrap());
    SessionStore::new(backing, client)
}

fn logged_in_identity(account_type: AccountType) -> Identity {
    let mut id = Identity::new(account_type);
    id.auth_token = Some("tok-test".into());
    id
}

#[tokio::test]
async fn shipper_reconcile_merges_generic_permissions() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"billing": true, "email": false}, "isSubUser": true, "name": "Ana"}),
        json!({}),
    );
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Shipper));

    store.reconcile().await;

    let identity = store.identity().unwrap();
    assert!(identity.is_sub_user);
    assert!(identity.has_permission("billing"));
    assert!(!identity.has_permission("email"));
    assert_eq!(identity.name.as_deref(), Some("Ana"));
    Ok(())
}

#[tokio::test]
async fn trucker_reconcile_prefers_profile_endpoint() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"fleet": false}}),
        json!({
            "success": true,
            "data": {
                "permissions": {"fleet": true, "loadBoard": true},
                "isSubUser": true,
                "displayName": "Dana",
                "subUserId": 9
            }
        }),
    );
    let hits = stub.permissions_hits.clone();
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Trucker));

    store.reconcile().await;

    let identity = store.identity().unwrap();
    assert!(identity.has_permission("fleet"));
    // Legacy loadBoard was normalized into addLoad.
    assert!(identity.has_permission("addLoad"));
    assert_eq!(identity.name.as_deref(), Some("Dana"));
    assert_eq!(identity.sub_user_id, Some(json!(9)));
    // The generic endpoint was never consulted.
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn trucker_reconcile_falls_back_without_usable_profile_data() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"yard": true}, "isSubUser": true}),
        // Well-formed but carries no permission object.
        json!({"success": true, "data": {"displayName": "Dana"}}),
    );
    let hits = stub.permissions_hits.clone();
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Trucker));

    store.reconcile().await;

    let identity = store.identity().unwrap();
    assert!(identity.has_permission("yard"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn reconcile_runs_at_most_once_per_load() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"billing": true}}),
        json!({}),
    );
    let hits = stub.permissions_hits.clone();
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Shipper));

    store.reconcile().await;
    store.reconcile().await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // A fresh load event arms reconciliation again.
    store.load();
    store.login(logged_in_identity(AccountType::Shipper));
    store.reconcile().await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn reconcile_skips_account_types_without_permission_tracking() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"billing": true}}),
        json!({}),
    );
    let hits = stub.permissions_hits.clone();
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Other("broker".into())));

    store.reconcile().await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(store.identity().unwrap().permissions.is_none());
    Ok(())
}

#[tokio::test]
async fn refresh_rejected_by_server_leaves_session_untouched() -> Result<()> {
    let stub = StubState::new(json!({"success": false, "message": "expired"}), json!({}));
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Shipper));

    store.refresh_permissions().await;

    let identity = store.identity().unwrap();
    assert!(store.state().is_authenticated());
    assert!(identity.permissions.is_none());
    Ok(())
}

#[tokio::test]
async fn logout_mid_refresh_discards_the_resolved_permissions() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"billing": true}}),
        json!({}),
    )
    .with_permissions_delay(Duration::from_millis(200));
    let base = spawn_stub(stub).await?;
    let store = Arc::new(session_store(&base, Arc::new(MemoryStore::new())));
    store.load();
    store.login(logged_in_identity(AccountType::Shipper));

    let refreshing = {
        let store = store.clone();
        tokio::spawn(async move { store.refresh_permissions().await })
    };
    // Let the request get in flight, then supersede the session.
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.logout();
    store.login(logged_in_identity(AccountType::Shipper));
    refreshing.await?;

    // The stale result must not have been applied to the new identity.
    assert!(store.identity().unwrap().permissions.is_none());
    Ok(())
}

#[tokio::test]
async fn refresh_without_token_is_a_silent_noop() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"billing": true}}),
        json!({}),
    );
    let hits = stub.permissions_hits.clone();
    let base = spawn_stub(stub).await?;
    let store = session_store(&base, Arc::new(MemoryStore::new()));
    store.load();
    let mut id = Identity::new(AccountType::Shipper);
    id.auth_token = None; // no credential persisted
    store.login(id);

    store.refresh_permissions().await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(store.identity().unwrap().permissions.is_none());
    Ok(())
}

#[tokio::test]
async fn reconciled_identity_survives_a_reload() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"consignment": true}, "isSubUser": true}),
        json!({}),
    );
    let base = spawn_stub(stub).await?;
    let dir = tempdir()?;

    {
        let backing = Arc::new(FileStore::new(dir.path())?);
        let store = session_store(&base, backing);
        store.load();
        store.login(logged_in_identity(AccountType::Shipper));
        store.reconcile().await;
        assert!(store.identity().unwrap().has_permission("consignment"));
    }

    // Fresh process: resolve from disk alone.
    let backing = Arc::new(FileStore::new(dir.path())?);
    let store = session_store(&base, backing);
    store.load();
    let identity = store.identity().unwrap();
    assert!(identity.is_sub_user);
    assert!(identity.has_permission("consignment"));
    Ok(())
}

#[tokio::test]
async fn network_failure_during_reconcile_preserves_the_session() -> Result<()> {
    // Point at a port nothing listens on.
    let store = session_store("http://127.0.0.1:9", Arc::new(MemoryStore::new()));
    store.load();
    store.login(logged_in_identity(AccountType::Trucker));

    store.reconcile().await;
    store.refresh_permissions().await;

    assert!(store.state().is_authenticated());
    assert!(store.identity().unwrap().permissions.is_none());
    Ok(())
}

#[tokio::test]
async fn sub_user_crud_surfaces_server_rejections() -> Result<()> {
    let stub = StubState::new(json!({}), json!({}));
    let base = spawn_stub(stub).await?;
    let client = ApiClient::new(ApiConfig::new(&base)?);

    let rows = client.list_sub_users("tok-test").await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name.as_deref(), Some("Ana"));
    assert_eq!(rows[1].permissions, None);

    let err = client.delete_sub_user("tok-test", "1").await.unwrap_err();
    assert_eq!(err.code_str(), "server_rejection");
    assert!(err.to_string().contains("active loads"));
    Ok(())
}

#[tokio::test]
async fn subscriber_sees_reconcile_commit() -> Result<()> {
    let stub = StubState::new(
        json!({"success": true, "permissions": {"report": true}}),
        json!({}),
    );
    let base = spawn_stub(stub).await?;
    let store = Arc::new(session_store(&base, Arc::new(MemoryStore::new())));
    store.load();
    store.login(logged_in_identity(AccountType::Shipper));

    let saw_permissions = Arc::new(AtomicUsize::new(0));
    let saw = saw_permissions.clone();
    store.subscribe(move |state: &SessionState| {
        if let Some(identity) = state.identity() {
            if identity.has_permission("report") {
                saw.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    store.reconcile().await;
    assert_eq!(saw_permissions.load(Ordering::SeqCst), 1);
    Ok(())
}
