#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use gangway_core::types::DbId;
use gangway_gateway::{Gateway, InstanceGateway, MemoryAuthProvider, MemoryGateway};
use gangway_store::{OnboardingStore, Session};

/// Install a test-writer tracing subscriber, once per process.
///
/// Run with `RUST_LOG=gangway_store=debug` to watch subscription lifecycles
/// while debugging a test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A store over the seeded in-memory gateway. The concrete gateway handle is
/// returned alongside so tests can inject faults and count subscribers.
pub fn seeded_store() -> (Arc<MemoryGateway>, Arc<OnboardingStore>) {
    init_tracing();
    let gateway = Arc::new(MemoryGateway::seeded());
    let shared: Arc<dyn Gateway> = gateway.clone();
    let store = Arc::new(OnboardingStore::new(shared));
    (gateway, store)
}

/// Like [`seeded_store`], with a simulated gateway round trip so tests can
/// observe optimistic state while a commit is still in flight.
pub fn seeded_store_with_latency(ms: u64) -> (Arc<MemoryGateway>, Arc<OnboardingStore>) {
    init_tracing();
    let gateway = Arc::new(MemoryGateway::new(gangway_gateway::MemoryGatewayConfig {
        latency: std::time::Duration::from_millis(ms),
        seed_demo_data: true,
    }));
    let shared: Arc<dyn Gateway> = gateway.clone();
    let store = Arc::new(OnboardingStore::new(shared));
    (gateway, store)
}

/// A session over the seeded store and the seeded auth directory
/// (`sam@example.com` is an employee, `dana@example.com` a manager).
pub fn seeded_session() -> (Arc<MemoryGateway>, Arc<OnboardingStore>, Session) {
    let (gateway, store) = seeded_store();
    let auth = Arc::new(MemoryAuthProvider::seeded());
    let session = Session::new(auth, Arc::clone(&store));
    (gateway, store, session)
}

/// Resolve a seeded instance's id by employee email.
pub async fn instance_id(gateway: &MemoryGateway, email: &str) -> DbId {
    gateway
        .get_instance_by_employee_email(email)
        .await
        .expect("lookup works")
        .expect("seeded instance exists")
        .id
}
