use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ContainerConvention, ContentTree, TreeBuilder};
use crate::infrastructure::traits::{DocumentWorkflow, MemoryStore};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Honour RUST_LOG if given, otherwise stay quiet unless something breaks
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
    debug!("RUST_LOG={:?}", env::var("RUST_LOG").ok());
}

/// Builds a tree from a listing, panicking on malformed input.
pub fn tree_from_listing(listing: &str) -> ContentTree {
    TreeBuilder::new()
        .build_from_listing(listing)
        .unwrap_or_else(|e| panic!("invalid test listing: {e}"))
}

/// Store and default-convention workflow over a listing.
pub fn store_from_listing(listing: &str) -> (MemoryStore, DocumentWorkflow) {
    let store = MemoryStore::new(tree_from_listing(listing));
    let workflow = DocumentWorkflow::new(store.clone(), ContainerConvention::default());
    (store, workflow)
}
