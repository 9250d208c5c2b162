//! End-to-end tests for dynoexpr.
//!
//! The tests drive the public API the way a command layer would: build
//! conditions and updates, assemble them onto a request input, and assert on
//! the JSON that would go over the wire.
//!
//! Set `RUST_LOG=dynoexpr_core=trace` to see placeholder allocation.

use std::sync::Once;

use dynoexpr_core::TableSchema;
use dynoexpr_model::{GlobalSecondaryIndex, KeySchemaElement, LocalSecondaryIndex, Projection};

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Schema of the `orders` table used across tests: `pk`/`sk` primary key,
/// a `by-customer` GSI and a `by-status` LSI.
#[must_use]
pub fn orders_schema() -> TableSchema {
    init_tracing();

    TableSchema::new(
        "orders",
        vec![KeySchemaElement::hash("pk"), KeySchemaElement::range("sk")],
    )
    .with_global_index(GlobalSecondaryIndex {
        index_name: "by-customer".to_owned(),
        key_schema: vec![
            KeySchemaElement::hash("customer"),
            KeySchemaElement::range("created"),
        ],
        projection: Projection::default(),
    })
    .with_local_index(LocalSecondaryIndex {
        index_name: "by-status".to_owned(),
        key_schema: vec![KeySchemaElement::hash("pk"), KeySchemaElement::range("status")],
        projection: Projection::default(),
    })
}

mod test_compile;
mod test_request;
