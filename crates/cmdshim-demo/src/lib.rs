//! `shimdemo`: a cmdshim application over two in-memory services.
//!
//! - `graph`: a small API catalog (create, get, update, delete, list).
//! - `workflow`: environments whose settings nest under
//!   `NetworkConfiguration` and `LoggingConfiguration`.
//!
//! Both services live in process memory and start from a seeded state, so
//! every run sees the same data.
//!
//! ```text
//! $ shimdemo graph create-api --name demo --tag env=test --select '*' --force
//! $ shimdemo graph update-api --api-id api-0001 --name renamed --select ^ApiId
//! $ shimdemo workflow create-environment --name etl --execution-role-arn arn:role/etl \
//!       --subnets subnet-1 subnet-2 --dag-processing-logs-enabled --dry-run
//! ```

pub mod error;
pub mod graph;
pub mod operations;
pub mod provider;
pub mod workflow;

use cmdshim::{App, AppBuilder};

pub use provider::DemoProvider;

/// The demo app, not yet built.
pub fn app_builder(provider: DemoProvider) -> AppBuilder {
    App::builder("shimdemo", provider)
        .about("Call the in-memory graph and workflow services")
        .version(env!("CARGO_PKG_VERSION"))
        .operations(operations::graph())
        .operations(operations::workflow())
}
