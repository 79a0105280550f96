//! Test support for cmdshim applications.
//!
//! Three kinds of helpers:
//!
//! - **Collaborator doubles**: [`RecordingClient`], [`FailingClient`] and
//!   [`SlowClient`] stand in for a service, [`CountingProvider`] counts client
//!   constructions, and [`ScriptedConfirmer`] answers confirmation prompts.
//! - **Fixtures**: descriptors shaped like a small graph API and a workflow
//!   environment API, in [`fixtures`].
//! - **Harness**: [`TestHarness`] runs an app in-process with a mock
//!   environment, mock stdin and an optional config file, and captures the
//!   output and exit code.
//!
//! # Example
//!
//! ```rust
//! use cmdshim::App;
//! use cmdshim_test::{fixtures, RecordingClient, TestHarness};
//! use serde_json::json;
//!
//! let client = RecordingClient::echo();
//! let builder = App::builder("shimdemo", client.provider())
//!     .operations(fixtures::graph_operations());
//!
//! let result = TestHarness::new().run(
//!     builder,
//!     &["graph", "update-api", "--api-id", "abc", "--select", "^ApiId", "--force", "--output", "text"],
//! );
//!
//! result.assert_success();
//! assert_eq!(result.stdout, "abc\n");
//! assert_eq!(client.requests()[0].body, json!({"ApiId": "abc"}));
//! ```

mod clients;
mod confirm;
pub mod fixtures;
mod harness;
mod provider;

pub use clients::{FailingClient, RecordingClient, SlowClient};
pub use confirm::ScriptedConfirmer;
pub use harness::{TestHarness, TestResult};
pub use provider::CountingProvider;
