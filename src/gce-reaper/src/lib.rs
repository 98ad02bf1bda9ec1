// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deletes reapable instances from a Compute Engine instance group.
//!
//! Autoscalers and health checks may leave instances in an instance group
//! after they stop running. This crate periodically lists the instances in
//! one group, and deletes those in a `STOPPING`, `STOPPED`, `SUSPENDING`,
//! `SUSPENDED`, or `TERMINATED` state. Each deletion is a long-running
//! operation, the reaper waits for it to complete before moving to the next
//! instance.
//!
//! # Example
//! ```no_run
//! # use gce_reaper::{Config, Reaper};
//! # use tokio_util::sync::CancellationToken;
//! # async fn sample() -> gce_reaper::Result<()> {
//! let config = Config::new("my-project", "us-central1-a", "my-group")
//!     .with_poll_interval(std::time::Duration::from_secs(30));
//! let reaper = Reaper::new(config).await?;
//! reaper.run(CancellationToken::new()).await
//! # }
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod exponential_backoff;
pub mod logging;
pub mod loop_state;
pub mod model;
pub mod polling_backoff_policy;
pub mod polling_error_policy;
pub mod reaper;
pub mod stub;

mod transport;

pub use client::Client;
pub use config::Config;
pub use error::Error;
pub use reaper::Reaper;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
