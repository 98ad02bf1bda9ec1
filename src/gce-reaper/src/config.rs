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

//! Configuration for the reaper.
//!
//! The [Config] is immutable once the reaper is created. The binary builds it
//! from the command-line [Args], each flag may also be set with an environment
//! variable.

use crate::Result;
use crate::error::Error;
use crate::exponential_backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use crate::polling_error_policy::{InProgressOnly, PollingErrorPolicy, PollingErrorPolicyExt};
use clap::Parser;
use humantime::parse_duration;
use std::sync::Arc;
use std::time::Duration;

/// The largest accepted poll interval and operation backoff.
pub const MAXIMUM_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

const DESCRIPTION: &str = concat!(
    "Periodically deletes the instances in a Compute Engine instance group",
    " that are stopping, stopped, suspending, suspended, or terminated."
);

/// Command-line arguments for the `gce-reaper` binary.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = DESCRIPTION)]
pub struct Args {
    /// The project that contains the instance group.
    #[arg(long, env = "GCE_REAPER_PROJECT")]
    pub project: String,

    /// The zone of the instance group.
    #[arg(long, env = "GCE_REAPER_ZONE")]
    pub zone: String,

    /// The name of the instance group.
    #[arg(long, env = "GCE_REAPER_INSTANCE_GROUP")]
    pub instance_group: String,

    /// The time between reaping cycles, for example `30s` or `5m`.
    ///
    /// Without this flag the reaper runs a single cycle and exits.
    #[arg(long, env = "GCE_REAPER_POLL_INTERVAL", value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// The initial backoff while waiting for a deletion to complete.
    #[arg(long, value_parser = parse_duration, default_value = "500ms")]
    pub operation_initial_delay: Duration,

    /// The maximum backoff while waiting for a deletion to complete.
    #[arg(long, value_parser = parse_duration, default_value = "60s")]
    pub operation_maximum_delay: Duration,

    /// The growth factor for the backoff between operation polls.
    #[arg(long, default_value_t = 1.5)]
    pub operation_scaling: f64,

    /// Randomize the backoff between operation polls.
    #[arg(long, default_value_t = false)]
    pub operation_jitter: bool,

    /// Stop waiting for a deletion after this many polls.
    #[arg(long)]
    pub operation_attempt_limit: Option<u32>,

    /// The log level: error, warn, info, debug, or trace.
    #[arg(long, env = "GCE_REAPER_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}

/// The instance group to reap, and how to reap it.
///
/// # Example
/// ```
/// # use gce_reaper::Config;
/// use std::time::Duration;
/// let config = Config::new("my-project", "us-central1-a", "my-group")
///     .with_poll_interval(Duration::from_secs(30));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub project: String,
    pub zone: String,
    pub instance_group: String,
    /// The time between the end of a cycle and the start of the next one. If
    /// `None` the reaper runs a single cycle.
    pub poll_interval: Option<Duration>,
    pub operation_initial_delay: Duration,
    pub operation_maximum_delay: Duration,
    pub operation_scaling: f64,
    pub operation_jitter: bool,
    /// Stop polling a deletion after this many attempts. Unbounded if `None`.
    pub operation_attempt_limit: Option<u32>,
}

impl Config {
    pub fn new<P, Z, G>(project: P, zone: Z, instance_group: G) -> Self
    where
        P: Into<String>,
        Z: Into<String>,
        G: Into<String>,
    {
        Self {
            project: project.into(),
            zone: zone.into(),
            instance_group: instance_group.into(),
            poll_interval: None,
            operation_initial_delay: Duration::from_millis(500),
            operation_maximum_delay: Duration::from_secs(60),
            operation_scaling: 1.5,
            operation_jitter: false,
            operation_attempt_limit: None,
        }
    }

    /// Runs a cycle every `v`, measured from the end of the previous cycle.
    pub fn with_poll_interval<V: Into<Duration>>(mut self, v: V) -> Self {
        self.poll_interval = Some(v.into());
        self
    }

    /// Limits the number of polls for each deletion.
    pub fn with_operation_attempt_limit(mut self, v: u32) -> Self {
        self.operation_attempt_limit = Some(v);
        self
    }

    /// Enables jitter in the backoff between polls.
    pub fn with_operation_jitter(mut self, v: bool) -> Self {
        self.operation_jitter = v;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.project.is_empty() {
            return Err(Error::Config("the project must be non-empty".into()));
        }
        if self.zone.is_empty() {
            return Err(Error::Config("the zone must be non-empty".into()));
        }
        if self.instance_group.is_empty() {
            return Err(Error::Config("the instance group must be non-empty".into()));
        }
        if self.poll_interval.is_some_and(|d| d.is_zero()) {
            return Err(Error::Config(
                "the poll interval must be greater than zero".into(),
            ));
        }
        if self.poll_interval.is_some_and(|d| d > MAXIMUM_DELAY) {
            return Err(Error::Config(format!(
                "the poll interval must be at most {}",
                humantime::format_duration(MAXIMUM_DELAY)
            )));
        }
        if self.operation_maximum_delay > MAXIMUM_DELAY {
            return Err(Error::Config(format!(
                "the operation maximum delay must be at most {}",
                humantime::format_duration(MAXIMUM_DELAY)
            )));
        }
        if self.operation_attempt_limit == Some(0) {
            return Err(Error::Config(
                "the operation attempt limit must be greater than zero".into(),
            ));
        }
        self.backoff_policy()?;
        Ok(())
    }

    pub(crate) fn backoff_policy(&self) -> Result<ExponentialBackoff> {
        ExponentialBackoffBuilder::new()
            .with_initial_delay(self.operation_initial_delay)
            .with_maximum_delay(self.operation_maximum_delay)
            .with_scaling(self.operation_scaling)
            .with_jitter(self.operation_jitter)
            .build()
            .map_err(|e| Error::Config(format!("invalid operation backoff: {e}")))
    }

    pub(crate) fn error_policy(&self) -> Arc<dyn PollingErrorPolicy> {
        match self.operation_attempt_limit {
            Some(limit) => Arc::new(InProgressOnly.with_attempt_limit(limit)),
            None => Arc::new(InProgressOnly),
        }
    }
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        let config = Self {
            project: args.project,
            zone: args.zone,
            instance_group: args.instance_group,
            poll_interval: args.poll_interval,
            operation_initial_delay: args.operation_initial_delay,
            operation_maximum_delay: args.operation_maximum_delay,
            operation_scaling: args.operation_scaling,
            operation_jitter: args.operation_jitter,
            operation_attempt_limit: args.operation_attempt_limit,
        };
        config.validate()?;
        Ok(config)
    }
}
