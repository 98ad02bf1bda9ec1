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

//! The reaper loop.
//!
//! The first cycle starts immediately. If the configuration has a poll
//! interval the next cycle starts that long after the previous cycle ends,
//! otherwise the loop stops after one cycle. Failures abort the current cycle
//! and are logged, only cancellation stops the loop.

use crate::Result;
use crate::client::Client;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Error;
use crate::model::CycleReport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Periodically deletes the reapable instances in one instance group.
#[derive(Debug)]
pub struct Reaper {
    config: Config,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl Reaper {
    /// Creates a reaper using the Compute Engine API.
    ///
    /// Fails if the configuration is invalid or the Compute Engine clients
    /// cannot be created, for example, when no credentials are available.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .with_polling_error_policy(config.error_policy())
            .with_polling_backoff_policy(config.backoff_policy()?)
            .build()
            .await?;
        Self::with_client(config, client)
    }

    /// Creates a reaper using a prebuilt client.
    ///
    /// The reaper schedules its cycles with the client's clock. Fails if the
    /// configuration is invalid.
    pub fn with_client(config: Config, client: Client) -> Result<Self> {
        config.validate()?;
        let clock = client.clock();
        Ok(Self {
            config,
            client,
            clock,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the reaper until it completes or `cancel` is triggered.
    ///
    /// Returns `Ok(())` after the first cycle if the configuration has no
    /// poll interval, regardless of the cycle outcome. Otherwise it runs until
    /// cancelled and returns [Error::Cancelled].
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let span = tracing::info_span!(
            "reaper",
            project = %self.config.project,
            zone = %self.config.zone,
            instance_group = %self.config.instance_group,
        );
        self.run_loop(cancel).instrument(span).await
    }

    async fn run_loop(&self, cancel: CancellationToken) -> Result<()> {
        let mut next = self.clock.now();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = self.clock.sleep_until(next) => {},
            }
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                r = self.reap() => r,
            };
            match result {
                Ok(report) => tracing::debug!(deleted = report.deleted.len(), "cycle complete"),
                Err(e) => self::log_failure(&e),
            }
            let Some(interval) = self.config.poll_interval else {
                return Ok(());
            };
            // No more cycles if the deadline cannot be represented.
            let Some(deadline) = self.clock.now().checked_add(interval) else {
                cancel.cancelled().await;
                return Err(Error::Cancelled);
            };
            next = deadline;
        }
    }

    /// Runs a single reaping cycle.
    ///
    /// Deletes the reapable instances one at a time, in the order returned by
    /// the service. The cycle stops at the first failure, the remaining
    /// instances are left for the next cycle.
    pub async fn reap(&self) -> Result<CycleReport> {
        let Config {
            project,
            zone,
            instance_group,
            ..
        } = &self.config;
        let instances = self
            .client
            .list_reapable_instances(project, zone, instance_group)
            .await?;
        let mut report = CycleReport::default();
        for instance in instances {
            let result = self
                .client
                .delete_instance(project, zone, instance.name())
                .await;
            if let Err(e) = result {
                return Err(Error::DeleteInstance {
                    link: instance.link,
                    source: Box::new(e),
                });
            }
            tracing::info!(link = %instance.link, "deleted instance");
            report.deleted.push(instance.link);
        }
        Ok(report)
    }
}

fn log_failure(error: &Error) {
    match error {
        Error::DeleteInstance { link, source } => {
            tracing::error!(%link, error = %source, "error deleting instance")
        }
        e => tracing::error!(error = %e, "reaping failed"),
    }
}
