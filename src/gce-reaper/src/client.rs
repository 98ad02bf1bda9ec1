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

//! The cloud client used by the reaper.
//!
//! The client lists the instances in a group, deletes instances, and waits
//! for the deletion operations to complete.

use crate::Result;
use crate::clock::{Clock, TokioClock};
use crate::error::{Error, OperationErrors};
use crate::exponential_backoff::ExponentialBackoff;
use crate::loop_state::LoopState;
use crate::model::{InstanceReference, Operation};
use crate::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use crate::polling_error_policy::{
    InProgressOnly, PollingErrorPolicy, PollingErrorPolicyArg, PollingState,
};
use crate::stub::ComputeStub;
use std::sync::Arc;

/// Lists, deletes, and waits for the deletion of Compute Engine instances.
///
/// # Example
/// ```no_run
/// # use gce_reaper::Client;
/// # async fn sample() -> gce_reaper::Result<()> {
/// let client = Client::builder().build().await?;
/// for instance in client
///     .list_reapable_instances("my-project", "us-central1-a", "my-group")
///     .await?
/// {
///     client
///         .delete_instance("my-project", "us-central1-a", instance.name())
///         .await?;
/// }
/// # Ok(()) }
/// ```
///
/// `Client` holds its configuration behind `Arc`s, cloning it is cheap.
#[derive(Clone, Debug)]
pub struct Client {
    stub: Arc<dyn ComputeStub>,
    error_policy: Arc<dyn PollingErrorPolicy>,
    backoff_policy: Arc<dyn PollingBackoffPolicy>,
    clock: Arc<dyn Clock>,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Creates a client that sends all requests to `stub`, with the default
    /// polling policies.
    pub fn from_stub<T>(stub: T) -> Self
    where
        T: ComputeStub + 'static,
    {
        Self {
            stub: Arc::new(stub),
            error_policy: Arc::new(InProgressOnly),
            backoff_policy: Arc::new(ExponentialBackoff::default()),
            clock: Arc::new(TokioClock),
        }
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Lists the instances in `instance_group` that can be reaped.
    ///
    /// The instances are returned in the order listed by the service. Listing
    /// errors are not retried.
    pub async fn list_reapable_instances(
        &self,
        project: &str,
        zone: &str,
        instance_group: &str,
    ) -> Result<Vec<InstanceReference>> {
        let instances = self
            .stub
            .list_group_instances(project, zone, instance_group)
            .await?;
        Ok(instances
            .into_iter()
            .filter(|i| i.status.is_reapable())
            .collect())
    }

    /// Deletes `instance` and waits until the deletion completes.
    pub async fn delete_instance(&self, project: &str, zone: &str, instance: &str) -> Result<()> {
        let operation = self.stub.delete_instance(project, zone, instance).await?;
        self.wait_for_operation_completion(project, zone, operation)
            .await
    }

    /// Polls `operation` until it completes.
    ///
    /// Errors sending the poll request and errors reported by the operation
    /// are returned immediately. While the operation is in progress the
    /// client consults the polling error policy, and then sleeps for the
    /// period returned by the polling backoff policy.
    pub async fn wait_for_operation_completion(
        &self,
        project: &str,
        zone: &str,
        operation: Operation,
    ) -> Result<()> {
        let Some(name) = self::handle_start(operation)? else {
            return Ok(());
        };
        let start = self.clock.now();
        let mut state = PollingState::default();
        loop {
            state.attempt_count += 1;
            let result = self
                .stub
                .get_zone_operation(project, zone, &name)
                .await
                .and_then(self::handle_poll);
            let error = match result {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            state.elapsed = self.clock.now().duration_since(start);
            match self.error_policy.on_error(&state, error) {
                LoopState::Continue(_) => (),
                LoopState::Permanent(e) | LoopState::Exhausted(e) => return Err(e),
            }
            self.clock
                .sleep(self.backoff_policy.wait_period(&state))
                .await;
        }
    }
}

// Returns the name to poll, or `None` if the operation is already complete.
fn handle_start(operation: Operation) -> Result<Option<String>> {
    if !operation.errors.is_empty() {
        return Err(OperationErrors::new(operation.name, operation.errors).into());
    }
    if operation.done() {
        return Ok(None);
    }
    if operation.name.is_empty() {
        return Err(Error::provider(
            "delete instance",
            "the service returned an operation without a name",
        ));
    }
    Ok(Some(operation.name))
}

fn handle_poll(operation: Operation) -> Result<()> {
    tracing::debug!(
        operation = %operation.name,
        status = %operation.status,
        "operation status"
    );
    if !operation.errors.is_empty() {
        return Err(OperationErrors::new(operation.name, operation.errors).into());
    }
    if operation.done() {
        return Ok(());
    }
    Err(Error::InProgress {
        operation: operation.name,
        status: operation.status,
    })
}

/// Configures and creates a [Client].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    stub: Option<Arc<dyn ComputeStub>>,
    error_policy: Option<PollingErrorPolicyArg>,
    backoff_policy: Option<PollingBackoffPolicyArg>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    /// Sends all requests to `stub` instead of Compute Engine.
    pub fn with_stub<T>(mut self, stub: T) -> Self
    where
        T: ComputeStub + 'static,
    {
        self.stub = Some(Arc::new(stub));
        self
    }

    /// Sets the polling error policy.
    ///
    /// The default policy polls until the operation completes, without any
    /// limits.
    pub fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.error_policy = Some(v.into());
        self
    }

    /// Sets the polling backoff policy.
    ///
    /// The default is [ExponentialBackoff] starting at 500ms, growing by a
    /// factor of 1.5 up to 60s.
    pub fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = Some(v.into());
        self
    }

    /// Sets the clock used in the polling loop.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Creates the client.
    ///
    /// Without a stub, this creates the Compute Engine clients using
    /// Application Default Credentials, which may fail.
    pub async fn build(self) -> Result<Client> {
        let stub: Arc<dyn ComputeStub> = match self.stub {
            Some(s) => s,
            None => Arc::new(crate::transport::Compute::new().await?),
        };
        Ok(Client {
            stub,
            error_policy: self
                .error_policy
                .map(|p| p.0)
                .unwrap_or_else(|| Arc::new(InProgressOnly)),
            backoff_policy: self
                .backoff_policy
                .map(|p| p.0)
                .unwrap_or_else(|| Arc::new(ExponentialBackoff::default())),
            clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
        })
    }
}
