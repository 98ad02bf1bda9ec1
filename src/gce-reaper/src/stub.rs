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

//! Traits to mock the Compute Engine API.
//!
//! The [Client][crate::Client] sends all requests through an implementation of
//! [ComputeStub]. The default implementation uses the Compute Engine client
//! library. Applications and tests can provide their own implementation, for
//! example, to simulate a group with instances in different states.

use crate::Result;
use crate::model::{InstanceReference, Operation};

/// Defines the three Compute Engine RPCs used by the reaper.
///
/// All requests are scoped by project and zone.
#[async_trait::async_trait]
pub trait ComputeStub: std::fmt::Debug + Send + Sync {
    /// Lists all the instances in an instance group, regardless of status.
    ///
    /// Implementations must follow any pagination and return the instances
    /// in the order returned by the service.
    async fn list_group_instances(
        &self,
        project: &str,
        zone: &str,
        instance_group: &str,
    ) -> Result<Vec<InstanceReference>>;

    /// Starts deleting an instance, returning the long-running operation.
    async fn delete_instance(&self, project: &str, zone: &str, instance: &str)
    -> Result<Operation>;

    /// Gets the current state of a zonal operation.
    async fn get_zone_operation(
        &self,
        project: &str,
        zone: &str,
        operation: &str,
    ) -> Result<Operation>;
}
