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

//! Implements [ComputeStub] using the Compute Engine client library.

use crate::Result;
use crate::error::Error;
use crate::model::{
    InstanceReference, InstanceStatus, Operation, OperationErrorEntry, OperationStatus,
};
use crate::stub::ComputeStub;
use compute::client::{InstanceGroups, Instances, ZoneOperations};
use compute::model::{InstanceGroupsListInstancesRequest, InstanceWithNamedPorts};
use gax::paginator::ItemPaginator as _;

/// The production stub, sends requests to Compute Engine.
///
/// The clients use Application Default Credentials.
#[derive(Clone, Debug)]
pub(crate) struct Compute {
    instance_groups: InstanceGroups,
    instances: Instances,
    operations: ZoneOperations,
}

impl Compute {
    pub async fn new() -> Result<Self> {
        let instance_groups = InstanceGroups::builder()
            .with_tracing()
            .build()
            .await
            .map_err(Error::build)?;
        let instances = Instances::builder()
            .with_tracing()
            .build()
            .await
            .map_err(Error::build)?;
        let operations = ZoneOperations::builder()
            .with_tracing()
            .build()
            .await
            .map_err(Error::build)?;
        Ok(Self {
            instance_groups,
            instances,
            operations,
        })
    }
}

#[async_trait::async_trait]
impl ComputeStub for Compute {
    async fn list_group_instances(
        &self,
        project: &str,
        zone: &str,
        instance_group: &str,
    ) -> Result<Vec<InstanceReference>> {
        let mut items = self
            .instance_groups
            .list_instances()
            .set_project(project)
            .set_zone(zone)
            .set_instance_group(instance_group)
            .set_body(InstanceGroupsListInstancesRequest::new())
            .by_item();
        let mut instances = Vec::new();
        while let Some(item) = items.next().await {
            let item = item.map_err(|e| Error::provider("list instances", e))?;
            instances.extend(to_instance_reference(item));
        }
        Ok(instances)
    }

    async fn delete_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation> {
        let operation = self
            .instances
            .delete()
            .set_project(project)
            .set_zone(zone)
            .set_instance(instance)
            .send()
            .await
            .map_err(|e| Error::provider("delete instance", e))?;
        Ok(to_operation(operation))
    }

    async fn get_zone_operation(
        &self,
        project: &str,
        zone: &str,
        operation: &str,
    ) -> Result<Operation> {
        let operation = self
            .operations
            .get()
            .set_project(project)
            .set_zone(zone)
            .set_operation(operation)
            .send()
            .await
            .map_err(|e| Error::provider("get operation", e))?;
        Ok(to_operation(operation))
    }
}

// Members without a link cannot be deleted, they are skipped.
fn to_instance_reference(item: InstanceWithNamedPorts) -> Option<InstanceReference> {
    let link = item.instance?;
    let status = item
        .status
        .as_ref()
        .and_then(|s| s.name())
        .map(InstanceStatus::from)
        .unwrap_or_else(|| InstanceStatus::Unknown(String::new()));
    Some(InstanceReference::new(link, status))
}

fn to_operation(operation: compute::model::Operation) -> Operation {
    let status = operation
        .status
        .as_ref()
        .and_then(|s| s.name())
        .map(OperationStatus::from)
        .unwrap_or_else(|| OperationStatus::Unknown(String::new()));
    let mut errors: Vec<OperationErrorEntry> = operation
        .error
        .iter()
        .flat_map(|e| e.errors.iter())
        .map(|e| {
            OperationErrorEntry::new(
                e.code.clone().unwrap_or_default(),
                e.message.clone().unwrap_or_default(),
            )
        })
        .collect();
    // Some operations fail with an HTTP error and no detailed errors.
    if errors.is_empty()
        && (operation.http_error_status_code.is_some() || operation.http_error_message.is_some())
    {
        errors.push(OperationErrorEntry::new(
            operation
                .http_error_status_code
                .map(|c| c.to_string())
                .unwrap_or_default(),
            operation.http_error_message.clone().unwrap_or_default(),
        ));
    }
    Operation::new(operation.name.unwrap_or_default(), status).set_errors(errors)
}
