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

//! The instances and operations exchanged with the Compute Engine API.
//!
//! These types only carry the fields the reaper needs. The transport converts
//! the `google-cloud-compute-v1` messages into them.

/// The status of a Compute Engine instance.
///
/// The service may introduce new values, these are preserved in
/// [Unknown][InstanceStatus::Unknown].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Stopped,
    Suspending,
    Suspended,
    Terminated,
    Repairing,
    Unknown(String),
}

impl InstanceStatus {
    /// Returns true if an instance in this status should be deleted.
    pub fn is_reapable(&self) -> bool {
        matches!(
            self,
            Self::Stopping | Self::Stopped | Self::Suspending | Self::Suspended | Self::Terminated
        )
    }

    /// The name used by the service for this status.
    pub fn name(&self) -> &str {
        match self {
            Self::Provisioning => "PROVISIONING",
            Self::Staging => "STAGING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Suspending => "SUSPENDING",
            Self::Suspended => "SUSPENDED",
            Self::Terminated => "TERMINATED",
            Self::Repairing => "REPAIRING",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(value: &str) -> Self {
        match value {
            "PROVISIONING" => Self::Provisioning,
            "STAGING" => Self::Staging,
            "RUNNING" => Self::Running,
            "STOPPING" => Self::Stopping,
            "STOPPED" => Self::Stopped,
            "SUSPENDING" => Self::Suspending,
            "SUSPENDED" => Self::Suspended,
            "TERMINATED" => Self::Terminated,
            "REPAIRING" => Self::Repairing,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An instance that is a member of an instance group.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceReference {
    /// The resource URL for the instance, for example
    /// `https://www.googleapis.com/compute/v1/projects/p/zones/z/instances/vm-1`.
    pub link: String,

    /// The status of the instance when it was listed.
    pub status: InstanceStatus,
}

impl InstanceReference {
    pub fn new<L: Into<String>>(link: L, status: InstanceStatus) -> Self {
        Self {
            link: link.into(),
            status,
        }
    }

    /// Returns the instance name, that is, the last segment of the link.
    ///
    /// # Example
    /// ```
    /// # use gce_reaper::model::{InstanceReference, InstanceStatus};
    /// let instance = InstanceReference::new(
    ///     "projects/p/zones/us-central1-a/instances/my-vm-1",
    ///     InstanceStatus::Stopped,
    /// );
    /// assert_eq!(instance.name(), "my-vm-1");
    /// ```
    pub fn name(&self) -> &str {
        self.link.rsplit('/').next().unwrap_or(self.link.as_str())
    }
}

/// The status of a Compute Engine long-running operation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
    Unknown(String),
}

impl OperationStatus {
    /// The name used by the service for this status.
    pub fn name(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Done => "DONE",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl From<&str> for OperationStatus {
    fn from(value: &str) -> Self {
        match value {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "DONE" => Self::Done,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the errors reported by a failed operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationErrorEntry {
    /// The error type identifier, for example `RESOURCE_IN_USE`.
    pub code: String,
    /// A human readable description of the error.
    pub message: String,
}

impl OperationErrorEntry {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A Compute Engine long-running operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    /// The operation name, used to poll the operation status.
    pub name: String,
    pub status: OperationStatus,
    /// The errors reported by the service, empty if the operation has not
    /// failed.
    pub errors: Vec<OperationErrorEntry>,
}

impl Operation {
    pub fn new<N: Into<String>>(name: N, status: OperationStatus) -> Self {
        Self {
            name: name.into(),
            status,
            errors: Vec::new(),
        }
    }

    pub fn set_errors<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<OperationErrorEntry>,
    {
        self.errors = v.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Returns true if the operation completed, with or without errors.
    pub fn done(&self) -> bool {
        self.status == OperationStatus::Done
    }
}

/// The outcome of a successful reaping cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleReport {
    /// The links of the deleted instances, in deletion order.
    pub deleted: Vec<String>,
}
