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

//! The error type for the reaper.
//!
//! The reaper distinguishes between errors reported by the Compute Engine API
//! while sending a request, errors reported by a long-running operation, and
//! operations that have not completed yet. Only the last kind is transient,
//! the operation polling loop retries them until the operation completes.

use crate::model::{OperationErrorEntry, OperationStatus};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The errors returned by this crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The Compute Engine API rejected or failed to service a request.
    #[error("the request to {action} failed: {source}")]
    Provider {
        action: &'static str,
        #[source]
        source: BoxError,
    },

    /// The service completed the operation, and reported it failed.
    #[error(transparent)]
    OperationFailed(#[from] OperationErrors),

    /// The operation has not completed.
    #[error("operation {operation} is in progress, status={status}")]
    InProgress {
        operation: String,
        status: OperationStatus,
    },

    /// Deleting an instance failed.
    #[error("cannot delete instance {link}: {source}")]
    DeleteInstance {
        link: String,
        #[source]
        source: Box<Error>,
    },

    /// The reaper loop was cancelled.
    #[error("the reaper was cancelled")]
    Cancelled,

    /// The Compute Engine clients could not be created.
    #[error("cannot create the Compute Engine client: {0}")]
    Build(#[source] BoxError),

    /// The configuration is not valid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates an error for a failed request to the Compute Engine API.
    pub fn provider<E>(action: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Provider {
            action,
            source: source.into(),
        }
    }

    /// Creates an error when the client cannot be initialized.
    pub fn build<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Build(source.into())
    }

    /// Returns true if retrying the operation may succeed.
    ///
    /// Only operations that are still in progress are transient. Errors
    /// sending the request and errors reported by the operation are permanent.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }

    /// Returns true if the error represents a cancelled reaper.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The errors reported by the operation, if any.
    pub fn operation_errors(&self) -> Option<&[OperationErrorEntry]> {
        match self {
            Self::OperationFailed(e) => Some(e.errors()),
            Self::DeleteInstance { source, .. } => source.operation_errors(),
            _ => None,
        }
    }
}

/// All the errors reported by a failed long-running operation.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationErrors {
    operation: String,
    errors: Vec<OperationErrorEntry>,
}

impl OperationErrors {
    pub fn new<N, T>(operation: N, errors: T) -> Self
    where
        N: Into<String>,
        T: IntoIterator<Item = OperationErrorEntry>,
    {
        Self {
            operation: operation.into(),
            errors: errors.into_iter().collect(),
        }
    }

    /// The name of the failed operation.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The errors, in the order reported by the service.
    pub fn errors(&self) -> &[OperationErrorEntry] {
        &self.errors
    }
}

impl std::fmt::Display for OperationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation {} failed with", self.operation)?;
        let mut sep = " ";
        for e in &self.errors {
            write!(f, "{sep}GCE Error {}: {}", e.code, e.message)?;
            sep = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for OperationErrors {}
