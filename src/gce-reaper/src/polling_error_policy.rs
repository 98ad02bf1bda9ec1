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

//! Defines the types for polling error policies.
//!
//! The client waits for the long-running operation created by each deletion.
//! It needs to (1) distinguish between transient and permanent errors, and (2)
//! optionally limit the polling loop duration.
//!
//! # Example
//! ```
//! # use gce_reaper::polling_error_policy::*;
//! use std::time::Duration;
//! // Poll for at most 15 minutes or at most 50 attempts: whichever limit is
//! // reached first stops the polling loop.
//! let policy = InProgressOnly
//!     .with_time_limit(Duration::from_secs(15 * 60))
//!     .with_attempt_limit(50);
//! ```

use crate::error::Error;
use crate::loop_state::LoopState;
use std::sync::Arc;
use std::time::Duration;

/// The state of a polling loop, as seen by the loop control policies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollingState {
    /// The number of poll queries, including the one that just completed.
    pub attempt_count: u32,
    /// The time since the polling loop started.
    pub elapsed: Duration,
}

impl PollingState {
    pub fn new(attempt_count: u32, elapsed: Duration) -> Self {
        Self {
            attempt_count,
            elapsed,
        }
    }
}

/// Determines how errors are handled in the polling loop.
///
/// Implementations of this trait determine if polling errors may resolve in
/// future attempts, and for how long the polling loop may continue.
pub trait PollingErrorPolicy: Send + Sync + std::fmt::Debug {
    /// Query the polling policy after an error.
    ///
    /// # Parameters
    /// * `state` - the attempt count and elapsed time. This method is called
    ///   after a poll query, the attempt count is always non-zero.
    /// * `error` - the result of the last poll query.
    fn on_error(&self, state: &PollingState, error: Error) -> LoopState;
}

/// A helper type to use [PollingErrorPolicy] in the client builder.
#[derive(Clone, Debug)]
pub struct PollingErrorPolicyArg(pub(crate) Arc<dyn PollingErrorPolicy>);

impl<T> From<T> for PollingErrorPolicyArg
where
    T: PollingErrorPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl From<Arc<dyn PollingErrorPolicy>> for PollingErrorPolicyArg {
    fn from(value: Arc<dyn PollingErrorPolicy>) -> Self {
        Self(value)
    }
}

/// Extension trait for [PollingErrorPolicy]
pub trait PollingErrorPolicyExt: PollingErrorPolicy + Sized {
    /// Decorate a [PollingErrorPolicy] to limit the total elapsed time in the
    /// polling loop.
    ///
    /// # Example
    /// ```
    /// # use gce_reaper::polling_error_policy::*;
    /// # use gce_reaper::{Error, model::OperationStatus};
    /// use std::time::Duration;
    /// let policy = InProgressOnly.with_time_limit(Duration::from_secs(10));
    /// let state = PollingState::new(1, Duration::from_secs(20));
    /// assert!(policy.on_error(&state, in_progress()).is_exhausted());
    ///
    /// fn in_progress() -> Error {
    ///     Error::InProgress { operation: "op".into(), status: OperationStatus::Running }
    /// }
    /// ```
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Decorate a [PollingErrorPolicy] to limit the number of poll attempts.
    ///
    /// The policy passes through the results from the inner policy as long as
    /// `attempt_count < maximum_attempts`. Once the maximum number of attempts
    /// is reached, the policy returns [Exhausted][LoopState::Exhausted] if the
    /// inner policy returns [Continue][LoopState::Continue].
    ///
    /// # Example
    /// ```
    /// # use gce_reaper::polling_error_policy::*;
    /// # use gce_reaper::{Error, model::OperationStatus};
    /// use std::time::Duration;
    /// let policy = InProgressOnly.with_attempt_limit(3);
    /// let state = |n| PollingState::new(n, Duration::ZERO);
    /// assert!(policy.on_error(&state(2), in_progress()).is_continue());
    /// assert!(policy.on_error(&state(3), in_progress()).is_exhausted());
    ///
    /// fn in_progress() -> Error {
    ///     Error::InProgress { operation: "op".into(), status: OperationStatus::Running }
    /// }
    /// ```
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: PollingErrorPolicy> PollingErrorPolicyExt for T {}

/// Continues polling while the operation is in progress, stops on any other
/// error.
///
/// Errors sending the poll request, and errors reported by the operation, are
/// permanent. This policy never stops the loop on its own, decorate it to
/// limit the number of attempts or the duration of the polling loop.
#[derive(Clone, Debug, Default)]
pub struct InProgressOnly;

impl PollingErrorPolicy for InProgressOnly {
    fn on_error(&self, _state: &PollingState, error: Error) -> LoopState {
        if error.is_transient() {
            LoopState::Continue(error)
        } else {
            LoopState::Permanent(error)
        }
    }
}

/// A polling policy decorator that limits the total time in the polling loop.
///
/// While the time spent in the polling loop (including time in backoff) is
/// less than the prescribed duration the `on_error()` method returns the
/// results of the inner policy. After that time it returns
/// [Exhausted][LoopState::Exhausted] if the inner policy returns
/// [Continue][LoopState::Continue].
#[derive(Debug)]
pub struct LimitedElapsedTime<P = InProgressOnly>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    pub fn new(maximum_duration: Duration) -> Self {
        Self::custom(InProgressOnly, maximum_duration)
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }
}

impl<P> PollingErrorPolicy for LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, state: &PollingState, error: Error) -> LoopState {
        match self.inner.on_error(state, error) {
            LoopState::Continue(e) if state.elapsed >= self.maximum_duration => {
                LoopState::Exhausted(e)
            }
            s => s,
        }
    }
}

/// A polling policy decorator that limits the number of attempts.
///
/// The policy passes through the results from the inner policy as long as
/// `attempt_count < maximum_attempts`. However, once the maximum number of
/// attempts is reached, the policy replaces any [Continue][LoopState::Continue]
/// result with [Exhausted][LoopState::Exhausted].
#[derive(Debug)]
pub struct LimitedAttemptCount<P = InProgressOnly>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    pub fn new(maximum_attempts: u32) -> Self {
        Self::custom(InProgressOnly, maximum_attempts)
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> PollingErrorPolicy for LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, state: &PollingState, error: Error) -> LoopState {
        match self.inner.on_error(state, error) {
            LoopState::Continue(e) if state.attempt_count >= self.maximum_attempts => {
                LoopState::Exhausted(e)
            }
            s => s,
        }
    }
}
