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

//! The time source for the reaper loop and the operation polling loop.
//!
//! Both loops only need the current time and a way to sleep until some
//! deadline. Tests replace the [TokioClock] with a fake that records the
//! requested deadlines and returns immediately.

use std::time::Duration;
use tokio::time::Instant;

/// Provides the current time and sleeps.
///
/// The futures returned by `sleep_until()` must be cancel-safe, the reaper
/// drops them when it is cancelled.
#[async_trait::async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current time.
    fn now(&self) -> Instant;

    /// Completes once `deadline` is reached.
    async fn sleep_until(&self, deadline: Instant);

    /// Completes after `duration` elapses.
    ///
    /// Never completes if the deadline cannot be represented.
    async fn sleep(&self, duration: Duration) {
        match self.now().checked_add(duration) {
            Some(deadline) => self.sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// A [Clock] based on the Tokio timer.
///
/// With a paused Tokio runtime (`#[tokio::test(start_paused = true)]`) time
/// advances automatically when all the tasks are idle.
#[derive(Clone, Debug, Default)]
pub struct TokioClock;

#[async_trait::async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only implements the required methods, to test `Clock::sleep()`.
    #[derive(Debug)]
    struct FrozenClock(Instant);

    #[async_trait::async_trait]
    impl Clock for FrozenClock {
        fn now(&self) -> Instant {
            self.0
        }

        async fn sleep_until(&self, _deadline: Instant) {}
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep(Duration::from_secs(30)).await;
        assert!(clock.now() >= start + Duration::from_secs(30));

        let deadline = clock.now() + Duration::from_secs(5);
        clock.sleep_until(deadline).await;
        assert!(clock.now() >= deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_past_deadline() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep_until(start).await;
        assert!(clock.now() - start < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_sleep_saturates() {
        let clock = TokioClock;
        let got =
            tokio::time::timeout(Duration::from_secs(3600), clock.sleep(Duration::MAX)).await;
        assert!(got.is_err(), "{got:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn default_sleep() {
        let clock = FrozenClock(Instant::now());
        let got = tokio::time::timeout(
            Duration::from_secs(1),
            clock.sleep(Duration::from_secs(30)),
        )
        .await;
        assert!(got.is_ok(), "{got:?}");

        let got = tokio::time::timeout(Duration::from_secs(1), clock.sleep(Duration::MAX)).await;
        assert!(got.is_err(), "{got:?}");
    }
}
