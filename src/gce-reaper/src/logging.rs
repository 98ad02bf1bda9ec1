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

//! Log configuration for the `gce-reaper` binary.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::{DefaultFields, Format};

/// The subscriber type installed by [enable_tracing].
pub type Subscriber =
    tracing_subscriber::fmt::Subscriber<DefaultFields, Format, LevelFilter, fn() -> std::io::Stderr>;

/// Creates a subscriber that writes one line per event to stderr.
pub fn subscriber(max_level: tracing::Level) -> Subscriber {
    tracing_subscriber::fmt()
        .with_level(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr as fn() -> std::io::Stderr)
        .with_max_level(max_level)
        .finish()
}

/// Enables logging for the application.
///
/// Fails if a global subscriber is already installed.
pub fn enable_tracing(
    max_level: tracing::Level,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber(max_level))
}
