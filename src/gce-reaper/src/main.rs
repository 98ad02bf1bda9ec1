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

//! Deletes stopped and terminated instances from a Compute Engine instance
//! group.

use anyhow::Result;
use clap::Parser;
use gce_reaper::config::Args;
use gce_reaper::logging::enable_tracing;
use gce_reaper::{Config, Reaper};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    enable_tracing(args.log_level)?;
    let config = Config::try_from(args)?;
    tracing::info!("Configuration: {config:?}");

    let reaper = Reaper::new(config).await?;
    let cancel = CancellationToken::new();
    tokio::spawn(shutdown(cancel.clone()));

    match reaper.run(cancel).await {
        Err(e) if e.is_cancelled() => {
            tracing::info!("shutting down");
            Ok(())
        }
        r => Ok(r?),
    }
}

// Cancels the reaper on Ctrl-C or SIGTERM.
async fn shutdown(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot install SIGTERM handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        r = tokio::signal::ctrl_c() => {
            if let Err(e) = r {
                tracing::warn!("cannot wait for Ctrl-C: {e}");
                return;
            }
        }
        _ = terminate => {}
    }
    cancel.cancel();
}
