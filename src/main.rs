// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Insights aggregation service for Facebook ad accounts.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    adsight::dispatch::dispatch().await
}
