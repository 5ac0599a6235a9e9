// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily insights aggregation for Facebook ad accounts.

pub mod aggregate;
pub mod charts;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod facebook;
pub mod report;
pub mod server;
pub mod window;
