// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod api;
pub mod app;
pub mod server;
pub mod telemetry;
pub mod writer;
pub mod tailer;
pub mod ping;
pub mod aggregator;
pub mod network;
