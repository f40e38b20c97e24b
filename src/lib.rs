//! Cronhook - HTTP job orchestration
//!
//! Operators register HTTP-triggered jobs, either recurring (cron-driven)
//! or one-shot delayed. Each job boils down to invoking a configured URL
//! with a method, headers and payload, optionally injecting a bearer token
//! obtained from an external identity provider.

#![allow(missing_docs)]

pub mod api;
pub mod app;
pub mod app_info;
pub mod auth;
pub mod boot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod invoker;
pub mod jobs;
pub mod router;
pub mod scheduler;
pub mod setup_tracing;
