#![forbid(unsafe_code)]

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod index;
pub mod journey;
pub mod logging;
pub mod navigate;
pub mod position;
pub mod resolve;
pub mod transform;
