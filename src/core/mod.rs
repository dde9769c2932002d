//! Core library components.
//!
//! This module contains the secret store engine, its storage and
//! encryption backends, and configuration handling.

pub mod cancel;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod identity;
pub mod pool;
pub mod progress;
pub mod storage;
pub mod store;
