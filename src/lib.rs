//! Jetton Console - a terminal console for TON jettons.
//!
//! This library provides:
//! - Decimal amount conversion at a token's on-chain precision
//! - Declarative forms with live and submit-time validation
//! - Guarded burn, mint and transfer flows with user notifications
//! - Chain adapters for a wallet bridge and an in-memory dev ledger
//! - Local storage for the last session

pub mod config;
pub mod domain;
pub mod infra;
