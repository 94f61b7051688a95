//! Scripts for deploying and upgrading proxied contracts, recording the
//! deployed addresses in per-branch ledgers.

#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gas;
pub mod ledger;
mod solidity;
pub mod types;
pub mod utils;
