//! Inventory Service - Append-only stock ledger with per-product rollup.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
