//! Gym management backend: seed-record import with idempotent
//! reconciliation, per-entity create services, aggregate dashboard reports,
//! and a minimal credential store, on SQLite.

pub mod db;
pub mod domain;
pub mod error;
pub mod import;
pub mod rest;
pub mod storage;
