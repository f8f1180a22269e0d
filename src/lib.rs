//! Local data sidecar for the disaster-preparedness learning app.
//!
//! The UI drives it over newline-delimited JSON (see [`ipc`]). Underneath, every
//! collection is a [`store::PersistentStore`] over a [`storage::KeyValueStorage`],
//! grouped in [`collections::Collections`]; [`progress`] and [`notifications`]
//! derive their views from those stores.

pub mod backup;
pub mod collections;
pub mod config;
pub mod db;
pub mod ipc;
pub mod logging;
pub mod model;
pub mod notifications;
pub mod progress;
pub mod seed;
pub mod services;
pub mod storage;
pub mod store;
