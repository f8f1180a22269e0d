pub mod backup;
pub mod collections;
pub mod core;
pub mod notifications;
pub mod progress;
pub mod services;
