//! Shared configuration, events and diagnostics

mod config;
mod debug;
mod events;

pub use config::{CacheConfig, ContextConfig, PoolConfig};
pub use debug::{CacheReport, ResidentInfo};
pub use events::{EventQueue, ResourceEvent};
