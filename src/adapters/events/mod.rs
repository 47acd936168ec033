//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous in-process bus; production wiring
//!   for the single-binary deployment and the deterministic test bus
//! - `IdempotentHandler` - Wrapper that skips already processed events

mod idempotent_handler;
mod in_memory;

pub use idempotent_handler::IdempotentHandler;
pub use in_memory::InMemoryEventBus;
