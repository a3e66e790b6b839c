//! Session storage backends.

mod memory;

pub use memory::InMemorySessionStore;
