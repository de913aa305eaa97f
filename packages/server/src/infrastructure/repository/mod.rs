//! Room directory implementations.

pub mod inmemory;

pub use inmemory::InMemoryRoomDirectory;
