// Module declarations
pub mod persistence;
pub mod search;

// Re-export the store implementation
pub use persistence::InMemoryBusinessRepository;
