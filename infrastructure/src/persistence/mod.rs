pub mod in_memory_repository;
pub mod snapshot;

pub use in_memory_repository::InMemoryBusinessRepository;
