pub mod collections;

pub use collections::CollectionService;
