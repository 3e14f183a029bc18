//! Infrastructure adapters for seeding the work queue.

pub mod seed;

pub use seed::{JsonFileSeed, SeedSource, StaticSeed};
