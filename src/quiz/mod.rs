//! Question generation: pool building and multiple-choice construction.

pub mod generator;
pub mod pool;

pub use generator::{choose_direction, generate_questions, prepare_questions};
pub use pool::{dedup_pool, pool_from_collections};
