//! Short code generation
//!
//! Candidates are drawn uniformly from the 62 ASCII alphanumerics. Generators
//! never touch storage; uniqueness is the allocator's job.

use rand::{distr::Alphanumeric, Rng};

/// Default short code length (62^6, roughly 56.8 billion codes)
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Source of candidate short codes
pub trait CodeGenerator: Send + Sync {
    /// Produces a candidate of exactly `length` characters
    fn generate(&self, length: usize) -> String;
}

/// Production generator backed by the thread-local CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        generate_code(length)
    }
}

/// Generates a random alphanumeric code of `length` characters
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
