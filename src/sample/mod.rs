//! Sample handling — decoded audio buffers, pitch folding, and the shared cache.

pub mod cache;
pub mod data;
pub mod fold;

pub use cache::{DirSampleSource, NoSampleSource, SampleCache, SampleFetched, SampleSource};
pub use data::{SampleData, SampleError};
pub use fold::{fold, is_sampled, Folding};
