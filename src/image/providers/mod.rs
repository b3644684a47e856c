//! Image generation providers.

mod replicate;

pub use replicate::{ReplicateModel, ReplicateProvider, ReplicateProviderBuilder};
