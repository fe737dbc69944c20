//! Repository traits for the impact engine's persistence port.
//!
//! Reads go through [`MissionRepository`]; writes of analysis history go
//! through [`PredictionRepository`]. [`FullRepository`] is the combined
//! trait object handed to services.
//!
//! # Thread Safety
//! All implementations must be `Send + Sync`: camp analyses run on separate
//! tokio tasks and share one repository handle.

pub mod error;
pub mod mission;
pub mod prediction;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use mission::MissionRepository;
pub use prediction::PredictionRepository;

/// Everything the impact analysis service needs from storage.
pub trait FullRepository: MissionRepository + PredictionRepository {}

impl<T> FullRepository for T where T: MissionRepository + PredictionRepository {}
