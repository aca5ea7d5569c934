pub mod chunker;
pub mod coordinator;
pub mod loaders;
pub mod normalize;
pub mod summary;

pub use coordinator::{IngestionBatch, IngestionCoordinator};
pub use loaders::StagedUpload;
pub use summary::{IngestionSummary, KindSummary};
