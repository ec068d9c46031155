pub mod batch;
pub mod importer;
pub mod records;
pub mod source;
pub mod thumbnail;

pub use batch::{BatchRunner, BatchSummary};
pub use importer::{AbortReason, ImportPhase, PackImporter, PackOutcome, PackReport};
pub use thumbnail::{ScratchFile, ThumbnailDeriver};
