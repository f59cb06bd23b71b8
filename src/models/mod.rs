// Canonical read-side projections
pub mod lot;
pub mod movement;
pub mod page;
pub mod summary;
pub mod trace;

pub use lot::Lot;
pub use movement::{Direction, Movement, QuantitySource, Reason};
pub use page::{PageMeta, UnwrappedPage};
pub use summary::{CenterTally, Summary, UNKNOWN_CENTER_LABEL};
pub use trace::{MovementProjection, PartTraceRecord, VinTraceReport};
