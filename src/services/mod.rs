// Raw payload handling
pub mod envelope;
pub mod field_resolver;

// Canonicalization
pub mod lot_resolver;
pub mod movement_normalizer;

// Derived views
pub mod aggregator;
pub mod center_directory;
pub mod ledger;
pub mod traceability;

pub use aggregator::{aggregate, Aggregator};
pub use center_directory::CenterDirectory;
pub use envelope::{unwrap_envelope, Envelope};
pub use field_resolver::{resolve, AliasTable, FieldPath};
pub use ledger::{LedgerPage, LedgerService};
pub use lot_resolver::resolve_lots;
pub use movement_normalizer::{normalize, normalize_all};
pub use traceability::{group_by_vin, TraceabilityService};
