pub mod csv_loader;
pub mod mock;
pub mod observability;
pub mod random;
pub mod snapshot_source;

pub use mock::MockPriceProvider;
pub use random::{FixedRandomSource, SeededRandomSource, ThreadRngSource};
pub use snapshot_source::FileSnapshotSource;
