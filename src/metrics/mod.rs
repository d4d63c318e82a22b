//! Metrics core
//!
//! Typed instruments, the registry that owns them, point-in-time snapshots
//! and the text exposition encoder.
//!
//! ```text
//! Registry
//!   ├── register_counter / register_gauge / register_histogram
//!   ├── snapshot() → RegistrySnapshot
//!   └── encode()   → text/plain; version=0.0.4
//! ```

mod atomic;
pub mod counter;
pub mod encoder;
pub mod gauge;
pub mod histogram;
pub mod labels;
pub mod registry;
pub mod snapshot;
pub mod standard;
pub mod types;

pub use counter::Counter;
pub use encoder::{CONTENT_TYPE, encode};
pub use gauge::Gauge;
pub use histogram::{DEFAULT_DURATION_BUCKETS_MS, Histogram};
pub use labels::LabelSchema;
pub use registry::{Instrument, Registry};
pub use snapshot::{
    HistogramValue, MetricSnapshot, RegistrySnapshot, SeriesSnapshot, SeriesValue,
};
pub use standard::PluginMetrics;
pub use types::{MetricDescriptor, MetricKind};
