//! Data providers: bar history and fundamentals.

pub mod circuit_breaker;
pub mod ingest;
pub mod memory;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use ingest::{ingest, IngestResult};
pub use memory::InMemoryProvider;
pub use provider::{
    DataError, DataSource, FetchResult, HistoryProvider, RawBar, ReferenceProvider,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
