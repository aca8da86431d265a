pub mod batch;
pub mod combine;
pub mod config;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod metrics;

pub use batch::*;
pub use combine::*;
pub use config::*;
pub use error::*;
pub use ingest::*;
pub use layout::*;
pub use metrics::*;
