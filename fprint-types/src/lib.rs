pub mod error;
pub mod field;
pub mod framing;
pub mod kind;
pub mod registry;
pub mod schema;

pub use error::*;
pub use field::*;
pub use framing::*;
pub use kind::*;
pub use registry::*;
pub use schema::*;
