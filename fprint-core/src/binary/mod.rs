//! Little-endian примитивы для заголовка и тела `.fpt`.

pub mod read;
pub mod write;

pub use read::*;
pub use write::*;
