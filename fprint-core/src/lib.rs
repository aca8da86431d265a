//! Декодер захватов fingerprint-приёмника
//!
//! Превращает сырые дампы float32 (CE, AUX, Info) в типизированные таблицы:
//! восстанавливает границы CE-записей по STOP-символу, приводит целые поля и
//! переводит TTI из миллисекунд в секунды.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use fprint_core::{decode_file, TableWriter, OutputFormat};
//! use fprint_types::{RecordKind, SchemaRegistry};
//!
//! let registry = SchemaRegistry::standard();
//! let schema = registry.get(RecordKind::ChannelEstimate);
//!
//! let decoded = decode_file("ce/ce_0_raw.txt", schema)?;
//! println!("{} rows, {:?}", decoded.table.n_rows(), decoded.stats);
//!
//! TableWriter::new(OutputFormat::Fpt).write("ce/ce_0.fpt", &decoded.table)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod decoder;
pub mod export;
pub mod format;
pub mod locations;
pub mod resync;
pub mod serialization;
pub mod stream;
pub mod table;

pub use decoder::*;
pub use export::*;
pub use format::*;
pub use fprint_types::error;
pub use locations::*;
pub use resync::*;
pub use serialization::*;
pub use stream::*;
pub use table::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
