//! Schema module - Facility data, selection and configuration types.

mod config;
mod date;
mod facility;
mod selection;

pub use config::*;
pub use date::*;
pub use facility::*;
pub use selection::*;
