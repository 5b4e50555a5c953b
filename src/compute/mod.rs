//! Compute module - Temporal filtering, timeline indexing and playback.

mod dashboard;
mod events;
mod filter;
mod playback;
mod ticker;
mod timeline;

pub use dashboard::*;
pub use events::*;
pub use filter::*;
pub use playback::*;
pub use ticker::*;
pub use timeline::*;
