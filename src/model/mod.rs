//! Types that represent the core data model: the category taxonomy, the cascading selection, the
//! entry form and the layout of the month tabs.
mod amount;
pub mod cell;
mod entry;
mod selection;
pub mod taxonomy;

pub use amount::{thousands, Won, WonError};
pub use cell::{Cell, Column};
pub use entry::{Draft, Entry};
pub use selection::{Level, Selection, SelectionError};
pub use taxonomy::{Major, PAYMENT_METHODS};
