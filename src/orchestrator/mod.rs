//! Orchestration layer
//!
//! ```text
//! batch_processor (session lifecycle, login, whole run)
//!     ↓
//! record_processor (Vec<DecisionRecord>, one at a time)
//!     ↓
//! workflow::DecisionFlow (one record)
//!     ↓
//! services (search / form / navigation / events)
//!     ↓
//! infrastructure (PortalPage)
//! ```
//!
//! Only this layer holds the session; everything below borrows the page.

pub mod batch_processor;
pub mod cancel;
pub mod record_processor;

pub use batch_processor::App;
pub use cancel::{watch_interrupts, CancelHandle};
pub use record_processor::{BatchSummary, RecordProcessor};
