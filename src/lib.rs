//! # Decision Submit
//!
//! Batch-applies accept/reject decisions from a spreadsheet onto the student
//! records portal by driving a real browser, one record at a time.
//!
//! ## Architecture
//!
//! Four layers, each depending only on the ones below it:
//!
//! ### ① Infrastructure
//! - `infrastructure/` - holds the scarce resource (the page), exposes capabilities only
//! - `PortalPage` - the page trait; `ChromePage` is the Chromium implementation
//! - `Locator` - element lookup strategies, resolved by `first_visible`
//!
//! ### ② Services
//! - `services/` - "what I can do" for a single record
//! - `StudentSearch` - search and result-row matching
//! - `DecisionForm` - offer / reject forms, reason selection
//! - `Navigator` - back to the search page
//! - `Reporter` - progress and status broadcast
//!
//! ### ③ Workflow
//! - `workflow/` - the complete sequence for one record
//! - `RecordCtx` - which record of the batch
//! - `DecisionFlow` - search → match → actions → decision
//!
//! ### ④ Orchestration
//! - `orchestrator/batch_processor` - session lifecycle and the whole run
//! - `orchestrator/record_processor` - per-record loop, fault isolation, cancellation
//!
//! `browser/` owns launching/attaching and the login wait; `models/` holds the
//! records, the programme code table and the CSV loader.

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use browser::SessionManager;
pub use config::{Config, Timeouts};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromePage, JsExecutor, Locator, PortalPage};
pub use models::{
    load_records_from_csv, resolve_search_token, Decision, DecisionFilter, DecisionRecord,
    RecordStatus,
};
pub use orchestrator::{App, BatchSummary, CancelHandle};
pub use services::{Reporter, StatusChange};
pub use workflow::{DecisionFlow, RecordCtx};
