//! Infrastructure layer
//!
//! Holds the scarce resource (the browser page) and exposes capabilities only.

pub mod chrome_page;
pub mod js_executor;
pub mod locator;
pub mod portal_page;
#[cfg(test)]
pub(crate) mod scripted_page;

pub use chrome_page::ChromePage;
pub use js_executor::JsExecutor;
pub use locator::{first_visible, wait_for_any, wait_for_count, AriaRole, Locator};
pub use portal_page::{PortalPage, RowLink};
