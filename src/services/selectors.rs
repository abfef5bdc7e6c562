//! Portal element locators
//!
//! Fallback chains are ordered by priority; the first visible entry wins.

use crate::infrastructure::{AriaRole, Locator};

// ========== Session ==========

/// Only rendered once the SSO session is established
pub const LOGGED_IN_MARKER: Locator = Locator::text("My Portico");
pub const LOGIN_BUTTON: Locator =
    Locator::role(AriaRole::Button, Some("Staff and Students Login"));

// ========== Navigation ==========

pub const SELECT_ENTRY: Locator = Locator::text("UCLSelect");
pub const SEARCH_TAB: Locator = Locator::css_with_text("a", "Search");

// ========== Search ==========

pub const SEARCH_MODE: Locator = Locator::text("Student Number");
pub const SEARCH_INPUT: &[Locator] = &[
    Locator::role(AriaRole::Textbox, None),
    Locator::css("input[type='text']"),
];
pub const SEARCH_BUTTON: &[Locator] = &[
    Locator::css("input[value='Search']"),
    Locator::css_with_text("button", "Search"),
];
pub const RESULTS_TABLE: Locator = Locator::css("table");
pub const RESULT_LINKS: Locator = Locator::css("table tbody tr td a");

// ========== Decision form ==========

pub const ACTIONS_TAB: Locator = Locator::text("Actions");
pub const RECOMMEND_LINK: &[Locator] = &[
    Locator::css_with_text("a", "Recommend Offer or Reject"),
    Locator::text("Recommend Offer or Reject"),
];
pub const OFFER_OPTION: Locator = Locator::text("Offer recommendation");
pub const DECISION_RADIOS: Locator = Locator::css("input[type='radio']");
pub const REJECT_LABEL: Locator = Locator::label("Reject");
pub const DROPDOWNS: Locator = Locator::css("select");
pub const PROCESS_BUTTON: &[Locator] = &[
    Locator::css("input[value='Process']"),
    Locator::css_with_text("button", "Process"),
];
