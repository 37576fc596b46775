//! Detector Module
//!
//! Predicates over the host document deciding which plugins auto-activate:
//! - Base queries (class, id, selector, data attribute, onclick)
//! - `any` / `all` combinators

pub mod combinators;
pub mod detector;

pub use combinators::{all, any};
pub use detector::{
    custom, has_class, has_data_attribute, has_id, has_on_click, has_selector, Detector,
};
