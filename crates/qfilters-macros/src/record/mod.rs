//! Implementation of the `#[derive(Record)]` macro.
//!
//! Turns `#[field(...)]` annotations into `Record` and `Model`
//! implementations plus field name constants.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
