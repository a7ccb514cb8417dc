//! Carbon-footprint activity logging: domain model, backend gateway,
//! debounced CO₂ preview, dialog controller and terminal UI.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod dialog;
pub mod gateway;
pub mod model;
pub mod preview;
pub mod tui;
