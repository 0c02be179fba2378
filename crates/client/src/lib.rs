//! Shoplane client library.
//!
//! This crate provides the storefront client as a library, allowing the
//! controller and view layer to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod filters;
pub mod session;
pub mod views;
