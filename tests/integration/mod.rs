//! Integration tests for the caspar front controller.
//!
//! Each test starts an in-process server on an ephemeral port and talks to
//! it over real HTTP.
//!
//! Run with: `cargo test --test integration`

mod ajax;
mod cookies;
mod helpers;
mod http_basic;
mod redirects;
