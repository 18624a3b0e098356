//! SiteCanvas browser bindings.
//!
//! Thin wasm-bindgen wrappers around the page and flowchart editors. State
//! crosses into JavaScript as JSON strings; the engine stays in Rust.

pub mod bridge;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebEditor, WebFlowchart, start};
