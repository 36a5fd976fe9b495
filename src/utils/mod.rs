//! Utility Module
//!
//! - [`trs`]: Translation / rotation / scale decomposition and blending

pub mod trs;

pub use trs::{Trs, blend_trs, compose_trs, decompose_trs, slerp_shortest};
