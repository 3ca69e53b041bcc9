//! Backend engine variants.
//!
//! One module per backend kind. All four share the [`crate::analysis`] state
//! and differ only in construction and in the handful of operations the
//! [`crate::engine::Engine`] trait lets them override.

pub mod emulated;
pub mod live;
pub mod remote;
pub mod static_dasm;
