//! panel — validated staggered-adoption panels and their derived layout.
//!
//! Purpose
//! -------
//! Own everything about the input panel: conversion from named columns,
//! structural validation, the wide `periods × units` layout, the group-time
//! cell layout, and the optional within transformation.
//!
//! Key behaviors
//! -------------
//! - [`PanelFrame`] / [`ColumnSpec`]: string-keyed columns at the loading
//!   boundary, converted by [`PanelData::from_frame`].
//! - [`PanelData`]: balanced panel with explicit [`Cohort`] labels.
//! - [`PanelMeta`] / [`CellLayout`]: control indices, pre-treatment window,
//!   and (cohort, period) cell bookkeeping.
//! - [`within_transform`]: period and unit demeaning prior to estimation.
//!
//! Invariants & assumptions
//! ------------------------
//! - A constructed [`PanelData`] is balanced, finite, has at least one
//!   never-treated and one treated unit, and every cohort has a
//!   pre-treatment period.
//! - Never-treated status is a [`Cohort`] variant, never a float sentinel.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its own validation paths and transforms.

pub mod data;
pub mod errors;
pub mod frame;
pub mod meta;
pub mod within;

pub use self::data::{Cohort, PanelData};
pub use self::errors::{PanelError, PanelResult};
pub use self::frame::{ColumnSpec, PanelFrame};
pub use self::meta::{CellLayout, GroupInfo, PanelMeta};
pub use self::within::within_transform;
