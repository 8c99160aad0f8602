//! Orthographic globe with trackball-style drag rotation.
//!
//! Pointer events go through [`drag::DragSessionController`], which maps
//! screen positions to trackball angles ([`trackball`]) and folds the offset
//! into the drag-start rotation ([`compose`]). The resulting yaw/pitch/roll
//! lives in [`projection::ProjectionState`]; [`scene`] and [`svg`] turn it
//! into drawable geometry.

pub mod compose;
pub mod config;
pub mod drag;
pub mod error;
pub mod globe;
pub mod graticule;
pub mod projection;
pub mod scene;
pub mod svg;
pub mod trackball;
