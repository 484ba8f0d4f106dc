//! Core 2-D typed-particle simulation library.
//!
//! Main components:
//! - [`particle`] — particle data.
//! - [`spring`] — Hookean springs between particle pairs.
//! - [`outline`] — particle rings drawn as closed contours.
//! - [`grid`] — uniform spatial grid with sort-based bucket indexing.
//! - [`kernel`] — pairwise, averaged and boundary force kernels.
//! - [`registry`] — which kernels act on which particle type.
//! - [`integrator`] — Euler step with velocity damping.
//! - [`simulation`] — the owned simulation context and per-tick pipeline.
//! - [`scene`] — blob and scatter helpers for building scenes.
//! - [`config`] — simulation configuration.
//! - [`error`] — construction errors.
//! - [`types`] — shared ids, tags and filters.

pub mod config;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod kernel;
pub mod outline;
pub mod particle;
pub mod registry;
pub mod scene;
pub mod simulation;
pub mod spring;
pub mod types;
