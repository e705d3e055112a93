//! Forward-rendering shading contract.
//!
//! The vertex stage composes object, view and projection transforms; the
//! fragment stage derives a diffuse intensity from a directional light, an
//! optional shadow-map depth test and an optional diffuse texture. Uniforms
//! reach both stages through a fixed, additive binding layout
//! (see [`core::binding`]).
//!
//! A small headless software renderer (`pipeline::renderer`, `pipeline::passes`)
//! plays the role of the host so the contract can be exercised end to end.

pub mod app;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod scene;
