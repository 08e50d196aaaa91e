#![forbid(unsafe_code)]

//! Node model, configuration and boundary geometry for classbox (headless).
//!
//! Design goals:
//! - no DOM: nodes and shapes are plain data until the render crate serializes them
//! - deterministic, testable outputs

pub mod config;
pub mod error;
pub mod geom;
pub mod intersect;
pub mod model;
pub mod style;

pub use config::{ClassBoxConfig, ClassboxConfig, ThemeDefaults};
pub use error::{Error, Result};
pub use intersect::{Boundary, BoundaryKind, Intersectable};
pub use model::{ClassMember, Look, Node};
