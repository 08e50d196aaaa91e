#![forbid(unsafe_code)]

//! Headless class-box shape layout and SVG emission.

pub mod class_box;
pub mod class_text;
pub mod error_diagram;
pub mod model;
pub mod rough;
mod svg;
pub mod text;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use classbox_core::{ClassBoxConfig, ClassboxConfig, Node};
use serde_json::Value;
use std::sync::Arc;

pub use class_box::{ClassBoxContext, ClassBoxShape, class_box};
pub use error_diagram::render_error_svg;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("drawing backend rejected options: {message}")]
    Backend { message: String },
    #[error(transparent)]
    Core(#[from] classbox_core::Error),
    #[error("node JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Per-call configuration (for example from an `init` directive), layered over the base
    /// config. `Value::Null` applies none.
    pub config_overrides: Value,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            config_overrides: Value::Null,
        }
    }
}

/// Builds the class box for a node given as a JSON value.
///
/// Returns the node with its geometry and resolved styles filled in, and the shape.
pub async fn layout_class_node(
    node: &Value,
    config: &ClassboxConfig,
    options: &LayoutOptions,
) -> Result<(Node, ClassBoxShape)> {
    let mut node = Node::from_json(node)?;
    let config = ClassBoxConfig::from_config(&config.with_overrides(&options.config_overrides));
    let ctx = ClassBoxContext {
        config: &config,
        measurer: options.text_measurer.as_ref(),
    };
    let shape = class_box(&mut node, &ctx).await?;
    Ok((node, shape))
}

/// Renders a node given as JSON text to a positioned SVG `<g>` fragment.
pub async fn render_class_node_svg(
    node_json: &str,
    config: &ClassboxConfig,
    options: &LayoutOptions,
) -> Result<String> {
    let value: Value = serde_json::from_str(node_json)?;
    let (node, shape) = layout_class_node(&value, config, options).await?;
    let mut out = String::new();
    shape.write_svg(&mut out, Some(node.center()));
    Ok(out)
}
