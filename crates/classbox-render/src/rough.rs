//! Drawing backend built on `roughr` (a Rough.js port).
//!
//! Both looks go through the same generator: the precise look is Rough.js with roughness 0,
//! which keeps path structure and PRNG consumption identical between the two.

use crate::model::Bounds;
use crate::svg::{escape_xml_into, fmt_display};
use crate::{Error, Result};
use classbox_core::style::compile_styles;
use classbox_core::{ClassBoxConfig, Look, Node};
use roughr::core::{FillStyle, OpSet, OpSetType, OpType, Options, OptionsBuilder};
use std::fmt::Write as _;

/// Resolved Rough.js options for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    pub roughness: f32,
    pub fill_style: FillStyle,
    pub fill: String,
    pub fill_weight: f32,
    pub hachure_gap: f32,
    pub stroke: String,
    pub stroke_width: f32,
    pub stroke_line_dash: Vec<f64>,
    pub fill_line_dash: Vec<f64>,
    pub seed: u64,
}

/// Rough options derived from the node's compiled styles, falling back to the theme.
pub fn user_node_overrides(node: &Node, config: &ClassBoxConfig) -> StyleOptions {
    let styles = compile_styles(node);
    let stroke_width = styles
        .get("stroke-width")
        .and_then(|w| w.replace("px", "").trim().parse::<f32>().ok())
        .unwrap_or(1.3);
    let seed = if config.hand_drawn_seed != 0 {
        config.hand_drawn_seed
    } else {
        stable_seed(node.dom_id())
    };

    StyleOptions {
        roughness: 0.7,
        fill_style: FillStyle::Hachure,
        fill: styles
            .get("fill")
            .cloned()
            .unwrap_or_else(|| config.theme.main_bkg.clone()),
        fill_weight: 4.0,
        hachure_gap: 5.2,
        stroke: styles
            .get("stroke")
            .cloned()
            .unwrap_or_else(|| config.theme.node_border.clone()),
        stroke_width,
        stroke_line_dash: stroke_dash_array(styles.get("stroke-dasharray").map(String::as_str)),
        fill_line_dash: vec![0.0, 0.0],
        seed,
    }
}

fn stroke_dash_array(value: Option<&str>) -> Vec<f64> {
    let Some(value) = value else {
        return vec![0.0, 0.0];
    };
    let nums: Vec<f64> = value
        .replace(',', " ")
        .split_whitespace()
        .map(|t| t.parse::<f64>().unwrap_or(0.0))
        .collect();
    match nums.as_slice() {
        [a] => vec![*a, *a],
        [a, b, ..] => vec![*a, *b],
        _ => vec![0.0, 0.0],
    }
}

/// FNV-1a 64 over the DOM id; Rough.js treats seed 0 as "random", which would make output
/// non-reproducible.
fn stable_seed(dom_id: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in dom_id.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h.max(1)
}

fn parse_hex_color_to_srgba(s: &str) -> Option<roughr::Srgba> {
    let hex = s.trim().strip_prefix('#')?;
    // Non-ASCII input would put byte offsets inside a character.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let (r, g, b) = match hex.len() {
        6 => {
            let channel = |i: usize| Some(nibble(i)? << 4 | nibble(i + 1)?);
            (channel(0)?, channel(2)?, channel(4)?)
        }
        3 => {
            let short = |i: usize| nibble(i).map(|n| n << 4 | n);
            (short(0)?, short(1)?, short(2)?)
        }
        _ => return None,
    };
    Some(roughr::Srgba::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    pub d: String,
    pub stroke: String,
    pub stroke_width: String,
    pub fill: String,
    pub stroke_dasharray: Option<String>,
    pub style: Option<String>,
}

impl SvgPath {
    pub fn write_svg(&self, out: &mut String) {
        out.push_str("<path d=\"");
        out.push_str(&self.d);
        out.push_str("\" stroke=\"");
        escape_xml_into(out, &self.stroke);
        out.push_str("\" stroke-width=\"");
        escape_xml_into(out, &self.stroke_width);
        out.push_str("\" fill=\"");
        escape_xml_into(out, &self.fill);
        out.push('"');
        if let Some(dash) = &self.stroke_dasharray {
            out.push_str(" stroke-dasharray=\"");
            escape_xml_into(out, dash);
            out.push('"');
        }
        if let Some(style) = &self.style {
            out.push_str(" style=\"");
            escape_xml_into(out, style);
            out.push('"');
        }
        out.push_str("/>");
    }
}

/// A drawn element: a `<g>` wrapping one or more paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub class: Option<String>,
    pub paths: Vec<SvgPath>,
    bounds: Option<Bounds>,
}

impl Drawable {
    /// Bounding box of the generated geometry, cubic extrema included.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn write_svg(&self, out: &mut String) {
        out.push_str("<g");
        if let Some(class) = &self.class {
            out.push_str(" class=\"");
            escape_xml_into(out, class);
            out.push('"');
        }
        out.push('>');
        for path in &self.paths {
            path.write_svg(out);
        }
        out.push_str("</g>");
    }
}

pub trait DrawingBackend {
    fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<Drawable>;
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Drawable>;
}

pub struct RoughBackend {
    look: Look,
    style: StyleOptions,
    options: Options,
}

impl RoughBackend {
    /// The precise look draws with roughness 0 and a solid fill.
    pub fn new(look: Look, mut style: StyleOptions) -> Result<Self> {
        if !look.is_hand_drawn() {
            style.roughness = 0.0;
            style.fill_style = FillStyle::Solid;
        }

        let mut builder = OptionsBuilder::default();
        builder
            .seed(style.seed)
            .roughness(style.roughness)
            .fill_style(style.fill_style)
            .fill_weight(style.fill_weight)
            .hachure_gap(style.hachure_gap)
            .stroke_width(style.stroke_width)
            .stroke_line_dash(style.stroke_line_dash.clone())
            .stroke_line_dash_offset(0.0)
            .fill_line_dash(style.fill_line_dash.clone())
            .fill_line_dash_offset(0.0)
            .disable_multi_stroke(false)
            .disable_multi_stroke_fill(false);
        if let Some(fill) = parse_hex_color_to_srgba(&style.fill) {
            builder.fill(fill);
        }
        if let Some(stroke) = parse_hex_color_to_srgba(&style.stroke) {
            builder.stroke(stroke);
        }
        let options = builder.build().map_err(|e| Error::Backend {
            message: e.to_string(),
        })?;

        Ok(Self {
            look,
            style,
            options,
        })
    }

    pub fn look(&self) -> Look {
        self.look
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    fn stroke_path(&self, opset: &OpSet<f64>) -> SvgPath {
        SvgPath {
            d: ops_to_svg_path_d(opset),
            stroke: self.style.stroke.clone(),
            stroke_width: self.style.stroke_width.to_string(),
            fill: "none".to_string(),
            stroke_dasharray: Some(dash_attr(&self.style.stroke_line_dash)),
            style: None,
        }
    }

    /// Solid fills paint the polygon; pattern fills stroke their sketch lines in the fill color.
    fn fill_path(&self, opset: &OpSet<f64>) -> SvgPath {
        let d = ops_to_svg_path_d(opset);
        match opset.op_set_type {
            OpSetType::FillSketch => SvgPath {
                d,
                stroke: self.style.fill.clone(),
                stroke_width: self.style.fill_weight.to_string(),
                fill: "none".to_string(),
                stroke_dasharray: Some(dash_attr(&self.style.fill_line_dash)),
                style: None,
            },
            _ => SvgPath {
                d,
                stroke: "none".to_string(),
                stroke_width: "0".to_string(),
                fill: self.style.fill.clone(),
                stroke_dasharray: None,
                style: None,
            },
        }
    }
}

impl DrawingBackend for RoughBackend {
    fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<Drawable> {
        // Every shape starts from a fresh PRNG state. Within the shape the outline is generated
        // before the fill; the fill is emitted first.
        let mut opts = self.options.clone();
        let stroke_opset = roughr::renderer::rectangle::<f64>(x, y, width, height, &mut opts);
        let polygon = vec![vec![
            roughr::Point2D::new(x, y),
            roughr::Point2D::new(x + width, y),
            roughr::Point2D::new(x + width, y + height),
            roughr::Point2D::new(x, y + height),
        ]];
        let fill_opset = if self.style.fill_style == FillStyle::Solid {
            roughr::renderer::solid_fill_polygon(&polygon, &mut opts)
        } else {
            roughr::renderer::pattern_fill_polygons(polygon, &mut opts)
        };

        Ok(Drawable {
            class: None,
            bounds: opset_bounds([&fill_opset, &stroke_opset]),
            paths: vec![self.fill_path(&fill_opset), self.stroke_path(&stroke_opset)],
        })
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Drawable> {
        let mut opts = self.options.clone();
        let opset = roughr::renderer::line::<f64>(x1, y1, x2, y2, &mut opts);
        Ok(Drawable {
            class: None,
            bounds: opset_bounds([&opset]),
            paths: vec![self.stroke_path(&opset)],
        })
    }
}

fn dash_attr(dash: &[f64]) -> String {
    let mut out = String::new();
    for (i, v) in dash.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(&mut out, "{}", fmt_display(*v));
    }
    out
}

// Rough.js emits path data with `Number.toString()` precision; keep the raw values.
fn ops_to_svg_path_d(opset: &OpSet<f64>) -> String {
    let mut out = String::new();
    for op in &opset.ops {
        match op.op {
            OpType::Move => {
                let _ = write!(&mut out, "M{} {} ", op.data[0], op.data[1]);
            }
            OpType::BCurveTo => {
                let _ = write!(
                    &mut out,
                    "C{} {}, {} {}, {} {} ",
                    op.data[0], op.data[1], op.data[2], op.data[3], op.data[4], op.data[5]
                );
            }
            OpType::LineTo => {
                let _ = write!(&mut out, "L{} {} ", op.data[0], op.data[1]);
            }
        }
    }
    out.trim_end().to_string()
}

fn opset_bounds<'a>(opsets: impl IntoIterator<Item = &'a OpSet<f64>>) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    let mut cursor = (0.0, 0.0);
    for op in opsets.into_iter().flat_map(|set| set.ops.iter()) {
        let b = bounds.get_or_insert_with(|| Bounds::from_rect(op.data[0], op.data[1], 0.0, 0.0));
        match op.op {
            OpType::Move | OpType::LineTo => {
                cursor = (op.data[0], op.data[1]);
                b.include_point(cursor.0, cursor.1);
            }
            OpType::BCurveTo => {
                let d = &op.data;
                b.include_cubic(cursor.0, cursor.1, d[0], d[1], d[2], d[3], d[4], d[5]);
                cursor = (d[4], d[5]);
            }
        }
    }
    bounds
}
