//! The class-box shape: a rectangle framing the annotation, the class name and the
//! member/method sections, split by horizontal dividers.

use crate::Result;
use crate::class_text::{
    LabelMode, MeasuredText, TextAnchor, TextFragment, TextGroupKind, Translate, layout_class_text,
};
use crate::model::Bounds;
use crate::rough::{Drawable, DrawingBackend, RoughBackend, user_node_overrides};
use crate::svg::{escape_xml_into, fmt_display};
use crate::text::{TextMeasurer, label_lines};
use classbox_core::geom::Point;
use classbox_core::style::{CompiledStyles, find_color_decl, styles_to_string};
use classbox_core::{BoundaryKind, ClassBoxConfig, Node};
use std::fmt::Write as _;

pub struct ClassBoxContext<'a> {
    pub config: &'a ClassBoxConfig,
    pub measurer: &'a dyn TextMeasurer,
}

/// The composed subtree of one class node, in node-local coordinates (centered on the origin).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBoxShape {
    pub dom_id: String,
    pub css_classes: String,
    pub label_mode: LabelMode,
    pub render_extra_box: bool,
    /// First child of the shape.
    pub container: Drawable,
    pub fragments: Vec<TextFragment>,
    pub dividers: Vec<Drawable>,
    pub rect_bounds: Bounds,
}

/// Lays out and draws the class box for `node`.
///
/// On return `node.width`/`node.height` hold the drawn rectangle's size, `node.css_styles` and
/// `node.label_style` the resolved styles, and `node.intersect` clips at the rectangle.
pub async fn class_box(node: &mut Node, ctx: &ClassBoxContext<'_>) -> Result<ClassBoxShape> {
    let measured = layout_class_text(node, ctx.config, ctx.config.gap(), ctx.measurer).await?;
    compose_class_box(node, ctx.config, measured)
}

/// Draws the class box around already measured text.
pub fn compose_class_box(
    node: &mut Node,
    config: &ClassBoxConfig,
    measured: MeasuredText,
) -> Result<ClassBoxShape> {
    let padding = config.padding;
    let gap = config.gap();
    let MeasuredText {
        bbox,
        mut fragments,
        label_mode,
    } = measured;

    let CompiledStyles {
        label_styles,
        node_styles,
        ..
    } = styles_to_string(node);
    node.label_style = label_styles;
    let styles = match node.styles.as_ref().map(|s| s.join(";")) {
        Some(joined) if !joined.is_empty() => joined,
        _ => node_styles,
    };
    node.css_styles = match &node.styles {
        Some(list) => list.clone(),
        None => styles
            .replace("!important", "")
            .split(';')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect(),
    };

    let render_extra_box =
        node.members.is_empty() && node.methods.is_empty() && !config.hide_empty_members_box;
    let extra = |v: f64| if render_extra_box { v } else { 0.0 };

    let mut backend = RoughBackend::new(node.look, user_node_overrides(node, config))?;

    let w = bbox.width;
    let h = bbox.height;
    let x = -w / 2.0;
    let y = -h / 2.0;

    let (rx, ry) = (x - padding, y - padding - extra(padding));
    let (rw, rh) = (w + 2.0 * padding, h + 2.0 * padding + extra(padding * 2.0));
    let mut container = backend.rectangle(rx, ry, rw, rh)?;
    container.class = Some("basic label-container".to_string());
    let rect_bounds = container
        .bounds()
        .unwrap_or_else(|| Bounds::from_rect(rx, ry, rw, rh));

    tracing::debug!(
        node = %node.id,
        render_extra_box,
        x = rx,
        y = ry,
        width = rw,
        height = rh,
        "class box rectangle"
    );

    let anchored_middle = fragments
        .iter()
        .any(|f| f.text_anchor == Some(TextAnchor::Middle));
    let base_dy = y + padding - extra(padding);
    for fragment in &mut fragments {
        let dy = fragment.transform.map_or(0.0, |t| t.dy);
        let dx = match fragment.kind {
            kind if kind.is_title() && anchored_middle => 0.0,
            kind if kind.is_title() => -fragment.width / 2.0,
            _ => x,
        };
        let placed = Translate::new(dx, dy + base_dy);
        tracing::trace!(group = fragment.kind.css_class(), %placed, "re-centered text group");
        fragment.transform = Some(placed);
    }

    let group_height = |kind: TextGroupKind| {
        fragments
            .iter()
            .find(|f| f.kind == kind)
            .map_or(0.0, |f| f.height - extra(padding / 2.0))
    };
    let ann_h = group_height(TextGroupKind::Annotation);
    let label_h = group_height(TextGroupKind::Label);
    let members_h = group_height(TextGroupKind::Members);

    let has_members = !node.members.is_empty();
    let has_methods = !node.methods.is_empty();
    let mut dividers = Vec::new();
    if has_members || has_methods || render_extra_box {
        let line_y = ann_h + label_h + y + padding;
        dividers.push(backend.line(rect_bounds.min_x, line_y, rect_bounds.max_x, line_y)?);
    }
    if has_members && has_methods {
        let line_y = ann_h + label_h + members_h + y + gap * 2.0 + padding;
        dividers.push(backend.line(rect_bounds.min_x, line_y, rect_bounds.max_x, line_y)?);
    }
    tracing::debug!(node = %node.id, dividers = dividers.len(), "class box dividers");

    if !node.look.is_hand_drawn() {
        for path in &mut container.paths {
            path.style = Some(styles.clone());
        }
    }
    if let Some(stroke) = container.paths.get_mut(1) {
        stroke.style = Some(styles.clone());
    }
    for divider in &mut dividers {
        divider.class = Some("divider".to_string());
        if let Some(path) = divider.paths.first_mut() {
            path.style = Some(styles.clone());
        }
    }

    let lines = fragments.iter_mut().flat_map(|f| f.lines.iter_mut());
    match label_mode {
        LabelMode::Html => {
            let span_style = if node.label_style.is_empty() {
                styles.clone()
            } else {
                node.label_style.clone()
            };
            for line in lines {
                line.style = Some(span_style.clone());
            }
        }
        LabelMode::Svg => {
            let color = find_color_decl(&node.label_style).or_else(|| find_color_decl(&styles));
            if let Some(color) = color {
                let fill = format!("fill:{color}");
                for line in lines {
                    line.style = Some(fill.clone());
                }
            }
        }
    }

    node.width = Some(rect_bounds.width());
    node.height = Some(rect_bounds.height());
    node.boundary = Some(BoundaryKind::Rect);

    Ok(ClassBoxShape {
        dom_id: node.dom_id().to_string(),
        css_classes: node.css_classes.clone(),
        label_mode,
        render_extra_box,
        container,
        fragments,
        dividers,
        rect_bounds,
    })
}

impl ClassBoxShape {
    pub fn fragment(&self, kind: TextGroupKind) -> Option<&TextFragment> {
        self.fragments.iter().find(|f| f.kind == kind)
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        self.write_svg(&mut out, None);
        out
    }

    /// Appends the shape's `<g>`; `at` places it at the node center.
    pub fn write_svg(&self, out: &mut String, at: Option<Point>) {
        out.push_str("<g class=\"node");
        if !self.css_classes.is_empty() {
            out.push(' ');
            escape_xml_into(out, &self.css_classes);
        }
        out.push_str("\" id=\"");
        escape_xml_into(out, &self.dom_id);
        out.push('"');
        if let Some(p) = at {
            let _ = write!(out, " transform=\"{}\"", Translate::new(p.x, p.y));
        }
        out.push('>');

        self.container.write_svg(out);
        for fragment in &self.fragments {
            write_fragment(out, fragment, self.label_mode);
        }
        for divider in &self.dividers {
            divider.write_svg(out);
        }
        out.push_str("</g>");
    }
}

fn write_fragment(out: &mut String, fragment: &TextFragment, mode: LabelMode) {
    out.push_str("<g class=\"");
    out.push_str(fragment.kind.css_class());
    out.push_str(" text\"");
    if let Some(t) = fragment.transform {
        let _ = write!(out, " transform=\"{t}\"");
    }
    if fragment.lines.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    for line in &fragment.lines {
        out.push_str("<g class=\"label\"");
        if fragment.bold {
            out.push_str(" style=\"font-weight: bolder\"");
        }
        let _ = write!(out, " transform=\"translate(0, {})\">", fmt_display(line.y));
        match mode {
            LabelMode::Html => {
                let _ = write!(
                    out,
                    r#"<foreignObject width="{}" height="{}"><div xmlns="http://www.w3.org/1999/xhtml" style="display: table-cell; white-space: nowrap; line-height: 1.5; text-align: center;"><span class="nodeLabel""#,
                    fmt_display(line.width),
                    fmt_display(line.height)
                );
                write_style_attr(out, line.style.as_deref());
                out.push_str("><p>");
                for (i, row) in label_lines(&line.text).enumerate() {
                    if i > 0 {
                        out.push_str("<br />");
                    }
                    escape_xml_into(out, row);
                }
                out.push_str("</p></span></div></foreignObject>");
            }
            LabelMode::Svg => {
                out.push_str("<text");
                if let Some(anchor) = fragment.text_anchor {
                    let _ = write!(out, " style=\"text-anchor: {}\"", anchor.as_str());
                }
                out.push('>');
                for (i, row) in label_lines(&line.text).enumerate() {
                    let dy = if i == 0 { "1em" } else { "1.2em" };
                    let _ = write!(out, r#"<tspan x="0" dy="{dy}""#);
                    write_style_attr(out, line.style.as_deref());
                    out.push('>');
                    escape_xml_into(out, row);
                    out.push_str("</tspan>");
                }
                out.push_str("</text>");
            }
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");
}

fn write_style_attr(out: &mut String, style: Option<&str>) {
    if let Some(style) = style {
        out.push_str(" style=\"");
        escape_xml_into(out, style);
        out.push('"');
    }
}
