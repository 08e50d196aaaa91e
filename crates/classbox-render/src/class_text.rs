//! Class text layout: measures the annotation, label, members and methods of a class node and
//! stacks them into four groups in shape-local coordinates.
//!
//! The groups are positioned relative to each other only; the shape layout re-centers them
//! around the rectangle afterwards.

use crate::Result;
use crate::model::{BoundingBox, Bounds};
use crate::svg::fmt_display;
use crate::text::{TextMeasurer, TextStyle};
use classbox_core::{ClassBoxConfig, ClassMember, Node};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A `translate(dx, dy)` transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Translate {
    pub dx: f64,
    pub dy: f64,
}

impl Translate {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Parses the first `translate(dx, dy)` of a transform attribute.
    ///
    /// A single-argument translate or an unparsable `dy` yields `None`; an unparsable `dx`
    /// reads as 0.
    pub fn parse(transform: &str) -> Option<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE
            .get_or_init(|| Regex::new(r"translate\(([^,]+),([^)]+)\)").expect("valid regex"));
        let caps = re.captures(transform)?;
        let dy = parse_number_prefix(caps.get(2)?.as_str())?;
        let dx = caps
            .get(1)
            .and_then(|m| parse_number_prefix(m.as_str()))
            .unwrap_or(0.0);
        Some(Self { dx, dy })
    }
}

impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}, {})",
            fmt_display(self.dx),
            fmt_display(self.dy)
        )
    }
}

/// Leading numeric prefix of `s` (`" 12.5px"` -> 12.5).
fn parse_number_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+')))
        .unwrap_or(s.len());
    (1..=end)
        .rev()
        .find_map(|i| s[..i].parse::<f64>().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextGroupKind {
    Annotation,
    Label,
    Members,
    Methods,
}

impl TextGroupKind {
    pub fn css_class(self) -> &'static str {
        match self {
            TextGroupKind::Annotation => "annotation-group",
            TextGroupKind::Label => "label-group",
            TextGroupKind::Members => "members-group",
            TextGroupKind::Methods => "methods-group",
        }
    }

    /// Annotation and label groups are centered horizontally; member rows are left-aligned.
    pub fn is_title(self) -> bool {
        matches!(self, TextGroupKind::Annotation | TextGroupKind::Label)
    }
}

/// How label text is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelMode {
    /// `foreignObject` + XHTML `span`.
    Html,
    /// SVG `text`/`tspan`.
    Svg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Offset of the row inside its group.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Inline style of the row's text element (`span` or `tspan`).
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub kind: TextGroupKind,
    pub transform: Option<Translate>,
    pub width: f64,
    pub height: f64,
    /// `None` when the group has no SVG `text` element (HTML labels).
    pub text_anchor: Option<TextAnchor>,
    pub bold: bool,
    pub lines: Vec<TextLine>,
}

impl TextFragment {
    pub fn empty(kind: TextGroupKind, text_anchor: Option<TextAnchor>) -> Self {
        Self {
            kind,
            transform: None,
            width: 0.0,
            height: 0.0,
            text_anchor,
            bold: false,
            lines: Vec::new(),
        }
    }

    /// Horizontal extent of the group content relative to its own origin.
    fn local_x_range(&self) -> (f64, f64) {
        match self.text_anchor {
            Some(TextAnchor::Middle) => (-self.width / 2.0, self.width / 2.0),
            Some(TextAnchor::End) => (-self.width, 0.0),
            Some(TextAnchor::Start) | None => (0.0, self.width),
        }
    }

    /// Extent of the group after its transform, `None` for an empty group.
    pub fn extent(&self) -> Option<Bounds> {
        if self.lines.is_empty() {
            return None;
        }
        let t = self.transform.unwrap_or(Translate::new(0.0, 0.0));
        let (x0, x1) = self.local_x_range();
        Some(Bounds {
            min_x: t.dx + x0,
            min_y: t.dy,
            max_x: t.dx + x1,
            max_y: t.dy + self.height,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredText {
    pub bbox: BoundingBox,
    /// Always annotation, label, members, methods, in that order.
    pub fragments: Vec<TextFragment>,
    pub label_mode: LabelMode,
}

struct Stacker<'a> {
    measurer: &'a dyn TextMeasurer,
    style: TextStyle,
    row_gap: f64,
    anchor: Option<TextAnchor>,
}

impl Stacker<'_> {
    fn stack<I, S>(&self, kind: TextGroupKind, rows: I) -> TextFragment
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fragment = TextFragment::empty(kind, self.anchor);
        let mut y = 0.0;
        for text in rows {
            let text = text.into();
            let metrics = self.measurer.measure(&text, &self.style);
            if !fragment.lines.is_empty() {
                y += self.row_gap;
            }
            fragment.lines.push(TextLine {
                text,
                y,
                width: metrics.width,
                height: metrics.height,
                style: None,
            });
            fragment.width = fragment.width.max(metrics.width);
            y += metrics.height;
        }
        fragment.height = y;
        fragment
    }
}

fn display_rows(rows: &[ClassMember]) -> impl Iterator<Item = &str> {
    rows.iter().map(|m| m.display_text.as_str())
}

/// Measures and stacks the text of a class node.
pub async fn layout_class_text(
    node: &Node,
    config: &ClassBoxConfig,
    gap: f64,
    measurer: &dyn TextMeasurer,
) -> Result<MeasuredText> {
    let label_mode = if config.html_labels {
        LabelMode::Html
    } else {
        LabelMode::Svg
    };
    let (title_anchor, body_anchor, row_gap) = match label_mode {
        LabelMode::Html => (None, None, 0.0),
        LabelMode::Svg => (Some(TextAnchor::Middle), Some(TextAnchor::Start), 3.0),
    };

    let style = TextStyle {
        font_family: config.font_family.clone(),
        font_size: config.font_size,
        font_weight: None,
    };
    let mut stacker = Stacker {
        measurer,
        style,
        row_gap,
        anchor: title_anchor,
    };

    let mut annotation = stacker.stack(
        TextGroupKind::Annotation,
        node.annotations
            .first()
            .map(|a| format!("\u{00AB}{}\u{00BB}", a.trim())),
    );

    stacker.style.font_weight = Some("bolder".to_string());
    let mut label = stacker.stack(TextGroupKind::Label, [node.label.as_str()]);
    label.bold = true;

    stacker.style.font_weight = None;
    stacker.anchor = body_anchor;
    let mut members = stacker.stack(TextGroupKind::Members, display_rows(&node.members));
    let mut methods = stacker.stack(TextGroupKind::Methods, display_rows(&node.methods));

    let title_dx = |f: &TextFragment| match f.text_anchor {
        Some(TextAnchor::Middle) => 0.0,
        _ => -f.width / 2.0,
    };

    let ann_h = annotation.height;
    let label_h = label.height;
    let members_h = if members.height <= 0.0 {
        gap / 2.0
    } else {
        members.height
    };

    annotation.transform = Some(Translate::new(title_dx(&annotation), 0.0));
    label.transform = Some(Translate::new(title_dx(&label), ann_h));
    members.transform = Some(Translate::new(0.0, ann_h + label_h + gap * 2.0));
    methods.transform = Some(Translate::new(0.0, ann_h + label_h + members_h + gap * 4.0));

    let fragments = vec![annotation, label, members, methods];
    let bbox = fragments
        .iter()
        .filter_map(TextFragment::extent)
        .reduce(|mut acc, b| {
            acc.union(&b);
            acc
        })
        .map_or(BoundingBox::default(), |b| BoundingBox {
            width: b.width(),
            height: b.height(),
        });

    Ok(MeasuredText {
        bbox,
        fragments,
        label_mode,
    })
}
