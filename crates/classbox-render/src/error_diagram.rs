//! Placeholder SVG shown instead of a diagram that failed to parse.

use crate::svg::{escape_xml_into, fmt_display};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::OnceLock;

pub const ERROR_COLOR: &str = "#552222";

const ERROR_ICON_PATHS: [&str; 6] = [
    "m411.313,123.313c6.25-6.25 6.25-16.375 0-22.625s-16.375-6.25-22.625,0l-32,32-9.375,9.375-20.688-20.688c-12.484-12.5-32.766-12.5-45.25,0l-16,16c-1.261,1.261-2.304,2.648-3.31,4.051-21.739-8.561-45.324-13.426-70.065-13.426-105.867,0-192,86.133-192,192s86.133,192 192,192 192-86.133 192-192c0-24.741-4.864-48.327-13.426-70.065 1.402-1.007 2.79-2.049 4.051-3.31l16-16c12.5-12.492 12.5-32.758 0-45.25l-20.688-20.688 9.375-9.375 32.001-31.999zm-219.313,100.687c-52.938,0-96,43.063-96,96 0,8.836-7.164,16-16,16s-16-7.164-16-16c0-70.578 57.422-128 128-128 8.836,0 16,7.164 16,16s-7.164,16-16,16z",
    "m459.02,148.98c-6.25-6.25-16.375-6.25-22.625,0s-6.25,16.375 0,22.625l16,16c3.125,3.125 7.219,4.688 11.313,4.688 4.094,0 8.188-1.563 11.313-4.688 6.25-6.25 6.25-16.375 0-22.625l-16.001-16z",
    "m340.395,75.605c3.125,3.125 7.219,4.688 11.313,4.688 4.094,0 8.188-1.563 11.313-4.688 6.25-6.25 6.25-16.375 0-22.625l-16-16c-6.25-6.25-16.375-6.25-22.625,0s-6.25,16.375 0,22.625l15.999,16z",
    "m400,64c8.844,0 16-7.164 16-16v-32c0-8.836-7.156-16-16-16-8.844,0-16,7.164-16,16v32c0,8.836 7.156,16 16,16z",
    "m496,96.586h-32c-8.844,0-16,7.164-16,16 0,8.836 7.156,16 16,16h32c8.844,0 16-7.164 16-16 0-8.836-7.156-16-16-16z",
    "m436.98,75.605c3.125,3.125 7.219,4.688 11.313,4.688 4.094,0 8.188-1.563 11.313-4.688l32-32c6.25-6.25 6.25-16.375 0-22.625s-16.375-6.25-22.625,0l-32,32c-6.251,6.25-6.251,16.375-0.001,22.625z",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorDiagramLayout {
    pub viewbox_width: f64,
    pub viewbox_height: f64,
    pub max_width_px: f64,
}

impl Default for ErrorDiagramLayout {
    fn default() -> Self {
        Self {
            viewbox_width: 2412.0,
            viewbox_height: 512.0,
            max_width_px: 512.0,
        }
    }
}

/// Splits a KaTeX parse error into the heading and the message body.
fn katex_title_and_body(message: &str) -> (&str, String) {
    static PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX_RE.get_or_init(|| Regex::new(r"[A-z]*:").expect("valid regex"));

    let title = message.split(": ").next().unwrap_or(message);
    let body = re
        .replace(message, "")
        .replacen("KaTeX parse ", "", 1);
    (title, body)
}

fn css(diagram_id: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        &mut out,
        "#{id} .error-icon{{fill:{c};}}#{id} .error-text{{fill:{c};stroke:{c};}}",
        id = diagram_id,
        c = ERROR_COLOR
    );
    out
}

/// Renders the syntax-error SVG for `diagram_id`.
///
/// KaTeX errors get a plain text panel; everything else gets the error icon with the
/// "Syntax error in text" banner.
pub fn render_error_svg(diagram_id: &str, version: &str, error: Option<&str>) -> String {
    tracing::debug!(diagram_id, "rendering svg for syntax error");

    let mut out = String::new();
    match error.filter(|m| m.contains("KaTeX")) {
        Some(message) => {
            let (title, body) = katex_title_and_body(message);
            out.push_str("<svg id=\"");
            escape_xml_into(&mut out, diagram_id);
            out.push_str(
                "\" width=\"500\" height=\"100\" xmlns=\"http://www.w3.org/2000/svg\" role=\"graphics-document document\" aria-roledescription=\"error\"><style>",
            );
            escape_xml_into(&mut out, &css(diagram_id));
            out.push_str("</style><g><foreignObject height=\"100\" width=\"500\"><div xmlns=\"http://www.w3.org/1999/xhtml\" style=\"font-size: 18px; color: ");
            out.push_str(ERROR_COLOR);
            out.push_str(";\"><div style=\"font-size: 26px; margin-bottom: 8px\">");
            escape_xml_into(&mut out, title);
            out.push_str("</div><div>");
            escape_xml_into(&mut out, &body);
            out.push_str("</div></div></foreignObject></g></svg>");
        }
        None => {
            let layout = ErrorDiagramLayout::default();
            out.push_str("<svg id=\"");
            escape_xml_into(&mut out, diagram_id);
            let _ = write!(
                &mut out,
                "\" width=\"100%\" xmlns=\"http://www.w3.org/2000/svg\" style=\"max-width: {}px;\" viewBox=\"0 0 {} {}\" role=\"graphics-document document\" aria-roledescription=\"error\"><style>",
                fmt_display(layout.max_width_px),
                fmt_display(layout.viewbox_width),
                fmt_display(layout.viewbox_height)
            );
            escape_xml_into(&mut out, &css(diagram_id));
            out.push_str("</style><g>");
            for d in ERROR_ICON_PATHS {
                let _ = write!(&mut out, r#"<path class="error-icon" d="{d}"/>"#);
            }
            out.push_str(r#"<text class="error-text" x="1440" y="250" font-size="150px" style="text-anchor: middle;">Syntax error in text</text>"#);
            out.push_str(r#"<text class="error-text" x="1250" y="400" font-size="100px" style="text-anchor: middle;">mermaid version "#);
            escape_xml_into(&mut out, version);
            out.push_str("</text></g></svg>");
        }
    }
    out
}
