// Shared SVG serialization helpers.

use std::fmt;

/// Attribute-ready number: snapped to integers within 1e-6, never `-0`, and `0` for
/// non-finite input.
pub(crate) fn fmt_display(v: f64) -> FmtDisplay {
    FmtDisplay(v)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FmtDisplay(f64);

impl fmt::Display for FmtDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if !v.is_finite() {
            return f.write_str("0");
        }
        let snapped = if (v - v.round()).abs() < 1e-6 {
            v.round()
        } else {
            v
        };
        // `+ 0.0` folds `-0.0` into `0.0`.
        write!(f, "{}", snapped + 0.0)
    }
}

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
        out.push_str(&rest[..pos]);
        out.push_str(match rest.as_bytes()[pos] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => "&#39;",
        });
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);
}
