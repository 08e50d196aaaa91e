use crate::geom::{Point, point};
use crate::intersect::{Boundary, BoundaryKind, Intersectable};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Rendering mode of a node.
///
/// Anything other than `"handDrawn"` (including a missing value) renders precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Look {
    #[default]
    Classic,
    HandDrawn,
}

impl Look {
    pub fn as_str(self) -> &'static str {
        match self {
            Look::Classic => "classic",
            Look::HandDrawn => "handDrawn",
        }
    }

    pub fn is_hand_drawn(self) -> bool {
        self == Look::HandDrawn
    }
}

impl From<String> for Look {
    fn from(value: String) -> Self {
        match value.as_str() {
            "handDrawn" => Look::HandDrawn,
            _ => Look::Classic,
        }
    }
}

impl From<Look> for String {
    fn from(value: Look) -> Self {
        value.as_str().to_string()
    }
}

/// A member or method row of a class node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MemberRepr")]
#[serde(rename_all = "camelCase")]
pub struct ClassMember {
    pub display_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MemberRepr {
    Text(String),
    Object {
        #[serde(rename = "displayText", alias = "text")]
        display_text: String,
    },
}

impl From<MemberRepr> for ClassMember {
    fn from(value: MemberRepr) -> Self {
        match value {
            MemberRepr::Text(display_text) | MemberRepr::Object { display_text } => {
                Self { display_text }
            }
        }
    }
}

impl From<&str> for ClassMember {
    fn from(value: &str) -> Self {
        Self {
            display_text: value.to_string(),
        }
    }
}

impl From<String> for ClassMember {
    fn from(display_text: String) -> Self {
        Self { display_text }
    }
}

/// A diagram node as seen by the shape layer.
///
/// Class sections (`annotations`, `members`, `methods`) always exist; an absent section in the
/// input deserializes to an empty list. `styles` keeps the absent/empty distinction because an
/// explicit (even empty) override list replaces `css_styles` wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub dom_id: Option<String>,
    pub label: String,
    pub css_classes: String,
    pub look: Look,
    #[serde(deserialize_with = "string_or_list")]
    pub css_compiled_styles: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub css_styles: Vec<String>,
    pub label_style: String,
    pub annotations: Vec<String>,
    pub members: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub styles: Option<Vec<String>>,
    /// Center, assigned by the graph layout.
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(skip)]
    pub boundary: Option<BoundaryKind>,
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::One(s) => s
            .split(';')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect(),
        Repr::Many(v) => v,
        Repr::Nothing(()) => Vec::new(),
    })
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let node = Node::deserialize(value)?;
        if node.id.trim().is_empty() {
            return Err(Error::InvalidNode {
                message: "node id must not be empty".to_string(),
            });
        }
        Ok(node)
    }

    pub fn dom_id(&self) -> &str {
        self.dom_id.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn center(&self) -> Point {
        point(self.x, self.y)
    }

    /// The boundary registered by the last render, built from the current geometry.
    pub fn boundary(&self) -> Option<Boundary> {
        let kind = self.boundary?;
        Some(kind.boundary(
            self.center(),
            self.width.unwrap_or(0.0),
            self.height.unwrap_or(0.0),
        ))
    }

    /// Clips the segment from the node center towards `toward` at the node outline.
    ///
    /// Returns `None` until a shape has been rendered for this node.
    pub fn intersect(&self, toward: Point) -> Option<Point> {
        self.boundary().map(|b| b.intersect(toward))
    }
}
