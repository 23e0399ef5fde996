//! Semantic marker descriptions supplied by the host application.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::geometry::LatLng;

/// Visual variant of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Default,
    Special,
}

/// Opaque icon reference handed to the icon renderer.
///
/// The SVG renderer treats the contents as inline SVG markup. Cloning is
/// cheap; equality and hashing are by content.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(Arc<str>);

impl IconRef {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Icon markup can be kilobytes long.
        let preview: String = self.0.chars().take(24).collect();
        write!(f, "IconRef({:?}.., {} bytes)", preview, self.0.len())
    }
}

/// Immutable semantic description of one marker's content and state.
///
/// Equality is structural and is what decides whether a change needs a
/// transition at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub label: String,
    #[serde(default)]
    pub counter: Option<String>,
    #[serde(default)]
    pub icon: Option<IconRef>,
    #[serde(default)]
    pub has_pointer: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default)]
    pub is_visualized: bool,
    #[serde(default)]
    pub variant: Variant,
}

impl MarkerSpec {
    /// Plain marker showing `label` and nothing else.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_counter(mut self, counter: impl Into<String>) -> Self {
        self.counter = Some(counter.into());
        self
    }

    pub fn with_icon(mut self, icon: IconRef) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_pointer(mut self, has_pointer: bool) -> Self {
        self.has_pointer = has_pointer;
        self
    }

    pub fn selected(mut self, is_selected: bool) -> Self {
        self.is_selected = is_selected;
        self
    }

    pub fn visualized(mut self, is_visualized: bool) -> Self {
        self.is_visualized = is_visualized;
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Counter text, if one should be drawn. Empty counters count as absent.
    pub fn counter_text(&self) -> Option<&str> {
        self.counter.as_deref().filter(|c| !c.is_empty())
    }
}

/// Logical marker identity chosen by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Everything the steady-state controller needs to place or update a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerOptions {
    pub id: MarkerId,
    #[serde(default)]
    pub position: LatLng,
    #[serde(default)]
    pub z_index: f32,
    pub spec: MarkerSpec,
    /// Whether a content change should play a transition.
    #[serde(default = "default_animate")]
    pub animate: bool,
}

fn default_animate() -> bool {
    true
}

impl MarkerOptions {
    pub fn new(id: impl Into<MarkerId>, spec: MarkerSpec) -> Self {
        Self {
            id: id.into(),
            position: LatLng::default(),
            z_index: 0.0,
            spec,
            animate: true,
        }
    }

    pub fn at(mut self, position: LatLng) -> Self {
        self.position = position;
        self
    }

    pub fn with_z_index(mut self, z_index: f32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn animated(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }
}
