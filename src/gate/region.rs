//! Pointer region classification

use serde::{Deserialize, Serialize};

/// Fraction of the container width, measured from its left edge, that
/// counts as the cancel zone
pub const DEFAULT_CONFIRM_SPLIT: f64 = 0.2;

/// Discrete classification of the pointer position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Cancel zone
    Left,
    /// Confirm zone
    Right,
    /// No pointer over the container (initial, or after leaving)
    #[default]
    None,
}

/// Bounding box of the container, in the same coordinate space as the
/// pointer events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Source of the container's current bounding box.
///
/// `None` means there is no container to measure against; pointer events
/// are skipped in that case.
pub trait ContainerGeometry {
    fn container_rect(&self) -> Option<ContainerRect>;
}

impl ContainerGeometry for Option<ContainerRect> {
    fn container_rect(&self) -> Option<ContainerRect> {
        *self
    }
}

impl ContainerGeometry for ContainerRect {
    fn container_rect(&self) -> Option<ContainerRect> {
        Some(*self)
    }
}

/// Classify a horizontal pointer coordinate against a container.
///
/// Returns `None` for geometry that cannot be classified.
pub fn classify(client_x: f64, rect: &ContainerRect, split: f64) -> Option<Region> {
    if !client_x.is_finite() || !rect.left.is_finite() || !split.is_finite() {
        return None;
    }
    if !rect.width.is_finite() || rect.width <= 0.0 {
        return None;
    }

    let x = client_x - rect.left;
    if x < split * rect.width {
        Some(Region::Left)
    } else {
        Some(Region::Right)
    }
}
