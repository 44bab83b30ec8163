use serde::{Deserialize, Serialize};

use crate::core::types::Viewport;

/// Discrete size class of a viewport, ordered from smallest to largest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ViewportSize {
    #[default]
    Tiny,
    Small,
    Medium,
    Normal,
    Big,
    Huge,
    Enormous,
}

impl ViewportSize {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Normal => "normal",
            Self::Big => "big",
            Self::Huge => "huge",
            Self::Enormous => "enormous",
        }
    }
}

/// Minimum `(width, height)` in pixels for each class above `Tiny`.
///
/// Both columns must be non-decreasing for classification to stay monotonic.
const BREAKPOINTS: [(ViewportSize, u32, u32); 6] = [
    (ViewportSize::Small, 100, 50),
    (ViewportSize::Medium, 200, 100),
    (ViewportSize::Normal, 300, 150),
    (ViewportSize::Big, 450, 225),
    (ViewportSize::Huge, 650, 325),
    (ViewportSize::Enormous, 900, 450),
];

/// Returns the largest class whose width and height minimums are both met.
#[must_use]
pub fn classify_viewport(viewport: Viewport) -> ViewportSize {
    BREAKPOINTS
        .iter()
        .rev()
        .find(|(_, min_width, min_height)| {
            viewport.width >= *min_width && viewport.height >= *min_height
        })
        .map_or(ViewportSize::Tiny, |(size, _, _)| *size)
}
