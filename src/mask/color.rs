//! Stable per-category display colors.

use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Random draws tried before scanning for a free color.
const RANDOM_DRAWS: usize = 64;
const COLOR_SPACE: u32 = 1 << 24;

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    fn from_packed(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Category to color lookup table.
///
/// The table is owned by the caller and keeps growing across calls, so a
/// category drawn in several masks always gets the same color. Colors are
/// unique within one table until all 2^24 of them are taken.
#[derive(Clone, Debug, Default)]
pub struct ColorMap {
    colors: BTreeMap<String, Color>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns the color already assigned to `category`, if any.
    pub fn get(&self, category: &str) -> Option<Color> {
        self.colors.get(category).copied()
    }

    /// Returns the color for `category`, drawing a new random color that no
    /// other category uses yet if it has none.
    pub fn color_for<R: Rng + ?Sized>(&mut self, category: &str, rng: &mut R) -> Color {
        if let Some(color) = self.get(category) {
            return color;
        }

        let color = self.unused_color(rng, RANDOM_DRAWS);
        tracing::debug!(category, %color, "assigned new category color");
        self.colors.insert(category.to_string(), color);
        color
    }

    /// Draws up to `draws` random colors, then walks the color space from
    /// the last draw to the next free one.
    fn unused_color<R: Rng + ?Sized>(&self, rng: &mut R, draws: usize) -> Color {
        let used: HashSet<Color> = self.colors.values().copied().collect();
        let mut candidate = Color::new(0, 0, 0);
        for _ in 0..draws {
            candidate = Color::new(rng.random(), rng.random(), rng.random());
            if !used.contains(&candidate) {
                return candidate;
            }
        }

        let start = candidate.packed();
        (1..=COLOR_SPACE)
            .map(|step| Color::from_packed((start + step) % COLOR_SPACE))
            .find(|color| !used.contains(color))
            .unwrap_or_else(|| {
                tracing::warn!(%candidate, "every color is taken, reusing one");
                candidate
            })
    }
}
