//! Atlas sizing and generation settings.

use crate::error::AtlasError;
use serde::{Deserialize, Serialize};

/// What happens once every physical slot of an atlas is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Reallocate a larger pixel buffer and recompute every UV.
    #[default]
    Grow,
    /// Keep counting slots but drop texel writes that fall outside the buffer.
    /// Metrics are still recorded, with UVs that point past the texture.
    Drop,
}

/// Settings shared by every atlas a font manager creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Edge length of one glyph cell in pixels.
    pub cell_size: u32,
    /// Distance field extent past the outline, in bitmap pixels.
    pub px_range: f64,
    /// Largest width or height an atlas may reach.
    pub max_dimension: u32,
    /// Spare slots reserved on top of the initial estimate.
    pub slot_slack: u32,
    /// Lower bound on the initial slot count.
    pub min_slots: u32,
    pub overflow: OverflowPolicy,
    /// Characters generated when an atlas is created.
    pub initial_charset: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            cell_size: 64,
            px_range: 4.0,
            max_dimension: 4096,
            slot_slack: 32,
            min_slots: 128,
            overflow: OverflowPolicy::Grow,
            initial_charset: printable_ascii(),
        }
    }
}

impl AtlasConfig {
    /// Set the cell size in pixels.
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the distance field extent in pixels.
    pub fn with_px_range(mut self, px_range: f64) -> Self {
        self.px_range = px_range;
        self
    }

    /// Set the maximum atlas dimension.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Set the overflow policy.
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set the characters generated up front.
    pub fn with_initial_charset(mut self, charset: impl Into<String>) -> Self {
        self.initial_charset = charset.into();
        self
    }

    /// Reject settings that cannot produce a glyph: the distance range must
    /// be positive and leave room for the outline inside the cell, and one
    /// cell must fit in the largest atlas.
    pub fn validate(&self) -> Result<(), AtlasError> {
        if !(self.px_range.is_finite() && self.px_range > 0.0) {
            return Err(AtlasError::InvalidConfig(format!(
                "px_range must be positive, got {}",
                self.px_range
            )));
        }
        if f64::from(self.cell_size) <= 2.0 * self.px_range {
            return Err(AtlasError::InvalidConfig(format!(
                "cell_size {} must exceed twice px_range ({})",
                self.cell_size, self.px_range
            )));
        }
        if self.cell_size > self.max_dimension {
            return Err(AtlasError::InvalidConfig(format!(
                "cell_size {} exceeds max_dimension {}",
                self.cell_size, self.max_dimension
            )));
        }
        Ok(())
    }
}

/// Codepoints 32 through 126.
pub fn printable_ascii() -> String {
    (' '..='~').collect()
}
