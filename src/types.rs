use serde::{Deserialize, Deserializer, Serialize};

/// An axis-aligned rectangle given as length (x axis) by width (y axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
}

impl Rect {
    pub fn new(length: u32, width: u32) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            length: self.width,
            width: self.length,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.length <= other.length && self.width <= other.width
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.length, self.width)
    }
}

/// A sub-area of the container designated to be tiled homogeneously by one
/// item orientation. Blocks in a decomposition never overlap each other, but
/// they are allowed to leave gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub length: u32,
    pub width: u32,
}

impl Block {
    pub fn new(x: u32, y: u32, length: u32, width: u32) -> Self {
        Self {
            x,
            y,
            length,
            width,
        }
    }

    pub fn size(&self) -> Rect {
        Rect::new(self.length, self.width)
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} @ ({}, {})", self.length, self.width, self.x, self.y)
    }
}

/// One placed item copy. `rotated` is relative to the item rect the caller
/// supplied to the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
    pub rotated: bool,
}

/// Result of one solve: the best item count found and the block decomposition
/// achieving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub count: u64,
    pub blocks: Vec<Block>,
    pub container: Rect,
    pub item: Rect,
}

impl Solution {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Fraction of the container area covered by placed items, in percent.
    pub fn utilization_percent(&self) -> f64 {
        let container_area = self.container.area();
        if container_area == 0 {
            return 0.0;
        }
        (self.count * self.item.area()) as f64 / container_area as f64 * 100.0
    }
}

/// Accepts JSON numbers written as floats (e.g. `3.0`) where an unsigned
/// integer is expected. Some HTTP clients serialize all numbers that way.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value > u32::MAX as f64 || value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}
