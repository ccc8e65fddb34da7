// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Collision category registry
//!
//! Categories are single-bit masks used together with each body's collision
//! and sensor filters to gate pairwise collision checks. The registry maps
//! human-readable tags to bit positions so scenes can refer to categories by
//! name. Capacity is bounded by the 32 bits of the mask; requesting a 33rd
//! distinct tag is a configuration error.
//!
//! Each [`World`](crate::world::World) owns its own registry so tests and
//! independent simulations stay isolated.

/// Registry mapping category tags to single-bit masks
///
/// # Examples
///
/// ```
/// use impulse2d::category::CategoryRegistry;
///
/// let mut registry = CategoryRegistry::new();
/// let ball = registry.category_for("ball").unwrap();
/// let wall = registry.category_for("wall").unwrap();
/// assert_eq!(ball, 1);
/// assert_eq!(wall, 2);
/// // Repeated requests return the existing bit
/// assert_eq!(registry.category_for("ball").unwrap(), ball);
/// assert_eq!(registry.tag_for(wall), Some("wall"));
/// ```
#[derive(Debug, Default)]
pub struct CategoryRegistry {
    records: Vec<(String, u32)>,
    count: u32,
}

impl CategoryRegistry {
    /// Maximum number of categories (bit width of the mask)
    pub const MAX_COUNT: u32 = 32;

    /// Mask matching every category
    pub const FULL_MASK: u32 = 0xFFFF_FFFF;

    /// Create an empty registry
    pub fn new() -> Self {
        CategoryRegistry {
            records: Vec::new(),
            count: 0,
        }
    }

    /// Allocate the next free category bit
    ///
    /// Returns an error once all 32 bits have been handed out.
    pub fn next(&mut self) -> Result<u32, String> {
        if self.count >= Self::MAX_COUNT {
            return Err(format!(
                "Max category count ({}) exceeded",
                Self::MAX_COUNT
            ));
        }
        let category = 1u32 << self.count;
        self.count += 1;
        Ok(category)
    }

    /// Get the category bit for `tag`, allocating one if the tag is new
    pub fn category_for(&mut self, tag: &str) -> Result<u32, String> {
        if let Some((_, category)) = self.records.iter().find(|(t, _)| t == tag) {
            return Ok(*category);
        }
        let category = self.next()?;
        self.records.push((tag.to_string(), category));
        Ok(category)
    }

    /// Look up the tag registered for a category bit
    pub fn tag_for(&self, category: u32) -> Option<&str> {
        self.records
            .iter()
            .find(|(_, c)| *c == category)
            .map(|(t, _)| t.as_str())
    }

    /// Number of categories allocated so far
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Whether no categories have been allocated
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
