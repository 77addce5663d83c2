//! Category quantizer
//!
//! Snaps a continuous reading onto the ordered boundary list of its dimension:
//! the result is the smallest boundary `b` with `value <= b`, or
//! [`Category::AboveMaximum`] when the value exceeds every boundary.
//!
//! ```text
//! boundaries:   22      24      29      30
//!   ────────────┤───────┤───────┤───────┤──────────▶ °C
//!   category:  22      24      29      30   AboveMaximum
//!   21.0 → 22   22.0 → 22   23.5 → 24   31.0 → AboveMaximum
//! ```
//!
//! Buckets are closed on the boundary side: a reading equal to a boundary lands
//! in that boundary's bucket. The function is total. NaN compares false against
//! every boundary and therefore ends up in [`Category::AboveMaximum`].

use core::cmp::Ordering;
use core::fmt;

use heapless::Vec;

use crate::constants::MAX_BOUNDARIES;
use crate::errors::{ConfigError, ConfigResult};
use crate::reading::{Dimension, SensorReading};

/// Representative value a reading quantizes to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Category {
    /// Bucket whose upper (inclusive) boundary is the contained value
    AtMost(f32),
    /// Above the largest configured boundary
    AboveMaximum,
}

impl Category {
    /// Boundary value, `None` for the sentinel
    pub const fn boundary(&self) -> Option<f32> {
        match self {
            Category::AtMost(bound) => Some(*bound),
            Category::AboveMaximum => None,
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Category::AtMost(a), Category::AtMost(b)) => a.partial_cmp(b),
            (Category::AtMost(_), Category::AboveMaximum) => Some(Ordering::Less),
            (Category::AboveMaximum, Category::AtMost(_)) => Some(Ordering::Greater),
            (Category::AboveMaximum, Category::AboveMaximum) => Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::AtMost(bound) => write!(f, "{}", bound),
            Category::AboveMaximum => f.write_str(">max"),
        }
    }
}

#[cfg(feature = "serde")]
mod category_serde {
    use super::Category;
    use core::fmt;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Config spelling of the sentinel
    pub const ABOVE_MAXIMUM: &str = "above_maximum";

    impl Serialize for Category {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Category::AtMost(bound) => serializer.serialize_f32(*bound),
                Category::AboveMaximum => serializer.serialize_str(ABOVE_MAXIMUM),
            }
        }
    }

    struct CategoryVisitor;

    impl<'de> Visitor<'de> for CategoryVisitor {
        type Value = Category;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a boundary number or \"{}\"", ABOVE_MAXIMUM)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Category, E> {
            Ok(Category::AtMost(v as f32))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Category, E> {
            Ok(Category::AtMost(v as f32))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Category, E> {
            Ok(Category::AtMost(v as f32))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Category, E> {
            if v == ABOVE_MAXIMUM {
                Ok(Category::AboveMaximum)
            } else {
                Err(E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }
    }

    impl<'de> Deserialize<'de> for Category {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(CategoryVisitor)
        }
    }
}

/// Quantized form of one reading, one category per dimension
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "(Category, Category, Category)", into = "(Category, Category, Category)")
)]
pub struct QuantizedTriple {
    /// Temperature category
    pub temperature: Category,
    /// Humidity category
    pub humidity: Category,
    /// Light category
    pub light: Category,
}

impl QuantizedTriple {
    /// Build from three categories
    pub const fn new(temperature: Category, humidity: Category, light: Category) -> Self {
        Self { temperature, humidity, light }
    }

    /// Build from three in-range boundary values
    pub const fn at_most(temperature: f32, humidity: f32, light: f32) -> Self {
        Self::new(
            Category::AtMost(temperature),
            Category::AtMost(humidity),
            Category::AtMost(light),
        )
    }

    /// Category for one dimension
    pub const fn get(&self, dimension: Dimension) -> Category {
        match dimension {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Light => self.light,
        }
    }
}

impl From<(Category, Category, Category)> for QuantizedTriple {
    fn from((temperature, humidity, light): (Category, Category, Category)) -> Self {
        Self::new(temperature, humidity, light)
    }
}

impl From<QuantizedTriple> for (Category, Category, Category) {
    fn from(triple: QuantizedTriple) -> Self {
        (triple.temperature, triple.humidity, triple.light)
    }
}

impl fmt::Display for QuantizedTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.temperature, self.humidity, self.light)
    }
}

/// Ordered, validated boundary list for one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBoundaries {
    dimension: Dimension,
    bounds: Vec<f32, MAX_BOUNDARIES>,
}

impl CategoryBoundaries {
    /// Validate and store a boundary list
    ///
    /// The list must be non-empty, finite and strictly increasing.
    pub fn new(dimension: Dimension, bounds: &[f32]) -> ConfigResult<Self> {
        if bounds.is_empty() {
            return Err(ConfigError::EmptyBoundaries { dimension });
        }

        let mut stored: Vec<f32, MAX_BOUNDARIES> = Vec::new();
        for (index, &bound) in bounds.iter().enumerate() {
            if !bound.is_finite() {
                return Err(ConfigError::NonFiniteBoundary { dimension, index });
            }
            if let Some(&previous) = stored.last() {
                if bound <= previous {
                    return Err(ConfigError::UnorderedBoundaries { dimension, previous, next: bound });
                }
            }
            stored.push(bound).map_err(|_| ConfigError::CapacityExceeded {
                what: "category boundaries",
                limit: MAX_BOUNDARIES,
            })?;
        }

        Ok(Self { dimension, bounds: stored })
    }

    /// Dimension these boundaries belong to
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Boundary values in increasing order
    pub fn bounds(&self) -> &[f32] {
        &self.bounds
    }

    /// Map a raw value to its category
    pub fn quantize(&self, value: f32) -> Category {
        self.bounds
            .iter()
            .find(|&&bound| value <= bound)
            .map(|&bound| Category::AtMost(bound))
            .unwrap_or(Category::AboveMaximum)
    }

    /// Every category this dimension can produce, lowest first
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.bounds
            .iter()
            .map(|&bound| Category::AtMost(bound))
            .chain(core::iter::once(Category::AboveMaximum))
    }

    /// Whether `category` is reachable through [`Self::quantize`]
    pub fn contains(&self, category: Category) -> bool {
        match category {
            Category::AtMost(bound) => self.bounds.contains(&bound),
            Category::AboveMaximum => true,
        }
    }
}

/// Boundary lists for all three dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Quantizer {
    temperature: CategoryBoundaries,
    humidity: CategoryBoundaries,
    light: CategoryBoundaries,
}

impl Quantizer {
    /// Validate all three boundary lists
    pub fn new(temperature: &[f32], humidity: &[f32], light: &[f32]) -> ConfigResult<Self> {
        Ok(Self {
            temperature: CategoryBoundaries::new(Dimension::Temperature, temperature)?,
            humidity: CategoryBoundaries::new(Dimension::Humidity, humidity)?,
            light: CategoryBoundaries::new(Dimension::Light, light)?,
        })
    }

    /// Boundaries for one dimension
    pub fn boundaries(&self, dimension: Dimension) -> &CategoryBoundaries {
        match dimension {
            Dimension::Temperature => &self.temperature,
            Dimension::Humidity => &self.humidity,
            Dimension::Light => &self.light,
        }
    }

    /// Quantize a full reading
    pub fn quantize(&self, reading: &SensorReading) -> QuantizedTriple {
        QuantizedTriple::new(
            self.temperature.quantize(reading.temperature),
            self.humidity.quantize(reading.humidity),
            self.light.quantize(reading.light),
        )
    }

    /// Check that every category of `triple` can actually be produced
    pub fn check_triple(&self, triple: &QuantizedTriple) -> ConfigResult<()> {
        for dimension in Dimension::ALL {
            let category = triple.get(dimension);
            if !self.boundaries(dimension).contains(category) {
                return Err(ConfigError::UnknownCategory {
                    dimension,
                    value: category.boundary().unwrap_or(f32::INFINITY),
                });
            }
        }
        Ok(())
    }
}
