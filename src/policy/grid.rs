//! GridPolicy v1: fixed column/row grid for layered layouts.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Coordinates are quantized before hashing (multiply by 1e6, round to
//! `i64`) so `params_hash` does not depend on float formatting.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_GRID_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Default x of the first column.
pub const DEFAULT_ORIGIN_X: f64 = 120.0;
/// Default y of the first row.
pub const DEFAULT_ORIGIN_Y: f64 = 80.0;
/// Default distance between columns (depth levels).
pub const DEFAULT_COLUMN_SPACING: f64 = 320.0;
/// Default distance between rows within a column.
pub const DEFAULT_ROW_SPACING: f64 = 140.0;

fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantizedGridParams {
    version: String,
    origin_x: i64,
    origin_y: i64,
    column_spacing: i64,
    row_spacing: i64,
}

/// Grid placement policy.
///
/// Depth selects the column and the rank within a depth group selects the
/// row: `x = origin_x + depth * column_spacing`,
/// `y = origin_y + index * row_spacing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPolicy {
    /// Policy version identifier.
    pub version: String,
    /// x of column 0.
    pub origin_x: f64,
    /// y of row 0.
    pub origin_y: f64,
    /// Horizontal distance between columns.
    pub column_spacing: f64,
    /// Vertical distance between rows.
    pub row_spacing: f64,
}

impl GridPolicy {
    /// Create a policy with custom geometry.
    pub fn new(origin_x: f64, origin_y: f64, column_spacing: f64, row_spacing: f64) -> Self {
        Self {
            version: DEFAULT_GRID_POLICY_VERSION.to_string(),
            origin_x,
            origin_y,
            column_spacing,
            row_spacing,
        }
    }

    /// Load geometry from environment variables, falling back to defaults.
    ///
    /// Reads `LAYOUT_ORIGIN_X`, `LAYOUT_ORIGIN_Y`, `LAYOUT_COLUMN_SPACING`
    /// and `LAYOUT_ROW_SPACING`.
    pub fn from_env() -> Self {
        fn var_or(name: &str, default: f64) -> f64 {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        }

        Self::new(
            var_or("LAYOUT_ORIGIN_X", DEFAULT_ORIGIN_X),
            var_or("LAYOUT_ORIGIN_Y", DEFAULT_ORIGIN_Y),
            var_or("LAYOUT_COLUMN_SPACING", DEFAULT_COLUMN_SPACING),
            var_or("LAYOUT_ROW_SPACING", DEFAULT_ROW_SPACING),
        )
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// x coordinate of a (possibly negative) column.
    pub fn column_x(&self, column: i64) -> f64 {
        self.origin_x + column as f64 * self.column_spacing
    }

    /// y coordinate of a row.
    pub fn row_y(&self, index: usize) -> f64 {
        self.origin_y + index as f64 * self.row_spacing
    }

    /// Column nearest to an x coordinate. Halves round toward +infinity.
    pub fn column_of(&self, x: f64) -> i64 {
        if self.column_spacing == 0.0 {
            return 0;
        }
        ((x - self.origin_x) / self.column_spacing + 0.5).floor() as i64
    }

    /// Hash of the quantized parameters.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedGridParams {
        QuantizedGridParams {
            version: self.version.clone(),
            origin_x: quantize_float(self.origin_x),
            origin_y: quantize_float(self.origin_y),
            column_spacing: quantize_float(self.column_spacing),
            row_spacing: quantize_float(self.row_spacing),
        }
    }
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ORIGIN_X,
            DEFAULT_ORIGIN_Y,
            DEFAULT_COLUMN_SPACING,
            DEFAULT_ROW_SPACING,
        )
    }
}
