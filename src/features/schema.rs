//! The frozen encoded-column schema.
//!
//! A `Schema` is created once, from the training split only, and never changes
//! shape afterwards. Every encoded row — training or serving — is aligned to
//! it by construction, which removes the classic failure mode of column drift
//! between train time and inference time.

use serde::{Deserialize, Serialize};

use crate::domain::{CATEGORICAL_FEATURE, NUMERIC_FEATURES};
use crate::error::AppError;

/// Ordered list of encoded column names plus the category bookkeeping needed
/// to reproduce the encoding at serving time.
///
/// Column layout: the numeric features in canonical order, then one
/// `Neighborhood_<cat>` indicator per non-reference category.
///
/// Reference-category rule: observed categories are sorted lexicographically
/// (byte order) and the first becomes the reference, represented by all-zero
/// indicators. This matches the drop-first convention of the encoding library
/// the original pipeline delegated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Encoded column names, in order.
    pub columns: Vec<String>,
    /// Every category observed at fit time (sorted), including the reference.
    pub categories: Vec<String>,
    /// The dropped category, implicitly encoded as all-zero indicators.
    pub reference_category: String,
}

impl Schema {
    /// Build a schema from the category values observed in the training split.
    pub fn from_categories(observed: impl IntoIterator<Item = String>) -> Result<Self, AppError> {
        let mut categories: Vec<String> = observed.into_iter().collect();
        categories.sort();
        categories.dedup();

        let reference_category = categories
            .first()
            .cloned()
            .ok_or_else(|| AppError::no_data("Cannot fit a schema from zero category values."))?;

        let mut columns: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        columns.extend(
            categories
                .iter()
                .skip(1)
                .map(|c| format!("{CATEGORICAL_FEATURE}_{c}")),
        );

        Ok(Self {
            columns,
            categories,
            reference_category,
        })
    }

    /// Total encoded column count.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The non-reference categories, in indicator-column order.
    pub fn indicator_categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().skip(1).map(String::as_str)
    }

    /// Structural self-check, used when reloading a persisted schema.
    ///
    /// Guards against hand-edited or truncated artifact files: the column list
    /// must be the numeric features followed by exactly one indicator per
    /// non-reference category.
    pub fn validate(&self) -> Result<(), AppError> {
        let expected = NUMERIC_FEATURES.len() + self.categories.len().saturating_sub(1);
        if self.columns.len() != expected {
            return Err(AppError::input(format!(
                "Schema is inconsistent: {} columns but {} expected from {} categories.",
                self.columns.len(),
                expected,
                self.categories.len()
            )));
        }
        if self.categories.first() != Some(&self.reference_category) {
            return Err(AppError::input(format!(
                "Schema is inconsistent: reference category '{}' is not the first sorted category.",
                self.reference_category
            )));
        }
        Ok(())
    }
}
