//! Catalog taxonomy: fabric categories, their sub-categories, and the closed
//! tag vocabulary.
//!
//! Names on the wire are the human-readable labels the backend stores
//! (e.g. `"Cotton Fabric"`, `"Banarasi Silk"`, `"New Arrival"`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Errors raised when a label does not belong to the taxonomy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Unknown sub-category: {0}")]
    UnknownSubCategory(String),
    #[error("Unknown tag: {0}")]
    UnknownTag(String),
    #[error("{sub_category} is not a sub-category of {category}")]
    SubCategoryMismatch {
        category: Category,
        sub_category: SubCategory,
    },
}

/// Top-level fabric category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[serde(rename = "Cotton Fabric")]
    #[strum(serialize = "Cotton Fabric")]
    Cotton,
    #[serde(rename = "Silk Fabric")]
    #[strum(serialize = "Silk Fabric")]
    Silk,
    #[serde(rename = "Linen Fabric")]
    #[strum(serialize = "Linen Fabric")]
    Linen,
}

impl Category {
    /// Parse a category from its label (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] for labels outside the taxonomy.
    pub fn parse(label: &str) -> Result<Self, CatalogError> {
        Self::from_str(label.trim()).map_err(|_| CatalogError::UnknownCategory(label.to_owned()))
    }

    /// Sub-categories offered under this category, in display order.
    #[must_use]
    pub const fn sub_categories(&self) -> &'static [SubCategory] {
        match self {
            Self::Cotton => &[
                SubCategory::PlainCotton,
                SubCategory::PrintedCotton,
                SubCategory::OrganicCotton,
            ],
            Self::Silk => &[
                SubCategory::RawSilk,
                SubCategory::BanarasiSilk,
                SubCategory::TussarSilk,
            ],
            Self::Linen => &[
                SubCategory::PlainLinen,
                SubCategory::EmbroideredLinen,
                SubCategory::BlendedLinen,
            ],
        }
    }

    /// Whether `sub_category` is one of this category's options.
    #[must_use]
    pub fn contains(&self, sub_category: SubCategory) -> bool {
        self.sub_categories().contains(&sub_category)
    }

    /// All categories in display order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// Second-level fabric category. Each belongs to exactly one [`Category`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum SubCategory {
    #[serde(rename = "Plain Cotton")]
    #[strum(serialize = "Plain Cotton")]
    PlainCotton,
    #[serde(rename = "Printed Cotton")]
    #[strum(serialize = "Printed Cotton")]
    PrintedCotton,
    #[serde(rename = "Organic Cotton")]
    #[strum(serialize = "Organic Cotton")]
    OrganicCotton,
    #[serde(rename = "Raw Silk")]
    #[strum(serialize = "Raw Silk")]
    RawSilk,
    #[serde(rename = "Banarasi Silk")]
    #[strum(serialize = "Banarasi Silk")]
    BanarasiSilk,
    #[serde(rename = "Tussar Silk")]
    #[strum(serialize = "Tussar Silk")]
    TussarSilk,
    #[serde(rename = "Plain Linen")]
    #[strum(serialize = "Plain Linen")]
    PlainLinen,
    #[serde(rename = "Embroidered Linen")]
    #[strum(serialize = "Embroidered Linen")]
    EmbroideredLinen,
    #[serde(rename = "Blended Linen")]
    #[strum(serialize = "Blended Linen")]
    BlendedLinen,
}

impl SubCategory {
    /// Parse a sub-category from its label (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSubCategory`] for labels outside the taxonomy.
    pub fn parse(label: &str) -> Result<Self, CatalogError> {
        Self::from_str(label.trim())
            .map_err(|_| CatalogError::UnknownSubCategory(label.to_owned()))
    }

    /// The category this sub-category belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::PlainCotton | Self::PrintedCotton | Self::OrganicCotton => Category::Cotton,
            Self::RawSilk | Self::BanarasiSilk | Self::TussarSilk => Category::Silk,
            Self::PlainLinen | Self::EmbroideredLinen | Self::BlendedLinen => Category::Linen,
        }
    }
}

/// Closed tag vocabulary for merchandising badges.
///
/// Declaration order is display order; `Ord` follows it so tag sets render
/// consistently.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ProductTag {
    #[serde(rename = "New Arrival")]
    #[strum(serialize = "New Arrival")]
    NewArrival,
    #[serde(rename = "Best Seller")]
    #[strum(serialize = "Best Seller")]
    BestSeller,
    #[serde(rename = "Limited Edition")]
    #[strum(serialize = "Limited Edition")]
    LimitedEdition,
    Discount,
    Trending,
}

impl ProductTag {
    /// Parse a tag from its label (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownTag`] for labels outside the vocabulary.
    pub fn parse(label: &str) -> Result<Self, CatalogError> {
        Self::from_str(label.trim()).map_err(|_| CatalogError::UnknownTag(label.to_owned()))
    }

    /// All tags in display order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}
