//! The editable product record.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use fabric_core::{CatalogError, Category, ProductTag, StockStatus, SubCategory};

use super::submission::ProductFields;
use crate::backend::Product;

/// Errors raised while applying user input to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Select a category before choosing a sub-category")]
    CategoryNotSelected,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Named numeric meterage attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measurement {
    PaintMeter,
    ShirtMeter,
}

impl Measurement {
    pub const ALL: [Self; 2] = [Self::PaintMeter, Self::ShirtMeter];

    /// Form and multipart field name.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::PaintMeter => "paintMeter",
            Self::ShirtMeter => "shirtMeter",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PaintMeter => "Paint meter",
            Self::ShirtMeter => "Shirt meter",
        }
    }
}

/// In-progress product attributes.
///
/// The category, sub-category, tag and feature fields are private so the
/// sub-category can never point outside the selected category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    category: Option<Category>,
    sub_category: Option<SubCategory>,
    pub stock: StockStatus,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub description: String,
    tags: BTreeSet<ProductTag>,
    features: Vec<String>,
    measurements: BTreeMap<Measurement, Decimal>,
}

impl ProductDraft {
    /// Seed a draft from a listed product.
    ///
    /// Labels the taxonomy does not know are dropped, as is a sub-category
    /// that does not belong to the product's category.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let mut draft = Self {
            name: product.product_name.clone(),
            stock: product.in_stock,
            price: product.price,
            discount_price: product.discount_price,
            description: product.description.clone(),
            tags: product
                .tags
                .iter()
                .filter_map(|tag| ProductTag::parse(tag).ok())
                .collect(),
            features: product
                .features
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
            ..Self::default()
        };

        draft.set_category(Category::parse(&product.category).ok());
        if let Ok(sub_category) = SubCategory::parse(&product.sub_category) {
            let _ = draft.set_sub_category(Some(sub_category));
        }
        draft.set_measurement(Measurement::PaintMeter, product.paint_meter);
        draft.set_measurement(Measurement::ShirtMeter, product.shirt_meter);
        draft
    }

    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub const fn sub_category(&self) -> Option<SubCategory> {
        self.sub_category
    }

    /// Change the category, clearing a sub-category that no longer fits.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        let still_valid = match (category, self.sub_category) {
            (Some(category), Some(sub_category)) => category.contains(sub_category),
            (_, None) => true,
            (None, Some(_)) => false,
        };
        if !still_valid {
            self.sub_category = None;
        }
    }

    /// Choose a sub-category under the current category.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::CategoryNotSelected`] when no category is set and
    /// [`CatalogError::SubCategoryMismatch`] when the option belongs to a
    /// different category. The draft is unchanged on error.
    pub fn set_sub_category(&mut self, sub_category: Option<SubCategory>) -> Result<(), DraftError> {
        if let Some(sub_category) = sub_category {
            let category = self.category.ok_or(DraftError::CategoryNotSelected)?;
            if !category.contains(sub_category) {
                return Err(CatalogError::SubCategoryMismatch {
                    category,
                    sub_category,
                }
                .into());
            }
        }
        self.sub_category = sub_category;
        Ok(())
    }

    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<ProductTag> {
        &self.tags
    }

    /// Replace the tag selection.
    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = ProductTag>) {
        self.tags = tags.into_iter().collect();
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Append a feature. Blank input is ignored. Returns whether it was added.
    pub fn add_feature(&mut self, input: &str) -> bool {
        let feature = input.trim();
        if feature.is_empty() {
            return false;
        }
        self.features.push(feature.to_string());
        true
    }

    /// Remove the feature at `index`, if any.
    pub fn remove_feature(&mut self, index: usize) -> Option<String> {
        (index < self.features.len()).then(|| self.features.remove(index))
    }

    #[must_use]
    pub fn measurement(&self, measurement: Measurement) -> Option<Decimal> {
        self.measurements.get(&measurement).copied()
    }

    pub fn set_measurement(&mut self, measurement: Measurement, value: Option<Decimal>) {
        match value {
            Some(value) => self.measurements.insert(measurement, value),
            None => self.measurements.remove(&measurement),
        };
    }

    /// Apply a submitted field form.
    ///
    /// Everything is validated before anything is assigned, so a rejected
    /// form leaves the draft as it was. When the form changes the category,
    /// a sub-category that only fit the old category is dropped rather than
    /// rejected, since the browser still posts the stale selection.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] for unknown labels, unparseable numbers or a
    /// sub-category outside the chosen category.
    pub fn apply_form(&mut self, form: &DraftForm) -> Result<(), DraftError> {
        let category = non_blank(&form.category).map(Category::parse).transpose()?;
        let mut sub_category = non_blank(&form.sub_category)
            .map(SubCategory::parse)
            .transpose()?;
        let tags = form
            .tags
            .iter()
            .map(String::as_str)
            .filter_map(non_blank)
            .map(ProductTag::parse)
            .collect::<Result<BTreeSet<_>, _>>()?;
        let price = parse_decimal("price", &form.price)?;
        let discount_price = parse_decimal("discountPrice", &form.discount_price)?;
        let paint_meter = parse_decimal(Measurement::PaintMeter.field_name(), &form.paint_meter)?;
        let shirt_meter = parse_decimal(Measurement::ShirtMeter.field_name(), &form.shirt_meter)?;

        if let Some(chosen) = sub_category {
            match category {
                None => return Err(DraftError::CategoryNotSelected),
                Some(category) if !category.contains(chosen) => {
                    if self.category == Some(category) {
                        return Err(CatalogError::SubCategoryMismatch {
                            category,
                            sub_category: chosen,
                        }
                        .into());
                    }
                    sub_category = None;
                }
                Some(_) => {}
            }
        }

        self.name = form.name.trim().to_string();
        self.set_category(category);
        self.sub_category = sub_category;
        self.stock = StockStatus::from(form.in_stock);
        self.price = price;
        self.discount_price = discount_price;
        self.description = form.description.trim().to_string();
        self.tags = tags;
        self.set_measurement(Measurement::PaintMeter, paint_meter);
        self.set_measurement(Measurement::ShirtMeter, shirt_meter);
        Ok(())
    }

    /// Reset to an empty draft.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Flatten into the fields sent to the backend.
    #[must_use]
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            category: self.category,
            sub_category: self.sub_category,
            stock: self.stock,
            price: self.price,
            discount_price: self.discount_price,
            description: self.description.clone(),
            tags: self.tags.iter().copied().collect(),
            features: self.features.clone(),
            paint_meter: self.measurement(Measurement::PaintMeter),
            shirt_meter: self.measurement(Measurement::ShirtMeter),
        }
    }
}

/// Raw field values posted by the editor form.
///
/// Built from URL-encoded pairs so repeated `tags` keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub in_stock: bool,
    pub price: String,
    pub discount_price: String,
    pub description: String,
    pub tags: Vec<String>,
    pub paint_meter: String,
    pub shirt_meter: String,
}

impl DraftForm {
    /// Collect form fields from decoded key/value pairs. Unknown keys are
    /// ignored; the stock checkbox counts as checked when present with any
    /// value other than `no`/`false`.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "productName" => form.name = value,
                "category" => form.category = value,
                "subCategory" => form.sub_category = value,
                "inStock" => {
                    form.in_stock = !matches!(
                        value.trim().to_ascii_lowercase().as_str(),
                        "no" | "false"
                    );
                }
                "price" => form.price = value,
                "discountPrice" => form.discount_price = value,
                "description" => form.description = value,
                "tags" => form.tags.push(value),
                "paintMeter" => form.paint_meter = value,
                "shirtMeter" => form.shirt_meter = value,
                _ => {}
            }
        }
        form
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Option<Decimal>, DraftError> {
    non_blank(value)
        .map(|text| {
            Decimal::from_str(text).map_err(|_| DraftError::InvalidNumber {
                field,
                value: value.to_string(),
            })
        })
        .transpose()
}
