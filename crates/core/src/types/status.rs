//! Status enums for various entities.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Order lifecycle status as reported by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Badge colour used by the orders table.
    #[must_use]
    pub const fn badge_color(&self) -> &'static str {
        match self {
            Self::Pending => "#9E9E9E",
            Self::Confirmed => "#1976D2",
            Self::Processing => "#FFA000",
            Self::Shipped => "#0288D1",
            Self::Delivered => "#2E7D32",
            Self::Cancelled => "#D32F2F",
        }
    }
}

/// Stock availability flag.
///
/// The backend stores this as the strings `"Yes"` / `"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StockStatus {
    #[default]
    #[serde(rename = "Yes", alias = "yes", alias = "true")]
    InStock,
    #[serde(rename = "No", alias = "no", alias = "false")]
    OutOfStock,
}

impl StockStatus {
    /// Wire value sent in form fields.
    #[must_use]
    pub const fn as_wire(&self) -> &'static str {
        match self {
            Self::InStock => "Yes",
            Self::OutOfStock => "No",
        }
    }

    /// Label shown in listings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }

    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        matches!(self, Self::InStock)
    }
}

impl From<bool> for StockStatus {
    fn from(in_stock: bool) -> Self {
        if in_stock {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }
}

/// Customer account activity, used by the users listing filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CustomerStatus {
    Active,
    Offline,
}

impl From<bool> for CustomerStatus {
    fn from(is_active: bool) -> Self {
        if is_active { Self::Active } else { Self::Offline }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        assert_eq!("Delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_stock_status_wire_format() {
        let status: StockStatus = serde_json::from_str("\"No\"").unwrap();
        assert_eq!(status, StockStatus::OutOfStock);
        assert_eq!(StockStatus::from(true).as_wire(), "Yes");
        assert_eq!(StockStatus::OutOfStock.label(), "Out of Stock");
    }

    #[test]
    fn test_customer_status_from_flag() {
        assert_eq!(CustomerStatus::from(false), CustomerStatus::Offline);
        assert_eq!("active".parse::<CustomerStatus>().unwrap(), CustomerStatus::Active);
    }
}
