//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │    Category     │   │    Currency     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  "USD", "EUR"   │       │
//! │  │  title, author  │   │  name           │   │  ISO 4217       │       │
//! │  │  price (Money)  │   │  icon           │   └─────────────────┘       │
//! │  │  discount       │   └─────────────────┘                              │
//! │  │  reviews ───────┼──► Review { user, rating, comment, date }         │
//! │  └─────────────────┘                         ┌─────────────────┐       │
//! │                                              │    Discount     │       │
//! │                                              │  ─────────────  │       │
//! │                                              │  bps (u32)      │       │
//! │                                              │  1500 = 15%     │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog records are owned by the catalog collaborator and are read-only
//! to the cart; the cart copies what it needs when an item is added.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_currency_code, validate_discount_bps};

// =============================================================================
// Discount
// =============================================================================

/// A percentage discount represented in basis points.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%, so 1500 bps = 15%. Integer storage keeps the
/// discounted price deterministic.
///
/// ## Range
/// Always within 0..=10000 (0% to 100%). The constructors clamp, while
/// deserialization rejects out-of-range values so a malformed catalog
/// fails to load instead of being silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Discount(u32);

impl Discount {
    /// 100% expressed in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a discount from basis points, clamped to 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            Discount(Self::MAX_BPS)
        } else {
            Discount(bps)
        }
    }

    /// Creates a discount from a percentage such as `15.0`.
    ///
    /// Negative and non-finite values become zero, values above 100 become
    /// 100.
    ///
    /// ```rust
    /// use bookshelf_core::types::Discount;
    ///
    /// assert_eq!(Discount::from_percentage(15.0).bps(), 1500);
    /// assert_eq!(Discount::from_percentage(-5.0).bps(), 0);
    /// assert_eq!(Discount::from_percentage(250.0).bps(), 10000);
    /// ```
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Discount::zero();
        }
        // float → int casts saturate, the clamp handles the rest
        Discount::from_bps((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the discount as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Discount(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::zero()
    }
}

impl<'de> Deserialize<'de> for Discount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bps = u32::deserialize(deserializer)?;
        validate_discount_bps(bps).map_err(serde::de::Error::custom)?;
        Ok(Discount(bps))
    }
}

// =============================================================================
// Currency
// =============================================================================

/// An ISO 4217 currency code.
///
/// Serialized as the bare code (`"USD"`). Parsing goes through
/// [`validate_currency_code`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub struct Currency(String);

impl Currency {
    /// The storefront's default currency.
    pub fn usd() -> Self {
        Currency("USD".to_string())
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Display symbol for the handful of currencies the storefront knows;
    /// everything else falls back to the code itself.
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" | "MXN" | "ARS" | "CLP" | "COP" => "$",
            "EUR" => "€",
            "GBP" => "£",
            other => other,
        }
    }

    /// Formats an amount for display, e.g. `$21.24` or `€21.24`.
    ///
    /// Codes without a known symbol are rendered as `JPY 21.24`.
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let symbol = self.symbol();
        let separator = if symbol == self.0 { " " } else { "" };
        format!(
            "{}{}{}{}.{:02}",
            sign,
            symbol,
            separator,
            amount.dollars().abs(),
            amount.cents_part()
        )
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        validate_currency_code(code)?;
        Ok(Currency(code.to_string()))
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Category
// =============================================================================

/// A browse category shown in the horizontal category strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Icon name understood by the presentation layer.
    pub icon: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Category {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// A shopper review attached to a catalog item. Read-only to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user: String,
    /// 0-5, half stars allowed.
    pub rating: f32,
    #[serde(default)]
    pub comment: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(default)]
    pub likes: u32,
}

impl Review {
    pub fn new(
        id: impl Into<String>,
        user: impl Into<String>,
        rating: f32,
        comment: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Review {
            id: id.into(),
            user: user.into(),
            rating,
            comment: comment.into(),
            date,
            likes: 0,
        }
    }

    pub fn with_likes(mut self, likes: u32) -> Self {
        self.likes = likes;
        self
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A book offered by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique identifier.
    pub id: String,

    pub title: String,

    pub author: String,

    /// Unit price before discount.
    pub price: Money,

    /// Optional percentage discount ("15% OFF" badge).
    #[serde(default)]
    pub discount: Option<Discount>,

    /// Cover image reference (URL).
    #[serde(default)]
    pub image: String,

    /// Average review rating, 0-5.
    #[serde(default)]
    pub rating: Option<f32>,

    #[serde(default)]
    pub genre: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Browse category this item is listed under.
    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default)]
    pub pages: Option<u32>,

    #[serde(default)]
    pub isbn: Option<String>,

    /// Newest first, as the detail sheet shows them.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl CatalogItem {
    /// Creates an item with the required fields; everything else starts empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Money,
    ) -> Self {
        CatalogItem {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            price,
            discount: None,
            image: String::new(),
            rating: None,
            genre: None,
            language: None,
            tags: Vec::new(),
            category_id: None,
            pages: None,
            isbn: None,
            reviews: Vec::new(),
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
        self.reviews = reviews;
        self
    }

    /// Whether the item carries a non-zero discount badge.
    pub fn has_discount(&self) -> bool {
        self.discount.is_some_and(|d| !d.is_zero())
    }

    /// The price a shopper actually pays for one unit.
    #[inline]
    pub fn discounted_price(&self) -> Money {
        crate::cart::discounted_unit_price(self.price, self.discount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
