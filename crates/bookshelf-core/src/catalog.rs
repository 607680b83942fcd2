//! # Catalog
//!
//! In-memory, read-only catalog: browse categories, the featured shelf
//! (discounted books), the new-arrivals shelf, and the filter panel.
//!
//! The cart never mutates the catalog. It only copies the fields it needs
//! into a [`crate::cart::CartLine`] when an item is added.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CatalogItem, Category};
use crate::validation::{
    validate_catalog_item, validate_item_id, validate_rating, validate_search_query,
    validate_text, ValidationResult,
};

// =============================================================================
// Shelves
// =============================================================================

/// Which horizontal list on the home screen an item appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shelf {
    Featured,
    NewArrivals,
}

#[derive(Debug, Clone)]
struct Entry {
    shelf: Shelf,
    item: CatalogItem,
}

// =============================================================================
// Catalog
// =============================================================================

/// The storefront catalog.
///
/// ## Invariants
/// - Item ids are unique across both shelves
/// - Every item passed [`validate_catalog_item`]
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    entries: Vec<Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a browse category.
    pub fn add_category(&mut self, category: Category) -> CoreResult<()> {
        validate_item_id(&category.id)?;
        validate_text("name", &category.name)?;

        if self.categories.iter().any(|c| c.id == category.id) {
            return Err(CoreError::DuplicateItem(category.id));
        }

        self.categories.push(category);
        Ok(())
    }

    /// Adds an item to a shelf after validating it.
    pub fn add_item(&mut self, item: CatalogItem, shelf: Shelf) -> CoreResult<()> {
        validate_catalog_item(&item)?;

        if self.find(&item.id).is_some() {
            return Err(CoreError::DuplicateItem(item.id));
        }

        self.entries.push(Entry { shelf, item });
        Ok(())
    }

    /// Looks up an item by id.
    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.entries.iter().map(|e| &e.item).find(|item| item.id == id)
    }

    /// Like [`Catalog::find`] but with a typed error.
    pub fn get(&self, id: &str) -> CoreResult<&CatalogItem> {
        self.find(id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn featured(&self) -> impl Iterator<Item = &CatalogItem> {
        self.shelf(Shelf::Featured)
    }

    pub fn new_arrivals(&self) -> impl Iterator<Item = &CatalogItem> {
        self.shelf(Shelf::NewArrivals)
    }

    pub fn all(&self) -> impl Iterator<Item = &CatalogItem> {
        self.entries.iter().map(|e| &e.item)
    }

    /// Items listed under a browse category.
    pub fn in_category<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a CatalogItem> {
        self.all()
            .filter(move |item| item.category_id.as_deref() == Some(category_id))
    }

    /// Items matching every criterion of `filter`, in catalog order.
    pub fn search(&self, filter: &CatalogFilter) -> Vec<&CatalogItem> {
        self.all().filter(|item| filter.matches(item)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn shelf(&self, shelf: Shelf) -> impl Iterator<Item = &CatalogItem> {
        self.entries
            .iter()
            .filter(move |e| e.shelf == shelf)
            .map(|e| &e.item)
    }
}

// =============================================================================
// Filter Panel
// =============================================================================

/// Language selector of the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFilter {
    #[default]
    All,
    Only(String),
}

/// The "advanced filters" panel plus the search box.
///
/// ## Defaults
/// Price 0-100 (whole currency units), minimum rating 0, all genres, all
/// languages, empty query: everything matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Inclusive bounds on the discounted price.
    pub price_range: (Money, Money),
    pub min_rating: f32,
    /// Empty means every genre.
    pub genres: Vec<String>,
    pub language: LanguageFilter,
    /// Case-insensitive match on title or author.
    pub query: String,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        CatalogFilter {
            price_range: (Money::zero(), Money::from_major_minor(100, 0)),
            min_rating: 0.0,
            genres: Vec::new(),
            language: LanguageFilter::All,
            query: String::new(),
        }
    }
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the price bounds; reversed bounds are swapped.
    pub fn with_price_range(mut self, min: Money, max: Money) -> Self {
        self.price_range = if min <= max { (min, max) } else { (max, min) };
        self
    }

    pub fn with_min_rating(mut self, rating: f32) -> ValidationResult<Self> {
        validate_rating(rating)?;
        self.min_rating = rating;
        Ok(self)
    }

    pub fn with_language(mut self, language: LanguageFilter) -> Self {
        self.language = language;
        self
    }

    pub fn with_query(mut self, query: &str) -> ValidationResult<Self> {
        self.query = validate_search_query(query)?;
        Ok(self)
    }

    /// Selects a genre chip, or deselects it if it was already selected.
    pub fn toggle_genre(&mut self, genre: &str) {
        match self.genres.iter().position(|g| g == genre) {
            Some(index) => {
                self.genres.remove(index);
            }
            None => self.genres.push(genre.to_string()),
        }
    }

    /// Whether `item` passes every active criterion.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.matches_price(item)
            && item.rating.unwrap_or(0.0) >= self.min_rating
            && self.matches_genre(item)
            && self.matches_language(item)
            && self.matches_query(item)
    }

    fn matches_price(&self, item: &CatalogItem) -> bool {
        let (min, max) = self.price_range;
        let price = item.discounted_price();
        price >= min && price <= max
    }

    /// A genre chip matches when it appears in the item's genre
    /// ("Literatura Infantil" matches "Infantil") or equals one of its tags.
    fn matches_genre(&self, item: &CatalogItem) -> bool {
        if self.genres.is_empty() {
            return true;
        }

        let genre = item.genre.as_deref().unwrap_or_default().to_lowercase();
        self.genres.iter().any(|selected| {
            let selected = selected.to_lowercase();
            genre.contains(&selected) || item.tags.iter().any(|t| t.to_lowercase() == selected)
        })
    }

    fn matches_language(&self, item: &CatalogItem) -> bool {
        match &self.language {
            LanguageFilter::All => true,
            LanguageFilter::Only(wanted) => item
                .language
                .as_deref()
                .is_some_and(|lang| lang.to_lowercase() == wanted.to_lowercase()),
        }
    }

    fn matches_query(&self, item: &CatalogItem) -> bool {
        if self.query.is_empty() {
            return true;
        }

        let query = self.query.to_lowercase();
        item.title.to_lowercase().contains(&query) || item.author.to_lowercase().contains(&query)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Discount;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add_category(Category::new("1", "Literatura", "book-open"))
            .unwrap();
        catalog
            .add_item(
                CatalogItem::new("1", "El Principito", "Antoine de Saint-Exupéry", Money::from_cents(2499))
                    .with_discount(Discount::from_percentage(15.0))
                    .with_rating(4.8)
                    .with_genre("Literatura Infantil")
                    .with_language("Español")
                    .with_tags(["Clásico", "Infantil", "Filosofía"])
                    .with_category("1"),
                Shelf::Featured,
            )
            .unwrap();
        catalog
            .add_item(
                CatalogItem::new("2", "Cien años de soledad", "Gabriel García Márquez", Money::from_cents(2999))
                    .with_discount(Discount::from_percentage(20.0))
                    .with_category("1"),
                Shelf::Featured,
            )
            .unwrap();
        catalog
            .add_item(
                CatalogItem::new("3", "La Ciudad y los Perros", "Mario Vargas Llosa", Money::from_cents(1999)),
                Shelf::NewArrivals,
            )
            .unwrap();
        catalog
    }

    fn ids(items: Vec<&CatalogItem>) -> Vec<&str> {
        items.into_iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_shelves() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.featured().count(), 2);
        assert_eq!(catalog.new_arrivals().next().unwrap().id, "3");
        assert_eq!(catalog.in_category("1").count(), 2);
    }

    #[test]
    fn test_find_and_get() {
        let catalog = sample_catalog();
        assert!(catalog.find("2").is_some());
        assert!(matches!(catalog.get("9"), Err(CoreError::ItemNotFound(id)) if id == "9"));
    }

    #[test]
    fn test_rejects_duplicates_and_invalid_items() {
        let mut catalog = sample_catalog();

        let dup = CatalogItem::new("1", "Other", "Someone", Money::from_cents(100));
        assert!(matches!(
            catalog.add_item(dup, Shelf::NewArrivals),
            Err(CoreError::DuplicateItem(_))
        ));

        let bad = CatalogItem::new("", "Title", "Author", Money::from_cents(100));
        assert!(matches!(
            catalog.add_item(bad, Shelf::Featured),
            Err(CoreError::Validation(_))
        ));

        assert!(catalog
            .add_category(Category::new("1", "Again", "x"))
            .is_err());
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let catalog = sample_catalog();
        assert_eq!(catalog.search(&CatalogFilter::default()).len(), 3);
    }

    #[test]
    fn test_price_filter_uses_discounted_price() {
        let catalog = sample_catalog();
        // 29.99 at 20% off is 23.99, inside 20-24
        let filter = CatalogFilter::new()
            .with_price_range(Money::from_cents(2400), Money::from_cents(2000));
        assert_eq!(ids(catalog.search(&filter)), ["1", "2"]);
    }

    #[test]
    fn test_rating_filter_treats_unrated_as_zero() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new().with_min_rating(4.0).unwrap();
        assert_eq!(ids(catalog.search(&filter)), ["1"]);
        assert!(CatalogFilter::new().with_min_rating(6.0).is_err());
    }

    #[test]
    fn test_genre_toggle_and_match() {
        let catalog = sample_catalog();
        let mut filter = CatalogFilter::new();

        filter.toggle_genre("Infantil");
        assert_eq!(ids(catalog.search(&filter)), ["1"]);

        filter.toggle_genre("Infantil");
        assert!(filter.genres.is_empty());
        assert_eq!(catalog.search(&filter).len(), 3);
    }

    #[test]
    fn test_language_filter() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new().with_language(LanguageFilter::Only("español".to_string()));
        assert_eq!(ids(catalog.search(&filter)), ["1"]);
    }

    #[test]
    fn test_query_matches_title_or_author() {
        let catalog = sample_catalog();

        let by_author = CatalogFilter::new().with_query("  márquez ").unwrap();
        assert_eq!(ids(catalog.search(&by_author)), ["2"]);

        let by_title = CatalogFilter::new().with_query("PERROS").unwrap();
        assert_eq!(ids(catalog.search(&by_title)), ["3"]);
    }
}
