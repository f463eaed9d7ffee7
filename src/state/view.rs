/// Search and sort over the product list
///
/// The view is a pure projection: it never reorders the collection, it only
/// returns collection indices in display order.

use std::cmp::Ordering;
use std::fmt;

use super::data::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    ItemNo,
    Brand,
    Description,
    FobPrice,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::ItemNo,
        SortField::Brand,
        SortField::Description,
        SortField::FobPrice,
    ];

    /// Textual sort key; zero numbers and empty strings both sort as ""
    fn key(self, product: &Product) -> String {
        match self {
            SortField::ItemNo => product.item_no.clone(),
            SortField::Brand => product.brand.clone(),
            SortField::Description => product.description.clone(),
            SortField::FobPrice if product.fob_price == 0.0 => String::new(),
            SortField::FobPrice => product.fob_price.to_string(),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortField::ItemNo => "Item No",
            SortField::Brand => "Brand",
            SortField::Description => "Description",
            SortField::FobPrice => "FOB Price",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ViewState {
    pub fn toggle_direction(&mut self) {
        self.sort_direction = self.sort_direction.toggled();
    }

    /// Case-insensitive substring match on brand, item number or description
    pub fn matches(&self, product: &Product) -> bool {
        let term = self.search.to_lowercase();
        product.brand.to_lowercase().contains(&term)
            || product.item_no.to_lowercase().contains(&term)
            || product.description.to_lowercase().contains(&term)
    }

    /// Collection indices of the visible products, in display order.
    ///
    /// Numbers compare by their text, so a FOB price of 10 sorts before 9.
    pub fn project(&self, products: &[Product]) -> Vec<usize> {
        let mut visible: Vec<(usize, String)> = products
            .iter()
            .enumerate()
            .filter(|(_, p)| self.matches(p))
            .map(|(i, p)| (i, self.sort_field.key(p)))
            .collect();

        // Stable, so equal keys keep collection order in both directions
        visible.sort_by(|(_, a), (_, b)| self.compare(a, b));

        visible.into_iter().map(|(i, _)| i).collect()
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self.sort_direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        }
    }
}
