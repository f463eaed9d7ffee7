/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the persistence layer, the import/export adapters and the UI layer.

use serde::{Deserialize, Serialize};

/// Reference shown for products without an uploaded image
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/200";

/// A product image: either the placeholder or an embedded compressed payload
///
/// Serialized as a plain string so persisted and exported documents stay
/// compatible with the `data:` URL form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductImage {
    #[default]
    Placeholder,
    /// A `data:image/...;base64,` URL or any other non-placeholder reference
    Embedded(String),
}

impl ProductImage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ProductImage::Placeholder)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProductImage::Placeholder => PLACEHOLDER_IMAGE,
            ProductImage::Embedded(url) => url,
        }
    }
}

impl From<String> for ProductImage {
    fn from(value: String) -> Self {
        if value.is_empty() || value == PLACEHOLDER_IMAGE {
            ProductImage::Placeholder
        } else {
            ProductImage::Embedded(value)
        }
    }
}

impl From<ProductImage> for String {
    fn from(image: ProductImage) -> Self {
        match image {
            ProductImage::Placeholder => PLACEHOLDER_IMAGE.to_string(),
            ProductImage::Embedded(url) => url,
        }
    }
}

/// A single catalog record
///
/// Field names serialize in camelCase (`itemNo`, `fobPrice`, ...) which is
/// also the column naming used by spreadsheet export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Identifier; not guaranteed unique across the collection
    pub item_no: String,
    pub brand: String,
    pub description: String,
    /// Units per case
    pub case_pack: u32,
    /// Free-on-board unit price in the purchase currency
    pub fob_price: f64,
    /// Recommended retail price in the selling currency
    pub eu_rrp: f64,
    /// Units per 40ft high-cube container; 0 means derive from `cbm`
    #[serde(rename = "containerQty40ftHQ")]
    pub container_qty_40ft_hq: u32,
    /// Cubic metres per case
    pub cbm: f64,
    pub customer_srp: f64,
    pub image: ProductImage,
}

impl Product {
    /// The record appended by "Add Product"
    pub fn blank() -> Self {
        Self::default()
    }

    /// Copy of this record with any embedded image replaced by the placeholder
    pub fn without_image(&self) -> Self {
        Self {
            image: ProductImage::Placeholder,
            ..self.clone()
        }
    }
}

/// Editable product fields, as exposed by the product form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    ItemNo,
    Brand,
    Description,
    CasePack,
    FobPrice,
    EuRrp,
    ContainerQty,
    Cbm,
    CustomerSrp,
}

impl ProductField {
    pub const ALL: [ProductField; 9] = [
        ProductField::Brand,
        ProductField::ItemNo,
        ProductField::Description,
        ProductField::FobPrice,
        ProductField::CasePack,
        ProductField::EuRrp,
        ProductField::ContainerQty,
        ProductField::Cbm,
        ProductField::CustomerSrp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProductField::ItemNo => "Item #",
            ProductField::Brand => "Brand",
            ProductField::Description => "Description",
            ProductField::CasePack => "Case Pack",
            ProductField::FobPrice => "FOB Price ($)",
            ProductField::EuRrp => "EU RRP (€)",
            ProductField::ContainerQty => "Container Qty (40ftHQ)",
            ProductField::Cbm => "CBM",
            ProductField::CustomerSrp => "Customer SRP (€)",
        }
    }

    /// Current value as form text; zero numbers render as an empty field
    pub fn display(self, product: &Product) -> String {
        match self {
            ProductField::ItemNo => product.item_no.clone(),
            ProductField::Brand => product.brand.clone(),
            ProductField::Description => product.description.clone(),
            ProductField::CasePack => int_text(product.case_pack),
            ProductField::FobPrice => decimal_text(product.fob_price),
            ProductField::EuRrp => decimal_text(product.eu_rrp),
            ProductField::ContainerQty => int_text(product.container_qty_40ft_hq),
            ProductField::Cbm => decimal_text(product.cbm),
            ProductField::CustomerSrp => decimal_text(product.customer_srp),
        }
    }

    /// Write form text into `product`; numeric fields fall back to 0
    pub fn apply(self, product: &mut Product, raw: &str) {
        match self {
            ProductField::ItemNo => product.item_no = raw.to_string(),
            ProductField::Brand => product.brand = raw.to_string(),
            ProductField::Description => product.description = raw.to_string(),
            ProductField::CasePack => product.case_pack = parse_int_or_zero(raw),
            ProductField::FobPrice => product.fob_price = parse_decimal_or_zero(raw),
            ProductField::EuRrp => product.eu_rrp = parse_decimal_or_zero(raw),
            ProductField::ContainerQty => product.container_qty_40ft_hq = parse_int_or_zero(raw),
            ProductField::Cbm => product.cbm = parse_decimal_or_zero(raw),
            ProductField::CustomerSrp => product.customer_srp = parse_decimal_or_zero(raw),
        }
    }
}

fn int_text(value: u32) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}

fn decimal_text(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        value.to_string()
    }
}

/// Parse an integer form value; anything unparseable or negative becomes 0
///
/// A decimal input is truncated toward zero (`"12.7"` is 12).
pub fn parse_int_or_zero(raw: &str) -> u32 {
    let raw = raw.trim();
    raw.parse::<u32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.trunc().min(u32::MAX as f64) as u32)
        })
        .unwrap_or(0)
}

/// Parse a decimal form value; anything unparseable or non-finite becomes 0
pub fn parse_decimal_or_zero(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// One line of the order
///
/// Entries are keyed by their position in the order list, not by `item_no`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderEntry {
    pub brand: String,
    pub item_no: String,
    pub order_qty: u32,
    /// Unit price agreed with the customer, selling currency
    pub customer_price: f64,
    pub notes: String,
}

impl OrderEntry {
    pub fn line_total(&self) -> f64 {
        self.customer_price * self.order_qty as f64
    }

    /// "Brand - item number", the title of an order summary line
    pub fn heading(&self) -> String {
        format!("{} - {}", self.brand, self.item_no)
    }

    pub fn notes_label(&self) -> &str {
        if self.notes.is_empty() {
            "No notes"
        } else {
            &self.notes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serializes_with_record_keys() {
        let product = Product {
            item_no: "A-1".into(),
            container_qty_40ft_hq: 12,
            ..Product::blank()
        };
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["itemNo"], "A-1");
        assert_eq!(json["containerQty40ftHQ"], 12);
        assert_eq!(json["image"], PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_product_missing_keys_default() {
        let product: Product = serde_json::from_str(r#"{"brand":"Acme"}"#).unwrap();
        assert_eq!(product.brand, "Acme");
        assert_eq!(product.case_pack, 0);
        assert!(product.image.is_placeholder());
    }

    #[test]
    fn test_image_from_string() {
        assert!(ProductImage::from(String::new()).is_placeholder());
        assert!(ProductImage::from(PLACEHOLDER_IMAGE.to_string()).is_placeholder());

        let embedded = ProductImage::from("data:image/jpeg;base64,AAAA".to_string());
        assert_eq!(embedded.as_str(), "data:image/jpeg;base64,AAAA");
        assert!(!embedded.is_placeholder());
    }

    #[test]
    fn test_field_apply_parses_or_zeroes() {
        let mut product = Product::blank();

        ProductField::FobPrice.apply(&mut product, "1.85");
        ProductField::CasePack.apply(&mut product, "24");
        ProductField::Cbm.apply(&mut product, "abc");
        ProductField::Brand.apply(&mut product, "Acme");

        assert_eq!(product.fob_price, 1.85);
        assert_eq!(product.case_pack, 24);
        assert_eq!(product.cbm, 0.0);
        assert_eq!(product.brand, "Acme");
        assert_eq!(ProductField::Cbm.display(&product), "");
        assert_eq!(ProductField::FobPrice.display(&product), "1.85");
    }

    #[test]
    fn test_parse_int_or_zero() {
        assert_eq!(parse_int_or_zero(" 7 "), 7);
        assert_eq!(parse_int_or_zero("12.7"), 12);
        assert_eq!(parse_int_or_zero("-3"), 0);
        assert_eq!(parse_int_or_zero(""), 0);
    }

    #[test]
    fn test_line_total() {
        let entry = OrderEntry {
            order_qty: 3,
            customer_price: 2.5,
            ..OrderEntry::default()
        };
        assert_eq!(entry.line_total(), 7.5);
    }

    #[test]
    fn test_summary_labels() {
        let mut entry = OrderEntry {
            brand: "Acme".into(),
            item_no: "H-20".into(),
            ..OrderEntry::default()
        };
        assert_eq!(entry.heading(), "Acme - H-20");
        assert_eq!(entry.notes_label(), "No notes");

        entry.notes = "rush".into();
        assert_eq!(entry.notes_label(), "rush");
    }
}
