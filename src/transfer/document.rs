/// JSON catalog document: `{ "settings": {...}, "products": [...] }`
///
/// Export strips embedded images down to the placeholder reference so the
/// document stays small. Import does not restore them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::rows::{product_keys, products_from_table, ImportOptions};
use super::sheet::{Cell, Table};
use crate::error::Result;
use crate::state::data::Product;
use crate::state::settings::Settings;

#[derive(Serialize)]
struct ExportDocument<'a> {
    settings: &'a Settings,
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct ImportDocument {
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    products: Vec<Map<String, Value>>,
}

/// A parsed document, ready to be applied to the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogDocument {
    /// `None` when the document has no settings object
    pub settings: Option<Settings>,
    pub products: Vec<Product>,
}

/// Serialize settings and products as a pretty-printed document
pub fn export_document(settings: &Settings, products: &[Product]) -> Result<String> {
    let document = ExportDocument {
        settings,
        products: products.iter().map(Product::without_image).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse a document with the same defaults and checks as spreadsheet import
pub fn import_document(json: &str, options: &ImportOptions) -> Result<CatalogDocument> {
    let document: ImportDocument = serde_json::from_str(json)?;

    let columns = product_keys();
    let rows: Vec<Vec<Cell>> = document
        .products
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|key| record.get(key).map(cell_from_json).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();
    let products = products_from_table(&Table { columns, rows }, options)?;

    Ok(CatalogDocument {
        settings: document.settings,
        products,
    })
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::state::data::ProductImage;

    #[test]
    fn test_export_strips_images() {
        let products = vec![Product {
            item_no: "A".into(),
            image: ProductImage::Embedded("data:image/jpeg;base64,AAAA".into()),
            ..Product::blank()
        }];
        let json = export_document(&Settings::default(), &products).unwrap();

        assert!(!json.contains("base64"));
        assert!(json.contains("\"exchangeRate\""));
        assert!(json.contains("\"itemNo\": \"A\""));
    }

    #[test]
    fn test_export_then_import() {
        let settings = Settings {
            duty: 8.0,
            ..Settings::default()
        };
        let products = vec![Product {
            item_no: "00123".into(),
            brand: "Acme".into(),
            description: "Hose".into(),
            case_pack: 24,
            fob_price: 1.85,
            eu_rrp: 4.99,
            container_qty_40ft_hq: 7,
            cbm: 0.0148,
            customer_srp: 5.49,
            image: ProductImage::Embedded("data:image/jpeg;base64,AAAA".into()),
        }];

        let json = export_document(&settings, &products).unwrap();
        let document = import_document(&json, &ImportOptions::default()).unwrap();

        assert_eq!(document.settings, Some(settings));
        let p = &document.products[0];
        assert_eq!(p.item_no, "00123");
        assert_eq!(p.fob_price, 1.85);
        assert_eq!(p.customer_srp, 5.49);
        // Recomputed, not preserved
        assert_eq!(p.container_qty_40ft_hq, 108648);
        // Not restored
        assert!(p.image.is_placeholder());
    }

    #[test]
    fn test_import_with_missing_parts() {
        let document = import_document(r#"{"products":[{"itemNo":42}]}"#, &ImportOptions::legacy()).unwrap();
        assert_eq!(document.settings, None);
        assert_eq!(document.products[0].item_no, "42");
        assert_eq!(document.products[0].cbm, 0.0148);

        let empty = import_document("{}", &ImportOptions::default()).unwrap();
        assert!(empty.products.is_empty());
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        assert!(matches!(
            import_document("{not json", &ImportOptions::default()),
            Err(CatalogError::Json(_))
        ));
        assert!(matches!(
            import_document(r#"{"products":[{"fobPrice":"lots"}]}"#, &ImportOptions::default()),
            Err(CatalogError::Validation(_))
        ));
    }
}
