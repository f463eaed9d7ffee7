/// Mapping between catalog records and spreadsheet rows
///
/// Import is a parse-with-defaults step: absent or blank cells take the
/// field default, while a numeric cell holding text that is not a number is
/// reported with its row and column. A single bad cell rejects the whole
/// import so that nothing is partially applied.

use super::sheet::{Cell, Table};
use crate::error::{CatalogError, FieldError, Result};
use crate::pricing::derived_container_qty;
use crate::state::data::{OrderEntry, Product, ProductImage};

/// CBM used for missing cells by older catalog sheets
pub const LEGACY_DEFAULT_CBM: f64 = 0.0148;

/// Defaults applied to cells missing from an import
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    pub default_cbm: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { default_cbm: 0.0 }
    }
}

impl ImportOptions {
    pub fn legacy() -> Self {
        Self {
            default_cbm: LEGACY_DEFAULT_CBM,
        }
    }
}

/// Product columns: record key and the human label accepted as an alias
const ITEM_NO: (&str, &str) = ("itemNo", "Item Number");
const BRAND: (&str, &str) = ("brand", "Brand");
const DESCRIPTION: (&str, &str) = ("description", "Description");
const CASE_PACK: (&str, &str) = ("casePack", "Case Pack");
const FOB_PRICE: (&str, &str) = ("fobPrice", "FOB Price ($)");
const EU_RRP: (&str, &str) = ("euRrp", "EU RRP (€)");
const CONTAINER_QTY: (&str, &str) = ("containerQty40ftHQ", "Container Qty (40ftHQ)");
const CBM: (&str, &str) = ("cbm", "CBM");
const CUSTOMER_SRP: (&str, &str) = ("customerSrp", "Customer SRP (€)");
const IMAGE: (&str, &str) = ("image", "Image");

const PRODUCT_COLUMNS: [(&str, &str); 10] = [
    ITEM_NO,
    BRAND,
    DESCRIPTION,
    CASE_PACK,
    FOB_PRICE,
    EU_RRP,
    CONTAINER_QTY,
    CBM,
    CUSTOMER_SRP,
    IMAGE,
];

const ORDER_COLUMNS: [&str; 6] = ["brand", "itemNo", "orderQty", "customerPrice", "notes", "total"];

/// Record keys of every product column, in export order
pub fn product_keys() -> Vec<String> {
    PRODUCT_COLUMNS.iter().map(|(key, _)| key.to_string()).collect()
}

/// One row per product, columns named by record keys
///
/// Embedded images are written as the placeholder reference.
pub fn products_to_table(products: &[Product]) -> Table {
    let mut table = Table::new(product_keys());
    table.rows = products
        .iter()
        .map(|p| {
            vec![
                Cell::Text(p.item_no.clone()),
                Cell::Text(p.brand.clone()),
                Cell::Text(p.description.clone()),
                Cell::Number(p.case_pack as f64),
                Cell::Number(p.fob_price),
                Cell::Number(p.eu_rrp),
                Cell::Number(p.container_qty_40ft_hq as f64),
                Cell::Number(p.cbm),
                Cell::Number(p.customer_srp),
                Cell::Text(ProductImage::Placeholder.as_str().to_string()),
            ]
        })
        .collect();
    table
}

/// One row per order entry plus its line total
pub fn orders_to_table(orders: &[OrderEntry]) -> Table {
    let mut table = Table::new(ORDER_COLUMNS.iter().map(|c| c.to_string()).collect());
    table.rows = orders
        .iter()
        .map(|o| {
            vec![
                Cell::Text(o.brand.clone()),
                Cell::Text(o.item_no.clone()),
                Cell::Number(o.order_qty as f64),
                Cell::Number(o.customer_price),
                Cell::Text(o.notes.clone()),
                Cell::Number(o.line_total()),
            ]
        })
        .collect();
    table
}

/// Column positions resolved once per table
struct Columns {
    item_no: Option<usize>,
    brand: Option<usize>,
    description: Option<usize>,
    case_pack: Option<usize>,
    fob_price: Option<usize>,
    eu_rrp: Option<usize>,
    cbm: Option<usize>,
    customer_srp: Option<usize>,
    image: Option<usize>,
}

impl Columns {
    fn resolve(table: &Table) -> Result<Self> {
        let find = |(key, label): (&str, &str)| table.column(key).or_else(|| table.column(label));

        let columns = Self {
            item_no: find(ITEM_NO),
            brand: find(BRAND),
            description: find(DESCRIPTION),
            case_pack: find(CASE_PACK),
            fob_price: find(FOB_PRICE),
            eu_rrp: find(EU_RRP),
            cbm: find(CBM),
            customer_srp: find(CUSTOMER_SRP),
            image: find(IMAGE),
        };

        let any_known = PRODUCT_COLUMNS.iter().any(|&column| find(column).is_some());
        if any_known {
            Ok(columns)
        } else {
            Err(CatalogError::MissingColumns)
        }
    }
}

/// Accumulates cell errors while a table is parsed
struct RowParser<'a> {
    table: &'a Table,
    row: usize,
    errors: &'a mut Vec<FieldError>,
}

impl<'a> RowParser<'a> {
    fn cell(&self, col: Option<usize>) -> Option<&'a Cell> {
        let table: &'a Table = self.table;
        col.map(|c| table.cell(self.row, c))
            .filter(|cell| !cell.is_blank())
    }

    fn text(&self, col: Option<usize>) -> String {
        self.cell(col).map(Cell::as_text).unwrap_or_default()
    }

    fn decimal(&mut self, col: Option<usize>, default: f64) -> f64 {
        match self.cell(col) {
            None => default,
            Some(Cell::Number(n)) if n.is_finite() => *n,
            Some(cell) => {
                let raw = cell.as_text();
                match raw.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => self.reject(col, raw, 0.0),
                }
            }
        }
    }

    fn integer(&mut self, col: Option<usize>) -> u32 {
        let value = self.decimal(col, 0.0);
        if value >= 0.0 {
            value.trunc().min(u32::MAX as f64) as u32
        } else {
            self.reject(col, value.to_string(), 0)
        }
    }

    fn reject<T>(&mut self, col: Option<usize>, value: String, fallback: T) -> T {
        let column = col
            .and_then(|c| self.table.columns.get(c))
            .cloned()
            .unwrap_or_default();
        self.errors.push(FieldError {
            row: self.row + 1,
            column,
            value,
        });
        fallback
    }
}

/// Parse every row of `table` into a product.
///
/// The container quantity column is ignored: it is always recomputed from
/// CBM and case pack. Images come from the `image` column when present.
pub fn products_from_table(table: &Table, options: &ImportOptions) -> Result<Vec<Product>> {
    let columns = Columns::resolve(table)?;
    let mut errors = Vec::new();
    let mut products = Vec::with_capacity(table.rows.len());

    for row in 0..table.rows.len() {
        let mut parser = RowParser {
            table,
            row,
            errors: &mut errors,
        };

        let mut product = Product {
            item_no: parser.text(columns.item_no),
            brand: parser.text(columns.brand),
            description: parser.text(columns.description),
            case_pack: parser.integer(columns.case_pack),
            fob_price: parser.decimal(columns.fob_price, 0.0),
            eu_rrp: parser.decimal(columns.eu_rrp, 0.0),
            container_qty_40ft_hq: 0,
            cbm: parser.decimal(columns.cbm, options.default_cbm),
            customer_srp: parser.decimal(columns.customer_srp, 0.0),
            image: ProductImage::from(parser.text(columns.image)),
        };
        product.container_qty_40ft_hq = derived_container_qty(&product);
        products.push(product);
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(CatalogError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_labels_are_accepted() {
        let t = table(
            &["Item Number", "Brand", "FOB Price ($)", "Case Pack", "CBM"],
            vec![vec![Cell::Number(123.0), text("Acme"), Cell::Number(1.85), Cell::Number(24.0), Cell::Number(0.0148)]],
        );
        let products = products_from_table(&t, &ImportOptions::default()).unwrap();

        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.item_no, "123");
        assert_eq!(p.brand, "Acme");
        assert_eq!(p.fob_price, 1.85);
        assert_eq!(p.case_pack, 24);
        assert_eq!(p.container_qty_40ft_hq, 108648);
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let t = table(&["ITEMNO", "cbm "], vec![vec![text("x"), Cell::Number(1.0)]]);
        assert!(matches!(
            products_from_table(&t, &ImportOptions::default()),
            Err(CatalogError::MissingColumns)
        ));
    }

    #[test]
    fn test_missing_cells_take_defaults() {
        let t = table(&["itemNo", "cbm"], vec![vec![text("A")], vec![text("B"), text("  ")]]);

        let products = products_from_table(&t, &ImportOptions::default()).unwrap();
        assert_eq!(products[0].cbm, 0.0);
        assert_eq!(products[0].fob_price, 0.0);
        assert_eq!(products[1].cbm, 0.0);

        let legacy = products_from_table(&t, &ImportOptions::legacy()).unwrap();
        assert_eq!(legacy[0].cbm, LEGACY_DEFAULT_CBM);
        // No case pack -> nothing fits
        assert_eq!(legacy[0].container_qty_40ft_hq, 0);
    }

    #[test]
    fn test_stored_container_qty_is_recomputed() {
        let t = table(
            &["itemNo", "casePack", "cbm", "containerQty40ftHQ"],
            vec![
                vec![text("A"), Cell::Number(10.0), Cell::Number(0.5), Cell::Number(99.0)],
                vec![text("B"), Cell::Number(10.0), Cell::Number(0.0), Cell::Number(99.0)],
            ],
        );
        let products = products_from_table(&t, &ImportOptions::default()).unwrap();
        assert_eq!(products[0].container_qty_40ft_hq, 1340);
        assert_eq!(products[1].container_qty_40ft_hq, 0);
    }

    #[test]
    fn test_numeric_text_is_parsed() {
        let t = table(&["itemNo", "fobPrice", "casePack"], vec![vec![text("A"), text(" 2.5 "), text("12")]]);
        let products = products_from_table(&t, &ImportOptions::default()).unwrap();
        assert_eq!(products[0].fob_price, 2.5);
        assert_eq!(products[0].case_pack, 12);
    }

    #[test]
    fn test_bad_cells_are_collected() {
        let t = table(
            &["itemNo", "fobPrice", "casePack"],
            vec![
                vec![text("A"), text("cheap"), Cell::Number(1.0)],
                vec![text("B"), Cell::Number(1.0), Cell::Number(-4.0)],
            ],
        );

        let Err(CatalogError::Validation(errors)) = products_from_table(&t, &ImportOptions::default()) else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors,
            vec![
                FieldError { row: 1, column: "fobPrice".into(), value: "cheap".into() },
                FieldError { row: 2, column: "casePack".into(), value: "-4".into() },
            ]
        );
    }

    #[test]
    fn test_orders_table_has_totals() {
        let orders = vec![OrderEntry {
            brand: "Acme".into(),
            item_no: "A".into(),
            order_qty: 4,
            customer_price: 2.5,
            notes: "n".into(),
        }];
        let t = orders_to_table(&orders);
        assert_eq!(t.columns, ORDER_COLUMNS.to_vec());
        assert_eq!(t.rows[0][5], Cell::Number(10.0));
    }

    #[test]
    fn test_products_table_strips_images() {
        let product = Product {
            image: ProductImage::Embedded("data:image/jpeg;base64,AAAA".into()),
            ..Product::blank()
        };
        let t = products_to_table(&[product]);
        let image_col = t.column("image").unwrap();
        assert_eq!(t.cell(0, image_col), &Cell::Text(ProductImage::Placeholder.as_str().to_string()));
    }
}
