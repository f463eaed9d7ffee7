use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use super::data::{Product, ProductField, ProductImage};
use super::orders::{OrderCollection, OrderDraft, OrderForms};
use super::settings::{SettingKey, Settings};
use super::storage::{Storage, IMAGES_KEY, PRODUCTS_KEY, SETTINGS_KEY};
use super::view::ViewState;
use crate::error::{CatalogError, Result};
use crate::pricing::Quote;
use crate::transfer::document::{export_document, import_document};
use crate::transfer::rows::{orders_to_table, products_from_table, products_to_table, ImportOptions};
use crate::transfer::sheet::{read_table, write_table};

/// Severity of a banner message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// The whole editable state of the application.
///
/// Products, settings and images are mirrored to `storage` after every
/// change; each is its own blob, so a failure part way leaves them out of
/// step. Orders, order forms and the view are in-memory only.
pub struct Catalog {
    storage: Box<dyn Storage>,
    products: Vec<Product>,
    orders: OrderCollection,
    order_forms: OrderForms,
    settings: Settings,
    /// Item number -> compressed image data URL
    images: BTreeMap<String, String>,
    pub view: ViewState,
    notices: Vec<Notice>,
}

impl Catalog {
    /// Restore the catalog from `storage`.
    ///
    /// Each store falls back to its default independently when its blob is
    /// missing or unreadable; unreadable blobs are reported as notices.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let mut notices = Vec::new();

        let settings: Settings = read_blob(storage.as_ref(), SETTINGS_KEY, &mut notices).unwrap_or_default();
        let images: BTreeMap<String, String> =
            read_blob(storage.as_ref(), IMAGES_KEY, &mut notices).unwrap_or_default();
        let mut products: Vec<Product> =
            read_blob(storage.as_ref(), PRODUCTS_KEY, &mut notices).unwrap_or_default();

        for product in &mut products {
            product.image = image_for(&images, &product.item_no);
        }

        tracing::info!(
            "🗂️ Catalog loaded: {} products, {} images",
            products.len(),
            images.len()
        );

        Self {
            storage,
            products,
            orders: OrderCollection::new(),
            order_forms: OrderForms::default(),
            settings,
            images,
            view: ViewState::default(),
            notices,
        }
    }

    // ========== Accessors ==========

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn orders(&self) -> &OrderCollection {
        &self.orders
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Pricing for the product at `index`
    pub fn quote(&self, index: usize) -> Option<Quote> {
        self.product(index).map(|p| Quote::for_product(p, &self.settings))
    }

    /// Collection indices of the products matching the current view
    pub fn visible(&self) -> Vec<usize> {
        self.view.project(&self.products)
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Hand pending banner messages to the UI
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ========== Product collection ==========

    /// Append a blank product and return its index
    pub fn add_product(&mut self) -> Result<usize> {
        self.products.push(Product::blank());
        self.persist_products()?;
        Ok(self.products.len() - 1)
    }

    /// Replace the whole record at `index`
    pub fn update_product(&mut self, index: usize, product: Product) -> Result<()> {
        let len = self.products.len();
        let slot = self
            .products
            .get_mut(index)
            .ok_or(CatalogError::IndexOutOfRange { index, len })?;
        *slot = product;
        self.order_forms.retain_current(&self.products);
        self.persist_products()
    }

    /// Apply one form edit to the record at `index`
    pub fn update_field(&mut self, index: usize, field: ProductField, raw: &str) -> Result<()> {
        let mut product = self.checked(index)?.clone();
        field.apply(&mut product, raw);
        self.update_product(index, product)
    }

    /// Remove the record at `index`; later records shift down by one.
    ///
    /// The order list is left alone, so its positions no longer line up with
    /// products after `index`.
    pub fn remove_product(&mut self, index: usize) -> Result<Product> {
        self.checked(index)?;
        let removed = self.products.remove(index);
        self.order_forms.retain_current(&self.products);
        self.persist_products()?;
        Ok(removed)
    }

    /// Swap in a new product list (import); order forms start over
    pub fn replace_products(&mut self, products: Vec<Product>) -> Result<()> {
        self.products = products;
        self.order_forms.clear();
        self.persist_products()
    }

    /// Empty the product list; the caller confirms with the user first
    pub fn remove_all_products(&mut self) -> Result<()> {
        tracing::info!("🗑️ Removing all {} products", self.products.len());
        self.replace_products(Vec::new())
    }

    // ========== Settings ==========

    pub fn set_setting(&mut self, key: SettingKey, value: f64) -> Result<()> {
        self.settings.set(key, value);
        self.persist_settings()
    }

    pub fn replace_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.persist_settings()
    }

    pub fn reset_settings(&mut self) -> Result<()> {
        self.settings.reset();
        self.persist_settings()
    }

    // ========== Images ==========

    /// Store a compressed image for the product at `index`.
    ///
    /// The image map is keyed by item number, so every product sharing that
    /// item number picks it up on the next load. Both stores are written even
    /// if the first write fails; the first error is returned.
    pub fn set_image(&mut self, index: usize, data_url: String) -> Result<()> {
        let item_no = self.checked(index)?.item_no.clone();
        self.images.insert(item_no, data_url.clone());
        self.products[index].image = ProductImage::Embedded(data_url);

        let images = self.persist_images();
        let products = self.persist_products();
        images.and(products)
    }

    // ========== Orders ==========

    pub fn total_order_value(&self) -> f64 {
        self.orders.total_order_value()
    }

    /// "Add to Order" form of the card at `index`
    pub fn order_form(&self, index: usize) -> OrderDraft {
        self.product(index)
            .map(|product| self.order_forms.draft(index, product))
            .unwrap_or_default()
    }

    /// Edit the card's order form and mirror it into the order list
    pub fn edit_order_form(&mut self, index: usize, edit: impl FnOnce(&mut OrderDraft)) {
        let Some(product) = self.products.get(index) else {
            return;
        };
        if let Some(order) = self.order_forms.edit(index, product, edit) {
            self.orders.set_order_at(index, order);
        }
    }

    // ========== Import / export ==========

    /// Replace all products with the rows of a spreadsheet.
    ///
    /// Images are taken from the image map by item number. Nothing changes
    /// if any row fails to parse.
    pub fn import_sheet(&mut self, bytes: &[u8], options: &ImportOptions) -> Result<usize> {
        let table = read_table(bytes)?;
        let mut products = products_from_table(&table, options)?;
        for product in &mut products {
            product.image = image_for(&self.images, &product.item_no);
        }

        let count = products.len();
        self.replace_products(products)?;
        tracing::info!("📥 Imported {} products from spreadsheet", count);
        Ok(count)
    }

    /// Replace settings and products with a JSON document.
    ///
    /// Images in the document are kept as written; the image map is not
    /// consulted.
    pub fn import_json(&mut self, json: &str, options: &ImportOptions) -> Result<usize> {
        let document = import_document(json, options)?;

        if let Some(settings) = document.settings {
            self.replace_settings(settings)?;
        }
        let count = document.products.len();
        self.replace_products(document.products)?;
        tracing::info!("📥 Imported {} products from JSON", count);
        Ok(count)
    }

    pub fn export_products_sheet(&self) -> Result<Vec<u8>> {
        write_table("Products", &products_to_table(&self.products))
    }

    pub fn export_orders_sheet(&self) -> Result<Vec<u8>> {
        write_table("Order", &orders_to_table(self.orders.entries()))
    }

    pub fn export_json(&self) -> Result<String> {
        export_document(&self.settings, &self.products)
    }

    // ========== Persistence ==========

    fn checked(&self, index: usize) -> Result<&Product> {
        self.products.get(index).ok_or(CatalogError::IndexOutOfRange {
            index,
            len: self.products.len(),
        })
    }

    /// Products are stored without payloads; the image map holds those
    fn persist_products(&self) -> Result<()> {
        let stripped: Vec<Product> = self.products.iter().map(Product::without_image).collect();
        self.write_blob(PRODUCTS_KEY, &stripped)
    }

    fn persist_settings(&self) -> Result<()> {
        self.write_blob(SETTINGS_KEY, &self.settings)
    }

    fn persist_images(&self) -> Result<()> {
        self.write_blob(IMAGES_KEY, &self.images)
    }

    fn write_blob<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let blob = serde_json::to_string(value)?;
        self.storage.save(key, &blob).map_err(|e| {
            tracing::error!("❌ Failed to save {}: {}", key, e);
            e
        })
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("products", &self.products.len())
            .field("orders", &self.orders.len())
            .field("images", &self.images.len())
            .field("settings", &self.settings)
            .finish()
    }
}

fn image_for(images: &BTreeMap<String, String>, item_no: &str) -> ProductImage {
    images
        .get(item_no)
        .map(|url| ProductImage::Embedded(url.clone()))
        .unwrap_or_default()
}

/// Read and decode one store; `None` when absent or unreadable
fn read_blob<T: DeserializeOwned>(storage: &dyn Storage, key: &str, notices: &mut Vec<Notice>) -> Option<T> {
    let parsed: Result<Option<T>> = storage
        .load(key)
        .and_then(|blob| blob.map(|b| serde_json::from_str(&b)).transpose().map_err(CatalogError::from));

    match parsed {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("⚠️  Discarding saved {}: {}", key, e);
            notices.push(Notice::error("Error loading saved data"));
            None
        }
    }
}
