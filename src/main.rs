use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use iced::widget::{button, checkbox, column, container, image, pick_list, row, scrollable, text, text_input, Column, Row};
use iced::{time, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

mod config;
mod error;
mod media;
mod pricing;
mod state;
mod transfer;

use config::AppConfig;
use media::compress::{compress_image, decode_data_url};
use pricing::money_label;
use state::catalog::{Catalog, Notice, NoticeLevel};
use state::data::{parse_decimal_or_zero, Product, ProductField};
use state::settings::SettingKey;
use state::storage::{MemoryStorage, SqliteStorage, Storage};
use state::view::SortField;

/// How long a banner message stays up
const NOTICE_TIMEOUT: Duration = Duration::from_secs(3);

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const SHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "ods"];

/// Main application state
struct CatalogEditor {
    config: AppConfig,
    catalog: Catalog,
    /// Raw text of the settings inputs, in `SettingKey::ALL` order
    settings_input: Vec<String>,
    /// Product cell being typed into: collection index, field, raw text
    editing: Option<(usize, ProductField, String)>,
    /// Decoded product images, keyed by collection index
    thumbnails: HashMap<usize, image::Handle>,
    /// Banner currently shown
    notice: Option<Notice>,
    /// Header logo; kept for this session only
    logo: Option<image::Handle>,
    show_order_summary: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    SearchChanged(String),
    SortFieldSelected(SortField),
    ToggleSortDirection,

    SettingChanged(SettingKey, String),
    ResetSettings,

    AddProduct,
    FieldChanged(usize, ProductField, String),
    RemoveProduct(usize),
    RemoveAllProducts,

    OrderToggled(usize, bool),
    OrderQtyChanged(usize, String),
    OrderPriceChanged(usize, String),
    OrderNotesChanged(usize, String),

    /// User clicked "Change image" on a product card
    PickImage(usize),
    /// Background read + compression finished
    ImageCompressed(usize, Result<String, String>),

    ImportSheet,
    SheetLoaded(Result<Vec<u8>, String>),
    ImportJson,
    JsonLoaded(Result<Vec<u8>, String>),

    ExportProducts,
    ExportOrders,
    ExportJson,
    ExportFinished(Result<PathBuf, String>),

    ToggleOrderSummary,

    PickLogo,
    LogoLoaded(Result<Vec<u8>, String>),

    NoticeExpired,
}

impl CatalogEditor {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::from_env();
        config::init_logging(&config);

        // Without a database the editor still works, it just forgets on exit
        let mut startup_notice = None;
        let storage: Box<dyn Storage> = match SqliteStorage::open(&config.db_path()) {
            Ok(storage) => {
                tracing::info!("💾 Using database at {}", storage.path().display());
                Box::new(storage)
            }
            Err(e) => {
                tracing::error!("❌ Failed to open database {}: {}", config.db_path().display(), e);
                startup_notice = Some(Notice::error("Could not open the database, changes will not be saved"));
                Box::new(MemoryStorage::new())
            }
        };

        let mut catalog = Catalog::load(storage);
        if let Some(notice) = startup_notice {
            catalog.push_notice(notice);
        }
        tracing::info!(
            "🛒 Catalog editor initialized with {} products, {} images",
            catalog.products().len(),
            catalog.image_count()
        );

        let mut editor = CatalogEditor {
            config,
            catalog,
            settings_input: Vec::new(),
            editing: None,
            thumbnails: HashMap::new(),
            notice: None,
            logo: None,
            show_order_summary: false,
        };
        editor.sync_settings_input();
        editor.refresh_thumbnails();
        editor.collect_notices();

        (editor, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        self.collect_notices();
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SearchChanged(search) => {
                self.catalog.view.search = search;
            }
            Message::SortFieldSelected(field) => {
                self.catalog.view.sort_field = field;
            }
            Message::ToggleSortDirection => {
                self.catalog.view.toggle_direction();
            }

            Message::SettingChanged(key, raw) => {
                let result = self.catalog.set_setting(key, parse_decimal_or_zero(&raw));
                if let Some(slot) = SettingKey::ALL.iter().position(|k| *k == key) {
                    self.settings_input[slot] = raw;
                }
                self.check_saved(result);
            }
            Message::ResetSettings => {
                let result = self.catalog.reset_settings();
                self.sync_settings_input();
                self.check_saved(result);
            }

            Message::AddProduct => {
                let result = self.catalog.add_product().map(|_| ());
                self.check_saved(result);
            }
            Message::FieldChanged(index, field, raw) => {
                let result = self.catalog.update_field(index, field, &raw);
                self.editing = Some((index, field, raw));
                self.check_saved(result);
            }
            Message::RemoveProduct(index) => {
                let result = self.catalog.remove_product(index).map(|_| ());
                self.editing = None;
                self.refresh_thumbnails();
                self.check_saved(result);
            }
            Message::RemoveAllProducts => {
                let answer = MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title("Remove all products")
                    .set_description("Are you sure you want to remove all products? This cannot be undone.")
                    .set_buttons(MessageButtons::YesNo)
                    .show();

                if matches!(answer, MessageDialogResult::Yes) {
                    let result = self.catalog.remove_all_products();
                    self.editing = None;
                    self.refresh_thumbnails();
                    if self.check_saved(result) {
                        self.catalog.push_notice(Notice::success("All products removed"));
                    }
                }
            }

            Message::OrderToggled(index, ordered) => {
                self.catalog.edit_order_form(index, |draft| draft.ordered = ordered);
            }
            Message::OrderQtyChanged(index, qty) => {
                self.catalog.edit_order_form(index, |draft| draft.qty = qty);
            }
            Message::OrderPriceChanged(index, price) => {
                self.catalog.edit_order_form(index, |draft| draft.price = price);
            }
            Message::OrderNotesChanged(index, notes) => {
                self.catalog.edit_order_form(index, |draft| draft.notes = notes);
            }

            Message::PickImage(index) => {
                let file = FileDialog::new()
                    .set_title("Select Product Image")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    return Task::perform(load_image(path, self.config.image_max_width), move |result| {
                        Message::ImageCompressed(index, result)
                    });
                }
            }
            Message::ImageCompressed(index, result) => match result {
                Ok(data_url) => {
                    // The product may have changed while compressing; store
                    // under whatever item number it has now
                    let result = self.catalog.set_image(index, data_url);
                    self.refresh_thumbnails();
                    self.check_saved(result);
                }
                Err(e) => {
                    tracing::error!("❌ Error processing image: {}", e);
                    self.catalog.push_notice(Notice::error("Error processing image"));
                }
            },

            Message::ImportSheet => {
                let file = FileDialog::new()
                    .set_title("Import Products from Excel")
                    .add_filter("Spreadsheets", &SHEET_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    self.catalog.push_notice(Notice::info(format!("Importing {}...", path.display())));
                    return Task::perform(read_file(path), Message::SheetLoaded);
                }
            }
            Message::SheetLoaded(result) => {
                let imported = result.and_then(|bytes| {
                    self.catalog
                        .import_sheet(&bytes, &self.config.import)
                        .map_err(|e| e.to_string())
                });
                self.finish_import("Excel file", imported);
            }
            Message::ImportJson => {
                let file = FileDialog::new()
                    .set_title("Import Catalog from JSON")
                    .add_filter("JSON", &["json"])
                    .pick_file();

                if let Some(path) = file {
                    return Task::perform(read_file(path), Message::JsonLoaded);
                }
            }
            Message::JsonLoaded(result) => {
                let imported = result
                    .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()))
                    .and_then(|json| {
                        self.catalog
                            .import_json(&json, &self.config.import)
                            .map_err(|e| e.to_string())
                    });
                self.sync_settings_input();
                self.finish_import("JSON file", imported);
            }

            Message::ExportProducts => {
                let bytes = self.catalog.export_products_sheet();
                return self.export(transfer::PRODUCTS_FILENAME.to_string(), "Excel", &["xlsx"], bytes);
            }
            Message::ExportOrders => {
                let filename = transfer::order_filename(Local::now().date_naive());
                let bytes = self.catalog.export_orders_sheet();
                return self.export(filename, "Excel", &["xlsx"], bytes);
            }
            Message::ExportJson => {
                let filename = transfer::document_filename(Local::now().date_naive());
                let bytes = self.catalog.export_json().map(String::into_bytes);
                return self.export(filename, "JSON", &["json"], bytes);
            }
            Message::ExportFinished(result) => match result {
                Ok(path) => {
                    tracing::info!("📤 Exported {}", path.display());
                    self.catalog.push_notice(Notice::success("Data exported successfully"));
                }
                Err(e) => {
                    tracing::error!("❌ Export failed: {}", e);
                    self.catalog.push_notice(Notice::error(format!("Error exporting data: {}", e)));
                }
            },

            Message::ToggleOrderSummary => {
                self.show_order_summary = !self.show_order_summary;
            }

            Message::PickLogo => {
                let file = FileDialog::new()
                    .set_title("Select Logo")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    return Task::perform(read_file(path), Message::LogoLoaded);
                }
            }
            Message::LogoLoaded(result) => match result {
                Ok(bytes) => {
                    self.logo = Some(image::Handle::from_bytes(bytes));
                }
                Err(e) => {
                    tracing::error!("❌ Error loading logo: {}", e);
                    self.catalog.push_notice(Notice::error("Error loading logo"));
                }
            },

            Message::NoticeExpired => {
                self.notice = None;
            }
        }

        Task::none()
    }

    /// Report a failed save; returns whether the change was persisted
    fn check_saved(&mut self, result: error::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("❌ {}", e);
                self.catalog.push_notice(Notice::error(format!("Error saving data: {}", e)));
                false
            }
        }
    }

    fn finish_import(&mut self, source: &str, result: Result<usize, String>) {
        self.editing = None;
        self.refresh_thumbnails();
        match result {
            Ok(count) => {
                self.catalog
                    .push_notice(Notice::success(format!("{} imported successfully ({} products)", source, count)));
            }
            Err(e) => {
                tracing::error!("❌ Import failed: {}", e);
                self.catalog
                    .push_notice(Notice::error(format!("Error importing {}: {}", source, e)));
            }
        }
    }

    /// Ask for a destination and write `bytes` there in the background
    fn export(
        &mut self,
        filename: String,
        filter_name: &str,
        extensions: &[&str],
        bytes: error::Result<Vec<u8>>,
    ) -> Task<Message> {
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("❌ Failed to build {}: {}", filename, e);
                self.catalog.push_notice(Notice::error(format!("Error exporting data: {}", e)));
                return Task::none();
            }
        };

        let destination = FileDialog::new()
            .set_title("Export")
            .set_file_name(&filename)
            .add_filter(filter_name, extensions)
            .save_file();

        match destination {
            Some(path) => Task::perform(write_file(path, bytes), Message::ExportFinished),
            None => Task::none(),
        }
    }

    fn sync_settings_input(&mut self) {
        let settings = *self.catalog.settings();
        self.settings_input = SettingKey::ALL
            .iter()
            .map(|key| settings.get(*key).to_string())
            .collect();
    }

    /// Re-decode product images after the collection changed shape
    fn refresh_thumbnails(&mut self) {
        self.thumbnails = self
            .catalog
            .products()
            .iter()
            .enumerate()
            .filter(|(_, product)| !product.image.is_placeholder())
            .filter_map(|(index, product)| match decode_data_url(product.image.as_str()) {
                Ok(bytes) => Some((index, image::Handle::from_bytes(bytes))),
                Err(e) => {
                    tracing::warn!("⚠️  Unreadable image for {}: {}", product.item_no, e);
                    None
                }
            })
            .collect();
    }

    /// Show the newest pending notice
    fn collect_notices(&mut self) {
        if let Some(latest) = self.catalog.take_notices().pop() {
            self.notice = Some(latest);
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let logo: Element<Message> = match &self.logo {
            Some(handle) => image(handle.clone()).height(Length::Fixed(80.0)).into(),
            None => container(text("Logo").size(12))
                .center_x(Length::Fixed(200.0))
                .center_y(Length::Fixed(80.0))
                .style(container::bordered_box)
                .into(),
        };
        let header = row![
            logo,
            button("Change Logo").on_press(Message::PickLogo),
            text("Product Catalog").size(32),
        ]
        .spacing(16)
        .align_y(Alignment::Center);

        let mut content: Column<Message> = column![
            header,
            self.view_settings(),
            self.view_toolbar(),
        ]
        .spacing(16)
        .padding(20);

        if let Some(notice) = &self.notice {
            let banner = text(notice.message.as_str()).size(16);
            content = content.push(match notice.level {
                NoticeLevel::Info => banner,
                NoticeLevel::Success => banner.style(text::success),
                NoticeLevel::Error => banner.style(text::danger),
            });
        }

        let orders = self.catalog.orders();
        let order_summary = if orders.is_empty() {
            "No products ordered".to_string()
        } else {
            format!(
                "Order: {} lines, total €{}",
                orders.len(),
                money_label(self.catalog.total_order_value())
            )
        };
        content = content.push(text(order_summary).size(16));
        let products = scrollable(self.view_products()).height(Length::Fill).width(Length::Fill);
        content = content.push(if self.show_order_summary {
            row![products, self.view_order_summary()].spacing(16)
        } else {
            row![products]
        });

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_settings(&self) -> Element<'_, Message> {
        let fields = SettingKey::ALL.iter().zip(&self.settings_input).map(|(&key, raw)| {
            column![
                text(key.label()).size(12),
                text_input("0", raw)
                    .on_input(move |value| Message::SettingChanged(key, value))
                    .width(Length::Fixed(120.0)),
            ]
            .spacing(4)
            .into()
        });

        Row::with_children(fields)
            .push(button("Reset").on_press(Message::ResetSettings))
            .spacing(12)
            .align_y(Alignment::End)
            .into()
    }

    fn view_toolbar(&self) -> Element<'_, Message> {
        let view = &self.catalog.view;

        column![
            row![
                text_input("Search by brand, item number or description", &view.search)
                    .on_input(Message::SearchChanged)
                    .width(Length::Fill),
                pick_list(SortField::ALL, Some(view.sort_field), Message::SortFieldSelected),
                button(text(view.sort_direction.label())).on_press(Message::ToggleSortDirection),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
            row![
                button("Add Product").on_press(Message::AddProduct),
                button("Import Excel").on_press(Message::ImportSheet),
                button("Import JSON").on_press(Message::ImportJson),
                button("Export Products").on_press(Message::ExportProducts),
                button(text(format!("View Order ({})", self.catalog.orders().len())))
                    .on_press(Message::ToggleOrderSummary),
                button("Export Order").on_press(Message::ExportOrders),
                button("Export JSON").on_press(Message::ExportJson),
                button("Remove All").on_press(Message::RemoveAllProducts),
            ]
            .spacing(8),
        ]
        .spacing(8)
        .into()
    }

    fn view_products(&self) -> Element<'_, Message> {
        let visible = self.catalog.visible();
        if visible.is_empty() {
            return text("No products").size(16).into();
        }

        let cards = visible
            .into_iter()
            .filter_map(|index| self.catalog.product(index).map(|product| self.view_product(index, product)));

        Column::with_children(cards).spacing(12).into()
    }

    fn view_product<'a>(&'a self, index: usize, product: &'a Product) -> Element<'a, Message> {
        let thumbnail: Element<Message> = match self.thumbnails.get(&index) {
            Some(handle) => image(handle.clone()).width(Length::Fixed(160.0)).into(),
            None => container(text("No image").size(12))
                .center_x(Length::Fixed(160.0))
                .center_y(Length::Fixed(120.0))
                .style(container::bordered_box)
                .into(),
        };

        let inputs = ProductField::ALL.iter().map(|&field| {
            let value = match &self.editing {
                Some((i, f, raw)) if *i == index && *f == field => raw.clone(),
                _ => field.display(product),
            };
            column![
                text(field.label()).size(12),
                text_input(field.label(), &value)
                    .on_input(move |raw| Message::FieldChanged(index, field, raw))
                    .width(Length::Fixed(150.0)),
            ]
            .spacing(4)
            .into()
        });
        let fields = Row::with_children(inputs).spacing(8).wrap();

        let pricing = match self.catalog.quote(index) {
            Some(quote) => row![
                text(format!("Units/Container: {}", quote.container_label())),
                text(format!("Landed Price: €{}", quote.landed_label())),
                text(format!("Profit: {}", quote.profit_label())),
            ]
            .spacing(24),
            None => row![],
        };

        let draft = self.catalog.order_form(index);
        let mut order = column![checkbox("Add to Order", draft.ordered)
            .on_toggle(move |ordered| Message::OrderToggled(index, ordered))]
        .spacing(8);
        if draft.ordered {
            order = order.push(
                row![
                    text_input("Order Quantity", &draft.qty)
                        .on_input(move |qty| Message::OrderQtyChanged(index, qty))
                        .width(Length::Fixed(150.0)),
                    text_input("Customer Price (€)", &draft.price)
                        .on_input(move |price| Message::OrderPriceChanged(index, price))
                        .width(Length::Fixed(150.0)),
                    text_input("Notes", &draft.notes)
                        .on_input(move |notes| Message::OrderNotesChanged(index, notes))
                        .width(Length::Fill),
                ]
                .spacing(8),
            );
        }

        let card = row![
            column![thumbnail, button("Change Image").on_press(Message::PickImage(index))]
                .spacing(8)
                .align_x(Alignment::Center),
            column![
                fields,
                pricing,
                order,
                button("Remove").on_press(Message::RemoveProduct(index)).style(button::danger),
            ]
            .spacing(12)
            .width(Length::Fill),
        ]
        .spacing(16);

        container(card)
            .padding(12)
            .width(Length::Fill)
            .style(container::rounded_box)
            .into()
    }

    fn view_order_summary(&self) -> Element<'_, Message> {
        let orders = self.catalog.orders();
        if orders.is_empty() {
            return container(text("No products ordered").size(16))
                .padding(12)
                .width(Length::Fixed(400.0))
                .style(container::rounded_box)
                .into();
        }

        let lines = orders.entries().iter().map(|entry| {
            column![
                text(entry.heading()).size(16),
                text(format!("Quantity: {} units", entry.order_qty)).size(14),
                text(format!("Price: €{} per unit", entry.customer_price)).size(14),
                text(format!("Total: €{}", money_label(entry.line_total()))).size(14),
                text(format!("Notes: {}", entry.notes_label())).size(14),
            ]
            .spacing(2)
            .into()
        });

        let summary = column![
            text("Order Summary").size(20),
            scrollable(Column::with_children(lines).spacing(12)).height(Length::Fill),
            text(format!("Total Order Value: €{}", money_label(self.catalog.total_order_value()))).size(18),
            button("Export Order")
                .on_press(Message::ExportOrders)
                .width(Length::Fill),
        ]
        .spacing(12);

        container(summary)
            .padding(12)
            .width(Length::Fixed(400.0))
            .height(Length::Fill)
            .style(container::rounded_box)
            .into()
    }

    /// Expire the banner while one is showing
    fn subscription(&self) -> Subscription<Message> {
        if self.notice.is_some() {
            time::every(NOTICE_TIMEOUT).map(|_| Message::NoticeExpired)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application(
        "Catalog Editor",
        CatalogEditor::update,
        CatalogEditor::view,
    )
    .subscription(CatalogEditor::subscription)
    .theme(CatalogEditor::theme)
    .centered()
    .run_with(CatalogEditor::new)
}

async fn read_file(path: PathBuf) -> Result<Vec<u8>, String> {
    tokio::fs::read(&path)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))
}

/// Read an image from disk and compress it for storage
async fn load_image(path: PathBuf, max_width: u32) -> Result<String, String> {
    let bytes = read_file(path).await?;
    compress_image(bytes, max_width).await.map_err(|e| e.to_string())
}

async fn write_file(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, String> {
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(path)
}
