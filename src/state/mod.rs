/// State management module
///
/// This module handles all application state, including:
/// - The catalog object tying the stores together (catalog.rs)
/// - Shared data structures (data.rs)
/// - Global pricing parameters (settings.rs)
/// - The positional order list and order forms (orders.rs)
/// - Search and sort projection (view.rs)
/// - The key/value persistence port and its backends (storage.rs)

pub mod catalog;
pub mod data;
pub mod orders;
pub mod settings;
pub mod storage;
pub mod view;
