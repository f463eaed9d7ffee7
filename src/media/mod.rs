/// Product image handling
///
/// This module handles:
/// - Compressing uploaded images to bounded-width JPEG data URLs
/// - Decoding stored data URLs back to bytes for display

pub mod compress;
