//! Record model for stock summary tables.
//!
//! This module handles:
//! - The flat `Summary` shape and the keyed `Envelope` shape
//! - Decoding raw store items into either shape

pub mod decode;
pub mod types;

pub use decode::{decode_item, decode_items};
pub use types::{Envelope, RecordShape, Records, Summary};
