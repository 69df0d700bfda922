//! Atelier prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::Cart,
    items::{ItemDetails, ItemId, ItemPayload, LineItem, PayloadError},
};
