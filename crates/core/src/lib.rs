//! Atelier
//!
//! Atelier is the cart engine of a multi-role art marketplace client: canonical
//! in-memory cart state with identity normalization, derived totals, and the
//! invariants the rest of the client relies on.

pub mod cart;
pub mod items;
pub mod prelude;
