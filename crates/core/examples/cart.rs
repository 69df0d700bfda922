//! Cart Walkthrough Example
//!
//! Builds a small cart the way the marketplace UI would: repeated adds of
//! the same artwork collapse into one line item, quantities floor at zero,
//! and the badge count tracks units rather than distinct items.

use rust_decimal::Decimal;

use atelier::prelude::*;

/// Cart Walkthrough Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<(), PayloadError> {
    let mut cart = Cart::new();

    cart.add(
        ItemPayload::new("art-42")
            .with_price(Decimal::from(1500))
            .with_detail("title", "Harbour at Dusk".into()),
        2,
    )?;

    cart.add(
        ItemPayload::for_artwork("art-7").with_price(Decimal::from(950)),
        1,
    )?;

    // Same identity as the first add, under the server's field name.
    cart.add(ItemPayload::for_artwork("art-42"), 1)?;

    for item in cart.items() {
        println!(
            "{} × {} @ {}",
            item.quantity(),
            item.id(),
            item.price()
        );
    }

    println!("distinct items: {}", cart.len());
    println!("units in cart:  {}", cart.unit_count());
    println!("total:          {}", cart.total());

    cart.set_quantity(&ItemId::new("art-7"), 0);
    println!("after flooring art-7 to zero: {} items", cart.len());

    Ok(())
}
