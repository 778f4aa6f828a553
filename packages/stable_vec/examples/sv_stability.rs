//! Demonstrates the address-stability guarantee: elements never move, no
//! matter what happens to the sequence around them.

use std::ptr;

use stable_vec::StableVec;

fn main() {
    let mut items: StableVec<String> = StableVec::new();

    items.push("anchored".to_string());

    let address_at_insertion: *const String = ptr::from_ref(&items[0]);
    println!("Element address right after insertion: {address_at_insertion:?}");

    // Force many reallocations of the handle sequence.
    for i in 0..100_000 {
        items.push(i.to_string());
    }

    // Shift the element's position around.
    items.insert(0, "newcomer in front".to_string());
    items.reserve(100_000);
    items.shrink_to_fit();

    let address_now: *const String = ptr::from_ref(&items[1]);
    println!("Element address after 100k pushes, an insert and reshaping: {address_now:?}");

    assert_eq!(address_at_insertion, address_now);
    println!("The element never moved.");

    // Contrast with a plain Vec, which relocates its contents on growth.
    let mut plain = vec!["anchored".to_string()];
    let plain_address: *const String = ptr::from_ref(&plain[0]);

    for i in 0..100_000 {
        plain.push(i.to_string());
    }

    if ptr::from_ref(&plain[0]) == plain_address {
        println!("The plain Vec happened not to move its first element this time.");
    } else {
        println!("The plain Vec relocated its first element, as expected.");
    }
}
