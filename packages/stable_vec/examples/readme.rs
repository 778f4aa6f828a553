//! Example from the package README, verifying that it stays valid.

use stable_vec::StableVec;

fn main() {
    let mut items: StableVec<String> = StableVec::new();
    items.push("anchored".to_string());

    let address: *const String = &items[0];

    // Growth, insertion elsewhere and capacity reshaping do not move elements.
    for i in 0..10_000 {
        items.push(i.to_string());
    }
    items.insert(0, "zeroth".to_string());
    items.shrink_to_fit();

    assert_eq!(address, std::ptr::from_ref(&items[1]));

    println!("The element stayed at {address:?} through it all.");
}
