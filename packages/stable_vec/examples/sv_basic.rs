//! Basic usage of the `stable_vec` crate:
//!
//! * Creating a sequence.
//! * Adding and accessing elements.
//! * Removing elements.
//! * The pass-through variant for primitives.

use stable_vec::{DirectVec, StableVec};

fn main() {
    let mut guests: StableVec<String> = StableVec::new();

    guests.push("Alice".to_string());
    guests.push("Bob".to_string());
    guests.push("Charlie".to_string());

    println!(
        "The guest list holds {} names, with room for {} before the list grows",
        guests.len(),
        guests.capacity()
    );

    // Element access looks exactly like a Vec.
    println!("First guest: {}", guests[0]);
    println!("Last guest: {}", guests.last().expect("list is not empty"));

    // Insertion in the middle shifts only the per-element handles; the names
    // themselves stay where they are in memory.
    guests.insert(1, "Beatrice".to_string());

    let removed = guests.remove(2);
    println!("{removed} cancelled; {} guests remain:", guests.len());

    for guest in &guests {
        println!("  - {guest}");
    }

    // For primitives there is nothing to pin down, so a direct variant skips
    // the indirection and behaves like a plain Vec.
    let mut table_numbers: DirectVec<u32> = DirectVec::new();
    for table in 1..=3 {
        table_numbers.push(table);
    }

    println!("Tables in use: {table_numbers:?}");
}
