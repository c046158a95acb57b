//! Operation semantics of the cart store through its public API.

use pocket_cart_integration_tests::{ids, product};
use pocket_cart_store::{CartChange, CartStore, MemoryPersistence};
use proptest::prelude::*;

fn new_store() -> CartStore<MemoryPersistence> {
    CartStore::new(MemoryPersistence::new())
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_adding_same_product_twice_yields_quantity_two() {
    let store = new_store();
    assert_eq!(store.add_to_cart(product("a")).await.unwrap(), CartChange::Added);
    assert_eq!(
        store.add_to_cart(product("a")).await.unwrap(),
        CartChange::Incremented { quantity: 2 }
    );

    let products = store.products();
    assert_eq!(ids(&products), ["a"]);
    assert_eq!(products[0].quantity, 2);
}

#[tokio::test]
async fn test_decrementing_single_unit_empties_cart() {
    let store = new_store();
    store.add_to_cart(product("x")).await.unwrap();

    assert_eq!(store.decrement("x").await.unwrap(), CartChange::Removed);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_increment_middle_item_moves_it_first() {
    let store = new_store();
    for id in ["a", "b", "c"] {
        store.add_to_cart(product(id)).await.unwrap();
    }

    store.increment("b").await.unwrap();

    let products = store.products();
    assert_eq!(ids(&products), ["b", "a", "c"]);
    assert_eq!(store.get("b").unwrap().quantity, 2);
}

#[tokio::test]
async fn test_removed_item_can_be_added_again() {
    let store = new_store();
    store.add_to_cart(product("a")).await.unwrap();
    store.decrement("a").await.unwrap();

    assert_eq!(store.add_to_cart(product("a")).await.unwrap(), CartChange::Added);
    assert_eq!(store.get("a").unwrap().quantity, 1);
}

#[tokio::test]
async fn test_unknown_ids_are_ignored() {
    let store = new_store();
    store.add_to_cart(product("a")).await.unwrap();

    assert!(!store.increment("nope").await.unwrap().is_mutation());
    assert!(!store.decrement("nope").await.unwrap().is_mutation());
    assert_eq!(ids(&store.products()), ["a"]);
}

// =============================================================================
// Invariants over operation sequences
// =============================================================================

const IDS: [&str; 4] = ["a", "b", "c", "d"];

proptest! {
    /// Any sequence of operations leaves quantities >= 1, unique IDs, and the
    /// touched item where its operation puts it.
    #[test]
    fn test_operation_sequences_keep_invariants(
        ops in prop::collection::vec((0..IDS.len(), 0..3u8), 0..200)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let store = new_store();

            for (index, op) in ops {
                let id = IDS[index];
                let before = store.get(id);

                let change = match op {
                    0 => store.add_to_cart(product(id)).await.unwrap(),
                    1 => store.increment(id).await.unwrap(),
                    _ => store.decrement(id).await.unwrap(),
                };

                let products = store.products();
                prop_assert!(products.iter().all(|p| p.quantity >= 1));

                let mut unique = ids(&products);
                unique.sort_unstable();
                unique.dedup();
                prop_assert_eq!(unique.len(), products.len(), "duplicate ids");

                match change {
                    CartChange::Incremented { .. } | CartChange::Decremented { .. } => {
                        prop_assert_eq!(products[0].id.as_str(), id);
                    }
                    CartChange::NotFound => prop_assert!(before.is_none()),
                    CartChange::Added => {
                        prop_assert_eq!(products.last().unwrap().id.as_str(), id);
                    }
                    CartChange::Removed => prop_assert!(store.get(id).is_none()),
                }
            }
            Ok(())
        })?;
    }
}
