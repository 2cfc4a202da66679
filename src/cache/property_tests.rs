//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store/get round trip and the call tracking.

use proptest::prelude::*;
use std::sync::Arc;

use crate::cache::{Cache, CacheValue, STORE_OPERATION};
use crate::store::{KeyValueStore, MemoryStore};

// == Helpers ==
fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// == Strategies ==
/// Generates any of the four accepted value types
fn cache_value_strategy() -> impl Strategy<Value = CacheValue> {
    prop_oneof![
        ".{0,64}".prop_map(CacheValue::Text),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(CacheValue::Bytes),
        any::<i64>().prop_map(CacheValue::Int),
        any::<f64>().prop_map(CacheValue::Float),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Round trip: the key returned by store reads back the exact bytes written.
    #[test]
    fn prop_store_get_roundtrip(value in cache_value_strategy()) {
        runtime().block_on(async {
            let cache = Cache::new(Arc::new(MemoryStore::new()));

            let key = cache.store(value.clone()).await.unwrap();
            let stored = cache.get(&key).await.unwrap();

            prop_assert_eq!(stored, Some(value.to_bytes()));
            Ok(())
        })?;
    }

    // Integers read back through get_int unchanged.
    #[test]
    fn prop_int_roundtrip(n in any::<i64>()) {
        runtime().block_on(async {
            let cache = Cache::new(Arc::new(MemoryStore::new()));

            let key = cache.store(n).await.unwrap();
            prop_assert_eq!(cache.get_int(&key).await.unwrap(), Some(n));
            Ok(())
        })?;
    }

    // After N calls the counter is N and both logs hold N entries in call order.
    #[test]
    fn prop_call_tracking(values in prop::collection::vec(cache_value_strategy(), 0..20)) {
        runtime().block_on(async {
            let store = Arc::new(MemoryStore::new());
            let cache = Cache::new(store.clone());

            let mut keys = Vec::new();
            for value in &values {
                keys.push(cache.store(value.clone()).await.unwrap());
            }

            let op = cache.store_operation();
            prop_assert_eq!(op.call_count().await.unwrap(), values.len() as i64);

            let inputs = store.lrange("Cache.store:inputs", 0, -1).await.unwrap();
            let outputs = store.lrange("Cache.store:outputs", 0, -1).await.unwrap();
            prop_assert_eq!(inputs.len(), values.len());
            prop_assert_eq!(outputs.len(), values.len());

            for ((input, output), (value, key)) in inputs.iter().zip(&outputs).zip(values.iter().zip(&keys)) {
                prop_assert_eq!(input, &value.repr_args().into_bytes());
                prop_assert_eq!(output, &key.clone().into_bytes());
            }

            if values.is_empty() {
                prop_assert_eq!(store.get(STORE_OPERATION).await.unwrap(), None);
            }
            Ok(())
        })?;
    }

    // Keys that were never written read back as absent.
    #[test]
    fn prop_unknown_key_absent(key in "[a-z0-9-]{1,40}") {
        runtime().block_on(async {
            let cache = Cache::new(Arc::new(MemoryStore::new()));
            cache.store("something").await.unwrap();

            prop_assert_eq!(cache.get(&key).await.unwrap(), None);
            Ok(())
        })?;
    }
}
