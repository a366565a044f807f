use cart_core::snapshot::{decode, encode};
use cart_core::{
    CartState, CartStore, InMemoryKeyValueStore, KeyValueStore, LoadOutcome, NewCartItem,
    PersistError, PersistOutcome, SqliteKeyValueStore, StorageError, StorageResult, SNAPSHOT_KEY,
};
use std::cell::Cell;

fn product(id: &str) -> NewCartItem {
    NewCartItem::new(id, format!("Product {id}"), format!("https://img/{id}.png"), 12.5)
}

fn quantities<S: KeyValueStore>(store: &CartStore<S>) -> Vec<(String, u32)> {
    store
        .products()
        .iter()
        .map(|item| (item.id.clone(), item.quantity))
        .collect()
}

fn persisted(kv: &InMemoryKeyValueStore) -> CartState {
    decode(&kv.get(SNAPSHOT_KEY).unwrap().unwrap()).unwrap()
}

/// Fails writes until `healthy` is set; fails reads while `reads_fail` is set.
struct FlakyStore {
    inner: InMemoryKeyValueStore,
    healthy: Cell<bool>,
    reads_fail: Cell<bool>,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: InMemoryKeyValueStore::new(),
            healthy: Cell::new(false),
            reads_fail: Cell::new(false),
        }
    }
}

fn io_failure() -> StorageError {
    StorageError::Db(cart_core::db::DbError::Sqlite(
        rusqlite::Error::InvalidQuery,
    ))
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.reads_fail.get() {
            return Err(io_failure());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if !self.healthy.get() {
            return Err(io_failure());
        }
        self.inner.set(key, value)
    }
}

#[test]
fn distinct_adds_create_one_line_each() {
    let (mut store, _) = CartStore::open(InMemoryKeyValueStore::new());
    for id in ["a", "b", "c", "d"] {
        store.add_to_cart(product(id)).unwrap();
    }

    assert_eq!(
        quantities(&store),
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 1),
            ("c".to_string(), 1),
            ("d".to_string(), 1),
        ]
    );
}

#[test]
fn adding_same_id_twice_merges_into_quantity_two() {
    let (mut store, _) = CartStore::open(InMemoryKeyValueStore::new());
    store.add_to_cart(product("a")).unwrap();
    store.add_to_cart(product("a")).unwrap();

    assert_eq!(quantities(&store), vec![("a".to_string(), 2)]);
}

#[test]
fn increment_of_unknown_id_is_noop() {
    let (mut store, _) = CartStore::open(InMemoryKeyValueStore::new());
    store.add_to_cart(product("a")).unwrap();
    let before = store.state().clone();

    assert!(store.increment("missing").is_saved());
    assert_eq!(store.state(), &before);
}

#[test]
fn decrement_removes_at_one_and_reduces_above_one() {
    let (mut store, _) = CartStore::open(InMemoryKeyValueStore::new());
    store.add_to_cart(product("a")).unwrap();
    store.add_to_cart(product("b")).unwrap();
    store.increment("b");

    store.decrement("a");
    store.decrement("b");
    store.decrement("missing");

    assert_eq!(quantities(&store), vec![("b".to_string(), 1)]);
}

#[test]
fn full_scenario_persists_after_update_state() {
    let kv = InMemoryKeyValueStore::new();
    let (mut store, _) = CartStore::open(&kv);

    store.add_to_cart(product("A")).unwrap();
    assert_eq!(quantities(&store), vec![("A".to_string(), 1)]);
    assert_eq!(&persisted(&kv), store.state());

    store.add_to_cart(product("A")).unwrap();
    assert_eq!(quantities(&store), vec![("A".to_string(), 2)]);
    assert_eq!(&persisted(&kv), store.state());

    store.increment("A");
    assert_eq!(quantities(&store), vec![("A".to_string(), 3)]);
    assert_eq!(&persisted(&kv), store.state());

    store.decrement("A");
    store.decrement("A");
    assert_eq!(quantities(&store), vec![("A".to_string(), 1)]);
    assert_eq!(&persisted(&kv), store.state());

    store.decrement("A");
    assert!(store.products().is_empty());
    assert!(persisted(&kv).is_empty());
}

#[test]
fn snapshot_roundtrip_preserves_every_field() {
    let (mut store, _) = CartStore::open(InMemoryKeyValueStore::new());
    store.add_to_cart(product("a")).unwrap();
    store
        .add_to_cart(NewCartItem::new("b", "Kettle", "kettle.png", 0.0))
        .unwrap();
    store.increment("b");

    let decoded = decode(&encode(store.state()).unwrap()).unwrap();
    assert_eq!(&decoded, store.state());
}

#[test]
fn reopened_store_restores_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.sqlite3");

    {
        let (mut store, _) = CartStore::open(SqliteKeyValueStore::open(&path).unwrap());
        store.add_to_cart(product("a")).unwrap();
        store.add_to_cart(product("b")).unwrap();
        store.increment("a");
    }

    let mut store = CartStore::new(SqliteKeyValueStore::open(&path).unwrap());
    assert_eq!(store.initialize(), LoadOutcome::Restored { items: 2 });
    assert_eq!(
        quantities(&store),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[test]
fn corrupt_snapshot_loads_as_empty_cart() {
    let kv = InMemoryKeyValueStore::with_entry(SNAPSHOT_KEY, "{not json");
    let mut store = CartStore::new(&kv);

    assert_eq!(store.initialize(), LoadOutcome::Discarded);
    assert!(store.products().is_empty());

    store.add_to_cart(product("a")).unwrap();
    assert_eq!(persisted(&kv).len(), 1);
}

#[test]
fn duplicate_ids_in_snapshot_are_discarded() {
    let raw = r#"[
        {"id":"a","title":"t","image_url":"i","price":1.0,"quantity":1},
        {"id":"a","title":"t","image_url":"i","price":1.0,"quantity":3}
    ]"#;
    let mut store = CartStore::new(InMemoryKeyValueStore::with_entry(SNAPSHOT_KEY, raw));
    assert_eq!(store.initialize(), LoadOutcome::Discarded);
    assert!(store.state().is_empty());
}

#[test]
fn failed_write_keeps_memory_and_next_write_resyncs() {
    let flaky = FlakyStore::new();
    let (mut store, _) = CartStore::open(&flaky);

    let outcome = store.add_to_cart(product("a")).unwrap();
    assert!(matches!(
        outcome,
        PersistOutcome::Failed(PersistError::Storage(_))
    ));
    assert_eq!(quantities(&store), vec![("a".to_string(), 1)]);
    assert_eq!(flaky.inner.get(SNAPSHOT_KEY).unwrap(), None);

    flaky.healthy.set(true);
    assert!(store.increment("missing").is_saved());
    assert_eq!(&persisted(&flaky.inner), store.state());
}

#[test]
fn unreadable_storage_starts_empty_cart() {
    let flaky = FlakyStore::new();
    flaky.healthy.set(true);
    flaky
        .inner
        .set(
            SNAPSHOT_KEY,
            r#"[{"id":"a","title":"t","image_url":"i","price":1.0,"quantity":2}]"#,
        )
        .unwrap();
    flaky.reads_fail.set(true);

    let (mut store, outcome) = CartStore::open(&flaky);
    assert_eq!(outcome, LoadOutcome::Unavailable);
    assert!(store.products().is_empty());
    assert_eq!(store.initialize(), LoadOutcome::AlreadyInitialized);
}

#[test]
fn discount_lines_restore_from_snapshot() {
    let raw = r#"[
        {"id":"mug","title":"Mug","image_url":"mug.png","price":12.0,"quantity":1},
        {"id":"promo","title":"Spring promo","image_url":"","price":-3.5,"quantity":1}
    ]"#;
    let (store, outcome) = CartStore::open(InMemoryKeyValueStore::with_entry(SNAPSHOT_KEY, raw));

    assert_eq!(outcome, LoadOutcome::Restored { items: 2 });
    assert_eq!(store.state().subtotal(), 8.5);
}
