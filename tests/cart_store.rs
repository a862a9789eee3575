mod common;

use std::{sync::Arc, time::Duration};

use common::{product, variant};
use storefront_api::{
    cart::{
        CartSessions, CartStore,
        session::is_valid_session_id,
        store::{CART_ITEMS_KEY, DELIVERY_MODE_KEY},
    },
    checkout::{CheckoutForm, CheckoutPayload, PayloadStash, payload::CHECKOUT_PAYLOAD_KEY},
    dto::cart::floor_quantity,
    models::{DeliveryMode, PaymentMethod},
    storage::{ClientStorage, FileStorage, MemoryStorage, ScopedStorage},
};

fn memory_store() -> (Arc<MemoryStorage>, CartStore) {
    let storage = Arc::new(MemoryStorage::new());
    let store = CartStore::create(storage.clone());
    (storage, store)
}

#[test]
fn quantity_never_exceeds_stock() {
    let (_, mut cart) = memory_store();
    let p = product(1);
    let v = variant(10, 1, "Noir", 12, 5_000, 4);

    cart.add_to_cart(&p, &v, 3);
    cart.add_to_cart(&p, &v, 3);
    assert_eq!(cart.line(10).map(|l| l.quantity), Some(4));

    cart.update_quantity(10, 100);
    assert_eq!(cart.line(10).map(|l| l.quantity), Some(4));

    cart.add_to_cart(&p, &v, 1);
    cart.update_quantity(10, 2);
    cart.add_to_cart(&p, &v, 50);
    assert_eq!(cart.line(10).map(|l| l.quantity), Some(4));
}

#[test]
fn adding_same_variant_twice_merges_into_one_line() {
    let (_, mut cart) = memory_store();
    let p = product(1);
    let v = variant(10, 1, "Noir", 12, 5_000, 10);

    cart.add_to_cart(&p, &v, 2);
    cart.add_to_cart(&p, &v, 3);

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].quantity, 5);
    assert_eq!(cart.total_items(), 5);
}

#[test]
fn update_is_clamped_to_stock() {
    let (_, mut cart) = memory_store();
    let v = variant(10, 1, "Noir", 12, 5_000, 3);
    cart.add_to_cart(&product(1), &v, 1);

    cart.update_quantity(10, 10);

    assert_eq!(cart.line(10).map(|l| l.quantity), Some(3));
    assert_eq!(cart.total_price(), 15_000);
}

#[test]
fn sold_out_or_inactive_variants_are_not_added() {
    let (_, mut cart) = memory_store();
    let p = product(1);
    let sold_out = variant(10, 1, "Noir", 12, 5_000, 0);
    let mut inactive = variant(11, 1, "Noir", 14, 5_000, 5);
    inactive.is_active = false;
    let mut unknown_stock = variant(12, 1, "Noir", 16, 5_000, 5);
    unknown_stock.stock_count = None;

    cart.add_to_cart(&p, &sold_out, 1);
    cart.add_to_cart(&p, &inactive, 1);
    cart.add_to_cart(&p, &unknown_stock, 1);

    assert!(cart.is_empty());
}

#[test]
fn non_positive_add_counts_as_one() {
    let (_, mut cart) = memory_store();
    cart.add_to_cart(&product(1), &variant(10, 1, "Noir", 12, 5_000, 5), 0);
    assert_eq!(cart.line(10).map(|l| l.quantity), Some(1));
}

#[test]
fn zero_or_negative_update_removes_the_line() {
    let (_, mut cart) = memory_store();
    let p = product(1);
    cart.add_to_cart(&p, &variant(10, 1, "Noir", 12, 5_000, 5), 2);
    cart.add_to_cart(&p, &variant(11, 1, "Noir", 14, 6_000, 5), 2);

    cart.update_quantity(10, 0);
    cart.update_quantity(11, floor_quantity(0.9));

    assert!(cart.is_empty());
}

#[test]
fn fractional_quantities_are_floored() {
    assert_eq!(floor_quantity(2.7), 2);
    assert_eq!(floor_quantity(-0.5), -1);
    assert_eq!(floor_quantity(f64::NAN), 0);
}

#[test]
fn inactive_line_cannot_grow() {
    let storage = Arc::new(MemoryStorage::new());
    let mut v = variant(10, 1, "Noir", 12, 5_000, 5);
    v.is_active = false;
    let lines = serde_json::json!([{ "product": product(1), "variant": v, "quantity": 2 }]);
    storage
        .set_item(CART_ITEMS_KEY, &lines.to_string())
        .expect("seed storage");

    let mut cart = CartStore::create(storage);
    cart.update_quantity(10, 4);
    assert_eq!(cart.line(10).map(|l| l.quantity), Some(2));

    cart.update_quantity(10, 1);
    assert_eq!(cart.line(10).map(|l| l.quantity), Some(1));
}

#[test]
fn removing_missing_line_is_a_no_op() {
    let (_, mut cart) = memory_store();
    cart.add_to_cart(&product(1), &variant(10, 1, "Noir", 12, 5_000, 5), 1);
    cart.remove_from_cart(99);
    cart.update_quantity(99, 3);
    assert_eq!(cart.lines().len(), 1);
}

#[test]
fn clear_cart_resets_delivery_mode() {
    let (storage, mut cart) = memory_store();
    cart.add_to_cart(&product(1), &variant(10, 1, "Noir", 12, 5_000, 5), 1);
    cart.set_delivery_mode(DeliveryMode::Pickup);

    cart.clear_cart();

    assert!(cart.is_empty());
    assert_eq!(cart.delivery_mode(), DeliveryMode::Delivery);
    assert_eq!(
        storage.get_item(DELIVERY_MODE_KEY).expect("read"),
        Some("delivery".to_string())
    );
}

#[test]
fn cart_survives_a_reload_from_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let p = product(1);

    let before = {
        let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::open(dir.path())?);
        let mut cart = CartStore::create(storage);
        cart.add_to_cart(&p, &variant(10, 1, "Noir", 12, 5_000, 5), 2);
        cart.add_to_cart(&p, &variant(11, 1, "Blond", 16, 7_500, 3), 1);
        cart.set_delivery_mode(DeliveryMode::Pickup);
        let snapshot = cart.snapshot();
        cart.dispose();
        snapshot
    };

    let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::open(dir.path())?);
    let after = CartStore::create(storage).snapshot();

    assert_eq!(after, before);
    assert_eq!(after.delivery_mode, DeliveryMode::Pickup);
    assert_eq!(after.total_price, 17_500);
    Ok(())
}

#[test]
fn malformed_storage_loads_an_empty_cart() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(CART_ITEMS_KEY, "{not json").expect("seed");
    storage.set_item(DELIVERY_MODE_KEY, "teleport").expect("seed");

    let cart = CartStore::create(storage);

    assert!(cart.is_empty());
    assert_eq!(cart.delivery_mode(), DeliveryMode::Delivery);
}

#[test]
fn subscribers_see_every_mutation_until_dispose() -> anyhow::Result<()> {
    let (_, mut cart) = memory_store();
    let mut rx = cart.subscribe();

    cart.add_to_cart(&product(1), &variant(10, 1, "Noir", 12, 5_000, 5), 2);
    assert!(rx.has_changed()?);
    assert_eq!(rx.borrow_and_update().total_items, 2);

    cart.set_delivery_mode(DeliveryMode::Pickup);
    assert_eq!(rx.borrow_and_update().delivery_mode, DeliveryMode::Pickup);

    cart.dispose();
    assert!(rx.has_changed().is_err());
    Ok(())
}

#[test]
fn scoped_storage_keeps_sessions_apart() -> anyhow::Result<()> {
    let shared: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
    let alice = ScopedStorage::new(shared.clone(), "alice");
    let bob = ScopedStorage::new(shared.clone(), "bob");

    alice.set_item(CART_ITEMS_KEY, "[]")?;

    assert_eq!(alice.get_item(CART_ITEMS_KEY)?, Some("[]".to_string()));
    assert_eq!(bob.get_item(CART_ITEMS_KEY)?, None);
    assert_eq!(shared.get_item("alice:cart_items_v1")?, Some("[]".to_string()));
    Ok(())
}

#[test]
fn registry_returns_the_same_session_until_disposed() -> anyhow::Result<()> {
    let carts = Arc::new(MemoryStorage::new());
    let sessions = CartSessions::new(
        carts.clone(),
        Arc::new(MemoryStorage::new()),
        Duration::from_secs(60),
    );

    let first = sessions.get_or_create("session-0001")?;
    first.update(|cart| cart.add_to_cart(&product(1), &variant(10, 1, "Noir", 12, 5_000, 5), 1))?;
    let again = sessions.get_or_create("session-0001")?;
    assert!(Arc::ptr_eq(&first, &again));

    drop((first, again));
    sessions.dispose("session-0001")?;

    let reloaded = sessions.get_or_create("session-0001")?;
    assert_eq!(reloaded.snapshot()?.total_items, 1);

    let other = sessions.get_or_create("session-0002")?;
    assert!(other.snapshot()?.is_empty());
    Ok(())
}

#[test]
fn huge_quantity_merges_up_to_stock() -> anyhow::Result<()> {
    let sessions = CartSessions::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
        Duration::from_secs(60),
    );
    let session = sessions.get_or_create("session-huge")?;
    let p = product(1);
    let v = variant(10, 1, "Noir", 12, 5_000, 3);

    session.update(|cart| cart.add_to_cart(&p, &v, 1))?;
    assert_eq!(floor_quantity(1e300), i64::from(i32::MAX));
    session.update(|cart| cart.add_to_cart(&p, &v, floor_quantity(1e300)))?;
    let snapshot = session.update(|cart| cart.add_to_cart(&p, &v, i64::MAX))?;

    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.total_items, 3);
    assert_eq!(session.snapshot()?.total_price, 15_000);
    Ok(())
}

#[test]
fn idle_sessions_are_evicted_and_reload_from_storage() -> anyhow::Result<()> {
    let sessions = CartSessions::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
        Duration::from_secs(60),
    )
    .with_idle_ttl(Duration::ZERO);

    let idle = sessions.get_or_create("session-idle")?;
    idle.update(|cart| cart.add_to_cart(&product(1), &variant(10, 1, "Noir", 12, 5_000, 5), 2))?;
    drop(idle);

    let held = sessions.get_or_create("session-held")?;
    let busy = sessions.get_or_create("session-busy")?;
    let guard = busy.begin_submission();
    assert!(guard.is_some());
    drop(busy);
    assert_eq!(sessions.len(), 3);

    assert_eq!(sessions.evict_idle()?, 1);
    assert_eq!(sessions.len(), 2);

    let reloaded = sessions.get_or_create("session-idle")?;
    assert_eq!(reloaded.snapshot()?.total_items, 2);

    drop((reloaded, held, guard));
    assert_eq!(sessions.evict_idle()?, 3);
    assert!(sessions.is_empty());
    Ok(())
}

#[test]
fn recently_used_sessions_survive_a_sweep() -> anyhow::Result<()> {
    let sessions = CartSessions::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
        Duration::from_secs(3600),
    );
    drop(sessions.get_or_create("session-fresh")?);

    assert_eq!(sessions.evict_idle()?, 0);
    assert_eq!(sessions.len(), 1);
    Ok(())
}

#[test]
fn submission_guard_is_exclusive_and_released_on_drop() -> anyhow::Result<()> {
    let sessions = CartSessions::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
        Duration::from_secs(60),
    );
    let session = sessions.get_or_create("session-guard")?;

    let guard = session.begin_submission();
    assert!(guard.is_some());
    assert!(session.begin_submission().is_none());
    assert!(session.is_submitting());

    drop(guard);
    assert!(!session.is_submitting());
    assert!(session.begin_submission().is_some());
    Ok(())
}

#[test]
fn session_ids_are_validated() {
    assert!(is_valid_session_id("0b6f6c1e-5d2a-4c2e-9a57-3b1f0c9d2e11"));
    assert!(is_valid_session_id("abc_DEF-12"));
    assert!(!is_valid_session_id("short"));
    assert!(!is_valid_session_id("has spaces in it"));
    assert!(!is_valid_session_id(&"x".repeat(65)));
}

fn sample_payload() -> CheckoutPayload {
    CheckoutPayload {
        user_id: None,
        form_data: CheckoutForm {
            full_name: "Ama Mensah".into(),
            phone: "90 00 00 00".into(),
            ..CheckoutForm::default()
        },
        payment_method: PaymentMethod::Mobile,
        delivery_mode: DeliveryMode::Pickup,
        items: Vec::new(),
        total_price: 0,
    }
}

#[test]
fn staged_payload_is_read_back_until_discarded() -> anyhow::Result<()> {
    let stash = PayloadStash::new(Arc::new(MemoryStorage::new()), Duration::from_secs(60));
    let payload = sample_payload();

    stash.stage(&payload)?;
    assert_eq!(stash.peek(), Some(payload.clone()));
    assert_eq!(stash.peek(), Some(payload));

    stash.discard();
    assert_eq!(stash.peek(), None);
    Ok(())
}

#[test]
fn expired_payload_reads_as_absent_and_is_removed() -> anyhow::Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let stash = PayloadStash::new(storage.clone(), Duration::from_secs(60));

    let envelope = serde_json::json!({
        "staged_at": "2020-01-01T00:00:00Z",
        "payload": serde_json::to_value(sample_payload())?,
    });
    storage.set_item(CHECKOUT_PAYLOAD_KEY, &envelope.to_string())?;

    assert_eq!(stash.peek(), None);
    assert_eq!(storage.get_item(CHECKOUT_PAYLOAD_KEY)?, None);
    Ok(())
}
