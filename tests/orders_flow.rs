mod common;

use std::{sync::Arc, time::Duration};

use common::{checkout_form, test_config};
use storefront_api::{
    cart::CartSessions,
    checkout::{reconcile_payment, submit_checkout},
    db::{OrmConn, contains_pattern, create_orm_conn, run_migrations},
    dto::{
        cart::AddToCartRequest,
        checkout::{CheckoutRequest, PaymentReturnQuery},
        orders::UpdateOrderStatusRequest,
    },
    entity::{
        product_variants::ActiveModel as VariantActive, products::ActiveModel as ProductActive,
    },
    middleware::auth::AuthUser,
    models::PaymentMethod,
    response::Navigation,
    routes::params::OrderListQuery,
    services::{
        account_service, admin_service, cart_service,
        catalog_service::SeaOrmCatalog,
        notify_service::LogNotifier,
        order_service::SeaOrmOrderStore,
        payment_service::{MockPaymentGateway, PaymentVerification},
    },
    state::AppState,
    storage::MemoryStorage,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use uuid::Uuid;

fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

async fn setup_state(database_url: &str, gateway: MockPaymentGateway) -> anyhow::Result<(AppState, OrmConn)> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let config = test_config();
    let state = AppState {
        carts: Arc::new(CartSessions::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(3600),
        )),
        config: Arc::new(config),
        catalog: Arc::new(SeaOrmCatalog::new(orm.clone())),
        orders: Arc::new(SeaOrmOrderStore::new(orm.clone())),
        gateway: Arc::new(gateway),
        notifier: Arc::new(LogNotifier),
    };
    Ok((state, orm))
}

/// One active wig with a 3-in-stock variant. Returns (product id, variant id).
async fn seed_wig(orm: &OrmConn) -> anyhow::Result<(i64, i64)> {
    let slug = format!("test-wig-{}", Uuid::new_v4());
    let product = ProductActive {
        id: NotSet,
        name: Set("Test Wig".into()),
        slug: Set(slug),
        category: Set(Some("bob".into())),
        description: Set(None),
        base_price_min: Set(Some(20_000)),
        original_price: Set(Some(25_000)),
        is_active: Set(true),
        details: Set(Some(serde_json::json!(["Human hair"]))),
        image_url: Set(None),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    let variant = VariantActive {
        id: NotSet,
        product_id: Set(product.id),
        color: Set("Noir".into()),
        color_hex: Set(Some("#111111".into())),
        length: Set(12),
        price: Set(20_000),
        stock_count: Set(Some(3)),
        sku: Set(None),
        is_active: Set(true),
        is_default: Set(true),
        medias: Set(Some(serde_json::json!(["/m/noir.jpg"]))),
        image_url: Set(None),
    }
    .insert(orm)
    .await?;

    Ok((product.id, variant.id))
}

#[test]
fn search_wildcards_match_literally() {
    assert_eq!(contains_pattern("Ama"), "%Ama%");
    assert_eq!(contains_pattern("100%"), "%100\\%%");
    assert_eq!(contains_pattern("A_a"), "%A\\_a%");
    assert_eq!(contains_pattern(r"C:\x"), r"%C:\\x%");
}

fn shopper() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    }
}

fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    }
}

// Cash checkout against a real database, then account and back-office views.
#[tokio::test]
async fn cash_checkout_account_and_admin_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
        return Ok(());
    };

    let (state, orm) = setup_state(&database_url, MockPaymentGateway::new()).await?;
    let (product_id, variant_id) = seed_wig(&orm).await?;
    let user = shopper();

    let session = state.carts.get_or_create(&Uuid::new_v4().to_string())?;
    cart_service::add_item(
        &state,
        &session,
        AddToCartRequest {
            product_id,
            variant_id,
            quantity: Some(2.0),
        },
    )
    .await?;

    let step = submit_checkout(
        &state,
        &session,
        Some(user.user_id),
        CheckoutRequest {
            form: checkout_form(),
            payment_method: PaymentMethod::Cash,
        },
    )
    .await?;
    let Navigation::Confirmation { order_id } = step.navigation else {
        anyhow::bail!("expected confirmation, got {:?}", step.navigation);
    };
    assert!(session.snapshot()?.is_empty());

    let mine = account_service::list_my_orders(&state, &user).await?;
    let mine = mine.data.expect("orders");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].id, order_id);
    assert_eq!(mine.items[0].total, 42_000);
    assert_eq!(mine.items[0].status, "pending");

    let detail = account_service::get_my_order(&state, &user, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 2);
    assert_eq!(detail.items[0].unit_price, 20_000);

    assert!(account_service::get_my_order(&state, &shopper(), order_id).await.is_err());

    let item_id = detail.items[0].id;
    let again = account_service::reorder_item(&state, &user, &session, order_id, item_id)
        .await?
        .data
        .expect("cart");
    assert_eq!(again.total_items, 2);

    let updated = admin_service::update_order_status(
        &state,
        &admin(),
        order_id,
        UpdateOrderStatusRequest {
            status: "Shipped".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(updated.status, "shipped");

    assert!(
        admin_service::update_order_status(
            &state,
            &admin(),
            order_id,
            UpdateOrderStatusRequest {
                status: "lost".into(),
            },
        )
        .await
        .is_err()
    );

    let listed = admin_service::list_all_orders(
        &state,
        &admin(),
        OrderListQuery {
            q: Some("Ama".into()),
            status: Some("shipped".into()),
            ..OrderListQuery::default()
        },
    )
    .await?;
    let listed_items = listed.data.expect("orders").items;
    assert!(listed_items.iter().any(|o| o.id == order_id));

    let wildcard = admin_service::list_all_orders(
        &state,
        &admin(),
        OrderListQuery {
            q: Some("A_a".into()),
            ..OrderListQuery::default()
        },
    )
    .await?;
    let wildcard_items = wildcard.data.expect("orders").items;
    assert!(wildcard_items.iter().all(|o| o.id != order_id));

    Ok(())
}

// Gateway checkout: the return is reconciled once and the webhook finds nothing left to do.
#[tokio::test]
async fn paid_return_creates_one_order() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
        return Ok(());
    };

    let payment_id = format!("py_{}", Uuid::new_v4().simple());

    let mut gateway = MockPaymentGateway::new();
    gateway.expect_provider().return_const("moneroo");
    gateway.expect_verify().returning(|_| {
        Ok(PaymentVerification {
            status: "success".into(),
        })
    });

    let (state, orm) = setup_state(&database_url, gateway).await?;
    let (product_id, variant_id) = seed_wig(&orm).await?;

    let session = state.carts.get_or_create(&Uuid::new_v4().to_string())?;
    cart_service::add_item(
        &state,
        &session,
        AddToCartRequest {
            product_id,
            variant_id,
            quantity: None,
        },
    )
    .await?;

    let step = submit_checkout(
        &state,
        &session,
        None,
        CheckoutRequest {
            form: checkout_form(),
            payment_method: PaymentMethod::Mobile,
        },
    )
    .await?;
    assert_eq!(step.navigation, Navigation::Payment);

    let query = PaymentReturnQuery {
        payment_id: Some(payment_id.clone()),
        payment_status: Some("success".into()),
    };
    let step = reconcile_payment(&state, &session, query.clone()).await?;
    let Navigation::Confirmation { order_id } = step.navigation else {
        anyhow::bail!("expected confirmation, got {:?}", step.navigation);
    };

    let order = state
        .orders
        .find_by_payment_id(payment_id.clone())
        .await?
        .expect("order stored");
    assert_eq!(order.id, order_id);
    assert_eq!(order.status, "paid");
    assert_eq!(order.payment_provider.as_deref(), Some("moneroo"));

    let replay = reconcile_payment(&state, &session, query).await?;
    assert_eq!(replay.navigation, Navigation::Cart);

    assert!(!state.orders.mark_paid(payment_id).await?);
    Ok(())
}
