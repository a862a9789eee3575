use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr, sea_query::extension::postgres::PgExpr,
};
use uuid::Uuid;

use crate::{
    audit::log_audit_best_effort,
    checkout::payload::OrderLineSnapshot,
    db::{OrmConn, contains_pattern},
    dto::orders::OrderWithItems,
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::AppResult,
    models::{DeliveryMode, NewOrder, Order, OrderItem},
};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";

pub const ORDER_STATUSES: [&str; 6] = [
    "pending",
    "paid",
    "processing",
    "shipped",
    "delivered",
    "cancelled",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    /// Case-insensitive match on name, phone or status.
    pub q: Option<String>,
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub oldest_first: bool,
}

#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: NewOrder) -> AppResult<Order>;

    /// One row per snapshot line, prices copied as-is.
    async fn insert_items(
        &self,
        order_id: Uuid,
        items: Vec<OrderLineSnapshot>,
    ) -> AppResult<Vec<OrderItem>>;

    async fn find_by_payment_id(&self, payment_id: String) -> AppResult<Option<Order>>;

    /// Marks the order holding `payment_id` as paid. `false` when there is no
    /// such order or it was already paid.
    async fn mark_paid(&self, payment_id: String) -> AppResult<bool>;

    /// A page of orders plus the total count for the filter.
    async fn list_orders(&self, filter: OrderFilter) -> AppResult<(Vec<Order>, i64)>;

    async fn get_order(&self, id: Uuid) -> AppResult<Option<OrderWithItems>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: String,
        actor: Option<Uuid>,
    ) -> AppResult<Option<Order>>;
}

#[derive(Debug, Clone)]
pub struct SeaOrmOrderStore {
    orm: OrmConn,
}

impl SeaOrmOrderStore {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl OrderStore for SeaOrmOrderStore {
    async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let active = OrderActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(order.user_id),
            full_name: Set(order.full_name),
            phone: Set(order.phone),
            email: Set(order.email),
            country: Set(order.country),
            region: Set(order.region),
            city: Set(order.city),
            address: Set(order.address),
            notes: Set(order.notes),
            payment_method: Set(order.payment_method.as_str().to_string()),
            delivery_mode: Set(order.delivery_mode.as_str().to_string()),
            delivery_fee: Set(order.delivery_fee),
            total: Set(order.total),
            payment_provider: Set(order.payment_provider),
            payment_id: Set(order.payment_id),
            payment_status: Set(order.payment_status),
            status: Set(order.status),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = active.insert(&self.orm).await?;

        log_audit_best_effort(
            &self.orm,
            created.user_id,
            "order_create",
            "orders",
            Some(created.id.to_string()),
            Some(serde_json::json!({
                "total": created.total,
                "payment_method": created.payment_method,
                "payment_id": created.payment_id,
            })),
        )
        .await;

        Ok(order_from_entity(created))
    }

    async fn insert_items(
        &self,
        order_id: Uuid,
        items: Vec<OrderLineSnapshot>,
    ) -> AppResult<Vec<OrderItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let rows: Vec<OrderItemActive> = items
            .into_iter()
            .map(|item| OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                variant_id: Set(item.variant_id),
                color: Set(Some(item.color)),
                length: Set(Some(item.length)),
                quantity: Set(i32::try_from(item.quantity).unwrap_or(i32::MAX)),
                unit_price: Set(item.unit_price),
                created_at: Set(now.into()),
            })
            .collect();

        OrderItems::insert_many(rows).exec(&self.orm).await?;

        let inserted = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order_id))
            .all(&self.orm)
            .await?
            .into_iter()
            .map(order_item_from_entity)
            .collect();
        Ok(inserted)
    }

    async fn find_by_payment_id(&self, payment_id: String) -> AppResult<Option<Order>> {
        let order = Orders::find()
            .filter(OrderCol::PaymentId.eq(payment_id))
            .one(&self.orm)
            .await?
            .map(order_from_entity);
        Ok(order)
    }

    async fn mark_paid(&self, payment_id: String) -> AppResult<bool> {
        let Some(existing) = Orders::find()
            .filter(OrderCol::PaymentId.eq(payment_id))
            .one(&self.orm)
            .await?
        else {
            return Ok(false);
        };

        if existing.payment_status.as_deref() == Some(STATUS_PAID) {
            return Ok(false);
        }

        let order_id = existing.id;
        let mut active: OrderActive = existing.into();
        active.payment_status = Set(Some(STATUS_PAID.to_string()));
        active.status = Set(STATUS_PAID.to_string());
        active.updated_at = Set(Utc::now().into());
        active.update(&self.orm).await?;

        log_audit_best_effort(
            &self.orm,
            None,
            "order_mark_paid",
            "orders",
            Some(order_id.to_string()),
            None,
        )
        .await;

        Ok(true)
    }

    async fn list_orders(&self, filter: OrderFilter) -> AppResult<(Vec<Order>, i64)> {
        let mut condition = Condition::all();

        if let Some(user_id) = filter.user_id {
            condition = condition.add(OrderCol::UserId.eq(user_id));
        }
        if let Some(status) = filter.status.as_ref().filter(|s| !s.is_empty()) {
            condition = condition.add(OrderCol::Status.eq(status.clone()));
        }
        if let Some(search) = filter.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(OrderCol::FullName).ilike(pattern.clone()))
                    .add(Expr::col(OrderCol::Phone).ilike(pattern.clone()))
                    .add(Expr::col(OrderCol::Status).ilike(pattern)),
            );
        }

        let mut finder = Orders::find().filter(condition);
        finder = if filter.oldest_first {
            finder.order_by_asc(OrderCol::CreatedAt)
        } else {
            finder.order_by_desc(OrderCol::CreatedAt)
        };

        let total = finder.clone().count(&self.orm).await? as i64;

        let orders = finder
            .limit(filter.limit.max(1) as u64)
            .offset(filter.offset.max(0) as u64)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect();

        Ok((orders, total))
    }

    async fn get_order(&self, id: Uuid) -> AppResult<Option<OrderWithItems>> {
        let Some(order) = Orders::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };

        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .order_by_asc(OrderItemCol::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(order_item_from_entity)
            .collect();

        Ok(Some(OrderWithItems {
            order: order_from_entity(order),
            items,
        }))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: String,
        actor: Option<Uuid>,
    ) -> AppResult<Option<Order>> {
        let Some(existing) = Orders::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };

        let mut active: OrderActive = existing.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&self.orm).await?;

        log_audit_best_effort(
            &self.orm,
            actor,
            "order_status_update",
            "orders",
            Some(order.id.to_string()),
            Some(serde_json::json!({ "status": order.status })),
        )
        .await;

        Ok(Some(order_from_entity(order)))
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        full_name: model.full_name,
        phone: model.phone,
        email: model.email,
        country: model.country,
        region: model.region,
        city: model.city,
        address: model.address,
        notes: model.notes,
        payment_method: model.payment_method,
        delivery_mode: DeliveryMode::parse(&model.delivery_mode).unwrap_or_default(),
        delivery_fee: model.delivery_fee,
        total: model.total,
        payment_provider: model.payment_provider,
        payment_id: model.payment_id,
        payment_status: model.payment_status,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        variant_id: model.variant_id,
        color: model.color,
        length: model.length,
        quantity: model.quantity,
        unit_price: model.unit_price,
    }
}
