//! Read side of the product catalog. Writes belong to the back office.

use async_trait::async_trait;
use mockall::automock;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, sea_query::Expr,
    sea_query::extension::postgres::PgExpr,
};

use crate::{
    db::{OrmConn, contains_pattern},
    entity::{
        product_variants::{Column as VariantCol, Entity as ProductVariants, Model as VariantModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::AppResult,
    models::{Product, ProductId, ProductVariant, VariantId},
    routes::params::ProductQuery,
};

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Active products only, newest first.
    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> AppResult<Option<Product>>;

    /// All variants of a product, inactive and sold-out ones included,
    /// ordered default first, then colour, then length.
    async fn list_variants(&self, product_id: ProductId) -> AppResult<Vec<ProductVariant>>;

    async fn get_variant(&self, id: VariantId) -> AppResult<Option<ProductVariant>>;
}

#[derive(Debug, Clone)]
pub struct SeaOrmCatalog {
    orm: OrmConn,
}

impl SeaOrmCatalog {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalog {
    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        let mut condition = Condition::all().add(ProdCol::IsActive.eq(true));

        if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                    .add(Expr::col(ProdCol::Description).ilike(pattern)),
            );
        }

        if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
            condition = condition.add(ProdCol::Category.eq(category.clone()));
        }

        let items = Products::find()
            .filter(condition)
            .order_by_desc(ProdCol::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();

        Ok(items)
    }

    async fn get_product(&self, id: ProductId) -> AppResult<Option<Product>> {
        let product = Products::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(product_from_entity);
        Ok(product)
    }

    async fn list_variants(&self, product_id: ProductId) -> AppResult<Vec<ProductVariant>> {
        let variants = ProductVariants::find()
            .filter(VariantCol::ProductId.eq(product_id))
            .order_by_desc(VariantCol::IsDefault)
            .order_by_asc(VariantCol::Color)
            .order_by_asc(VariantCol::Length)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(variant_from_entity)
            .collect();
        Ok(variants)
    }

    async fn get_variant(&self, id: VariantId) -> AppResult<Option<ProductVariant>> {
        let variant = ProductVariants::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(variant_from_entity);
        Ok(variant)
    }
}

fn string_list(value: Option<serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
        .unwrap_or_default()
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        category: model.category,
        description: model.description,
        base_price_min: model.base_price_min,
        original_price: model.original_price,
        is_active: model.is_active,
        details: string_list(model.details),
        image_url: model.image_url,
    }
}

pub(crate) fn variant_from_entity(model: VariantModel) -> ProductVariant {
    ProductVariant {
        id: model.id,
        product_id: model.product_id,
        color: model.color,
        color_hex: model.color_hex,
        length: model.length,
        price: model.price,
        stock_count: model.stock_count,
        sku: model.sku,
        is_active: model.is_active,
        is_default: model.is_default,
        medias: string_list(model.medias),
        image_url: model.image_url,
    }
}
