use storefront_api::{config::AppConfig, db::create_pool};

struct SeedVariant {
    color: &'static str,
    color_hex: &'static str,
    length: i32,
    price: i64,
    stock: i32,
    is_default: bool,
}

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    category: &'static str,
    description: &'static str,
    original_price: Option<i64>,
    details: &'static [&'static str],
    variants: &'static [SeedVariant],
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Bone Straight Lace Frontal",
        slug: "bone-straight-lace-frontal",
        category: "lace-frontal",
        description: "Human hair, HD lace, pre-plucked hairline",
        original_price: Some(95_000),
        details: &["100% human hair", "HD lace 13x4", "Density 180%"],
        variants: &[
            SeedVariant { color: "Noir naturel", color_hex: "#1b1b1b", length: 12, price: 45_000, stock: 8, is_default: true },
            SeedVariant { color: "Noir naturel", color_hex: "#1b1b1b", length: 16, price: 55_000, stock: 5, is_default: false },
            SeedVariant { color: "Noir naturel", color_hex: "#1b1b1b", length: 20, price: 68_000, stock: 2, is_default: false },
            SeedVariant { color: "Blond miel", color_hex: "#c99a4b", length: 16, price: 60_000, stock: 3, is_default: false },
            SeedVariant { color: "Blond miel", color_hex: "#c99a4b", length: 20, price: 72_000, stock: 0, is_default: false },
        ],
    },
    SeedProduct {
        name: "Body Wave Closure Wig",
        slug: "body-wave-closure-wig",
        category: "closure",
        description: "Soft body wave, glueless 5x5 closure",
        original_price: None,
        details: &["Glueless", "Adjustable straps"],
        variants: &[
            SeedVariant { color: "Brun", color_hex: "#5a3825", length: 14, price: 38_000, stock: 10, is_default: true },
            SeedVariant { color: "Brun", color_hex: "#5a3825", length: 18, price: 46_000, stock: 4, is_default: false },
        ],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut seeded = 0;
    for product in PRODUCTS {
        if seed_product(&pool, product).await? {
            seeded += 1;
        }
    }

    println!("Seed completed. {seeded} new product(s)");
    Ok(())
}

/// Inserts a product and its variants; `false` when the slug already exists.
async fn seed_product(pool: &sqlx::PgPool, product: &SeedProduct) -> anyhow::Result<bool> {
    let base_price_min = product.variants.iter().map(|v| v.price).min();

    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO products (name, slug, category, description, base_price_min, original_price, details)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (slug) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(product.name)
    .bind(product.slug)
    .bind(product.category)
    .bind(product.description)
    .bind(base_price_min)
    .bind(product.original_price)
    .bind(serde_json::json!(product.details))
    .fetch_optional(pool)
    .await?;

    let Some((product_id,)) = row else {
        return Ok(false);
    };

    for variant in product.variants {
        sqlx::query(
            r#"
            INSERT INTO product_variants
                (product_id, color, color_hex, length, price, stock_count, sku, is_default, medias)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product_id)
        .bind(variant.color)
        .bind(variant.color_hex)
        .bind(variant.length)
        .bind(variant.price)
        .bind(variant.stock)
        .bind(format!("{}-{}-{}", product.slug, variant.color_hex.trim_start_matches('#'), variant.length))
        .bind(variant.is_default)
        .bind(serde_json::json!([format!("/images/{}/{}.jpg", product.slug, variant.length)]))
        .execute(pool)
        .await?;
    }

    Ok(true)
}
