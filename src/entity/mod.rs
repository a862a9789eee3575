pub mod audit_logs;
pub mod order_items;
pub mod orders;
pub mod product_variants;
pub mod products;

pub use audit_logs::Entity as AuditLogs;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
