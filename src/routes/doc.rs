use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CarouselItem, CartLine, ColorGroup, Selection},
    checkout::CheckoutForm,
    dto::{
        cart::{AddToCartRequest, CartSessionCreated, CartView, DeliveryModeRequest, UpdateQuantityRequest},
        checkout::{CheckoutRequest, PaymentReturnQuery},
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{ProductDetail, ProductList, ProductSummary, SelectionView},
    },
    models::{Country, DeliveryMode, Order, OrderItem, PaymentMethod, Product, ProductVariant},
    response::{ApiResponse, Meta, Navigation, StepResponse},
    routes::{account, admin, cart, checkout, health, params, payment, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        products::resolve_selection,
        cart::create_session,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::set_delivery_mode,
        checkout::submit_checkout,
        payment::start_payment,
        payment::payment_return,
        payment::payment_webhook,
        account::list_my_orders,
        account::get_my_order,
        account::reorder_item,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status
    ),
    components(
        schemas(
            Product,
            ProductVariant,
            ProductSummary,
            ProductList,
            ProductDetail,
            SelectionView,
            Selection,
            ColorGroup,
            CarouselItem,
            CartLine,
            CartView,
            CartSessionCreated,
            AddToCartRequest,
            UpdateQuantityRequest,
            DeliveryModeRequest,
            DeliveryMode,
            PaymentMethod,
            Country,
            CheckoutForm,
            CheckoutRequest,
            PaymentReturnQuery,
            Navigation,
            StepResponse,
            Order,
            OrderItem,
            OrderList,
            OrderWithItems,
            UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartView>,
            ApiResponse<StepResponse>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog and variant selection"),
        (name = "Cart", description = "Per-session cart"),
        (name = "Checkout", description = "Checkout submission"),
        (name = "Payment", description = "Hosted payment and reconciliation"),
        (name = "Account", description = "Signed-in customer orders"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
