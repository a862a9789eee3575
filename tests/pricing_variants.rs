mod common;

use common::{product, variant};
use storefront_api::{
    cart::{
        CartLine, Selection, Totals, VariantIndex, delivery_fee, grand_total,
        pricing::format_fcfa,
        variants::{FALLBACK_COLOR_KEY, PLACEHOLDER_MEDIA},
    },
    checkout::{
        CheckoutForm, ValidationError,
        form::{normalize_phone, validate},
    },
    models::{Country, DeliveryMode, ProductVariant},
};

#[test]
fn delivery_fee_tiers() {
    assert_eq!(delivery_fee(DeliveryMode::Pickup, 0), 0);
    assert_eq!(delivery_fee(DeliveryMode::Pickup, 10_000), 0);
    assert_eq!(delivery_fee(DeliveryMode::Pickup, 80_000), 0);
    assert_eq!(delivery_fee(DeliveryMode::Delivery, 50_000), 0);
    assert_eq!(delivery_fee(DeliveryMode::Delivery, 49_999), 2_000);
    assert_eq!(delivery_fee(DeliveryMode::Delivery, 0), 2_000);
}

#[test]
fn free_delivery_starts_at_threshold() {
    let totals = Totals::compute(DeliveryMode::Delivery, 50_000);
    assert_eq!(totals.delivery_fee, 0);
    assert_eq!(totals.grand_total, 50_000);
    assert_eq!(grand_total(DeliveryMode::Delivery, 12_000), 14_000);
}

#[test]
fn prices_are_printed_with_grouped_digits() {
    assert_eq!(format_fcfa(12_500), "12\u{202f}500 FCFA");
    assert_eq!(format_fcfa(1_250_000), "1\u{202f}250\u{202f}000 FCFA");
    assert_eq!(format_fcfa(900), "900 FCFA");
}

#[test]
fn display_price_falls_back_to_reference_price() {
    let mut p = product(1);
    assert_eq!(p.display_price(), 5_000);
    p.base_price_min = None;
    assert_eq!(p.display_price(), 9_000);
    p.original_price = None;
    assert_eq!(p.display_price(), 0);
}

fn catalog_variants() -> Vec<ProductVariant> {
    let mut black_20 = variant(3, 1, "Noir", 20, 9_000, 2);
    black_20.color_hex = Some("#111111".into());
    let mut blond_16 = variant(4, 1, "Blond", 16, 8_000, 3);
    blond_16.is_default = true;
    blond_16.medias = vec!["/m/blond-1.jpg".into(), "/m/blond-2.jpg".into()];
    let mut blond_12 = variant(5, 1, "Blond", 12, 7_000, 1);
    blond_12.color_hex = Some("#d4a84f".into());
    let sold_out = variant(6, 1, "Rouge", 14, 7_500, 0);

    vec![
        variant(1, 1, "Noir", 12, 6_000, 5),
        black_20,
        blond_16,
        blond_12,
        sold_out,
    ]
}

#[test]
fn variants_are_grouped_by_colour_without_sold_out_ones() {
    let index = VariantIndex::new(catalog_variants());

    let colours: Vec<&str> = index.color_keys().collect();
    assert_eq!(colours, vec!["Noir", "Blond"]);
    assert_eq!(index.lengths("Noir"), vec![12, 20]);
    assert_eq!(index.lengths("Blond"), vec![12, 16]);
    assert_eq!(index.group("Noir").and_then(|g| g.hex.clone()), Some("#111111".into()));
    assert_eq!(index.group("Blond").and_then(|g| g.hex.clone()), Some("#d4a84f".into()));
    assert!(index.group("Rouge").is_none());
}

#[test]
fn default_variant_picks_the_initial_colour() {
    let index = VariantIndex::new(catalog_variants());
    let selection = index.default_selection();
    assert_eq!(selection.color.as_deref(), Some("Blond"));
    assert_eq!(selection.length, Some(12));
}

#[test]
fn first_colour_is_used_without_a_default() {
    let variants: Vec<ProductVariant> = catalog_variants()
        .into_iter()
        .map(|mut v| {
            v.is_default = false;
            v
        })
        .collect();
    let index = VariantIndex::new(variants);
    assert_eq!(index.default_color(), Some("Noir"));
}

#[test]
fn stale_length_falls_back_to_first_variant_of_colour() {
    let index = VariantIndex::new(catalog_variants());
    let selection = Selection {
        color: Some("Blond".into()),
        length: Some(20),
    };
    assert_eq!(index.resolve(&selection).map(|v| v.id), Some(5));

    let exact = Selection {
        color: Some("Noir".into()),
        length: Some(20),
    };
    assert_eq!(index.resolve(&exact).map(|v| v.id), Some(3));
}

#[test]
fn no_colour_shows_the_first_raw_variant() {
    let mut variants = catalog_variants();
    variants[0].stock_count = Some(0);
    let index = VariantIndex::new(variants);

    let current = index.resolve(&Selection::default());
    assert_eq!(current.map(|v| v.id), Some(1));
    assert!(current.is_some_and(|v| !v.is_purchasable()));
}

#[test]
fn switching_colour_resets_the_length() {
    let index = VariantIndex::new(catalog_variants());
    let selection = index.select_color("Noir");
    assert_eq!(selection.length, Some(12));
}

#[test]
fn unnamed_colour_is_grouped_under_fallback_key() {
    let index = VariantIndex::new(vec![variant(1, 1, "", 12, 5_000, 1)]);
    assert_eq!(index.color_keys().collect::<Vec<_>>(), vec![FALLBACK_COLOR_KEY]);
}

#[test]
fn carousel_uses_each_colours_first_variant() {
    let mut variants = catalog_variants();
    variants[0].image_url = Some("/m/noir.jpg".into());
    variants[3].medias = vec!["/m/blond-a.jpg".into(), "/m/blond-b.jpg".into()];
    variants[3].image_url = Some("/m/ignored.jpg".into());
    let index = VariantIndex::new(variants);

    let slides: Vec<(String, String)> = index
        .carousel()
        .into_iter()
        .map(|c| (c.color_key, c.image_url))
        .collect();
    assert_eq!(
        slides,
        vec![
            ("Noir".to_string(), "/m/noir.jpg".to_string()),
            ("Blond".to_string(), "/m/blond-a.jpg".to_string()),
            ("Blond".to_string(), "/m/blond-b.jpg".to_string()),
        ]
    );

    let selection = index.select_image(2);
    assert_eq!(selection.and_then(|s| s.color), Some("Blond".to_string()));
    assert!(index.select_image(3).is_none());
}

#[test]
fn carousel_falls_back_to_placeholder() {
    let index = VariantIndex::new(vec![variant(1, 1, "Noir", 12, 5_000, 1)]);
    let carousel = index.carousel();
    assert_eq!(carousel.len(), 1);
    assert_eq!(carousel[0].color_key, "default");
    assert_eq!(carousel[0].image_url, PLACEHOLDER_MEDIA);
    assert!(index.select_image(0).is_none());
}

#[test]
fn phone_numbers_get_the_country_prefix() {
    assert_eq!(normalize_phone(Country::Togo, "90 12 34 56"), "+22890123456");
    assert_eq!(normalize_phone(Country::Togo, "+228 90 12 34 56"), "+22890123456");
    assert_eq!(normalize_phone(Country::Benin, "97-00-00-01"), "+22997000001");
}

fn line() -> CartLine {
    CartLine {
        product: product(1),
        variant: variant(10, 1, "Noir", 12, 5_000, 5),
        quantity: 1,
    }
}

fn filled_form() -> CheckoutForm {
    CheckoutForm {
        full_name: "Ama Mensah".into(),
        phone: "90123456".into(),
        country: Country::Togo,
        region: "Maritime".into(),
        city: "Lomé".into(),
        address: "Rue 12".into(),
        ..CheckoutForm::default()
    }
}

#[test]
fn empty_cart_blocks_checkout() {
    assert_eq!(
        validate(&filled_form(), DeliveryMode::Delivery, &[]),
        Err(ValidationError::EmptyCart)
    );
}

#[test]
fn contact_fields_are_required() {
    let form = CheckoutForm {
        phone: "  ".into(),
        ..filled_form()
    };
    assert_eq!(
        validate(&form, DeliveryMode::Pickup, &[line()]),
        Err(ValidationError::MissingContact)
    );
}

#[test]
fn address_is_required_only_for_delivery() {
    let form = CheckoutForm {
        region: String::new(),
        city: String::new(),
        address: String::new(),
        ..filled_form()
    };
    assert_eq!(
        validate(&form, DeliveryMode::Delivery, &[line()]),
        Err(ValidationError::MissingAddress)
    );
    assert_eq!(validate(&form, DeliveryMode::Pickup, &[line()]), Ok(()));
}

#[test]
fn region_must_belong_to_the_country() {
    let form = CheckoutForm {
        region: "Littoral".into(),
        ..filled_form()
    };
    assert!(matches!(
        validate(&form, DeliveryMode::Delivery, &[line()]),
        Err(ValidationError::UnknownRegion { .. })
    ));

    let benin = CheckoutForm {
        country: Country::Benin,
        ..form
    };
    assert_eq!(validate(&benin, DeliveryMode::Delivery, &[line()]), Ok(()));
}

#[test]
fn corrupted_line_without_variant_is_rejected() {
    let mut broken = line();
    broken.variant.id = 0;
    assert_eq!(
        validate(&filled_form(), DeliveryMode::Pickup, &[broken]),
        Err(ValidationError::MissingVariant)
    );
}
