use storefront_api::{
    checkout::OrderLineSnapshot,
    services::{
        notify_service::{
            LogNotifier, MockOrderNotifier, NewOrderNotice, NotificationOutcome, NotifyError,
            admin_message, customer_message, notify_best_effort, whatsapp_address,
        },
        payment_service::{
            PaymentVerification, WebhookEvent, sign_webhook, verify_webhook_signature,
        },
    },
};
use uuid::Uuid;

fn notice(lines: Vec<OrderLineSnapshot>) -> NewOrderNotice {
    NewOrderNotice {
        order_id: Uuid::nil(),
        customer_name: "Ama Mensah".into(),
        customer_phone: "+22890123456".into(),
        total: 34_500,
        lines,
    }
}

#[test]
fn admin_message_lists_every_line() {
    let text = admin_message(&notice(vec![
        OrderLineSnapshot {
            product_id: 4,
            variant_id: 40,
            color: "Noir".into(),
            length: 16,
            quantity: 2,
            unit_price: 12_000,
        },
        OrderLineSnapshot {
            product_id: 5,
            variant_id: 50,
            color: "Blond".into(),
            length: 12,
            quantity: 1,
            unit_price: 0,
        },
    ]));

    assert!(text.contains("Nouvelle commande #00000000-0000-0000-0000-000000000000"));
    assert!(text.contains("Nom: Ama Mensah"));
    assert!(text.contains("Téléphone client: +22890123456"));
    assert!(text.contains("Total: 34\u{202f}500 FCFA"));
    assert!(text.contains("• Produit #4 (Noir - 16\") — 12\u{202f}000 FCFA x2"));
    assert!(text.contains("• Produit #5 (Blond - 12\") x1"));
}

#[test]
fn admin_message_without_lines_says_so() {
    let mut n = notice(Vec::new());
    n.customer_name = "  ".into();
    let text = admin_message(&n);
    assert!(text.contains("Aucun item trouvé"));
    assert!(text.contains("Nom: -"));
}

#[test]
fn customer_message_greets_by_name() {
    let text = customer_message(&notice(Vec::new()));
    assert!(text.starts_with("Bonjour Ama Mensah"));
    assert!(text.contains("*34\u{202f}500 FCFA*"));
    assert!(text.ends_with("BelléaWigs"));
}

#[test]
fn whatsapp_addresses_are_normalised() {
    assert_eq!(whatsapp_address("+22890123456").as_deref(), Some("whatsapp:+22890123456"));
    assert_eq!(whatsapp_address("22890123456").as_deref(), Some("whatsapp:+22890123456"));
    assert_eq!(whatsapp_address("whatsapp:+229970").as_deref(), Some("whatsapp:+229970"));
    assert_eq!(whatsapp_address("   "), None);
}

#[tokio::test]
async fn notification_failure_is_reported_not_raised() {
    let mut notifier = MockOrderNotifier::new();
    notifier.expect_notify_new_order().times(1).returning(|_| {
        Err(NotifyError::Rejected {
            status: 401,
            body: "bad credentials".into(),
        })
    });

    let outcome = notify_best_effort(&notifier, notice(Vec::new())).await;
    assert_eq!(outcome, NotificationOutcome::Failed);

    let outcome = notify_best_effort(&LogNotifier, notice(Vec::new())).await;
    assert_eq!(outcome, NotificationOutcome::Sent);
}

#[test]
fn webhook_signature_round_trips_and_rejects_tampering() {
    let body = br#"{"event":"payment.success","data":{"id":"py_1"}}"#;
    let signature = sign_webhook("secret", body).expect("hmac accepts any key");

    assert!(verify_webhook_signature("secret", body, &signature));
    assert!(verify_webhook_signature("secret", body, &signature.to_uppercase()));
    assert!(!verify_webhook_signature("other", body, &signature));
    assert!(!verify_webhook_signature("secret", b"{}", &signature));
    assert!(!verify_webhook_signature("secret", body, "not-hex"));
}

#[test]
fn webhook_payment_id_is_read_from_data_first() -> anyhow::Result<()> {
    let nested: WebhookEvent =
        serde_json::from_str(r#"{"event":"payment.success","data":{"id":"py_1"},"payment_id":"py_2"}"#)?;
    assert!(nested.is_payment_success());
    assert_eq!(nested.payment_id(), Some("py_1"));

    let flat: WebhookEvent = serde_json::from_str(r#"{"event":"payment.failed","payment_id":"py_3"}"#)?;
    assert!(!flat.is_payment_success());
    assert_eq!(flat.payment_id(), Some("py_3"));
    Ok(())
}

#[test]
fn verification_statuses() {
    for status in ["success", "PAID", " completed "] {
        assert!(PaymentVerification { status: status.into() }.is_success(), "{status}");
    }
    for status in ["pending", "failed", ""] {
        assert!(!PaymentVerification { status: status.into() }.is_success(), "{status}");
    }
}
