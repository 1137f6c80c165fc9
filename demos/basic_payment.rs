//! Basic example walking through a full payment lifecycle.
//!
//! This example shows how to:
//! - Check the merchant keys against the gateway
//! - Create a payment link for a store
//! - Read the payment link and a transaction
//! - Refund part of a transaction
//!
//! Keys are read from `AMWAL_SECRET_KEY` and `AMWAL_PUBLIC_KEY`.
//!
//! Run with: `cargo run --example basic_payment`

use amwal::{AmwalClient, Environment, Error, PaymentRequest, RefundRequest};

const STORE_ID: &str = "8ff41fae-709a-46da-9b27-a5d2b1059e67";
const TRANSACTION_ID: &str = "0f0a7c6a-ca74-4fae-8d9c-290b722b6750";

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("amwal=debug,basic_payment=info")
        .init();

    let secret_key = std::env::var("AMWAL_SECRET_KEY").unwrap_or_default();
    let public_key = std::env::var("AMWAL_PUBLIC_KEY").unwrap_or_default();

    let client = AmwalClient::builder(secret_key, public_key)
        .environment(Environment::Sandbox)
        .build()?;

    println!("=== Merchant Validation ===");
    if !client.test_connection().await {
        println!("The gateway rejected the merchant keys");
        return Ok(());
    }
    println!("Merchant keys accepted");
    println!();

    println!("=== Create Payment ===");
    // Only the amount is required.
    let payment = PaymentRequest::new(100);
    let link = client.create_payment(&payment, STORE_ID, None).await?;
    println!("Payment URL: {}", link.payment_url);
    println!();

    if let Some(payment_link_id) = &link.payment_link_id {
        println!("=== Payment Link Details ===");
        let details = client.get_payment_details(payment_link_id).await?;
        println!("{:#?}", details);
        println!();
    }

    println!("=== Transaction Details ===");
    let transaction = client.get_transaction_details(TRANSACTION_ID).await?;
    println!("{:#?}", transaction);
    println!();

    println!("=== Refund ===");
    let refund = client
        .refund_payment(&RefundRequest::new(TRANSACTION_ID, 10))
        .await?;
    println!("{:#?}", refund);

    Ok(())
}
