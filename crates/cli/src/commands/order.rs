//! Checkout command.

use bosanoga_client::checkout::checkout;
use bosanoga_client::{CheckoutError, ContactDetails, OrderReceipt, SharedCart};

use super::{CommandError, Context};

/// Submit the persisted cart. Field problems are listed one per line.
pub async fn submit(ctx: &Context, phone: String, address: String) -> Result<(), CommandError> {
    let cart = SharedCart::new(ctx.open_cart());
    let contact = ContactDetails { phone, address };

    match checkout(&ctx.api, &cart, &contact).await {
        Ok(receipt) => {
            tracing::info!("{}", receipt_label(&receipt));
            Ok(())
        }
        Err(CheckoutError::Validation(errors)) => {
            for error in &errors {
                tracing::warn!("  {error}");
            }
            Err(CheckoutError::Validation(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn receipt_label(receipt: &OrderReceipt) -> String {
    format!(
        "Order placed: {} items in {} lines, {}",
        receipt.items, receipt.lines, receipt.total
    )
}
