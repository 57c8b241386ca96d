//! Checkout: validate the customer's details and place the order.
//!
//! The order store accepts any request, so the checks a checkout form would
//! make happen here.

use bistro_core::{CartLine, Email, OrderRequest, PaymentMethod};
use bistro_store::AppState;
use thiserror::Error;

use super::{CliError, print_order};

const MIN_NAME_LENGTH: usize = 2;
const MIN_ADDRESS_LENGTH: usize = 10;

/// What the customer typed at checkout.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub payment: PaymentMethod,
    pub requests: Option<String>,
}

/// One problem with a checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("name must be at least 2 characters")]
    NameTooShort,
    #[error("{0}")]
    Email(#[from] bistro_core::EmailError),
    #[error("phone is required")]
    PhoneMissing,
    #[error("phone may only contain digits, spaces, and + - ( )")]
    PhoneInvalid,
    #[error("delivery address must be at least 10 characters")]
    AddressTooShort,
}

impl CheckoutForm {
    /// Check every field and build the order request for `items`.
    ///
    /// # Errors
    ///
    /// Returns every field that failed, in form order.
    pub fn into_request(self, items: Vec<CartLine>) -> Result<OrderRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_owned();
        if name.chars().count() < MIN_NAME_LENGTH {
            errors.push(FieldError::NameTooShort);
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(e.into());
                None
            }
        };

        let phone = self.phone.trim().to_owned();
        if phone.is_empty() {
            errors.push(FieldError::PhoneMissing);
        } else if !phone.chars().all(is_phone_char) {
            errors.push(FieldError::PhoneInvalid);
        }

        let address = self.address.trim().to_owned();
        if address.chars().count() < MIN_ADDRESS_LENGTH {
            errors.push(FieldError::AddressTooShort);
        }

        match email {
            Some(email) if errors.is_empty() => Ok(OrderRequest {
                customer_name: name,
                customer_email: email.into_inner(),
                customer_phone: phone,
                items,
                payment_method: self.payment,
                delivery_address: Some(address),
                special_requests: bistro_core::normalize_note(self.requests),
            }),
            _ => Err(errors),
        }
    }
}

const fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')')
}

/// Place an order for the whole cart, wait for it, then empty the cart.
///
/// # Errors
///
/// Returns an error if the cart is empty, the form is invalid, or no order
/// IDs are left.
pub async fn place(state: &AppState, form: CheckoutForm) -> Result<(), CliError> {
    let cart = state.cart();
    if cart.is_empty() {
        return Err(CliError::EmptyCart);
    }
    let summary = cart.summary().get();

    let request = form.into_request(cart.snapshot()).map_err(|errors| {
        CliError::InvalidCheckout(errors.iter().map(ToString::to_string).collect())
    })?;

    println!("Submitting order...");
    let order = state.orders().place_order(request).await?;
    cart.clear();

    print_order(&order);
    println!(
        "  Due with tax and delivery: {} (tax {}, delivery {})",
        summary.grand_total, summary.tax, summary.delivery_fee
    );
    Ok(())
}
