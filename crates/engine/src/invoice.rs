//! Printable invoice export.
//!
//! Renders a self-contained HTML document for a completed or approved
//! order. Every value comes from the stored order; nothing is recomputed
//! here, so the invoice can never disagree with the ledger.

use askama::Template;
use rust_decimal::Decimal;
use thiserror::Error;

use genzsport_core::{CartLineItem, Order, OrderStatus};

use crate::filters;

/// Errors that can occur when rendering an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Only completed or approved orders are invoiceable.
    #[error("order is not invoiceable in status {0:?}")]
    NotInvoiceable(OrderStatus),

    /// Template rendering failed.
    #[error("render error: {0}")]
    Render(#[from] askama::Error),
}

/// One line of the invoice item table.
struct InvoiceRow {
    name: String,
    quantity: u32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl From<&CartLineItem> for InvoiceRow {
    fn from(item: &CartLineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            line_total: item.line_total(),
        }
    }
}

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate<'a> {
    invoice_number: &'a str,
    issue_date: String,
    full_name: &'a str,
    address: &'a str,
    phone_number: &'a str,
    payment_label: &'static str,
    zone_label: &'static str,
    rows: Vec<InvoiceRow>,
    subtotal: Decimal,
    transport_fee: Decimal,
    show_transport_fee: bool,
    final_total: Decimal,
}

/// Render the printable invoice for `order`.
///
/// # Errors
///
/// Returns [`InvoiceError::NotInvoiceable`] unless the order is completed
/// or approved.
pub fn render_invoice(order: &Order) -> Result<String, InvoiceError> {
    if !matches!(order.status, OrderStatus::Completed | OrderStatus::Approved) {
        return Err(InvoiceError::NotInvoiceable(order.status));
    }

    let template = InvoiceTemplate {
        invoice_number: order.id.as_str(),
        issue_date: order.created_at.format("%d %B %Y").to_string(),
        full_name: &order.shipping.full_name,
        address: &order.shipping.address,
        phone_number: &order.shipping.phone_number,
        payment_label: order.payment_method.label(),
        zone_label: order
            .payment_method
            .transport_zone()
            .map_or("N/A", |zone| zone.label()),
        rows: order.items.iter().map(InvoiceRow::from).collect(),
        subtotal: order.subtotal,
        transport_fee: order.transport_fee,
        show_transport_fee: order.transport_fee > Decimal::ZERO,
        final_total: order.final_total,
    };
    Ok(template.render()?)
}
