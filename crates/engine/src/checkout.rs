//! Checkout orchestrator.
//!
//! A short-lived state machine that turns a cart snapshot plus shipping and
//! payment input into a recorded order. Stages move strictly forward:
//! `CollectingShippingInfo -> SelectingPayment -> Processing -> Complete`.
//! Payment-specific staging (slip upload, transport zone) is discarded when
//! the customer switches method, so stale state never leaks into a
//! different method's completion check.

use std::time::Duration;

use thiserror::Error;

use genzsport_core::{
    OrderDraft, PaymentKind, PaymentMethod, ShippingFieldErrors, ShippingInfo, SlipImage,
    TransportZone,
};

use crate::cart::CartStore;
use crate::error::EngineError;
use crate::orders::OrderLedger;
use crate::session::CustomerProfile;

/// Explicit checkout stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    CollectingShippingInfo,
    SelectingPayment,
    Processing,
    Complete,
}

/// Raw shipping form values, prefilled from the stored profile when one
/// exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingInput {
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
}

impl ShippingInput {
    fn from_profile(profile: &CustomerProfile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            address: profile.address.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
        }
    }
}

/// Payment-selection failures, each carrying its user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Please select a payment method")]
    MethodRequired,
    /// Card is recognized but categorically rejected at completion time.
    /// This is a business rule, not a missing integration.
    #[error("Credit card payment is currently unavailable. Please choose another payment method.")]
    CardUnavailable,
    #[error("Please select a delivery area")]
    TransportZoneRequired,
    #[error("Please upload your payment slip")]
    SlipRequired,
}

/// Checkout failures. All are recoverable: the orchestrator stays in its
/// current stage and the cart is untouched.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Field-level shipping validation messages.
    #[error("{0}")]
    Shipping(ShippingFieldErrors),

    /// Operation invalid for the current stage or selected method.
    #[error("Invalid state: {0}")]
    State(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One checkout session over the cart and ledger.
pub struct CheckoutOrchestrator {
    cart: CartStore,
    ledger: OrderLedger,
    processing_delay: Duration,
    stage: CheckoutStage,
    prefill: ShippingInput,
    shipping: Option<ShippingInfo>,
    selected: Option<PaymentKind>,
    slip: Option<SlipImage>,
    zone: Option<TransportZone>,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(
        cart: CartStore,
        ledger: OrderLedger,
        processing_delay: Duration,
        profile: Option<&CustomerProfile>,
    ) -> Self {
        Self {
            cart,
            ledger,
            processing_delay,
            stage: CheckoutStage::CollectingShippingInfo,
            prefill: profile.map(ShippingInput::from_profile).unwrap_or_default(),
            shipping: None,
            selected: None,
            slip: None,
            zone: None,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Form values prefilled from the stored customer profile.
    #[must_use]
    pub const fn shipping_prefill(&self) -> &ShippingInput {
        &self.prefill
    }

    #[must_use]
    pub const fn selected_method(&self) -> Option<PaymentKind> {
        self.selected
    }

    /// Data URL preview of the staged slip, if one is attached.
    #[must_use]
    pub fn slip_preview(&self) -> Option<String> {
        self.slip.as_ref().map(SlipImage::data_url)
    }

    /// Validate the shipping form and advance to payment selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Shipping`] with per-field messages; the
    /// stage does not advance.
    pub fn submit_shipping_info(&mut self, input: &ShippingInput) -> Result<(), CheckoutError> {
        if self.stage != CheckoutStage::CollectingShippingInfo {
            return Err(CheckoutError::State(format!(
                "shipping info is not editable in stage {:?}",
                self.stage
            )));
        }
        let info = ShippingInfo::parse(&input.full_name, &input.address, &input.phone_number)
            .map_err(CheckoutError::Shipping)?;
        self.shipping = Some(info);
        self.stage = CheckoutStage::SelectingPayment;
        Ok(())
    }

    /// Select a payment method, discarding staging that belongs to a
    /// different method.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::State`] outside the payment stage.
    pub fn select_payment_method(&mut self, kind: PaymentKind) -> Result<(), CheckoutError> {
        self.require_stage(CheckoutStage::SelectingPayment, "select a payment method")?;
        if kind != PaymentKind::BankSlip {
            self.slip = None;
        }
        if kind != PaymentKind::CashOnDelivery {
            self.zone = None;
        }
        self.selected = Some(kind);
        Ok(())
    }

    /// Attach the uploaded payment slip.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::State`] unless bank slip is the selected
    /// method.
    pub fn attach_slip(&mut self, slip: SlipImage) -> Result<(), CheckoutError> {
        self.require_stage(CheckoutStage::SelectingPayment, "attach a slip")?;
        if self.selected != Some(PaymentKind::BankSlip) {
            return Err(CheckoutError::State(
                "a slip can only be attached to a bank transfer payment".to_owned(),
            ));
        }
        self.slip = Some(slip);
        Ok(())
    }

    /// Choose the cash-on-delivery transport zone.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::State`] unless cash on delivery is the
    /// selected method.
    pub fn select_transport_zone(&mut self, zone: TransportZone) -> Result<(), CheckoutError> {
        self.require_stage(CheckoutStage::SelectingPayment, "select a delivery area")?;
        if self.selected != Some(PaymentKind::CashOnDelivery) {
            return Err(CheckoutError::State(
                "a delivery area only applies to cash on delivery".to_owned(),
            ));
        }
        self.zone = Some(zone);
        Ok(())
    }

    /// Validate the staged payment, record the order, and clear the cart.
    ///
    /// On success the stage moves through `Processing` to `Complete` and
    /// the recorded order is returned. On any failure the stage stays at
    /// `SelectingPayment`, no order is created, and the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Payment`] for a missing or invalid payment
    /// selection, with card always rejected, or [`CheckoutError::Engine`]
    /// when recording fails.
    #[tracing::instrument(skip(self))]
    pub async fn complete_order(&mut self) -> Result<genzsport_core::Order, CheckoutError> {
        self.require_stage(CheckoutStage::SelectingPayment, "complete the order")?;
        let payment_method = self.staged_payment()?;
        let Some(shipping) = self.shipping.clone() else {
            return Err(CheckoutError::State("shipping info is missing".to_owned()));
        };

        self.stage = CheckoutStage::Processing;
        tokio::time::sleep(self.processing_delay).await;

        let items = self.cart.snapshot().await.items;
        let draft = OrderDraft {
            items,
            shipping,
            payment_method,
        };
        let order = match self.ledger.record_order(draft).await {
            Ok(order) => order,
            Err(e) => {
                self.stage = CheckoutStage::SelectingPayment;
                return Err(e.into());
            }
        };
        self.cart.clear().await;
        self.stage = CheckoutStage::Complete;
        Ok(order)
    }

    /// Assemble the staged payment, validating in order: a method is
    /// selected, the method is not card, zone/slip requirements are met.
    fn staged_payment(&self) -> Result<PaymentMethod, PaymentError> {
        match self.selected {
            None => Err(PaymentError::MethodRequired),
            Some(PaymentKind::Card) => Err(PaymentError::CardUnavailable),
            Some(PaymentKind::CashOnDelivery) => {
                let zone = self.zone.ok_or(PaymentError::TransportZoneRequired)?;
                Ok(PaymentMethod::CashOnDelivery { zone })
            }
            Some(PaymentKind::BankSlip) => {
                let slip = self.slip.clone().ok_or(PaymentError::SlipRequired)?;
                Ok(PaymentMethod::BankSlip { slip })
            }
        }
    }

    fn require_stage(&self, stage: CheckoutStage, action: &str) -> Result<(), CheckoutError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(CheckoutError::State(format!(
                "cannot {action} in stage {:?}",
                self.stage
            )))
        }
    }
}
