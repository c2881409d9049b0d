//! Purchase order record, its derived totals and its guarded status changes
use super::amount::{DerivedAmount, DerivedField, View};
use super::codec::Guid;
use super::contact::ContactRef;
use super::error::StatusError;
use super::line_item::{LineAmountTypes, LineItem};
use super::persistence::Persistence;
use super::status::PurchaseOrderStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// How much of a persisted record the server sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// Top-level fields only, as list endpoints return them.
    Summary,
    /// Fetched from a detail endpoint; the line items are complete.
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrder {
    pub(crate) purchase_order_id: Option<Guid>,
    pub(crate) purchase_order_number: Option<String>,
    pub(crate) reference: Option<String>,
    pub(crate) status: PurchaseOrderStatus,
    pub(crate) completeness: Completeness,
    pub(crate) line_amount_types: LineAmountTypes,
    pub(crate) contact: Option<ContactRef>,
    pub(crate) line_items: Vec<LineItem>,
    pub(crate) sub_total: DerivedAmount,
    pub(crate) total_tax: DerivedAmount,
    pub(crate) total: DerivedAmount,
    pub(crate) branding_theme_id: Option<Guid>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) delivery_date: Option<NaiveDate>,
    pub(crate) expected_arrival_date: Option<NaiveDate>,
    pub(crate) total_discount: Option<Decimal>,
    pub(crate) currency_code: Option<String>,
    pub(crate) currency_rate: Option<Decimal>,
    pub(crate) sent_to_contact: bool,
    pub(crate) has_attachments: bool,
    pub(crate) delivery_address: Option<String>,
    pub(crate) attention_to: Option<String>,
    pub(crate) telephone: Option<String>,
    pub(crate) delivery_instructions: Option<String>,
}

impl Default for PurchaseOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl PurchaseOrder {
    /// A client-side draft. It has no id until saved and is always loaded.
    pub fn new() -> Self {
        Self {
            purchase_order_id: None,
            purchase_order_number: None,
            reference: None,
            status: PurchaseOrderStatus::Draft,
            completeness: Completeness::Full,
            line_amount_types: LineAmountTypes::default(),
            contact: None,
            line_items: Vec::new(),
            sub_total: DerivedAmount::Absent,
            total_tax: DerivedAmount::Absent,
            total: DerivedAmount::Absent,
            branding_theme_id: None,
            date: None,
            delivery_date: None,
            expected_arrival_date: None,
            total_discount: None,
            currency_code: None,
            currency_rate: None,
            sent_to_contact: false,
            has_attachments: false,
            delivery_address: None,
            attention_to: None,
            telephone: None,
            delivery_instructions: None,
        }
    }

    /// A record as received from the server.
    pub fn persisted(id: Guid, status: PurchaseOrderStatus, completeness: Completeness) -> Self {
        Self {
            purchase_order_id: Some(id),
            status,
            completeness,
            ..Self::new()
        }
    }

    pub fn with_purchase_order_number(mut self, number: impl Into<String>) -> Self {
        self.purchase_order_number = Some(number.into());
        self
    }
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
    pub fn with_line_amount_types(mut self, kind: LineAmountTypes) -> Self {
        self.line_amount_types = kind;
        self
    }
    pub fn with_contact(mut self, contact: ContactRef) -> Self {
        self.contact = Some(contact);
        self
    }
    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }
    pub fn with_line_items(mut self, items: impl IntoIterator<Item = LineItem>) -> Self {
        self.line_items.extend(items);
        self
    }
    /// Aggregates exactly as the server reported them. Overrides already in
    /// place are kept.
    pub fn with_reported_totals(
        mut self,
        sub_total: Option<Decimal>,
        total_tax: Option<Decimal>,
        total: Option<Decimal>,
    ) -> Self {
        for (field, value) in [
            (&mut self.sub_total, sub_total),
            (&mut self.total_tax, total_tax),
            (&mut self.total, total),
        ] {
            if !field.is_overridden() {
                *field = DerivedAmount::from_reported(value);
            }
        }
        self
    }
    pub fn with_branding_theme_id(mut self, id: Guid) -> Self {
        self.branding_theme_id = Some(id);
        self
    }
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }
    pub fn with_expected_arrival_date(mut self, date: NaiveDate) -> Self {
        self.expected_arrival_date = Some(date);
        self
    }
    pub fn with_total_discount(mut self, discount: Decimal) -> Self {
        self.total_discount = Some(discount);
        self
    }
    pub fn with_currency(mut self, code: impl Into<String>, rate: Option<Decimal>) -> Self {
        self.currency_code = Some(code.into());
        self.currency_rate = rate;
        self
    }
    pub fn with_sent_to_contact(mut self, sent: bool) -> Self {
        self.sent_to_contact = sent;
        self
    }
    pub fn with_has_attachments(mut self, has_attachments: bool) -> Self {
        self.has_attachments = has_attachments;
        self
    }
    pub fn with_delivery_address(mut self, address: impl Into<String>) -> Self {
        self.delivery_address = Some(address.into());
        self
    }
    pub fn with_attention_to(mut self, attention_to: impl Into<String>) -> Self {
        self.attention_to = Some(attention_to.into());
        self
    }
    pub fn with_telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = Some(telephone.into());
        self
    }
    pub fn with_delivery_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.delivery_instructions = Some(instructions.into());
        self
    }

    pub fn purchase_order_id(&self) -> Option<Guid> {
        self.purchase_order_id
    }
    pub fn purchase_order_number(&self) -> Option<&str> {
        self.purchase_order_number.as_deref()
    }
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }
    pub fn completeness(&self) -> Completeness {
        self.completeness
    }
    pub fn line_amount_types(&self) -> LineAmountTypes {
        self.line_amount_types
    }
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }
    pub fn contact(&self) -> Option<&ContactRef> {
        self.contact.as_ref()
    }
    pub fn branding_theme_id(&self) -> Option<Guid> {
        self.branding_theme_id
    }
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }
    pub fn expected_arrival_date(&self) -> Option<NaiveDate> {
        self.expected_arrival_date
    }
    pub fn total_discount(&self) -> Option<Decimal> {
        self.total_discount
    }
    pub fn currency_code(&self) -> Option<&str> {
        self.currency_code.as_deref()
    }
    pub fn currency_rate(&self) -> Option<Decimal> {
        self.currency_rate
    }
    pub fn sent_to_contact(&self) -> bool {
        self.sent_to_contact
    }
    pub fn has_attachments(&self) -> bool {
        self.has_attachments
    }
    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }
    pub fn attention_to(&self) -> Option<&str> {
        self.attention_to.as_deref()
    }
    pub fn telephone(&self) -> Option<&str> {
        self.telephone.as_deref()
    }
    pub fn delivery_instructions(&self) -> Option<&str> {
        self.delivery_instructions.as_deref()
    }

    /// Contact name without fetching the contact.
    pub fn contact_name(&self) -> Option<&str> {
        self.contact.as_ref().and_then(|c| c.name.as_deref())
    }
    /// Contact id without fetching the contact.
    pub fn contact_id(&self) -> Option<Guid> {
        self.contact.as_ref().and_then(|c| c.contact_id)
    }

    pub fn add_line_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Replace the lines of a summary with the complete set from a detail fetch.
    pub fn load_line_items(&mut self, items: Vec<LineItem>) {
        self.line_items = items;
        self.completeness = Completeness::Full;
    }

    pub fn is_new_record(&self) -> bool {
        self.purchase_order_id.is_none()
    }

    /// Whether the line items can be trusted to produce the totals.
    ///
    /// Summaries that somehow carry lines are treated as loaded, matching how
    /// the remote API marks records it has hydrated.
    pub fn is_loaded(&self) -> bool {
        if self.is_new_record() {
            return true;
        }
        match self.completeness {
            Completeness::Full => true,
            Completeness::Summary => !self.line_items.is_empty(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }

    pub fn is_overridden(&self, field: DerivedField) -> bool {
        self.derived(field).is_overridden()
    }

    // DERIVED FIELDS

    pub fn sub_total(&self) -> Option<Decimal> {
        self.sub_total_as(View::Resolved)
    }
    pub fn total_tax(&self) -> Option<Decimal> {
        self.total_tax_as(View::Resolved)
    }
    pub fn total(&self) -> Option<Decimal> {
        self.total_as(View::Resolved)
    }

    /// Tax exclusive sum of the line amounts.
    pub fn sub_total_as(&self, view: View) -> Option<Decimal> {
        self.resolve(DerivedField::SubTotal, view, || {
            let sum = saturating_sum(self.line_items.iter().map(LineItem::line_amount));
            // goes through the resolver so an overridden tax is honoured
            match self.line_amount_types {
                LineAmountTypes::Inclusive => {
                    sum.saturating_sub(self.total_tax_as(view).unwrap_or_default())
                }
                _ => sum,
            }
        })
    }

    pub fn total_tax_as(&self, view: View) -> Option<Decimal> {
        self.resolve(DerivedField::TotalTax, view, || {
            saturating_sum(self.line_items.iter().map(LineItem::tax_amount))
        })
    }

    pub fn total_as(&self, view: View) -> Option<Decimal> {
        self.resolve(DerivedField::Total, view, || {
            let sub_total = self.sub_total_as(view).unwrap_or_default();
            sub_total.saturating_add(self.total_tax_as(view).unwrap_or_default())
        })
    }

    pub fn set_sub_total(&mut self, value: Decimal) {
        self.sub_total = DerivedAmount::Overridden(value);
    }
    pub fn set_total_tax(&mut self, value: Decimal) {
        self.total_tax = DerivedAmount::Overridden(value);
    }
    pub fn set_total(&mut self, value: Decimal) {
        self.total = DerivedAmount::Overridden(value);
    }

    fn derived(&self, field: DerivedField) -> &DerivedAmount {
        match field {
            DerivedField::SubTotal => &self.sub_total,
            DerivedField::TotalTax => &self.total_tax,
            DerivedField::Total => &self.total,
        }
    }

    fn resolve(
        &self,
        field: DerivedField,
        view: View,
        compute: impl FnOnce() -> Decimal,
    ) -> Option<Decimal> {
        let stored = self.derived(field);
        if let Some(value) = stored.overridden() {
            return Some(value);
        }
        if view == View::Summary || !self.is_loaded() {
            return stored.stored();
        }
        Some(compute())
    }

    // STATUS TRANSITIONS

    /// Approve a draft or submitted order.
    pub fn approve<P: Persistence + ?Sized>(&mut self, store: &mut P) -> anyhow::Result<()> {
        self.change_status(PurchaseOrderStatus::Authorised, store)
    }

    /// Delete an order. The remote service additionally refuses orders with
    /// payments recorded against them.
    pub fn delete<P: Persistence + ?Sized>(&mut self, store: &mut P) -> anyhow::Result<()> {
        self.change_status(PurchaseOrderStatus::Deleted, store)
    }

    /// Id, number or a placeholder, whichever identifies the record best.
    pub fn identity(&self) -> String {
        match (&self.purchase_order_id, &self.purchase_order_number) {
            (Some(id), _) => id.to_string(),
            (None, Some(number)) => number.clone(),
            (None, None) => "<unsaved>".to_string(),
        }
    }

    // completeness is left alone: new records are already Full and a saved
    // summary still lacks its lines
    pub(crate) fn mark_saved(&mut self, id: Guid) {
        self.purchase_order_id = Some(id);
    }

    fn change_status<P: Persistence + ?Sized>(
        &mut self,
        target: PurchaseOrderStatus,
        store: &mut P,
    ) -> anyhow::Result<()> {
        let previous = self.status;
        if !previous.can_transition_to(target) {
            warn!(
                purchase_order = %self.identity(),
                from = %previous,
                to = %target,
                "rejected purchase order status change"
            );
            return Err(StatusError::InvalidStatusTransition {
                record: self.identity(),
                from: previous,
                to: target,
            }
            .into());
        }

        self.status = target;
        if let Err(err) = store.save(self) {
            self.status = previous;
            return Err(err);
        }

        info!(purchase_order = %self.identity(), from = %previous, to = %target, "purchase order status changed");
        Ok(())
    }
}

// Clamps at Decimal::MAX / MIN; reading a total never panics.
fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}
