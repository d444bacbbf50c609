//! Input shapes accepted by the recording operations.
//!
//! Every operation takes one of three shapes: nothing at all (everything is
//! inherited from the visitor's context), a bare parameter map, or a fluent
//! builder holding the positional fields plus optional extra parameters.
//! The `From` impls cover the common positional prefixes, so
//! `visitor.event(("video", "play"))` and
//! `visitor.event(Event::new("video", "play"))` are the same call.

use crate::types::Params;
use serde_json::Value;

// ============================================
// PAGEVIEW
// ============================================

/// Arguments of a pageview hit.
#[derive(Debug, Clone, PartialEq)]
pub enum PageviewInput {
    /// Reuse the previous call's page.
    Inherit,
    Params(Params),
    Fields(Pageview),
}

/// Builder for pageview hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pageview {
    pub(crate) path: Option<String>,
    pub(crate) hostname: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) params: Params,
}

impl Pageview {
    /// Pageview for a document path (`dp`).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the document hostname (`dh`).
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the document title (`dt`).
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a parameter.
    pub fn param(mut self, code: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(code.into(), value.into());
        self
    }

    /// Add several parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }
}

impl From<()> for PageviewInput {
    fn from(_: ()) -> Self {
        PageviewInput::Inherit
    }
}

impl From<Params> for PageviewInput {
    fn from(params: Params) -> Self {
        PageviewInput::Params(params)
    }
}

impl From<Pageview> for PageviewInput {
    fn from(pageview: Pageview) -> Self {
        PageviewInput::Fields(pageview)
    }
}

impl From<&str> for PageviewInput {
    fn from(path: &str) -> Self {
        Pageview::new(path).into()
    }
}

impl From<String> for PageviewInput {
    fn from(path: String) -> Self {
        Pageview::new(path).into()
    }
}

impl From<(&str, Params)> for PageviewInput {
    fn from((path, params): (&str, Params)) -> Self {
        Pageview::new(path).params(params).into()
    }
}

impl From<(&str, &str)> for PageviewInput {
    fn from((path, hostname): (&str, &str)) -> Self {
        Pageview::new(path).hostname(hostname).into()
    }
}

impl From<(&str, &str, &str)> for PageviewInput {
    fn from((path, hostname, title): (&str, &str, &str)) -> Self {
        Pageview::new(path).hostname(hostname).title(title).into()
    }
}

// ============================================
// EVENT
// ============================================

/// Arguments of an event hit.
#[derive(Debug, Clone, PartialEq)]
pub enum EventInput {
    /// Repeat the previous event.
    Inherit,
    Params(Params),
    Fields(Event),
}

/// Builder for event hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub(crate) category: Option<String>,
    pub(crate) action: Option<String>,
    pub(crate) label: Option<String>,
    pub(crate) value: Option<Value>,
    pub(crate) params: Params,
}

impl Event {
    /// Event with a category (`ec`) and action (`ea`).
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            action: Some(action.into()),
            ..Default::default()
        }
    }

    /// Set the category (`ec`).
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the action (`ea`).
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the label (`el`).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the value (`ev`).
    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add a parameter.
    pub fn param(mut self, code: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(code.into(), value.into());
        self
    }

    /// Add several parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }
}

impl From<()> for EventInput {
    fn from(_: ()) -> Self {
        EventInput::Inherit
    }
}

impl From<Params> for EventInput {
    fn from(params: Params) -> Self {
        EventInput::Params(params)
    }
}

impl From<Event> for EventInput {
    fn from(event: Event) -> Self {
        EventInput::Fields(event)
    }
}

/// Category only; the action comes from context.
impl From<&str> for EventInput {
    fn from(category: &str) -> Self {
        Event::default().category(category).into()
    }
}

impl From<(&str, &str)> for EventInput {
    fn from((category, action): (&str, &str)) -> Self {
        Event::new(category, action).into()
    }
}

impl From<(&str, &str, &str)> for EventInput {
    fn from((category, action, label): (&str, &str, &str)) -> Self {
        Event::new(category, action).label(label).into()
    }
}

impl From<(&str, &str, &str, i64)> for EventInput {
    fn from((category, action, label, value): (&str, &str, &str, i64)) -> Self {
        Event::new(category, action).label(label).value(value).into()
    }
}

impl From<(&str, &str, &str, i64, Params)> for EventInput {
    fn from((category, action, label, value, params): (&str, &str, &str, i64, Params)) -> Self {
        Event::new(category, action)
            .label(label)
            .value(value)
            .params(params)
            .into()
    }
}

// ============================================
// TRANSACTION
// ============================================

/// Arguments of a transaction hit.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionInput {
    Inherit,
    Params(Params),
    Fields(Transaction),
}

/// Builder for e-commerce transaction hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub(crate) id: Option<String>,
    pub(crate) revenue: Option<Value>,
    pub(crate) shipping: Option<Value>,
    pub(crate) tax: Option<Value>,
    pub(crate) affiliation: Option<String>,
    pub(crate) params: Params,
}

impl Transaction {
    /// Transaction with an id (`ti`).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Set the revenue (`tr`).
    pub fn revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue.into());
        self
    }

    /// Set the shipping cost (`ts`).
    pub fn shipping(mut self, shipping: f64) -> Self {
        self.shipping = Some(shipping.into());
        self
    }

    /// Set the tax (`tt`).
    pub fn tax(mut self, tax: f64) -> Self {
        self.tax = Some(tax.into());
        self
    }

    /// Set the affiliation (`ta`).
    pub fn affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Add a parameter.
    pub fn param(mut self, code: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(code.into(), value.into());
        self
    }

    /// Add several parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }
}

impl From<()> for TransactionInput {
    fn from(_: ()) -> Self {
        TransactionInput::Inherit
    }
}

impl From<Params> for TransactionInput {
    fn from(params: Params) -> Self {
        TransactionInput::Params(params)
    }
}

impl From<Transaction> for TransactionInput {
    fn from(transaction: Transaction) -> Self {
        TransactionInput::Fields(transaction)
    }
}

impl From<&str> for TransactionInput {
    fn from(id: &str) -> Self {
        Transaction::new(id).into()
    }
}

impl From<String> for TransactionInput {
    fn from(id: String) -> Self {
        Transaction::new(id).into()
    }
}

impl From<(&str, f64)> for TransactionInput {
    fn from((id, revenue): (&str, f64)) -> Self {
        Transaction::new(id).revenue(revenue).into()
    }
}

impl From<(&str, f64, f64)> for TransactionInput {
    fn from((id, revenue, shipping): (&str, f64, f64)) -> Self {
        Transaction::new(id).revenue(revenue).shipping(shipping).into()
    }
}

impl From<(&str, f64, f64, f64)> for TransactionInput {
    fn from((id, revenue, shipping, tax): (&str, f64, f64, f64)) -> Self {
        Transaction::new(id)
            .revenue(revenue)
            .shipping(shipping)
            .tax(tax)
            .into()
    }
}

impl From<(&str, f64, f64, f64, &str)> for TransactionInput {
    fn from((id, revenue, shipping, tax, affiliation): (&str, f64, f64, f64, &str)) -> Self {
        Transaction::new(id)
            .revenue(revenue)
            .shipping(shipping)
            .tax(tax)
            .affiliation(affiliation)
            .into()
    }
}

// ============================================
// ITEM
// ============================================

/// Arguments of a transaction item hit.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemInput {
    Inherit,
    Params(Params),
    Fields(Item),
}

/// Builder for transaction item hits.
///
/// The transaction id is normally inherited from a preceding
/// `transaction` call; set it explicitly with [`Item::transaction_id`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub(crate) price: Option<Value>,
    pub(crate) quantity: Option<Value>,
    pub(crate) sku: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) variation: Option<String>,
    pub(crate) params: Params,
}

impl Item {
    /// Item with a unit price (`ip`).
    pub fn new(price: f64) -> Self {
        Self {
            price: Some(price.into()),
            ..Default::default()
        }
    }

    /// Set the quantity (`iq`).
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    /// Set the SKU (`ic`).
    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Set the name (`in`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the variation (`iv`).
    pub fn variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = Some(variation.into());
        self
    }

    /// Set the owning transaction (`ti`).
    pub fn transaction_id(self, id: impl Into<String>) -> Self {
        self.param("ti", id.into())
    }

    /// Add a parameter.
    pub fn param(mut self, code: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(code.into(), value.into());
        self
    }

    /// Add several parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }
}

impl From<()> for ItemInput {
    fn from(_: ()) -> Self {
        ItemInput::Inherit
    }
}

impl From<Params> for ItemInput {
    fn from(params: Params) -> Self {
        ItemInput::Params(params)
    }
}

impl From<Item> for ItemInput {
    fn from(item: Item) -> Self {
        ItemInput::Fields(item)
    }
}

impl From<f64> for ItemInput {
    fn from(price: f64) -> Self {
        Item::new(price).into()
    }
}

impl From<(f64, i64)> for ItemInput {
    fn from((price, quantity): (f64, i64)) -> Self {
        Item::new(price).quantity(quantity).into()
    }
}

impl From<(f64, i64, &str)> for ItemInput {
    fn from((price, quantity, sku): (f64, i64, &str)) -> Self {
        Item::new(price).quantity(quantity).sku(sku).into()
    }
}

impl From<(f64, i64, &str, &str)> for ItemInput {
    fn from((price, quantity, sku, name): (f64, i64, &str, &str)) -> Self {
        Item::new(price).quantity(quantity).sku(sku).name(name).into()
    }
}

impl From<(f64, i64, &str, &str, &str)> for ItemInput {
    fn from((price, quantity, sku, name, variation): (f64, i64, &str, &str, &str)) -> Self {
        Item::new(price)
            .quantity(quantity)
            .sku(sku)
            .name(name)
            .variation(variation)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_prefixes_match_builders() {
        assert_eq!(
            PageviewInput::from(("/home", "example.com", "Home")),
            PageviewInput::Fields(Pageview::new("/home").hostname("example.com").title("Home"))
        );
        assert_eq!(
            EventInput::from(("video", "play", "intro", 3)),
            EventInput::Fields(Event::new("video", "play").label("intro").value(3))
        );
        assert_eq!(
            TransactionInput::from(("T-1", 10.0, 2.5)),
            TransactionInput::Fields(Transaction::new("T-1").revenue(10.0).shipping(2.5))
        );
        assert_eq!(
            ItemInput::from((4.99, 2, "SKU-1")),
            ItemInput::Fields(Item::new(4.99).quantity(2).sku("SKU-1"))
        );
    }

    #[test]
    fn test_unit_means_inherit() {
        assert_eq!(PageviewInput::from(()), PageviewInput::Inherit);
        assert_eq!(EventInput::from(()), EventInput::Inherit);
        assert_eq!(TransactionInput::from(()), TransactionInput::Inherit);
        assert_eq!(ItemInput::from(()), ItemInput::Inherit);
    }

    #[test]
    fn test_bare_category_leaves_action_unset() {
        let EventInput::Fields(event) = EventInput::from("video") else {
            panic!("expected fields");
        };
        assert_eq!(event.category.as_deref(), Some("video"));
        assert!(event.action.is_none());
    }

    #[test]
    fn test_item_transaction_id_goes_to_params() {
        let item = Item::new(1.0).transaction_id("T-9");
        assert_eq!(item.params.get("ti"), Some(&json!("T-9")));
    }

    #[test]
    fn test_trailing_params_are_kept() {
        let params = Params::from([("cd1".to_string(), json!("gold"))]);
        let PageviewInput::Fields(pageview) = PageviewInput::from(("/a", params.clone())) else {
            panic!("expected fields");
        };
        assert_eq!(pageview.params, params);
    }
}
