//! Resolution of call inputs into canonical parameter maps.
//!
//! Every function here is pure: caller maps and the visitor context are only
//! read, and the result is always a freshly built map.

use crate::builders::{
    Event, EventInput, Item, ItemInput, Pageview, PageviewInput, Transaction, TransactionInput,
};
use crate::types::{HitType, Params};
use crate::Error;
use serde_json::Value;

/// Long parameter names accepted in params maps.
const LONG_NAMES: &[(&str, &str)] = &[
    ("protocolVersion", "v"),
    ("trackingId", "tid"),
    ("clientId", "cid"),
    ("userId", "uid"),
    ("hitType", "t"),
    ("documentLocationUrl", "dl"),
    ("documentHostName", "dh"),
    ("documentPath", "dp"),
    ("documentTitle", "dt"),
    ("page", "p"),
    ("eventCategory", "ec"),
    ("eventAction", "ea"),
    ("eventLabel", "el"),
    ("eventValue", "ev"),
    ("transactionId", "ti"),
    ("transactionAffiliation", "ta"),
    ("transactionRevenue", "tr"),
    ("transactionShipping", "ts"),
    ("transactionTax", "tt"),
    ("itemName", "in"),
    ("itemPrice", "ip"),
    ("itemQuantity", "iq"),
    ("itemCode", "ic"),
    ("itemCategory", "iv"),
    ("currencyCode", "cu"),
];

fn short_code(name: &str) -> Option<&'static str> {
    LONG_NAMES
        .iter()
        .find(|(long, _)| *long == name)
        .map(|(_, short)| *short)
}

/// Rewrite long parameter names to their short codes.
pub(crate) fn translate(params: Params) -> Params {
    params
        .into_iter()
        .map(|(name, value)| match short_code(&name) {
            Some(code) => (code.to_string(), value),
            None => (name, value),
        })
        .collect()
}

/// Drop every parameter whose value is null.
pub(crate) fn tidy(mut params: Params) -> Params {
    params.retain(|_, value| !value.is_null());
    params
}

fn present(value: &Value) -> bool {
    !value.is_null()
}

/// Accumulates one call's parameters with positional > params > context
/// precedence.
struct Merge<'a> {
    params: Params,
    context: Option<&'a Params>,
}

impl<'a> Merge<'a> {
    fn new(params: Params, context: Option<&'a Params>) -> Self {
        Self {
            params: translate(params),
            context,
        }
    }

    fn take(&mut self, code: &str) -> Option<Value> {
        self.params.remove(code).filter(present)
    }

    fn inherited(&self, code: &str) -> Option<Value> {
        self.context
            .and_then(|context| context.get(code))
            .filter(|value| present(value))
            .cloned()
    }

    fn set(&mut self, code: &str, value: Option<Value>) {
        if let Some(value) = value {
            self.params.insert(code.to_string(), value);
        }
    }

    fn resolve(&mut self, code: &str, positional: Option<Value>) {
        let value = positional
            .filter(present)
            .or_else(|| self.take(code))
            .or_else(|| self.inherited(code));
        self.set(code, value);
    }

    /// `p` from params, then context `p`, then context `dp`.
    fn resolve_page(&mut self, explicit_dp: Option<Value>) {
        let page = self
            .take("p")
            .or(explicit_dp)
            .or_else(|| self.inherited("p"))
            .or_else(|| self.inherited("dp"));
        self.set("p", page);
    }

    fn finish(self) -> Params {
        tidy(self.params)
    }
}

fn require(params: &Params, hit: HitType, parameter: &'static str) -> Result<(), Error> {
    match params.get(parameter) {
        Some(Value::String(s)) if s.is_empty() => Err(Error::MissingParameter { hit, parameter }),
        Some(value) if present(value) => Ok(()),
        _ => Err(Error::MissingParameter { hit, parameter }),
    }
}

/// Resolve a pageview. Requires `dp`.
pub(crate) fn pageview(input: PageviewInput, context: Option<&Params>) -> Result<Params, Error> {
    let fields = match input {
        PageviewInput::Inherit => Pageview::default(),
        PageviewInput::Params(params) => Pageview {
            params,
            ..Default::default()
        },
        PageviewInput::Fields(fields) => fields,
    };

    let mut merge = Merge::new(fields.params, context);
    merge.resolve("dp", fields.path.map(Value::from));
    merge.resolve("dh", fields.hostname.map(Value::from));
    merge.resolve("dt", fields.title.map(Value::from));

    let params = merge.finish();
    require(&params, HitType::Pageview, "dp")?;
    Ok(params)
}

/// Resolve an event. Requires `ec` and `ea`; a `dp` in params becomes `p`.
pub(crate) fn event(input: EventInput, context: Option<&Params>) -> Result<Params, Error> {
    let fields = match input {
        EventInput::Inherit => Event::default(),
        EventInput::Params(params) => Event {
            params,
            ..Default::default()
        },
        EventInput::Fields(fields) => fields,
    };

    let mut merge = Merge::new(fields.params, context);
    merge.resolve("ec", fields.category.map(Value::from));
    merge.resolve("ea", fields.action.map(Value::from));
    merge.resolve("el", fields.label.map(Value::from));
    merge.resolve("ev", fields.value);
    let explicit_dp = merge.take("dp");
    merge.resolve_page(explicit_dp);

    let params = merge.finish();
    require(&params, HitType::Event, "ec")?;
    require(&params, HitType::Event, "ea")?;
    Ok(params)
}

/// Resolve a transaction. Requires `ti`.
pub(crate) fn transaction(
    input: TransactionInput,
    context: Option<&Params>,
) -> Result<Params, Error> {
    let fields = match input {
        TransactionInput::Inherit => Transaction::default(),
        TransactionInput::Params(params) => Transaction {
            params,
            ..Default::default()
        },
        TransactionInput::Fields(fields) => fields,
    };

    let mut merge = Merge::new(fields.params, context);
    merge.resolve("ti", fields.id.map(Value::from));
    merge.resolve("tr", fields.revenue);
    merge.resolve("ts", fields.shipping);
    merge.resolve("tt", fields.tax);
    merge.resolve("ta", fields.affiliation.map(Value::from));
    merge.resolve_page(None);

    let params = merge.finish();
    require(&params, HitType::Transaction, "ti")?;
    Ok(params)
}

/// Resolve a transaction item. Requires `ti`, which is never positional.
pub(crate) fn item(input: ItemInput, context: Option<&Params>) -> Result<Params, Error> {
    let fields = match input {
        ItemInput::Inherit => Item::default(),
        ItemInput::Params(params) => Item {
            params,
            ..Default::default()
        },
        ItemInput::Fields(fields) => fields,
    };

    let mut merge = Merge::new(fields.params, context);
    merge.resolve("ip", fields.price);
    merge.resolve("iq", fields.quantity);
    merge.resolve("ic", fields.sku.map(Value::from));
    merge.resolve("in", fields.name.map(Value::from));
    merge.resolve("iv", fields.variation.map(Value::from));
    merge.resolve("ti", None);
    merge.resolve_page(None);

    let params = merge.finish();
    require(&params, HitType::Item, "ti")?;
    Ok(params)
}
