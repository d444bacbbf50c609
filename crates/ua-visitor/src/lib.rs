//! Measurement protocol client for Rust.
//!
//! A [`Visitor`] turns pageviews, events, transactions and transaction items
//! into flat measurement-protocol hits, keeps them in an ordered queue and
//! delivers them one request at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use ua_visitor::{Event, Visitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ua_visitor::Error> {
//!     let visitor = Visitor::builder()
//!         .tracking_id("UA-XXXXX-1")
//!         .user_agent("my-service/1.0")
//!         .build()?;
//!
//!     visitor
//!         .pageview(("/checkout", "shop.example.com", "Checkout"))
//!         .event(Event::new("checkout", "submit").value(3))
//!         .transaction(("T-1001", 42.0))
//!         .item((21.0, 2, "MUG-RED", "Red mug", "Kitchen"));
//!
//!     visitor.send().await?;
//!     Ok(())
//! }
//! ```

mod builders;
mod config;
mod error;
pub mod identifier;
mod normalize;
mod queue;
mod transport;
pub mod types;
mod visitor;

pub use builders::{
    Event, EventInput, Item, ItemInput, Pageview, PageviewInput, Transaction, TransactionInput,
};
pub use config::{Config, VisitorBuilder, DEFAULT_HOSTNAME, DEFAULT_PATH};
pub use error::Error;
pub use identifier::{IdGenerator, RandomUuid};
pub use transport::{HttpTransport, Transport};
pub use types::{Hit, HitType, Params, TransportResponse};
pub use visitor::Visitor;
