//! SDK for the Gian Hàng storefront API.
//!
//! [`objects`] holds the wire-level request/response types shared by the
//! server and its consumers. The optional `client` feature adds a typed
//! [`client::ShopClient`] over reqwest.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
