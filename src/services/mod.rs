//! Services Module
//!
//! Read-through consumers of the caches: each service checks its cache,
//! falls back to the remote API on a miss, and caches what it fetched.
//! Fetch failures propagate to the caller; cache failures never do.

mod client;
mod images;
mod receipts;
mod shopping_lists;

#[cfg(test)]
mod testing;

pub use client::{FetchedBody, HttpClient, ResourceClient};
pub use images::{to_data_url, ImageService};
pub use receipts::{Receipt, ReceiptPage, ReceiptsService};
pub use shopping_lists::{ShoppingList, ShoppingListService};
