//! Database layer (local record store).

pub mod store;

pub use store::Store;
