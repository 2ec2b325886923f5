//! Domain models shared by the server and its clients

pub mod order;

pub use order::{Order, OrderStatus, UnknownOrderStatus};
