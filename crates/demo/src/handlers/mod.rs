//! Handlers live in private modules; the generated wiring names them through
//! these re-exports.

mod orders;
mod users;

pub use orders::{OrderCreatedAuditHandler, OrderCreatedHandler};
pub use users::{Archiving, Forwarder, UserHandler};
