//! Runtime side of generated pub/sub wiring.
//!
//! `tinybus-codegen` emits three artifacts into a consuming crate: the handler
//! contract, a broker that builds a [`RouteTable`], and a registration function
//! that fills a [`Container`]. This crate holds everything those artifacts call
//! into:
//!
//! * [`Container`] - contract-keyed service registrations (transient or singleton)
//! * [`RouteTable`] - payload `TypeId` to handler-invocation routes
//! * [`Broker`] - delivers one payload to every handler of its runtime type, in order
//!
//! Consumers include the generated files with [`include_generated!`].

mod broker;
mod container;
mod error;
mod route;

use std::future::Future;
use std::pin::Pin;

pub use async_trait::async_trait;
pub use broker::Broker;
pub use container::{Container, Lifetime};
pub use error::{DispatchError, HandlerError, HandlerResult};
pub use route::RouteTable;
pub use tokio_util::sync::CancellationToken;

/// Type-erased payload accepted by [`Broker::send`].
pub type Payload = dyn std::any::Any + Send + Sync;

/// Boxed `Send` future returned by handler invocations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Includes the generated contract, broker and registration artifacts.
///
/// Expands to `include!` items reading from `$OUT_DIR/<dir>/`, where `<dir>`
/// defaults to `tinybus` and must match the generator's `out-dir` setting.
/// Invoke it inside the module named by the configured contract path:
///
/// ```ignore
/// pub mod bus {
///     tinybus::include_generated!();
/// }
/// ```
#[macro_export]
macro_rules! include_generated {
	() => {
		$crate::include_generated!("tinybus");
	};
	($dir:literal) => {
		include!(concat!(env!("OUT_DIR"), "/", $dir, "/handler.rs"));
		include!(concat!(env!("OUT_DIR"), "/", $dir, "/broker.rs"));
		include!(concat!(env!("OUT_DIR"), "/", $dir, "/registration.rs"));
	};
}
