//! Example consumer of the generated wiring.
//!
//! Handlers under [`handlers`] are plain types implementing
//! [`bus::Handler`]; `build.rs` discovers them and generates
//! [`bus::MessageBroker`] and [`bus::add_pub_sub`].

pub mod bus;
pub mod events;
pub mod handlers;
pub mod log;

use std::sync::Arc;

use tinybus::Container;

/// Builds a container with every discovered handler and a broker over it.
pub fn wire() -> bus::MessageBroker {
	let mut services = Container::new();
	bus::add_pub_sub(&mut services);
	tracing::debug!(registrations = services.len(), "handlers registered");
	bus::MessageBroker::new(Arc::new(services))
}
