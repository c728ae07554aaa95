use std::any::Any;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{Container, DispatchError, Payload, RouteTable};

/// Delivers payloads to the handlers registered for their runtime type.
///
/// Each delivery resolves its own handler set from the container and awaits the
/// handlers one after another in registration order. The cancellation token is
/// forwarded to every handler unchanged; the broker never checks it between
/// handlers. Cloning is cheap and clones share the container and routes.
#[derive(Debug, Clone)]
pub struct Broker {
	container: Arc<Container>,
	routes: Arc<RouteTable>,
}

impl Broker {
	pub fn new(container: Arc<Container>, routes: RouteTable) -> Self {
		Self {
			container,
			routes: Arc::new(routes),
		}
	}

	/// Delivers `message` to every handler registered for its runtime type.
	///
	/// Fails with [`DispatchError::NullPayload`] before any lookup when `message`
	/// is `None`. A payload type without a route, or a routed type without
	/// registered handlers, completes with `Ok(())`.
	pub async fn send(&self, message: Option<&Payload>, cancel: &CancellationToken) -> Result<(), DispatchError> {
		let message = message.ok_or(DispatchError::NullPayload)?;
		let runtime_type = {
			let erased: &dyn Any = message;
			erased.type_id()
		};
		let Some(route) = self.routes.get(runtime_type) else {
			tracing::trace!(?runtime_type, "no route for payload type");
			return Ok(());
		};
		let payload = route.payload_name();
		let delivered = route.deliver(&self.container, message, cancel).await?;
		if delivered == 0 {
			tracing::trace!(payload, "no handlers registered");
		} else {
			tracing::trace!(payload, handlers = delivered, "payload delivered");
		}
		Ok(())
	}

	/// Delivers a statically typed payload with a fresh, never-cancelled token.
	pub async fn publish<P>(&self, message: &P) -> Result<(), DispatchError>
	where
		P: Any + Send + Sync,
	{
		let cancel = CancellationToken::new();
		self.send(Some(message), &cancel).await
	}

	pub fn container(&self) -> &Arc<Container> {
		&self.container
	}

	pub fn routes(&self) -> &RouteTable {
		&self.routes
	}
}
