//! Payload-type indexed dispatch routes.

use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use tokio_util::sync::CancellationToken;

use crate::{BoxFuture, Container, DispatchError, HandlerResult, Payload};

/// One payload type's delivery path: downcast, resolve handlers, invoke each.
pub(crate) trait Route: Send + Sync {
	fn payload_name(&self) -> &'static str;

	/// Delivers `message` and returns the number of handlers invoked.
	fn deliver<'a>(
		&'a self,
		container: &'a Container,
		message: &'a Payload,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, Result<usize, DispatchError>>;
}

struct TypedRoute<P, C: ?Sized, F> {
	invoke: F,
	_marker: PhantomData<fn() -> (P, Box<C>)>,
}

impl<P, C, F> Route for TypedRoute<P, C, F>
where
	P: Any + Send + Sync,
	C: ?Sized + Send + Sync + 'static,
	F: for<'a> Fn(&'a C, &'a P, &'a CancellationToken) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
	fn payload_name(&self) -> &'static str {
		type_name::<P>()
	}

	fn deliver<'a>(
		&'a self,
		container: &'a Container,
		message: &'a Payload,
		cancel: &'a CancellationToken,
	) -> BoxFuture<'a, Result<usize, DispatchError>> {
		Box::pin(async move {
			let Some(message) = message.downcast_ref::<P>() else {
				return Ok(0);
			};
			let handlers = container.resolve_all::<C>();
			for (index, handler) in handlers.iter().enumerate() {
				(self.invoke)(handler.as_ref(), message, cancel)
					.await
					.map_err(|source| DispatchError::Handler {
						payload: type_name::<P>(),
						index,
						source,
					})?;
			}
			Ok(handlers.len())
		})
	}
}

/// Maps payload `TypeId`s to their delivery routes.
///
/// The generated broker builds one table at construction with a single route per
/// discovered payload type; lookups at dispatch time are a hash lookup on the
/// payload's runtime type.
#[derive(Default, Clone)]
pub struct RouteTable {
	routes: HashMap<TypeId, Arc<dyn Route>>,
}

impl RouteTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Routes payloads of type `P` to every `C` resolved from the container.
	///
	/// `invoke` calls the contract method on one resolved handler. A second route
	/// for the same payload type is ignored.
	pub fn route<P, C, F>(&mut self, invoke: F) -> &mut Self
	where
		P: Any + Send + Sync,
		C: ?Sized + Send + Sync + 'static,
		F: for<'a> Fn(&'a C, &'a P, &'a CancellationToken) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
	{
		let route = TypedRoute::<P, C, F> {
			invoke,
			_marker: PhantomData,
		};
		if self.routes.contains_key(&TypeId::of::<P>()) {
			tracing::warn!(payload = type_name::<P>(), "duplicate route ignored");
		} else {
			self.routes.insert(TypeId::of::<P>(), Arc::new(route));
		}
		self
	}

	/// Returns true when payloads of type `P` have a route.
	pub fn contains<P: Any>(&self) -> bool {
		self.routes.contains_key(&TypeId::of::<P>())
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Routed payload type names, sorted.
	pub fn payload_names(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.routes.values().map(|route| route.payload_name()).collect();
		names.sort_unstable();
		names
	}

	pub(crate) fn get(&self, payload: TypeId) -> Option<&Arc<dyn Route>> {
		self.routes.get(&payload)
	}
}

impl std::fmt::Debug for RouteTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteTable").field("payloads", &self.payload_names()).finish()
	}
}
