//! Contract-keyed service container.
//!
//! Registrations are grouped by the `TypeId` of their contract type, which is
//! usually an unsized trait object such as `dyn Handler<OrderCreated>`.
//! Resolution returns instances in registration order.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap as HashMap;

/// Instance sharing policy for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
	/// A new instance is constructed on every resolution.
	Transient,
	/// One instance is constructed on first resolution and shared afterwards.
	Singleton,
}

type Factory<C> = Box<dyn Fn(&Container) -> Box<C> + Send + Sync>;

struct Registration<C: ?Sized> {
	implementation: &'static str,
	lifetime: Lifetime,
	factory: Factory<C>,
	shared: OnceLock<Arc<C>>,
}

impl<C: ?Sized> Registration<C> {
	fn instance(&self, container: &Container) -> Arc<C> {
		match self.lifetime {
			Lifetime::Transient => Arc::from((self.factory)(container)),
			Lifetime::Singleton => self.shared.get_or_init(|| Arc::from((self.factory)(container))).clone(),
		}
	}
}

/// Service container mapping contracts to ordered implementation factories.
///
/// Registration takes `&mut self`; resolution takes `&self` and is safe to call
/// concurrently once the container is shared behind an `Arc`.
#[derive(Default)]
pub struct Container {
	services: HashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>,
	len: usize,
}

impl Container {
	/// Creates an empty container.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `factory` as an implementation of contract `C`.
	///
	/// `implementation` names the concrete type for diagnostics and
	/// [`Container::implementations`].
	pub fn register<C, F>(&mut self, lifetime: Lifetime, implementation: &'static str, factory: F) -> &mut Self
	where
		C: ?Sized + Send + Sync + 'static,
		F: Fn(&Container) -> Box<C> + Send + Sync + 'static,
	{
		let registration = Registration::<C> {
			implementation,
			lifetime,
			factory: Box::new(factory),
			shared: OnceLock::new(),
		};
		self.services.entry(TypeId::of::<C>()).or_default().push(Box::new(registration));
		self.len += 1;
		tracing::trace!(contract = std::any::type_name::<C>(), implementation, ?lifetime, "registered service");
		self
	}

	/// Registers a transient implementation of contract `C`.
	pub fn add_transient<C, F>(&mut self, implementation: &'static str, factory: F) -> &mut Self
	where
		C: ?Sized + Send + Sync + 'static,
		F: Fn(&Container) -> Box<C> + Send + Sync + 'static,
	{
		self.register(Lifetime::Transient, implementation, factory)
	}

	/// Registers a singleton implementation of contract `C`.
	pub fn add_singleton<C, F>(&mut self, implementation: &'static str, factory: F) -> &mut Self
	where
		C: ?Sized + Send + Sync + 'static,
		F: Fn(&Container) -> Box<C> + Send + Sync + 'static,
	{
		self.register(Lifetime::Singleton, implementation, factory)
	}

	/// Resolves every implementation of contract `C` in registration order.
	pub fn resolve_all<C>(&self) -> Vec<Arc<C>>
	where
		C: ?Sized + Send + Sync + 'static,
	{
		self.registrations::<C>().map(|registration| registration.instance(self)).collect()
	}

	/// Returns the implementation names registered for contract `C`, in order.
	pub fn implementations<C>(&self) -> Vec<&'static str>
	where
		C: ?Sized + Send + Sync + 'static,
	{
		self.registrations::<C>().map(|registration| registration.implementation).collect()
	}

	/// Returns true when at least one implementation of `C` is registered.
	pub fn contains<C>(&self) -> bool
	where
		C: ?Sized + Send + Sync + 'static,
	{
		self.registrations::<C>().next().is_some()
	}

	/// Total number of registrations across all contracts.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn registrations<C>(&self) -> impl Iterator<Item = &Registration<C>>
	where
		C: ?Sized + Send + Sync + 'static,
	{
		self.services
			.get(&TypeId::of::<C>())
			.into_iter()
			.flatten()
			.filter_map(|entry| entry.downcast_ref::<Registration<C>>())
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Container")
			.field("contracts", &self.services.len())
			.field("registrations", &self.len)
			.finish()
	}
}

#[cfg(test)]
mod tests;
