use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

trait Greeter: Send + Sync {
	fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
	fn greet(&self) -> String {
		"hello".into()
	}
}

struct French;

impl Greeter for French {
	fn greet(&self) -> String {
		"bonjour".into()
	}
}

#[test]
fn resolves_in_registration_order() {
	let mut container = Container::new();
	container
		.add_transient::<dyn Greeter, _>("English", |_| Box::new(English))
		.add_transient::<dyn Greeter, _>("French", |_| Box::new(French));

	let greetings: Vec<String> = container.resolve_all::<dyn Greeter>().iter().map(|g| g.greet()).collect();
	assert_eq!(greetings, ["hello", "bonjour"]);
	assert_eq!(container.implementations::<dyn Greeter>(), ["English", "French"]);
	assert_eq!(container.len(), 2);
}

#[test]
fn unknown_contract_resolves_to_nothing() {
	let container = Container::new();
	assert!(container.resolve_all::<dyn Greeter>().is_empty());
	assert!(!container.contains::<dyn Greeter>());
	assert!(container.is_empty());
}

#[test]
fn transient_constructs_per_resolution() {
	let built = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&built);
	let mut container = Container::new();
	container.add_transient::<dyn Greeter, _>("English", move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
		Box::new(English)
	});

	let first = container.resolve_all::<dyn Greeter>();
	let second = container.resolve_all::<dyn Greeter>();
	assert_eq!(built.load(Ordering::SeqCst), 2);
	assert!(!Arc::ptr_eq(&first[0], &second[0]));
}

#[test]
fn singleton_is_shared() {
	let built = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&built);
	let mut container = Container::new();
	container.add_singleton::<dyn Greeter, _>("French", move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
		Box::new(French)
	});

	let first = container.resolve_all::<dyn Greeter>();
	let second = container.resolve_all::<dyn Greeter>();
	assert_eq!(built.load(Ordering::SeqCst), 1);
	assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[test]
fn contracts_are_isolated_by_type() {
	trait Other: Send + Sync {}
	struct Impl;
	impl Other for Impl {}

	let mut container = Container::new();
	container.add_transient::<dyn Other, _>("Impl", |_| Box::new(Impl));
	assert!(container.contains::<dyn Other>());
	assert!(!container.contains::<dyn Greeter>());
}
