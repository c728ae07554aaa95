//! Broker artifact: one route per payload type.

use super::HEADER;
use crate::config::GeneratorConfig;
use crate::model::TypeRef;

/// Renders the broker struct.
///
/// `payload_types` must already be in canonical order; each entry becomes one
/// route that resolves `dyn Contract<P>` from the container and awaits every
/// handler in turn. Payloads of any other type take the default path of the
/// route table, which does nothing.
pub fn emit_broker(config: &GeneratorConfig, payload_types: &[TypeRef]) -> String {
	let rt = config.runtime_path();
	let contract = config.shape().path;
	let broker = &config.broker;
	let register_fn = &config.register_fn;

	let routes = if payload_types.is_empty() {
		format!("let routes = {rt}::RouteTable::new();")
	} else {
		let arms: String = payload_types
			.iter()
			.map(|payload| {
				format!(
					"\n\t\t\t.route::<{payload}, dyn {contract}<{payload}>, _>(|handler, message, cancel| {{\n\t\t\t\t{contract}::handle(handler, message, cancel)\n\t\t\t}})"
				)
			})
			.collect();
		format!("let mut routes = {rt}::RouteTable::new();\n\t\troutes{arms};")
	};
	let names: String = payload_types.iter().map(|payload| format!("\n\t\t{:?},", payload.to_string())).collect();
	let names = if names.is_empty() { String::new() } else { format!("{names}\n\t") };

	format!(
		r#"{HEADER}

/// Delivers payloads to the handlers wired by `{register_fn}`.
#[derive(Debug, Clone)]
pub struct {broker} {{
	inner: {rt}::Broker,
}}

impl {broker} {{
	/// Payload types with a generated route, in canonical order.
	pub const PAYLOAD_TYPES: &'static [&'static str] = &[{names}];

	pub fn new(container: ::std::sync::Arc<{rt}::Container>) -> Self {{
		{routes}
		Self {{
			inner: {rt}::Broker::new(container, routes),
		}}
	}}

	/// Delivers `message` to every handler registered for its runtime type, one
	/// after another in registration order.
	///
	/// An absent payload fails with `DispatchError::NullPayload`. Payload types
	/// without a route, and routed types without handlers, are ignored.
	pub async fn send(
		&self,
		message: ::core::option::Option<&{rt}::Payload>,
		cancel: &{rt}::CancellationToken,
	) -> ::core::result::Result<(), {rt}::DispatchError> {{
		self.inner.send(message, cancel).await
	}}

	/// Delivers a statically typed payload with a fresh cancellation token.
	pub async fn publish<P>(&self, message: &P) -> ::core::result::Result<(), {rt}::DispatchError>
	where
		P: ::core::any::Any + Send + Sync,
	{{
		self.inner.publish(message).await
	}}

	pub fn routes(&self) -> &{rt}::RouteTable {{
		self.inner.routes()
	}}
}}
"#
	)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn route_lines(text: &str) -> Vec<&str> {
		text.lines().map(str::trim).filter(|line| line.starts_with(".route::<")).collect()
	}

	#[test]
	fn one_route_per_payload_type() {
		let payloads = [
			TypeRef::named("crate::events::OrderCreated"),
			TypeRef::generic("::std::vec::Vec", vec![TypeRef::named("u8")]),
		];
		let text = emit_broker(&GeneratorConfig::default(), &payloads);
		assert_eq!(
			route_lines(&text),
			[
				".route::<crate::events::OrderCreated, dyn crate::bus::Handler<crate::events::OrderCreated>, _>(|handler, message, cancel| {",
				".route::<::std::vec::Vec<u8>, dyn crate::bus::Handler<::std::vec::Vec<u8>>, _>(|handler, message, cancel| {",
			]
		);
		assert!(text.contains("\"crate::events::OrderCreated\",\n\t\t\"::std::vec::Vec<u8>\",\n\t];"));
		syn::parse_file(&text).unwrap();
	}

	#[test]
	fn empty_payload_set_keeps_only_the_default_path() {
		let text = emit_broker(&GeneratorConfig::default(), &[]);
		assert!(route_lines(&text).is_empty());
		assert!(text.contains("let routes = ::tinybus::RouteTable::new();"));
		assert!(text.contains("pub const PAYLOAD_TYPES: &'static [&'static str] = &[];"));
		syn::parse_file(&text).unwrap();
	}

	#[test]
	fn names_follow_configuration() {
		let config = GeneratorConfig {
			broker: "Bus".into(),
			register_fn: "wire".into(),
			..GeneratorConfig::default()
		};
		let text = emit_broker(&config, &[]);
		assert!(text.contains("pub struct Bus {"));
		assert!(text.contains("impl Bus {"));
		assert!(text.contains("handlers wired by `wire`"));
	}
}
