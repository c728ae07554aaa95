use pretty_assertions::assert_eq;
use tinybus_codegen::{
	ContractUse, DeclKind, Declaration, DeclarationProvider, DeclarationSet, DiagnosticKind, GenerateError,
	GeneratorConfig, ProviderError, SourceTree, TypeRef, generate,
};

const CONTRACT: &str = "crate::bus::Handler";

fn handles(payload: &str) -> ContractUse {
	ContractUse::new(CONTRACT, vec![TypeRef::named(payload)])
}

fn handler(path: &str, payloads: &[&str]) -> Declaration {
	payloads
		.iter()
		.fold(Declaration::new(path, DeclKind::Struct), |decl, payload| decl.implementing(handles(payload)))
}

fn registrations<'a>(text: &'a str, payload: &str) -> Vec<&'a str> {
	let needle = format!("add_transient::<dyn {CONTRACT}<{payload}>, _>");
	text.lines().filter(|line| line.contains(&needle)).collect()
}

fn route_count(text: &str, payload: &str) -> usize {
	let needle = format!(".route::<{payload}, dyn {CONTRACT}<{payload}>, _>");
	text.matches(&needle).count()
}

#[test]
fn scenario_a_two_handlers_for_one_payload() {
	let decls = vec![
		Declaration::new("crate::events::OrderCreated", DeclKind::Struct),
		handler("crate::handlers::OrderCreatedHandler", &["crate::events::OrderCreated"]),
		handler("crate::handlers::OrderCreatedAuditHandler", &["crate::events::OrderCreated"]),
	];
	let generation = generate(&decls, &GeneratorConfig::default()).unwrap();

	let lines = registrations(&generation.artifacts.registration, "crate::events::OrderCreated");
	assert_eq!(lines.len(), 2);
	assert!(lines[0].contains("\"crate::handlers::OrderCreatedHandler\""));
	assert!(lines[1].contains("\"crate::handlers::OrderCreatedAuditHandler\""));
	assert_eq!(route_count(&generation.artifacts.broker, "crate::events::OrderCreated"), 1);
	assert!(generation.diagnostics.is_empty());
}

#[test]
fn scenario_b_one_handler_for_two_payloads() {
	let decls = vec![handler("crate::UserHandler", &["crate::UserCreated", "crate::UserDeleted"])];
	let generation = generate(&decls, &GeneratorConfig::default()).unwrap();

	let registration = &generation.artifacts.registration;
	assert_eq!(registrations(registration, "crate::UserCreated").len(), 1);
	assert_eq!(registrations(registration, "crate::UserDeleted").len(), 1);
	assert_eq!(registration.matches("\"crate::UserHandler\"").count(), 2);
	let payloads: Vec<String> = generation.registry.payload_types.iter().map(ToString::to_string).collect();
	assert_eq!(payloads, ["crate::UserCreated", "crate::UserDeleted"]);
}

#[test]
fn scenario_c_abstract_candidates_contribute_nothing() {
	let decls = vec![
		Declaration::new("crate::AbstractHandler", DeclKind::Trait).implementing(handles("crate::Msg")),
		handler("crate::GenericHandler", &["crate::Msg"]).with_params(["T"]),
	];
	let generation = generate(&decls, &GeneratorConfig::default()).unwrap();

	assert!(generation.registry.is_empty());
	assert!(generation.registry.payload_types.is_empty());
	assert!(!generation.artifacts.registration.contains("add_transient"));
	assert!(!generation.artifacts.broker.contains(".route::<"));
}

#[test]
fn scenario_d_empty_input_keeps_only_fixed_wiring() {
	let generation = generate(&Vec::<Declaration>::new(), &GeneratorConfig::default()).unwrap();

	assert!(generation.registry.is_empty());
	assert!(!generation.artifacts.broker.contains(".route::<"));
	assert!(generation.artifacts.broker.contains("let routes = ::tinybus::RouteTable::new();"));
	assert!(!generation.artifacts.registration.contains("add_transient"));
	assert!(generation.artifacts.contract.contains("pub trait Handler<T>"));
}

#[test]
fn repeated_passes_are_byte_identical() {
	let decls = vec![
		handler("crate::Z", &["crate::b::Msg", "u64"]),
		handler("crate::A", &["crate::a::Msg", "crate::b::Msg"]),
		Declaration::new("crate::Other", DeclKind::Enum),
	];
	let config = GeneratorConfig::default();
	let first = generate(&decls, &config).unwrap();
	let second = generate(&decls, &config).unwrap();
	assert_eq!(first.artifacts, second.artifacts);
	assert_eq!(first.registry, second.registry);

	let routes: Vec<&str> = first
		.artifacts
		.broker
		.lines()
		.map(str::trim)
		.filter(|line| line.starts_with(".route::<"))
		.collect();
	assert_eq!(routes.len(), 3);
	assert!(routes[0].starts_with(".route::<crate::a::Msg,"));
	assert!(routes[1].starts_with(".route::<crate::b::Msg,"));
	assert!(routes[2].starts_with(".route::<u64,"));
}

#[test]
fn every_binding_is_registered_exactly_once() {
	let decls = vec![
		handler("crate::A", &["crate::X", "crate::Y", "crate::Z"]),
		handler("crate::B", &["crate::Y"]),
	];
	let generation = generate(&decls, &GeneratorConfig::default()).unwrap();
	let registration = &generation.artifacts.registration;

	for (implementation, payload) in generation.registry.bindings() {
		let count = registrations(registration, &payload.to_string())
			.iter()
			.filter(|line| line.contains(&format!("{implementation:?}")))
			.count();
		assert_eq!(count, 1, "{implementation} for {payload}");
	}
	assert_eq!(registration.matches("add_transient").count(), 4);
	assert_eq!(registration.matches("\"crate::A\"").count(), 3);
}

#[test]
fn malformed_candidates_do_not_abort_the_pass() {
	let decls = vec![
		Declaration::new("crate::Broken", DeclKind::Struct)
			.implementing(ContractUse::new(CONTRACT, vec![TypeRef::Unresolved("Missing".into())])),
		handler("crate::Fine", &["crate::Msg"]),
	];
	let generation = generate(&decls, &GeneratorConfig::default()).unwrap();

	assert_eq!(generation.registry.handlers.len(), 1);
	assert_eq!(generation.registry.handlers[0].implementation, "crate::Fine");
	assert_eq!(generation.diagnostics.len(), 1);
	assert_eq!(generation.diagnostics[0].kind, DiagnosticKind::MalformedCandidate);
	assert!(!generation.has_errors());
}

#[test]
fn inherited_contracts_are_registered() {
	let decls = vec![
		Declaration::new("crate::Audited", DeclKind::Trait)
			.with_params(["T"])
			.implementing(ContractUse::new(CONTRACT, vec![TypeRef::Param("T".into())])),
		Declaration::new("crate::Auditor", DeclKind::Struct)
			.implementing(ContractUse::new("crate::Audited", vec![TypeRef::named("crate::Msg")]))
			.implementing(handles("crate::Msg")),
	];
	let generation = generate(&decls, &GeneratorConfig::default()).unwrap();
	assert_eq!(registrations(&generation.artifacts.registration, "crate::Msg").len(), 1);
}

struct Unavailable;

impl DeclarationProvider for Unavailable {
	fn declarations(&self) -> Result<DeclarationSet, ProviderError> {
		Err(ProviderError::MissingRoot("nowhere".into()))
	}
}

#[test]
fn provider_failure_is_fatal() {
	let err = generate(&Unavailable, &GeneratorConfig::default()).unwrap_err();
	assert!(matches!(err, GenerateError::Provider(ProviderError::MissingRoot(_))));
}

#[test]
fn invalid_config_is_fatal() {
	let config = GeneratorConfig {
		broker: "not an ident".into(),
		..GeneratorConfig::default()
	};
	assert!(matches!(generate(&Vec::<Declaration>::new(), &config), Err(GenerateError::Config(_))));
}

#[test]
fn source_tree_end_to_end() {
	let dir = tempfile::tempdir().unwrap();
	let src = dir.path().join("src");
	std::fs::create_dir_all(src.join("handlers")).unwrap();
	std::fs::write(src.join("lib.rs"), "pub mod bus;\npub mod events;\npub mod handlers;\n").unwrap();
	std::fs::write(src.join("bus.rs"), "tinybus::include_generated!();\n").unwrap();
	std::fs::write(src.join("events.rs"), "pub struct UserCreated;\npub struct UserDeleted;\n").unwrap();
	std::fs::write(
		src.join("handlers/mod.rs"),
		"mod users;\npub use users::UserHandler;\n",
	)
	.unwrap();
	std::fs::write(
		src.join("handlers/users.rs"),
		r#"
use crate::bus::Handler;
use crate::events::*;

#[derive(Default)]
pub struct UserHandler;

impl Handler<UserCreated> for UserHandler {}
impl Handler<UserDeleted> for UserHandler {}

pub struct Pending<T>(T);
impl<T: Send + Sync + 'static> Handler<T> for Pending<T> {}

#[derive(Default)]
pub struct Half;
impl<T: Send + Sync + 'static> Handler<Option<T>> for Half {}
"#,
	)
	.unwrap();

	let generation = generate(&SourceTree::new(&src), &GeneratorConfig::default()).unwrap();
	let handlers: Vec<&str> = generation
		.registry
		.handlers
		.iter()
		.map(|handler| handler.implementation.as_str())
		.collect();
	assert_eq!(handlers, ["crate::handlers::UserHandler"]);
	let payloads: Vec<String> = generation.registry.payload_types.iter().map(ToString::to_string).collect();
	assert_eq!(payloads, ["crate::events::UserCreated", "crate::events::UserDeleted"]);

	assert_eq!(generation.diagnostics.len(), 1);
	assert_eq!(generation.diagnostics[0].kind, DiagnosticKind::MalformedCandidate);
	assert!(generation.diagnostics[0].message.contains("crate::handlers::users::Half"));
}

#[test]
fn source_tree_names_handlers_by_their_reachable_path() {
	let dir = tempfile::tempdir().unwrap();
	let src = dir.path().join("src");
	std::fs::create_dir_all(src.join("handlers")).unwrap();
	std::fs::write(src.join("lib.rs"), "pub mod bus;\npub mod events;\npub mod handlers;\n").unwrap();
	std::fs::write(src.join("bus.rs"), "tinybus::include_generated!();\n").unwrap();
	std::fs::write(src.join("events.rs"), "pub struct Ping;\n").unwrap();
	std::fs::write(src.join("handlers/mod.rs"), "mod audit;\nmod ping;\npub use ping::PingHandler;\n").unwrap();
	std::fs::write(
		src.join("handlers/ping.rs"),
		"#[derive(Default)]\npub struct PingHandler;\nimpl crate::bus::Handler<crate::events::Ping> for PingHandler {}\n",
	)
	.unwrap();
	std::fs::write(
		src.join("handlers/audit.rs"),
		"#[derive(Default)]\npub struct PingAudit;\nimpl crate::bus::Handler<crate::events::Ping> for PingAudit {}\n",
	)
	.unwrap();
	std::fs::write(
		src.join("stray.rs"),
		"pub struct Stray;\nimpl crate::bus::Handler<crate::events::Ping> for Stray {}\n",
	)
	.unwrap();

	let generation = generate(&SourceTree::new(&src), &GeneratorConfig::default()).unwrap();
	let registration = &generation.artifacts.registration;
	assert_eq!(
		registrations(registration, "crate::events::Ping"),
		[
			"\tservices.add_transient::<dyn crate::bus::Handler<crate::events::Ping>, _>(\"crate::handlers::PingHandler\", |_| {"
		]
	);
	assert!(registration.contains("<crate::handlers::PingHandler as ::core::default::Default>::default()"));
	assert!(!registration.contains("handlers::ping::"));
	assert!(!registration.contains("Stray"));

	assert_eq!(generation.diagnostics.len(), 1);
	let diagnostic = &generation.diagnostics[0];
	assert_eq!(diagnostic.kind, DiagnosticKind::MalformedCandidate);
	assert!(diagnostic.message.contains("crate::handlers::audit::PingAudit"));
	assert!(diagnostic.message.contains("not reachable from the crate root"));
}
