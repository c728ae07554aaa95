//! Registration artifact: one transient registration per binding.

use super::HEADER;
use crate::config::GeneratorConfig;
use crate::registry::HandlerInfo;

/// Renders the registration function.
///
/// Statements follow record order, then each record's payload order. Every
/// statement registers its own factory, so an implementation bound to several
/// payload types never shares an instance between them.
pub fn emit_registration(config: &GeneratorConfig, handlers: &[HandlerInfo]) -> String {
	let rt = config.runtime_path();
	let contract = config.shape().path;
	let register_fn = &config.register_fn;

	let statements: String = handlers
		.iter()
		.flat_map(|handler| handler.payloads.iter().map(move |payload| (handler.implementation.as_str(), payload)))
		.map(|(implementation, payload)| {
			format!(
				"\tservices.add_transient::<dyn {contract}<{payload}>, _>({implementation:?}, |_| {{\n\t\t::std::boxed::Box::new(<{implementation} as ::core::default::Default>::default())\n\t}});\n"
			)
		})
		.collect();

	format!(
		r#"{HEADER}

/// Registers every discovered handler as a transient implementation of the
/// handler contract, once per payload type it handles.
pub fn {register_fn}(services: &mut {rt}::Container) -> &mut {rt}::Container {{
{statements}	services
}}
"#
	)
}
