fn main() -> Result<(), tinybus_codegen::BuildError> {
	tinybus_codegen::compile::build()
}
