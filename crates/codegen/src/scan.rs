//! Declaration scanning.

use crate::model::Declaration;

/// Returns the concrete (instantiable, non-generic) declarations in input order.
pub fn scan(declarations: &[Declaration]) -> Vec<&Declaration> {
	declarations
		.iter()
		.filter(|decl| {
			let keep = decl.is_concrete();
			if !keep {
				tracing::trace!(path = %decl.path, kind = ?decl.kind, "skipping non-instantiable declaration");
			}
			keep
		})
		.collect()
}
