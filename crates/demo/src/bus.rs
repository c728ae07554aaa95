//! Generated handler contract, broker and registration.

tinybus::include_generated!();
