//! Build-time discovery of handler implementations and generation of their
//! pub/sub wiring.
//!
//! A generation pass runs, leaves first:
//!
//! * [`scan()`] - keeps the concrete declarations supplied by a [`DeclarationProvider`]
//! * [`ContractResolver`] - binds each candidate to the payload types it handles
//! * [`HandlerRegistry`] - aggregates the bindings and orders the payload-type set
//! * [`emit`] - renders the contract, broker and registration artifacts
//!
//! [`generate`] runs the whole pass; [`compile::build`] runs it from a build
//! script over the crate's own sources through [`SourceTree`].

pub mod compile;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod model;
pub mod pass;
pub mod provider;
pub mod registry;
pub mod resolve;
pub mod scan;
pub mod source;

pub use config::GeneratorConfig;
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use emit::Artifacts;
pub use error::{BuildError, ConfigError, GenerateError, ProviderError};
pub use model::{ContractUse, DeclKind, Declaration, Origin, TypeRef};
pub use pass::{Generation, generate};
pub use provider::{DeclarationProvider, DeclarationSet};
pub use registry::{HandlerInfo, HandlerRegistry};
pub use resolve::{Binding, ContractResolver, ContractShape, Resolution};
pub use scan::scan;
pub use source::SourceTree;
