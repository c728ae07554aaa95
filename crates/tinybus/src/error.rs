/// Error returned by a handler invocation.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Completion signal of a handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

/// Dispatch failures surfaced to the caller of [`crate::Broker::send`].
///
/// Unknown payload types and payload types with no registered handlers are not
/// errors; both complete with `Ok(())`.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	/// No payload instance was supplied.
	#[error("payload must not be absent")]
	NullPayload,

	/// A handler failed; handlers after it were not invoked.
	#[error("handler #{index} for {payload} failed: {source}")]
	Handler {
		payload: &'static str,
		index: usize,
		#[source]
		source: HandlerError,
	},
}
