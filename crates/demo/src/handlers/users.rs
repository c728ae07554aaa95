use tinybus::{CancellationToken, HandlerResult};

use crate::bus::Handler;
use crate::events::{UserCreated, UserDeleted};

/// Handles both user payloads; registered once per payload type.
#[derive(Debug, Default)]
pub struct UserHandler;

#[tinybus::async_trait]
impl Handler<UserCreated> for UserHandler {
	async fn handle(&self, message: &UserCreated, _cancel: &CancellationToken) -> HandlerResult {
		message.log.record(format!("user:{}:created", message.name));
		Ok(())
	}
}

#[tinybus::async_trait]
impl Handler<UserDeleted> for UserHandler {
	async fn handle(&self, message: &UserDeleted, _cancel: &CancellationToken) -> HandlerResult {
		if message.name == "root" {
			return Err("the root user cannot be deleted".into());
		}
		message.log.record(format!("user:{}:deleted", message.name));
		Ok(())
	}
}

/// Not instantiable, so never registered even though it requires the contract.
pub trait Archiving: Handler<UserDeleted> {}

/// Generic over its payload, so it has no concrete binding to register.
#[derive(Debug, Default)]
pub struct Forwarder<T>(std::marker::PhantomData<T>);

#[tinybus::async_trait]
impl<T> Handler<T> for Forwarder<T>
where
	T: Send + Sync + 'static,
{
	async fn handle(&self, _message: &T, _cancel: &CancellationToken) -> HandlerResult {
		Ok(())
	}
}
