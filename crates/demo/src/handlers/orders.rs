use tinybus::{CancellationToken, HandlerResult};

use crate::bus::Handler;
use crate::events::OrderCreated;

#[derive(Debug, Default)]
pub struct OrderCreatedHandler;

#[tinybus::async_trait]
impl Handler<OrderCreated> for OrderCreatedHandler {
	async fn handle(&self, message: &OrderCreated, _cancel: &CancellationToken) -> HandlerResult {
		message.log.record(format!("order:{}", message.id));
		tokio::task::yield_now().await;
		message.log.record(format!("order:{}:done", message.id));
		Ok(())
	}
}

/// Runs after [`OrderCreatedHandler`] and records whether the delivery was
/// cancelled.
#[derive(Debug, Default)]
pub struct OrderCreatedAuditHandler;

#[tinybus::async_trait]
impl Handler<OrderCreated> for OrderCreatedAuditHandler {
	async fn handle(&self, message: &OrderCreated, cancel: &CancellationToken) -> HandlerResult {
		tracing::info!(order = message.id, "auditing order");
		message
			.log
			.record(format!("audit:{}:cancelled={}", message.id, cancel.is_cancelled()));
		Ok(())
	}
}
