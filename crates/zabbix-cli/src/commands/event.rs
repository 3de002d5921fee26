//! Event commands.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::json;
use tracing::info;

use super::params::split_list;
use super::{Builtin, CommandContext, Params, created_ids, is_id};
use crate::error::CliError;
use crate::output::Acknowledged;

/// `event.acknowledge` action bits.
const ACTION_CLOSE: u8 = 1;
const ACTION_ACKNOWLEDGE: u8 = 2;
const ACTION_MESSAGE: u8 = 4;

/// `acknowledge_event`: acknowledge events, optionally closing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeEvent;

impl Builtin for AcknowledgeEvent {
    const NAME: &'static str = "acknowledge_event";
    const USAGE: &'static str = "EVENT_ID[,EVENT_ID...] [MESSAGE] [--close]";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let event_ids = split_list(&params.required("event_ids")?);
            let message = params.optional("message")?.filter(|m| !m.is_empty());
            let close = params.flag("close")?.unwrap_or(false);
            params.finish()?;

            if event_ids.is_empty() {
                return Err(CliError::InvalidArgument(
                    "acknowledge_event: at least one event ID is required".into(),
                ));
            }
            if let Some(bad) = event_ids.iter().find(|id| !is_id(id)) {
                return Err(CliError::InvalidArgument(format!(
                    "acknowledge_event: invalid event ID '{bad}'"
                )));
            }

            let mut action = ACTION_ACKNOWLEDGE;
            let mut request = json!({ "eventids": event_ids });
            if let Some(message) = &message {
                action |= ACTION_MESSAGE;
                request["message"] = json!(message);
            }
            if close {
                action |= ACTION_CLOSE;
            }
            request["action"] = json!(action);

            let result = ctx.api()?.call("event.acknowledge", request).await?;
            let eventids = created_ids(&result, "eventids")?;
            info!(?eventids, close, "events acknowledged");
            ctx.console().render(&Acknowledged {
                eventids,
                closed: close,
                message,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::fake::FakeApi;
    use super::super::testing::run_line;
    use super::*;

    fn api() -> Arc<FakeApi> {
        Arc::new(FakeApi::new().with_response("event.acknowledge", json!({"eventids": [101, 102]})))
    }

    #[tokio::test]
    async fn acknowledge_with_message() {
        let api = api();
        let (result, output) = run_line(Arc::clone(&api), "acknowledge_event 101,102 'Looking into it'").await;
        result.expect("should succeed");
        assert_eq!(output, "Acknowledged event(s): 101, 102\n");

        let calls = api.calls();
        let (_, params) = &calls[0];
        assert_eq!(params["eventids"], json!(["101", "102"]));
        assert_eq!(params["message"], "Looking into it");
        assert_eq!(params["action"], 6);
    }

    #[tokio::test]
    async fn acknowledge_and_close() {
        let api = api();
        let (result, output) = run_line(Arc::clone(&api), "acknowledge_event --event_ids 101 --close").await;
        result.expect("should succeed");
        assert!(output.starts_with("Acknowledged and closed"));
        assert_eq!(api.calls()[0].1["action"], 3);
    }

    #[tokio::test]
    async fn rejects_non_numeric_ids() {
        let api = api();
        let (result, _) = run_line(Arc::clone(&api), "acknowledge_event abc").await;
        assert!(result.expect_err("should fail").to_string().contains("invalid event ID 'abc'"));
        assert!(api.calls().is_empty());
    }
}
