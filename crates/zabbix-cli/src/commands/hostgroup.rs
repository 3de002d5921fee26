//! Host group commands.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use tracing::info;

use super::{Builtin, CommandContext, Params, created_ids, field, first_id, is_id};
use crate::error::CliError;
use crate::output::{Created, HostGroupInfo, HostGroupList};

/// `show_hostgroup`: show host groups by name, wildcard pattern or ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowHostGroup;

impl Builtin for ShowHostGroup {
    const NAME: &'static str = "show_hostgroup";
    const USAGE: &'static str = "NAME_OR_ID";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let name = params.required("name")?;
            params.finish()?;

            let mut query = json!({
                "output": ["groupid", "name"],
                "selectHosts": "count",
                "sortfield": "name",
            });
            if is_id(&name) {
                query["groupids"] = json!([name]);
            } else if name.contains('*') {
                query["search"] = json!({ "name": name });
                query["searchWildcardsEnabled"] = json!(true);
            } else {
                query["filter"] = json!({ "name": [name] });
            }

            let result = ctx.api()?.call("hostgroup.get", query).await?;
            let hostgroups: Vec<HostGroupInfo> = result
                .as_array()
                .map(|groups| groups.iter().map(group_info).collect())
                .unwrap_or_default();
            if hostgroups.is_empty() {
                return Err(CliError::NotFound(format!("host group '{name}'")));
            }
            ctx.console().render(&HostGroupList { hostgroups })
        }
        .boxed()
    }
}

fn group_info(group: &Value) -> HostGroupInfo {
    // selectHosts=count returns the count as a string
    let host_count = match group.get("hosts") {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()).unwrap_or(0),
        Some(Value::Array(hosts)) => hosts.len(),
        _ => 0,
    };
    HostGroupInfo {
        groupid: field(group, "groupid"),
        name: field(group, "name"),
        host_count,
    }
}

/// `create_hostgroup`: create a host group.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateHostGroup;

impl Builtin for CreateHostGroup {
    const NAME: &'static str = "create_hostgroup";
    const USAGE: &'static str = "NAME";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let name = params.required("name")?;
            params.finish()?;

            let api = ctx.api()?;
            let existing = api
                .call(
                    "hostgroup.get",
                    json!({ "output": ["groupid"], "filter": { "name": [name] } }),
                )
                .await?;
            if first_id(&existing, "groupid").is_some() {
                return Err(CliError::InvalidArgument(format!(
                    "host group '{name}' already exists"
                )));
            }

            let result = api.call("hostgroup.create", json!({ "name": name })).await?;
            let ids = created_ids(&result, "groupids")?;
            info!(hostgroup = %name, ?ids, "host group created");
            ctx.console().render(&Created {
                object: "host group".into(),
                name,
                ids,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::fake::FakeApi;
    use super::super::testing::{run_line, run_line_with};
    use super::*;
    use crate::cli::Format;
    use crate::config::Config;

    #[tokio::test]
    async fn show_hostgroup_counts_hosts() {
        let api = Arc::new(FakeApi::new().with_response(
            "hostgroup.get",
            json!([{"groupid": "2", "name": "Linux servers", "hosts": "12"}]),
        ));
        let (result, output) = run_line(Arc::clone(&api), "show_hostgroup 'Linux servers'").await;
        result.expect("should succeed");
        assert!(output.contains("Linux servers"));
        assert!(output.contains("12"));
        assert_eq!(api.calls()[0].1["filter"]["name"][0], "Linux servers");
    }

    #[tokio::test]
    async fn show_hostgroup_json() {
        let api = Arc::new(FakeApi::new().with_response(
            "hostgroup.get",
            json!([{"groupid": "2", "name": "Linux servers", "hosts": "3"}]),
        ));
        let (result, output) =
            run_line_with(api, Config::default(), None, Format::Json, "show_hostgroup 2").await;
        result.expect("should succeed");
        let value: Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(value["hostgroups"][0]["host_count"], 3);
    }

    #[tokio::test]
    async fn show_hostgroup_not_found() {
        let api = Arc::new(FakeApi::new().with_response("hostgroup.get", json!([])));
        let (result, _) = run_line(api, "show_hostgroup Missing").await;
        assert_eq!(
            result.expect_err("should fail").to_string(),
            "host group 'Missing' not found"
        );
    }

    #[tokio::test]
    async fn create_hostgroup() {
        let api = Arc::new(
            FakeApi::new()
                .with_response("hostgroup.get", json!([]))
                .with_response("hostgroup.create", json!({"groupids": ["42"]})),
        );
        let (result, output) = run_line(Arc::clone(&api), "create_hostgroup --name Web").await;
        result.expect("should succeed");
        assert_eq!(output, "Created host group 'Web' (42)\n");
        assert_eq!(api.calls()[1].1, json!({"name": "Web"}));
    }

    #[tokio::test]
    async fn create_hostgroup_already_exists() {
        let api = Arc::new(FakeApi::new().with_response("hostgroup.get", json!([{"groupid": "42"}])));
        let (result, _) = run_line(Arc::clone(&api), "create_hostgroup Web").await;
        assert!(result.expect_err("should fail").to_string().contains("already exists"));
        assert_eq!(api.methods(), ["hostgroup.get"]);
    }
}
