//! Host commands.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::params::split_list;
use super::{Builtin, CommandContext, Params, created_ids, field, first_id, is_id, resolve_ids};
use crate::client::ZabbixApi;
use crate::error::CliError;
use crate::output::{Created, HostInfo, HostList};

/// Proxy argument that selects any available proxy.
const ANY_PROXY: &str = ".+";

/// `show_host`: show hosts by name, wildcard pattern or ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowHost;

impl Builtin for ShowHost {
    const NAME: &'static str = "show_host";
    const USAGE: &'static str = "HOSTNAME_OR_ID";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let name = params.required("hostname_or_id")?;
            params.finish()?;

            let mut query = json!({
                "output": ["hostid", "host", "status"],
                "selectHostGroups": ["name"],
                "sortfield": "host",
            });
            if is_id(&name) {
                query["hostids"] = json!([name]);
            } else if name.contains('*') {
                query["search"] = json!({ "host": name });
                query["searchWildcardsEnabled"] = json!(true);
            } else {
                query["filter"] = json!({ "host": [name] });
            }

            let result = ctx.api()?.call("host.get", query).await?;
            let hosts: Vec<HostInfo> = result
                .as_array()
                .map(|hosts| hosts.iter().map(host_info).collect())
                .unwrap_or_default();
            if hosts.is_empty() {
                return Err(CliError::NotFound(format!("host '{name}'")));
            }
            ctx.console().render(&HostList { hosts })
        }
        .boxed()
    }
}

fn host_info(host: &Value) -> HostInfo {
    let status = match field(host, "status").as_str() {
        "0" => "Enabled".to_string(),
        "1" => "Disabled".to_string(),
        other => other.to_string(),
    };
    let hostgroups = host
        .get("hostgroups")
        .and_then(Value::as_array)
        .map(|groups| groups.iter().map(|g| field(g, "name")).collect())
        .unwrap_or_default();
    HostInfo {
        hostid: field(host, "hostid"),
        host: field(host, "host"),
        status,
        hostgroups,
    }
}

/// `create_host`: create a host in one or more host groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateHost;

impl Builtin for CreateHost {
    const NAME: &'static str = "create_host";
    const USAGE: &'static str = "HOSTNAME HOSTGROUP[,HOSTGROUP...] [PROXY] [STATUS]";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let hostname = params.required("hostname")?;
            let hostgroups = split_list(&params.required("hostgroup")?);
            let proxy = params.optional("proxy")?.filter(|p| !p.is_empty());
            let status = parse_status(params.optional("status")?.as_deref())?;
            params.finish()?;

            if hostgroups.is_empty() {
                return Err(CliError::InvalidArgument(
                    "create_host: at least one host group is required".into(),
                ));
            }

            let api = ctx.api()?;
            let existing = api
                .call(
                    "host.get",
                    json!({ "output": ["hostid"], "filter": { "host": [hostname] } }),
                )
                .await?;
            if first_id(&existing, "hostid").is_some() {
                return Err(CliError::InvalidArgument(format!(
                    "host '{hostname}' already exists"
                )));
            }

            let groupids = resolve_ids(api, "hostgroup", "groupid", "name", &hostgroups).await?;
            let mut host = Map::new();
            host.insert("host".into(), json!(hostname));
            host.insert(
                "groups".into(),
                groupids.iter().map(|id| json!({ "groupid": id })).collect(),
            );
            host.insert("status".into(), json!(status));
            if let Some(proxy) = proxy {
                let proxyid = resolve_proxy(api, &proxy).await?;
                debug!(%proxy, %proxyid, "monitoring host by proxy");
                host.insert("monitored_by".into(), json!(1));
                host.insert("proxyid".into(), json!(proxyid));
            }

            let result = api.call("host.create", Value::Object(host)).await?;
            let ids = created_ids(&result, "hostids")?;
            info!(host = %hostname, ?ids, "host created");
            ctx.console().render(&Created {
                object: "host".into(),
                name: hostname,
                ids,
            })
        }
        .boxed()
    }
}

/// Host status value from a CLI argument. Defaults to monitored.
fn parse_status(value: Option<&str>) -> Result<u8, CliError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "on" | "enabled") => Ok(0),
        Some("1" | "off" | "disabled") => Ok(1),
        Some(other) => Err(CliError::InvalidArgument(format!(
            "create_host: invalid status '{other}', expected 0 (on) or 1 (off)"
        ))),
    }
}

/// Resolve a proxy name or ID. [`ANY_PROXY`] picks the first proxy by name.
async fn resolve_proxy(api: &dyn ZabbixApi, proxy: &str) -> Result<String, CliError> {
    if is_id(proxy) {
        return Ok(proxy.to_string());
    }
    let mut query = json!({ "output": ["proxyid", "name"], "sortfield": "name" });
    if proxy != ANY_PROXY {
        query["filter"] = json!({ "name": [proxy] });
    }
    let result = api.call("proxy.get", query).await?;
    first_id(&result, "proxyid").ok_or_else(|| CliError::NotFound(format!("proxy '{proxy}'")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use test_case::test_case;

    use super::super::fake::FakeApi;
    use super::super::testing::run_line;
    use super::*;

    fn host_result() -> Value {
        json!([{
            "hostid": "10084",
            "host": "web01.example.com",
            "status": "0",
            "hostgroups": [{"groupid": "2", "name": "Linux servers"}],
        }])
    }

    #[tokio::test]
    async fn show_host_by_name() {
        let api = Arc::new(FakeApi::new().with_response("host.get", host_result()));
        let (result, output) = run_line(Arc::clone(&api), "show_host web01.example.com").await;
        result.expect("should succeed");
        assert!(output.contains("10084"));
        assert!(output.contains("Enabled"));
        assert!(output.contains("Linux servers"));

        let calls = api.calls();
        let (_, params) = &calls[0];
        assert_eq!(params["filter"]["host"][0], "web01.example.com");
    }

    #[tokio::test]
    async fn show_host_by_id() {
        let api = Arc::new(FakeApi::new().with_response("host.get", host_result()));
        let (result, _) = run_line(Arc::clone(&api), "show_host 10084").await;
        result.expect("should succeed");
        assert_eq!(api.calls()[0].1["hostids"][0], "10084");
    }

    #[tokio::test]
    async fn show_host_wildcard() {
        let api = Arc::new(FakeApi::new().with_response("host.get", host_result()));
        let (result, _) = run_line(Arc::clone(&api), "show_host --hostname_or_id '*.example.com'").await;
        result.expect("should succeed");
        let calls = api.calls();
        let (_, params) = &calls[0];
        assert_eq!(params["search"]["host"], "*.example.com");
        assert_eq!(params["searchWildcardsEnabled"], true);
    }

    #[tokio::test]
    async fn show_host_not_found() {
        let api = Arc::new(FakeApi::new().with_response("host.get", json!([])));
        let (result, _) = run_line(api, "show_host ghost").await;
        let err = result.expect_err("should fail");
        assert_eq!(err.to_string(), "host 'ghost' not found");
    }

    #[tokio::test]
    async fn create_host_legacy_positionals() {
        let api = Arc::new(
            FakeApi::new()
                .with_response("host.get", json!([]))
                .with_response("hostgroup.get", json!([{"groupid": "2"}]))
                .with_response("proxy.get", json!([{"proxyid": "5", "name": "proxy-a"}]))
                .with_response("host.create", json!({"hostids": ["10500"]})),
        );
        let (result, output) = run_line(Arc::clone(&api), "create_host web02 Linux-servers .+ 1").await;
        result.expect("should succeed");
        assert_eq!(output, "Created host 'web02' (10500)\n");

        assert_eq!(
            api.methods(),
            ["host.get", "hostgroup.get", "proxy.get", "host.create"]
        );
        let calls = api.calls();
        let (_, params) = &calls[3];
        assert_eq!(params["host"], "web02");
        assert_eq!(params["groups"], json!([{"groupid": "2"}]));
        assert_eq!(params["status"], 1);
        assert_eq!(params["proxyid"], "5");
        assert!(calls[2].1.get("filter").is_none());
    }

    #[tokio::test]
    async fn create_host_keywords_with_group_ids() {
        let api = Arc::new(
            FakeApi::new()
                .with_response("host.get", json!([]))
                .with_response("host.create", json!({"hostids": ["10501"]})),
        );
        let (result, _) = run_line(Arc::clone(&api), "create_host web03 --hostgroup 2,4 --status on").await;
        result.expect("should succeed");
        assert_eq!(api.methods(), ["host.get", "host.create"]);
        let calls = api.calls();
        let (_, params) = &calls[1];
        assert_eq!(params["groups"], json!([{"groupid": "2"}, {"groupid": "4"}]));
        assert_eq!(params["status"], 0);
        assert!(params.get("proxyid").is_none());
    }

    #[tokio::test]
    async fn create_host_already_exists() {
        let api = Arc::new(FakeApi::new().with_response("host.get", json!([{"hostid": "1"}])));
        let (result, _) = run_line(Arc::clone(&api), "create_host web01 2").await;
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("already exists"));
        assert_eq!(api.methods(), ["host.get"]);
    }

    #[tokio::test]
    async fn create_host_missing_group() {
        let api = Arc::new(FakeApi::new());
        let (result, _) = run_line(Arc::clone(&api), "create_host web01").await;
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("missing argument 'hostgroup'"));
        assert!(api.calls().is_empty());
    }

    #[test_case(None, 0 ; "default")]
    #[test_case(Some("0"), 0 ; "zero")]
    #[test_case(Some("ON"), 0 ; "on")]
    #[test_case(Some("1"), 1 ; "one")]
    #[test_case(Some("disabled"), 1 ; "disabled")]
    fn status_values(value: Option<&str>, expected: u8) {
        assert_eq!(parse_status(value).expect("valid status"), expected);
    }

    #[test]
    fn invalid_status() {
        assert!(parse_status(Some("2")).is_err());
    }
}
