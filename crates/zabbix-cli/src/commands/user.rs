//! User commands.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value, json};
use tracing::info;

use super::params::split_list;
use super::{Builtin, CommandContext, Params, created_ids, first_id, is_id, resolve_ids};
use crate::error::CliError;
use crate::output::Created;

/// Role assigned when none is given.
const DEFAULT_ROLE: &str = "1";

/// Session timeout assigned when none is given.
const DEFAULT_AUTOLOGOUT: &str = "86400";

/// `create_user`: create a user.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateUser;

impl Builtin for CreateUser {
    const NAME: &'static str = "create_user";
    const USAGE: &'static str =
        "USERNAME [FIRSTNAME] [LASTNAME] [PASSWD] [ROLE] [AUTOLOGIN] [AUTOLOGOUT] [GROUPS]";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let username = params.required("username")?;
            let firstname = params.optional("firstname")?;
            let lastname = params.optional("lastname")?;
            let passwd = params.optional("passwd")?;
            let role = parse_role(params.optional("role")?.as_deref())?;
            let autologin = params.flag("autologin")?.unwrap_or(false);
            let autologout = params
                .optional("autologout")?
                .unwrap_or_else(|| DEFAULT_AUTOLOGOUT.to_string());
            let groups = params.optional("groups")?.map(|g| split_list(&g)).unwrap_or_default();
            params.finish()?;

            let api = ctx.api()?;
            let existing = api
                .call(
                    "user.get",
                    json!({ "output": ["userid"], "filter": { "username": [username] } }),
                )
                .await?;
            if first_id(&existing, "userid").is_some() {
                return Err(CliError::InvalidArgument(format!(
                    "user '{username}' already exists"
                )));
            }

            let mut user = Map::new();
            user.insert("username".into(), json!(username));
            if let Some(name) = firstname {
                user.insert("name".into(), json!(name));
            }
            if let Some(surname) = lastname {
                user.insert("surname".into(), json!(surname));
            }
            if let Some(passwd) = passwd {
                user.insert("passwd".into(), json!(passwd));
            }
            user.insert("roleid".into(), json!(role));
            user.insert("autologin".into(), json!(u8::from(autologin)));
            user.insert("autologout".into(), json!(autologout));
            if !groups.is_empty() {
                let ids = resolve_ids(api, "usergroup", "usrgrpid", "name", &groups).await?;
                user.insert(
                    "usrgrps".into(),
                    ids.iter().map(|id| json!({ "usrgrpid": id })).collect(),
                );
            }

            let result = api.call("user.create", Value::Object(user)).await?;
            let ids = created_ids(&result, "userids")?;
            info!(user = %username, ?ids, "user created");
            ctx.console().render(&Created {
                object: "user".into(),
                name: username,
                ids,
            })
        }
        .boxed()
    }
}

/// Role ID from a role name or ID.
fn parse_role(value: Option<&str>) -> Result<String, CliError> {
    let Some(value) = value else {
        return Ok(DEFAULT_ROLE.to_string());
    };
    if is_id(value) {
        return Ok(value.to_string());
    }
    let id = match value.to_ascii_lowercase().as_str() {
        "user" => "1",
        "admin" => "2",
        "superadmin" => "3",
        "guest" => "4",
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "create_user: unknown role '{value}'"
            )));
        }
    };
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_case::test_case;
    use zabbix_bulk::parse_line;

    use super::super::fake::FakeApi;
    use super::super::testing::run_line;
    use super::*;

    fn api() -> Arc<FakeApi> {
        Arc::new(
            FakeApi::new()
                .with_response("user.get", json!([]))
                .with_response("usergroup.get", json!([{"usrgrpid": "13"}]))
                .with_response("user.create", json!({"userids": ["7"]})),
        )
    }

    #[tokio::test]
    async fn create_user_with_flag_defaults() {
        let api = api();
        let (result, output) = run_line(
            Arc::clone(&api),
            "create_user jdoe John Doe secret --autologin --autologout 3600",
        )
        .await;
        result.expect("should succeed");
        assert_eq!(output, "Created user 'jdoe' (7)\n");

        let calls = api.calls();
        let (method, params) = &calls[1];
        assert_eq!(method, "user.create");
        assert_eq!(params["username"], "jdoe");
        assert_eq!(params["name"], "John");
        assert_eq!(params["surname"], "Doe");
        assert_eq!(params["passwd"], "secret");
        assert_eq!(params["roleid"], "1");
        assert_eq!(params["autologin"], 1);
        assert_eq!(params["autologout"], "3600");
        assert!(params.get("usrgrps").is_none());
    }

    #[tokio::test]
    async fn create_user_resolves_groups() {
        let api = api();
        let (result, _) = run_line(
            Arc::clone(&api),
            "create_user ops --role admin --groups 'Zabbix administrators,8'",
        )
        .await;
        result.expect("should succeed");

        assert_eq!(api.methods(), ["user.get", "usergroup.get", "user.create"]);
        let calls = api.calls();
        let (_, params) = &calls[2];
        assert_eq!(params["roleid"], "2");
        assert_eq!(params["autologin"], 0);
        assert_eq!(params["autologout"], DEFAULT_AUTOLOGOUT);
        assert_eq!(params["usrgrps"], json!([{"usrgrpid": "13"}, {"usrgrpid": "8"}]));
    }

    const KEYWORD_LINE: &str = "create_user username --firstname name --lastname surname \
        --passwd pwd --role 1 --autologin --autologout 86400 --groups '1,2'";

    #[test]
    fn leading_username_binds_to_first_parameter() {
        let inv = parse_line(KEYWORD_LINE).expect("line should parse");
        assert_eq!(inv.args, ["username"]);

        let mut params = Params::new(CreateUser::NAME, &inv.args, &inv.kwargs);
        assert_eq!(params.required("username").expect("bound"), "username");
        assert_eq!(params.optional("firstname").expect("bound").as_deref(), Some("name"));
        assert_eq!(params.optional("lastname").expect("bound").as_deref(), Some("surname"));
        assert_eq!(params.optional("passwd").expect("bound").as_deref(), Some("pwd"));
        assert_eq!(params.optional("role").expect("bound").as_deref(), Some("1"));
        assert_eq!(params.flag("autologin").expect("bound"), Some(true));
        assert_eq!(params.optional("autologout").expect("bound").as_deref(), Some("86400"));
        assert_eq!(params.optional("groups").expect("bound").as_deref(), Some("1,2"));
        // No positional is left over once the named parameters are bound.
        params.finish().expect("nothing left unbound");
    }

    #[tokio::test]
    async fn create_user_from_keyword_line() {
        let api = api();
        let (result, _) = run_line(Arc::clone(&api), KEYWORD_LINE).await;
        result.expect("should succeed");

        assert_eq!(api.methods(), ["user.get", "user.create"]);
        let calls = api.calls();
        let (_, params) = &calls[1];
        assert_eq!(params["username"], "username");
        assert_eq!(params["name"], "name");
        assert_eq!(params["surname"], "surname");
        assert_eq!(params["passwd"], "pwd");
        assert_eq!(params["roleid"], "1");
        assert_eq!(params["autologin"], 1);
        assert_eq!(params["autologout"], "86400");
        assert_eq!(params["usrgrps"], json!([{"usrgrpid": "1"}, {"usrgrpid": "2"}]));
    }

    #[tokio::test]
    async fn create_user_already_exists() {
        let api = Arc::new(FakeApi::new().with_response("user.get", json!([{"userid": "1"}])));
        let (result, _) = run_line(Arc::clone(&api), "create_user Admin").await;
        assert!(result.expect_err("should fail").to_string().contains("already exists"));
        assert_eq!(api.methods(), ["user.get"]);
    }

    #[test_case(None, "1" ; "default")]
    #[test_case(Some("Admin"), "2" ; "by name")]
    #[test_case(Some("superadmin"), "3" ; "super admin")]
    #[test_case(Some("5"), "5" ; "by id")]
    fn roles(value: Option<&str>, expected: &str) {
        assert_eq!(parse_role(value).expect("valid role"), expected);
    }

    #[test]
    fn unknown_role() {
        assert!(parse_role(Some("root")).is_err());
    }
}
