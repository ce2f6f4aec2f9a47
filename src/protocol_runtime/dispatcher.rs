use super::ProtocolRequest;
use crate::app::App;
use crate::cli::VALID_COMMANDS;
use chainpost::{view, Address, NetworkId, PostId, Result, SessionError};
use serde_json::{json, Map, Value};

const DEFAULT_FEED_LIMIT: u64 = 10;

const COMMAND_HELP: &[(&str, &str)] = &[
    ("help", "This help"),
    ("status", "Show provider, account, network and contract binding"),
    ("profile", "Show a profile (--address, defaults to the active account)"),
    ("update-profile", "Set username and bio (--username, --bio)"),
    ("create-post", "Publish a post, paying the post fee (--content)"),
    ("like-post", "Like a post, paying the like fee (--post-id)"),
    ("comment", "Comment on a post, paying the comment fee (--post-id, --content)"),
    ("get-post", "Show one post (--post-id)"),
    ("feed", "Show posts from #1 up to the first gap (--limit)"),
    ("switch-account", "Make another wallet account active (--address)"),
    ("switch-network", "Point the wallet at another network (--network-id)"),
];

pub struct CommandSuccess {
    pub data: Value,
    pub text: String,
}

impl CommandSuccess {
    fn new(data: Value, text: String) -> Self {
        Self { data, text }
    }
}

/// # Errors
/// Returns the `SessionError` of the failing step: argument validation,
/// session readiness, or the contract operation itself.
pub async fn dispatch(app: &mut App, request: &ProtocolRequest) -> Result<CommandSuccess> {
    match request.cmd.as_str() {
        "?" | "help" => Ok(help()),
        "status" => Ok(status(app)),
        "profile" => profile(app, &request.args).await,
        "update-profile" => {
            let username = required_str(&request.args, "username")?;
            let bio = optional_str(&request.args, "bio")?.unwrap_or_default();
            app.require_ready()?;
            submitted(app.social().update_profile(username, bio).await?)
        }
        "create-post" => {
            let content = required_str(&request.args, "content")?;
            app.require_ready()?;
            submitted(app.social().create_post(content).await?)
        }
        "like-post" => {
            let post_id = PostId::new(required_u64(&request.args, "post_id")?);
            app.require_ready()?;
            submitted(app.social().like_post(post_id).await?)
        }
        "comment" => {
            let post_id = PostId::new(required_u64(&request.args, "post_id")?);
            let content = required_str(&request.args, "content")?;
            app.require_ready()?;
            submitted(app.social().comment_on_post(post_id, content).await?)
        }
        "get-post" => {
            let post_id = PostId::new(required_u64(&request.args, "post_id")?);
            app.require_ready()?;
            let post = app.social().get_post(post_id).await?;
            let text = view::render_post(post_id, &post);
            Ok(CommandSuccess::new(
                json!({"id": post_id.value(), "post": post}),
                text,
            ))
        }
        "feed" => {
            let limit = optional_u64(&request.args, "limit")?.unwrap_or(DEFAULT_FEED_LIMIT);
            app.require_ready()?;
            let posts = app.social().feed(limit).await?;
            let text = view::render_feed(&posts);
            let data = posts
                .iter()
                .map(|(id, post)| json!({"id": id.value(), "post": post}))
                .collect::<Vec<_>>();
            Ok(CommandSuccess::new(json!({"posts": data}), text))
        }
        "switch-account" => {
            let address = parse_arg::<Address>(&request.args, "address")?;
            let event = app.chain()?.select_account(address).await.ok_or_else(|| {
                SessionError::InvalidInvocation(format!("wallet has no account {address}"))
            })?;
            app.apply_event(event).await;
            Ok(status(app))
        }
        "switch-network" => {
            let network_id = parse_arg::<NetworkId>(&request.args, "network_id")?;
            let event = app.chain()?.set_network_id(network_id).await;
            app.apply_event(event).await;
            Ok(status(app))
        }
        other => {
            let hint = crate::cli::suggest_commands(other)
                .first()
                .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"));
            Err(SessionError::InvalidInvocation(format!(
                "Unknown command: {other}{hint}"
            )))
        }
    }
}

fn help() -> CommandSuccess {
    let commands = COMMAND_HELP
        .iter()
        .map(|(cmd, description)| ((*cmd).to_string(), json!(description)))
        .collect::<Map<_, _>>();
    let width = VALID_COMMANDS.iter().map(|c| c.len()).max().unwrap_or(0);
    let text = COMMAND_HELP
        .iter()
        .map(|(cmd, description)| format!("  {cmd:<width$}  {description}"))
        .collect::<Vec<_>>()
        .join("\n");

    CommandSuccess::new(
        json!({"commands": commands}),
        format!("chainpost <command> [--json] [--config PATH]\n\nCommands:\n{text}"),
    )
}

fn status(app: &App) -> CommandSuccess {
    let snapshot = app.session().session().snapshot();
    let text = view::render_status(&snapshot);
    CommandSuccess::new(json!(snapshot), text)
}

async fn profile(app: &App, args: &Map<String, Value>) -> Result<CommandSuccess> {
    let owner = match optional_str(args, "address")? {
        Some(raw) => Some(raw.parse::<Address>().map_err(|e| invalid_arg("address", &e))?),
        None => None,
    };
    app.require_ready()?;

    let social = app.social();
    let (owner, profile) = match owner {
        Some(owner) => (owner, social.profile(owner).await?),
        None => social.my_profile().await?,
    };
    let text = view::render_profile(owner, &profile);
    Ok(CommandSuccess::new(
        json!({"address": owner, "profile": profile}),
        text,
    ))
}

fn submitted(submission: chainpost::TransactionSubmission) -> Result<CommandSuccess> {
    let text = view::render_submission(&submission);
    Ok(CommandSuccess::new(json!(submission), text))
}

fn invalid_arg(field: &str, error: &dyn std::fmt::Display) -> SessionError {
    SessionError::InvalidInvocation(format!("Invalid value for field {field}: {error}"))
}

fn optional_str<'a>(args: &'a Map<String, Value>, field: &str) -> Result<Option<&'a str>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid_arg(field, &format!("expected string, got {other}"))),
    }
}

fn required_str<'a>(args: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    optional_str(args, field)?.ok_or_else(|| {
        SessionError::InvalidInvocation(format!("Missing required field: {field}"))
    })
}

/// Accepts JSON numbers and decimal strings.
fn optional_u64(args: &Map<String, Value>, field: &str) -> Result<Option<u64>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid_arg(field, &format!("{n} is not a non-negative integer"))),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|e| invalid_arg(field, &e)),
        Some(other) => Err(invalid_arg(field, &format!("expected integer, got {other}"))),
    }
}

fn required_u64(args: &Map<String, Value>, field: &str) -> Result<u64> {
    optional_u64(args, field)?.ok_or_else(|| {
        SessionError::InvalidInvocation(format!("Missing required field: {field}"))
    })
}

fn parse_arg<T>(args: &Map<String, Value>, field: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = match args.get(field) {
        Some(Value::Number(n)) => n.to_string(),
        _ => required_str(args, field)?.to_string(),
    };
    raw.parse::<T>().map_err(|e| invalid_arg(field, &e))
}
