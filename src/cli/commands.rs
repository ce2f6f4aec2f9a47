#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::protocol_runtime::ProtocolRequest;
use serde_json::{json, Map};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Status,
    Profile {
        address: Option<String>,
    },
    UpdateProfile {
        username: String,
        bio: String,
    },
    CreatePost {
        content: String,
    },
    LikePost {
        post_id: u64,
    },
    Comment {
        post_id: u64,
        content: String,
    },
    GetPost {
        post_id: u64,
    },
    Feed {
        limit: Option<u64>,
    },
    SwitchAccount {
        address: String,
    },
    SwitchNetwork {
        network_id: String,
    },
}

#[must_use]
pub fn cli_command_to_request(cmd: CliCommand) -> ProtocolRequest {
    let (cmd_name, args) = match cmd {
        CliCommand::Help => ("help", Map::new()),
        CliCommand::Status => ("status", Map::new()),
        CliCommand::Profile { address } => {
            let mut args = Map::new();
            if let Some(a) = address {
                args.insert("address".to_string(), json!(a));
            }
            ("profile", args)
        }
        CliCommand::UpdateProfile { username, bio } => {
            let mut args = Map::new();
            args.insert("username".to_string(), json!(username));
            args.insert("bio".to_string(), json!(bio));
            ("update-profile", args)
        }
        CliCommand::CreatePost { content } => {
            let mut args = Map::new();
            args.insert("content".to_string(), json!(content));
            ("create-post", args)
        }
        CliCommand::LikePost { post_id } => {
            let mut args = Map::new();
            args.insert("post_id".to_string(), json!(post_id));
            ("like-post", args)
        }
        CliCommand::Comment { post_id, content } => {
            let mut args = Map::new();
            args.insert("post_id".to_string(), json!(post_id));
            args.insert("content".to_string(), json!(content));
            ("comment", args)
        }
        CliCommand::GetPost { post_id } => {
            let mut args = Map::new();
            args.insert("post_id".to_string(), json!(post_id));
            ("get-post", args)
        }
        CliCommand::Feed { limit } => {
            let mut args = Map::new();
            if let Some(l) = limit {
                args.insert("limit".to_string(), json!(l));
            }
            ("feed", args)
        }
        CliCommand::SwitchAccount { address } => {
            let mut args = Map::new();
            args.insert("address".to_string(), json!(address));
            ("switch-account", args)
        }
        CliCommand::SwitchNetwork { network_id } => {
            let mut args = Map::new();
            args.insert("network_id".to_string(), json!(network_id));
            ("switch-network", args)
        }
    };

    ProtocolRequest {
        cmd: cmd_name.to_string(),
        rid: None,
        args,
    }
}
