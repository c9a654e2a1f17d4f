//! Command-line interface
//!
//! Argument definitions and command dispatch for the `quota-manager` binary

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quota_manager::config::settings::{APP_DESCRIPTION, APP_NAME, APP_VERSION};
use quota_manager::services::{Notification, NotificationLevel};
use quota_manager::{Api, ApiClient, ConfigResolver, ListParams, Notifier, RouteTable, SettingKey};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "quota-manager")]
#[command(about = "Manage quota strategies and quota transfers on a Quota Manager backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store file holding settings overrides and the auth token
    #[arg(long, global = true, env = "QUOTA_MANAGER_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or change client settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Store the auth token sent with every request
    Login {
        /// Bearer token
        token: String,
    },

    /// Forget the stored auth token
    Logout,

    /// Strategy management
    #[command(subcommand)]
    Strategy(StrategyCommand),

    /// Quota queries and transfers
    #[command(subcommand)]
    Quota(QuotaCommand),

    /// List view routes, or resolve a path to its view and page title
    Routes {
        /// Path to resolve
        path: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print one effective setting
    Get {
        /// Setting name (base-url, api-prefix, timeout, page-size, auto-refresh, refresh-interval)
        key: SettingKey,
    },

    /// Save a setting override
    Set {
        /// Setting name
        key: SettingKey,
        /// New value
        value: String,
    },

    /// Remove a setting override
    Unset {
        /// Setting name
        #[arg(required_unless_present = "all")]
        key: Option<SettingKey>,

        /// Remove every override
        #[arg(long, conflicts_with = "key")]
        all: bool,
    },

    /// Check the effective configuration
    Validate,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Extra query parameter as key=value
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// JSON body, or @path to read it from a file
    #[arg(long)]
    pub data: String,
}

#[derive(Subcommand, Debug)]
pub enum StrategyCommand {
    /// List strategies
    List(ListArgs),
    /// Show one strategy
    Get { id: String },
    /// Create a strategy
    Create(DataArgs),
    /// Replace a strategy
    Update {
        id: String,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Delete a strategy
    Delete { id: String },
    /// Enable a strategy
    Enable { id: String },
    /// Disable a strategy
    Disable { id: String },
    /// Trigger a strategy scan
    Scan,
    /// List executions of a strategy
    Executions {
        id: String,
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuotaCommand {
    /// Show the current user's quota
    Show,
    /// List quota audit records
    Audit {
        /// Look up another user's records (admin)
        #[arg(long)]
        user: Option<String>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Transfer quota out
    TransferOut(DataArgs),
    /// Transfer quota in
    TransferIn(DataArgs),
}

/// Notifier that prints to stderr
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.level {
            NotificationLevel::Error => "✖",
            NotificationLevel::Warning => "!",
            NotificationLevel::Success => "✔",
            NotificationLevel::Info => "ℹ",
        };
        eprintln!("{} {}", marker, notification.message);
    }
}

/// Run a parsed command
pub async fn run(
    command: Command,
    client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    let resolver = client.resolver().clone();
    let message_duration = Duration::from_millis(resolver.ui_config().message.duration_ms);
    let api = Api::new(client.clone());

    match command {
        Command::Config(cmd) => run_config(cmd, &client, notifier.as_ref(), message_duration)?,
        Command::Login { token } => {
            resolver.set_token(&token)?;
            notifier.notify(Notification::success("Token saved", message_duration));
        }
        Command::Logout => {
            resolver.clear_token()?;
            notifier.notify(Notification::success("Token removed", message_duration));
        }
        Command::Strategy(cmd) => {
            let strategies = &api.strategies;
            let data = match cmd {
                StrategyCommand::List(list) => {
                    strategies
                        .list_strategies(&list_params(list, &resolver))
                        .await?
                }
                StrategyCommand::Get { id } => strategies.get_strategy(&id).await?,
                StrategyCommand::Create(body) => {
                    strategies.create_strategy(&read_data(&body.data)?).await?
                }
                StrategyCommand::Update { id, data } => {
                    strategies
                        .update_strategy(&id, &read_data(&data.data)?)
                        .await?
                }
                StrategyCommand::Delete { id } => strategies.delete_strategy(&id).await?,
                StrategyCommand::Enable { id } => strategies.enable_strategy(&id).await?,
                StrategyCommand::Disable { id } => strategies.disable_strategy(&id).await?,
                StrategyCommand::Scan => strategies.trigger_scan().await?,
                StrategyCommand::Executions { id, list } => {
                    strategies
                        .get_strategy_executions(&id, &list_params(list, &resolver))
                        .await?
                }
            };
            print_json(&data)?;
        }
        Command::Quota(cmd) => {
            let quota = &api.quota;
            let data = match cmd {
                QuotaCommand::Show => quota.get_user_quota().await?,
                QuotaCommand::Audit { user: Some(user), list } => {
                    quota
                        .get_user_quota_audit_records(&user, &list_params(list, &resolver))
                        .await?
                }
                QuotaCommand::Audit { user: None, list } => {
                    quota
                        .get_quota_audit_records(&list_params(list, &resolver))
                        .await?
                }
                QuotaCommand::TransferOut(body) => {
                    quota.transfer_out(&read_data(&body.data)?).await?
                }
                QuotaCommand::TransferIn(body) => {
                    quota.transfer_in(&read_data(&body.data)?).await?
                }
            };
            print_json(&data)?;
        }
        Command::Routes { path } => {
            let table = RouteTable::default();
            match path {
                Some(path) => {
                    let matched = table
                        .resolve(&path)
                        .with_context(|| format!("No view matches path: {}", path))?;
                    let title = matched.page_title();
                    print_json(&serde_json::json!({
                        "name": matched.route.name,
                        "path": matched.path,
                        "params": matched.params,
                        "title": title,
                    }))?;
                }
                None => print_json(&table.routes())?,
            }
        }
    }

    Ok(())
}

fn run_config(
    cmd: ConfigCommand,
    client: &ApiClient,
    notifier: &dyn Notifier,
    message_duration: Duration,
) -> Result<()> {
    let resolver = client.resolver();

    match cmd {
        ConfigCommand::Show => {
            let mut shown = serde_json::to_value(resolver.effective_config())?;
            shown["app"] = app_info();
            shown["authenticated"] = Value::Bool(resolver.token().is_some());
            print_json(&shown)?;
        }
        ConfigCommand::Get { key } => {
            println!("{}", effective_value(resolver, key));
        }
        ConfigCommand::Set { key, value } => {
            resolver.set_setting(key, &value)?;
            if key.affects_client() {
                client.refresh();
            }
            notifier.notify(Notification::success(
                format!("Setting '{}' saved", key),
                message_duration,
            ));
        }
        ConfigCommand::Unset { key, all } => {
            match (key, all) {
                (_, true) => resolver.clear_all_settings()?,
                (Some(key), false) => resolver.clear_setting(key)?,
                (None, false) => anyhow::bail!("Specify a setting or --all"),
            }
            client.refresh();
            notifier.notify(Notification::success("Settings reset", message_duration));
        }
        ConfigCommand::Validate => {
            resolver.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn app_info() -> Value {
    serde_json::json!({
        "name": APP_NAME,
        "version": APP_VERSION,
        "description": APP_DESCRIPTION,
    })
}

fn effective_value(resolver: &ConfigResolver, key: SettingKey) -> String {
    match key {
        SettingKey::ApiBaseUrl => resolver.api_config().base_url,
        SettingKey::ApiPrefix => resolver.api_config().api_prefix,
        SettingKey::ApiTimeout => resolver.api_config().timeout_ms.to_string(),
        SettingKey::PageSize => resolver.ui_config().table.default_page_size.to_string(),
        SettingKey::AutoRefresh => resolver
            .feature_config()
            .auto_refresh
            .default_enabled
            .to_string(),
        SettingKey::RefreshInterval => resolver
            .feature_config()
            .auto_refresh
            .default_interval_secs
            .to_string(),
    }
}

fn list_params(args: ListArgs, resolver: &ConfigResolver) -> ListParams {
    let mut params = ListParams::new();
    if let Some(page) = args.page {
        params = params.page(page);
    }
    let page_size = args
        .page_size
        .unwrap_or_else(|| resolver.ui_config().table.default_page_size);
    params = params.page_size(page_size);

    args.params
        .into_iter()
        .fold(params, |params, (key, value)| params.param(key, value))
}

fn read_data(data: &str) -> Result<Value> {
    let raw = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request body from {}", path))?,
        None => data.to_string(),
    };
    serde_json::from_str(&raw)
        .context("Request body is not valid JSON")
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
