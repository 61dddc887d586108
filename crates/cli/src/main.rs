//! CLI for managing cloud load balancers.
//!
//! Flow: parse args -> authenticate -> resource call -> indented JSON on stdout.
//! Logs go to stderr.

mod commands;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use cloudlb_client::{AuthOptions, Authenticator, IdentityClient, ServiceClient};
use cloudlb_core::{CloudLbError, CloudLbResult, VirtualIpType};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cloudlb", version, about = "Manage cloud load balancers")]
struct Cli {
    /// Cloud region.
    #[arg(long, global = true, env = "OS_REGION_NAME")]
    region: Option<String>,

    /// Load balancer API endpoint. With --token, skips identity lookup.
    #[arg(long, global = true, env = "CLOUDLB_ENDPOINT")]
    endpoint: Option<String>,

    /// Auth token for --endpoint.
    #[arg(long, global = true, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a load balancer.
    Create {
        name: String,
        protocol: String,
        port: u16,

        /// Virtual IP type. PRIVATE is accepted for SERVICENET.
        #[arg(long = "type", value_enum, ignore_case = true, default_value = "public")]
        vip_type: VipKind,
    },

    /// List load balancers.
    List,

    /// Show one load balancer.
    Show { id: u64 },

    /// Update a load balancer (not implemented).
    Update,

    /// Delete a load balancer.
    Delete { id: u64 },

    /// Manage a load balancer's access list.
    AccessList {
        #[command(subcommand)]
        command: AccessListCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AccessListCommand {
    /// Print every entry.
    Show { lb_id: u64 },

    /// Append allow/deny entries.
    Add {
        lb_id: u64,

        #[arg(long = "allow", value_name = "ADDRESS")]
        allow: Vec<String>,

        #[arg(long = "deny", value_name = "ADDRESS")]
        deny: Vec<String>,
    },

    /// Delete the given entries, or all entries when no --id is given.
    Delete {
        lb_id: u64,

        #[arg(long = "id", value_name = "ENTRY_ID")]
        ids: Vec<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VipKind {
    Public,
    #[value(alias = "private")]
    Servicenet,
}

impl From<VipKind> for VirtualIpType {
    fn from(kind: VipKind) -> Self {
        match kind {
            VipKind::Public => VirtualIpType::Public,
            VipKind::Servicenet => VirtualIpType::Servicenet,
        }
    }
}

/// 2 for missing positional arguments, 0 for help/version, 1 otherwise.
fn usage_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        ErrorKind::MissingRequiredArgument => 2,
        _ => 1,
    }
}

/// Endpoint and token from flags, or the identity flow when no endpoint is given.
async fn connect(
    region: Option<&str>,
    endpoint: Option<&str>,
    token: Option<&str>,
) -> CloudLbResult<ServiceClient> {
    match (endpoint, token) {
        (Some(endpoint), Some(token)) => {
            tracing::debug!(%endpoint, "using explicit endpoint");
            ServiceClient::new(endpoint, token)
        }
        (Some(_), None) => Err(CloudLbError::Auth(
            "--endpoint requires --token (or OS_AUTH_TOKEN)".into(),
        )),
        (None, _) => {
            let identity = IdentityClient::new(AuthOptions::from_env()?)?;
            let session = identity.authenticate().await?;
            session.load_balancer_client(region)
        }
    }
}

async fn run(cli: Cli) -> commands::CommandResult {
    let service = || {
        connect(
            cli.region.as_deref(),
            cli.endpoint.as_deref(),
            cli.token.as_deref(),
        )
    };
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Create {
            name,
            protocol,
            port,
            vip_type,
        } => {
            let client = service().await?;
            commands::create(&client, name, protocol, port, vip_type.into(), &mut out).await
        }
        Commands::List => commands::list(&service().await?, &mut out).await,
        Commands::Show { id } => commands::show(&service().await?, id, &mut out).await,
        Commands::Update => {
            tracing::warn!("update is not implemented");
            Ok(())
        }
        Commands::Delete { id } => commands::delete(&service().await?, id).await,
        Commands::AccessList { command } => {
            let client = service().await?;
            match command {
                AccessListCommand::Show { lb_id } => {
                    commands::access_list_show(&client, lb_id, &mut out).await
                }
                AccessListCommand::Add { lb_id, allow, deny } => {
                    commands::access_list_add(&client, lb_id, allow, deny).await
                }
                AccessListCommand::Delete { lb_id, ids } => {
                    commands::access_list_delete(&client, lb_id, &ids).await
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = usage_exit_code(&err);
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("cloudlb").chain(args.iter().copied()))
    }

    #[test]
    fn show_with_non_numeric_id_is_usage_error() {
        let err = parse(&["show", "abc"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn missing_positional_exits_2() {
        let err = parse(&["show"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 2);

        let err = parse(&["create", "web", "HTTP"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 2);
    }

    #[test]
    fn unknown_or_missing_subcommand_exits_1() {
        assert_eq!(usage_exit_code(&parse(&["frobnicate"]).unwrap_err()), 1);
        assert_eq!(usage_exit_code(&parse(&[]).unwrap_err()), 1);
    }

    #[test]
    fn create_parses_port_and_vip_type() {
        let cli = parse(&["create", "web", "HTTP", "8080", "--type", "PRIVATE"]).unwrap();
        match cli.command {
            Commands::Create {
                name,
                protocol,
                port,
                vip_type,
            } => {
                assert_eq!(name, "web");
                assert_eq!(protocol, "HTTP");
                assert_eq!(port, 8080);
                assert_eq!(VirtualIpType::from(vip_type), VirtualIpType::Servicenet);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn create_defaults_to_public_vip() {
        let cli = parse(&["create", "web", "HTTP", "80"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Create {
                vip_type: VipKind::Public,
                ..
            }
        ));
    }

    #[test]
    fn port_out_of_range_is_rejected() {
        let err = parse(&["create", "web", "HTTP", "70000"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn region_is_global() {
        let cli = parse(&["list", "--region", "ORD"]).unwrap();
        assert_eq!(cli.region.as_deref(), Some("ORD"));
    }

    #[test]
    fn access_list_delete_collects_ids() {
        let cli = parse(&["access-list", "delete", "9", "--id", "1", "--id", "2"]).unwrap();
        match cli.command {
            Commands::AccessList {
                command: AccessListCommand::Delete { lb_id, ids },
            } => {
                assert_eq!(lb_id, 9);
                assert_eq!(ids, vec![1, 2]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn endpoint_without_token_is_auth_error() {
        let err = connect(None, Some("http://127.0.0.1:9/"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudLbError::Auth(_)));
    }

    #[tokio::test]
    async fn update_runs_without_credentials() {
        let cli = Cli {
            region: None,
            endpoint: Some("http://127.0.0.1:9/".into()),
            token: None,
            command: Commands::Update,
        };
        run(cli).await.unwrap();
    }

    #[test]
    fn help_describes_every_global_flag() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Cloud region"));
        assert!(help.contains("Load balancer API endpoint"));
        assert!(help.contains("Auth token for --endpoint"));
    }
}
