//! i-doit CLI
//!
//! Entry point for the `idoit` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use idoit_client::config::{ClientConfig, ConfigOverrides};
use idoit_client::model::Client;
use idoit_client::protocol::ops::{ObjectDescriptor, ObjectsRead, Ordering, RawRequest, SortDirection};
use idoit_client::{IdoitError, IdoitResult, IdoitSession};

#[derive(Parser)]
#[command(name = "idoit")]
#[command(about = "Query an i-doit CMDB over JSON-RPC", version)]
struct Cli {
    /// Path to config file (default: ~/.config/idoit/client.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// API key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Login user name
    #[arg(long, short = 'u', global = true)]
    username: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, print the session summary and log out again
    Login,

    /// List objects matching a filter
    Objects {
        /// Object type constant, e.g. C__OBJTYPE__SERVER
        #[arg(long = "type", short = 't')]
        type_name: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Object id (repeatable)
        #[arg(long = "id")]
        ids: Vec<i64>,

        #[arg(long)]
        sysid: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, value_enum)]
        order_by: Option<OrderField>,

        #[arg(long, value_enum)]
        sort: Option<SortOrder>,

        /// Maximum number of objects
        #[arg(long)]
        limit: Option<u32>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List client workstations with their global data, contacts and accounting
    Clients {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Call any method and print the raw result
    Call {
        /// Method name, e.g. cmdb.object_types.read
        method: String,

        /// Parameters as a JSON object
        #[arg(long, short = 'p')]
        params: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderField {
    Id,
    Title,
    Sysid,
    Type,
    TypeTitle,
    FirstName,
    LastName,
    Email,
}

impl From<OrderField> for Ordering {
    fn from(field: OrderField) -> Self {
        match field {
            OrderField::Id => Ordering::Id,
            OrderField::Title => Ordering::Title,
            OrderField::Sysid => Ordering::Sysid,
            OrderField::Type => Ordering::Type,
            OrderField::TypeTitle => Ordering::TypeTitle,
            OrderField::FirstName => Ordering::FirstName,
            OrderField::LastName => Ordering::LastName,
            OrderField::Email => Ordering::Email,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for SortDirection {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A command with its arguments already validated, ready to run against a
/// logged-in session.
enum Action {
    Login,
    Objects { request: ObjectsRead, json: bool },
    Clients { json: bool },
    Call(RawRequest),
}

impl Action {
    fn from_command(command: Commands) -> IdoitResult<Self> {
        let action = match command {
            Commands::Login => Action::Login,
            Commands::Objects {
                type_name,
                title,
                ids,
                sysid,
                email,
                order_by,
                sort,
                limit,
                json,
            } => {
                let mut request = ObjectsRead::new();
                if let Some(type_name) = type_name {
                    request = request.filter_type_name(type_name);
                }
                if let Some(title) = title {
                    request = request.filter_title(title);
                }
                if !ids.is_empty() {
                    request = request.filter_ids(ids);
                }
                if let Some(sysid) = sysid {
                    request = request.filter_sysid(sysid);
                }
                if let Some(email) = email {
                    request = request.filter_email(email);
                }
                if let Some(order_by) = order_by {
                    request = request.order_by(order_by.into());
                }
                if let Some(sort) = sort {
                    request = request.sort(sort.into());
                }
                if let Some(limit) = limit {
                    request = request.limit(limit);
                }
                Action::Objects { request, json }
            }
            Commands::Clients { json } => Action::Clients { json },
            Commands::Call { method, params } => {
                Action::Call(RawRequest::new(method, parse_params(params.as_deref())?))
            }
        };
        Ok(action)
    }

    fn run(&self, session: &IdoitSession) -> IdoitResult<()> {
        match self {
            Action::Login => run_login(session),
            Action::Objects { request, json } => run_objects(session, request, *json),
            Action::Clients { json } => run_clients(session, *json),
            Action::Call(request) => run_call(session, request),
        }
    }
}

fn run(cli: Cli) -> IdoitResult<()> {
    let overrides = ConfigOverrides {
        url: cli.url,
        api_key: cli.api_key,
        username: cli.username,
        password: None,
    };
    let config = ClientConfig::resolve(cli.config.as_deref(), &overrides)?;
    let action = Action::from_command(cli.command)?;

    let session = IdoitSession::connect(&config)?.login()?;
    let result = action.run(&session);

    // Always end the server-side session; report the command's error first.
    let logout = session.logout();
    result.and(logout)
}

fn run_login(session: &IdoitSession) -> IdoitResult<()> {
    if let Some(info) = session.login_info() {
        println!("Logged in as {}", info.username.as_deref().unwrap_or("-"));
        if let Some(name) = &info.name {
            println!("  Name:    {}", name.trim());
        }
        if let Some(mail) = &info.mail {
            println!("  Mail:    {}", mail);
        }
        if let Some(tenant) = &info.client_name {
            println!("  Tenant:  {}", tenant);
        }
        println!("  Session: {}", info.session_id);
    }
    Ok(())
}

fn run_objects(session: &IdoitSession, request: &ObjectsRead, json: bool) -> IdoitResult<()> {
    let objects = session.send(request)?;

    if json {
        print_json(&objects)?;
    } else if objects.is_empty() {
        println!("No objects found");
    } else {
        print_object_table(&objects);
    }
    Ok(())
}

fn print_object_table(objects: &[ObjectDescriptor]) {
    println!("{:<8} {:<32} {:<24} {}", "ID", "TITLE", "SYSID", "TYPE");
    for object in objects {
        println!(
            "{:<8} {:<32} {:<24} {}",
            object.id,
            object.title,
            object.sysid.as_deref().unwrap_or("-"),
            object.type_title.as_deref().unwrap_or("-"),
        );
    }
}

fn run_clients(session: &IdoitSession, json: bool) -> IdoitResult<()> {
    let clients = session.objects().read_type::<Client>()?;

    if json {
        return print_json(&clients);
    }

    println!("Clients ({}):", clients.len());
    for client in &clients {
        let title = client.global.as_ref().map(|g| g.title.as_str()).unwrap_or("-");
        let status = client
            .global
            .as_ref()
            .and_then(|g| g.cmdb_status.as_ref())
            .map(|s| s.title.as_str())
            .unwrap_or("-");
        println!("  {} [{}] {}", client.id, status, title);
        if let Some(accounting) = &client.accounting {
            let inventory = accounting.inventory_no.as_deref().unwrap_or("-");
            match accounting.acquirementdate {
                Some(date) => println!("      inventory {} (acquired {})", inventory, date),
                None => println!("      inventory {}", inventory),
            }
        }
        for contact in &client.contacts {
            let role = contact.role.as_ref().map(|r| r.title.as_str()).unwrap_or("contact");
            println!("      {}: object {}", role, contact.contact);
        }
    }
    Ok(())
}

fn run_call(session: &IdoitSession, request: &RawRequest) -> IdoitResult<()> {
    let result = session.send(request)?;
    print_json(&result)
}

/// `--params` text as a JSON object; absent means no parameters.
fn parse_params(text: Option<&str>) -> IdoitResult<Map<String, Value>> {
    let Some(text) = text else {
        return Ok(Map::new());
    };
    match serde_json::from_str(text) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(_) => Err(IdoitError::InvalidArgument(
            "--params must be a JSON object".to_string(),
        )),
        Err(e) => Err(IdoitError::InvalidArgument(format!(
            "--params is not valid JSON: {}",
            e
        ))),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> IdoitResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| IdoitError::Encode {
        request: "output".to_string(),
        source: e,
    })?;
    println!("{}", text);
    Ok(())
}
