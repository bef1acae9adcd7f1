use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use actrun_api::{ActionServerClient, SERVER_URL_ENV, ServerConfigProvider, run_path};
use actrun_engine::{ActionForm, Submission, SubmitController};
use actrun_tui::TuiOptions;
use actrun_types::{Action, ActionPackage, FieldKind, RunRequest, RunState, ServerConfig};
use actrun_util::{ApiKeyStore, MemoryKeyStore, SecretsBackend, open_api_key_store, redact_sensitive, stringify_result, to_kebab_case};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod inputs;

/// Environment variable that overrides the stored API key for `run`.
const API_KEY_ENV: &str = "ACTRUN_API_KEY";

#[derive(Debug, Parser)]
#[command(name = "actrun", version, about = "Run action server actions from generated forms")]
struct Cli {
    /// Action server base URL
    #[arg(long, global = true, env = SERVER_URL_ENV)]
    server: Option<String>,

    /// Package to open when the TUI starts
    #[arg(long, requires = "action")]
    package: Option<String>,

    /// Action to open when the TUI starts
    #[arg(long, requires = "package")]
    action: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List packages and their actions
    List,
    /// Show the form fields derived from an action's input schema
    Schema { package: String, action: String },
    /// Fill in an action's form and run it
    Run {
        package: String,
        action: String,
        /// Field assignment, repeatable
        #[arg(short, long = "input", value_name = "NAME=VALUE", value_parser = inputs::parse_assignment)]
        inputs: Vec<(String, String)>,
        /// YAML or JSON mapping of field names to values
        #[arg(short = 'f', long)]
        inputs_file: Option<PathBuf>,
        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Store the API key used when the server requires authentication
    SetApiKey { value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.is_none());

    let client = Arc::new(ActionServerClient::from_env(cli.server.as_deref())?);
    let key_store = open_api_key_store(SecretsBackend::from_env());

    let Some(command) = cli.command else {
        let server_config = fetch_server_config(&client).await;
        let initial_selection = cli.package.zip(cli.action);
        return actrun_tui::run(TuiOptions {
            client,
            key_store,
            server_config,
            initial_selection,
        })
        .await;
    };

    match command {
        Command::List => list(&client).await,
        Command::Schema { package, action } => schema(&client, &package, &action).await,
        Command::Run {
            package,
            action,
            inputs,
            inputs_file,
            dry_run,
        } => {
            let key_store = match std::env::var(API_KEY_ENV) {
                Ok(value) if !value.is_empty() => Arc::new(MemoryKeyStore::with_value(value)) as Arc<dyn ApiKeyStore>,
                _ => key_store,
            };
            let edits = collect_inputs(inputs_file, inputs)?;
            run(client, key_store, &package, &action, &edits, dry_run).await
        }
        Command::SetApiKey { value } => {
            key_store.set(&value).context("store API key")?;
            println!("API key saved");
            Ok(())
        }
    }
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so its logs go to a file under the cache
/// directory. Everything else logs to stderr.
fn init_tracing(tui_mode: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if !tui_mode {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    }
    match open_log_file() {
        Some(file) => {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }
}

fn open_log_file() -> Option<File> {
    let dir = dirs_next::cache_dir()?.join("actrun");
    fs::create_dir_all(&dir).ok()?;
    File::options().create(true).append(true).open(dir.join("actrun.log")).ok()
}

/// Server settings, or the defaults when the server cannot be asked.
async fn fetch_server_config(client: &ActionServerClient) -> ServerConfig {
    client.server_config().await.unwrap_or_else(|error| {
        warn!(error = %format!("{error:#}"), "could not fetch server config; assuming authentication is disabled");
        ServerConfig::default()
    })
}

async fn list(client: &ActionServerClient) -> Result<()> {
    let packages = client.list_action_packages().await?;
    if packages.is_empty() {
        println!("No action packages available");
    }
    for package in &packages {
        println!("{} ({})", package.name, to_kebab_case(&package.name));
        for action in &package.actions {
            println!("  {} ({})", action.name, to_kebab_case(&action.name));
        }
    }
    Ok(())
}

async fn schema(client: &ActionServerClient, package: &str, action: &str) -> Result<()> {
    let packages = client.list_action_packages().await?;
    let (package, action) = find_action(&packages, package, action)?;
    let form = ActionForm::new(package, action)?;

    if let Some(docs) = action.docs.as_deref().filter(|docs| !docs.trim().is_empty()) {
        println!("{}\n", docs.trim());
    }
    if form.fields.is_empty() {
        println!("{} takes no inputs", action.name);
    }
    for field in &form.fields {
        let mut line = format!("{:<24} {:<8}", field.name, kind_label(field.kind));
        if field.required {
            line.push_str(" required");
        }
        if !field.options.is_empty() {
            line.push_str(&format!(" [{}]", field.options.join("|")));
        }
        if !field.value.is_empty() {
            line.push_str(&format!(" (default: {})", field.value));
        }
        if let Some(description) = field.description() {
            line.push_str(&format!("  {description}"));
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}

async fn run(
    client: Arc<ActionServerClient>,
    key_store: Arc<dyn ApiKeyStore>,
    package: &str,
    action: &str,
    edits: &[(String, String)],
    dry_run: bool,
) -> Result<()> {
    let server_config = fetch_server_config(&client).await;
    let packages = client.list_action_packages().await?;
    let (package, action) = find_action(&packages, package, action)?;
    let form = apply_inputs(ActionForm::new(package, action)?, edits)?;
    let controller = SubmitController::new(client.clone(), key_store, server_config);

    if dry_run {
        return match controller.prepare(&form) {
            Submission::Skipped => bail!("package and action names are required"),
            Submission::Rejected(message) => bail!(message),
            Submission::Ready(request) => print_dry_run(&client, &request),
        };
    }

    match controller.submit(&form, |_| {}).await {
        Some(RunState::Succeeded(data)) => {
            println!("{}", stringify_result(data.as_ref()));
            Ok(())
        }
        Some(RunState::Failed(message)) => Err(anyhow!(message)),
        Some(RunState::Idle | RunState::Pending) | None => bail!("package and action names are required"),
    }
}

fn print_dry_run(client: &ActionServerClient, request: &RunRequest) -> Result<()> {
    let mut headers = serde_json::Map::new();
    headers.insert("accept".into(), json!("application/json"));
    headers.insert("content-type".into(), json!("application/json"));
    if let Some(key) = request.api_key.as_deref().filter(|key| !key.is_empty()) {
        let redacted = redact_sensitive(&format!("authorization: Bearer {key}"));
        let value = redacted.split_once(':').map(|(_, value)| value.trim()).unwrap_or_default();
        headers.insert("authorization".into(), json!(value));
    }
    let out = json!({
        "method": "POST",
        "url": format!("{}{}", client.base_url, run_path(&request.package_id, &request.action_id)),
        "headers": headers,
        "body": request.payload,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Locate an action by display name or kebab-case id.
fn find_action<'a>(packages: &'a [ActionPackage], package: &str, action: &str) -> Result<(&'a ActionPackage, &'a Action)> {
    let is_match = |name: &str, wanted: &str| name == wanted || to_kebab_case(name) == wanted;
    let package = packages
        .iter()
        .find(|candidate| is_match(&candidate.name, package))
        .ok_or_else(|| anyhow!("package '{package}' not found"))?;
    let action = package
        .actions
        .iter()
        .find(|candidate| is_match(&candidate.name, action))
        .ok_or_else(|| anyhow!("action '{action}' not found in package '{}'", package.name))?;
    Ok((package, action))
}

/// Inputs file entries first, then `-i` assignments so the command line wins.
fn collect_inputs(inputs_file: Option<PathBuf>, assignments: Vec<(String, String)>) -> Result<Vec<(String, String)>> {
    let mut edits = match inputs_file {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            inputs::parse_inputs_document(&text).with_context(|| format!("parse {}", path.display()))?
        }
        None => Vec::new(),
    };
    edits.extend(assignments);
    Ok(edits)
}

fn apply_inputs(mut form: ActionForm, edits: &[(String, String)]) -> Result<ActionForm> {
    for (name, raw) in edits {
        let index = form
            .fields
            .iter()
            .position(|field| &field.name == name)
            .ok_or_else(|| anyhow!("unknown field '{name}' for action '{}'", form.action_name))?;
        let value = inputs::field_value(&form.fields[index], raw)?;
        form = form.edit(index, value);
    }
    Ok(form)
}

fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Boolean => "boolean",
        FieldKind::Number => "number",
        FieldKind::Integer => "integer",
        FieldKind::Object => "object",
        FieldKind::Enum => "enum",
        FieldKind::Text => "text",
    }
}
