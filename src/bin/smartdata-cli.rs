use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use smartdata::{
    Api, ClientConfig, Credentials, DataQuery, DataSource, Method, Pagination, RequestOptions,
    SmartDataClient, ValuesQuery,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "smartdata-cli",
    version,
    about = "Small async CLI for querying the SmartData APIs"
)]
struct Cli {
    /// Account login sent in the `login` header.
    #[arg(long, env = "SMARTDATA_LOGIN")]
    login: String,

    /// Account password sent in the `password` header.
    #[arg(long, env = "SMARTDATA_PASSWORD", hide_env_values = true)]
    password: String,

    /// Root URL of the "out" API.
    #[arg(long, env = "SMARTDATA_OUT_URL")]
    out_url: Option<String>,

    /// Root URL of the "in" API.
    #[arg(long, env = "SMARTDATA_IN_URL")]
    in_url: Option<String>,

    /// Forwarding proxy for every request.
    #[arg(long, env = "SMARTDATA_PROXY")]
    proxy: Option<String>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List streams.
    Streams(PageArgs),
    /// Show one stream.
    Stream { id: String },
    /// Fetch stream contents.
    StreamData(StreamDataArgs),
    /// List the fields of a stream.
    StreamFields { id: String },
    /// List distinct values of a stream field.
    StreamValues {
        id: String,
        /// Field whose distinct values are requested.
        #[arg(long)]
        field: String,
        /// Only consider elements matching this query.
        #[arg(long)]
        query: Option<String>,
    },
    /// List sources.
    Sources(PageArgs),
    /// Show one source.
    Source { id: String },
    /// List the fields of a source.
    SourceFields { id: String },
    /// Replace a source representation.
    UpdateSource {
        id: String,
        #[command(flatten)]
        body: BodyInput,
    },
    /// Delete a source.
    DeleteSource { id: String },
    /// Preview renaming a source field without modifying the source.
    MappingPreview {
        id: String,
        real_path: String,
        mapped_to: String,
    },
    /// Send a raw request to either API root.
    Request(RequestArgs),
}

#[derive(Debug, Args)]
struct PageArgs {
    /// Rank (0-based) of the first result.
    #[arg(long)]
    from: Option<u64>,
    /// Number of results.
    #[arg(long)]
    size: Option<u64>,
}

#[derive(Debug, Args)]
struct StreamDataArgs {
    id: String,

    /// Filter query.
    #[arg(long)]
    query: Option<String>,

    #[command(flatten)]
    page: PageArgs,

    /// Security token for external API authentication.
    #[arg(long)]
    token: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ApiRoot {
    In,
    Out,
}

#[derive(Debug, Args)]
struct RequestArgs {
    /// API root the path is resolved against.
    #[arg(value_enum)]
    api: ApiRoot,

    /// HTTP method (GET, POST, PUT, DELETE).
    method: String,

    /// Request path (for example: /stream/).
    path: String,

    /// Parameter in form key=value. Repeat as needed. Sent as query for GET.
    #[arg(long = "param", value_name = "KEY=VALUE", conflicts_with_all = ["body_json", "body_file"])]
    param: Vec<String>,

    #[command(flatten)]
    body: BodyInput,
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with = "body_file")]
    body_json: Option<String>,

    /// Path to a file containing a JSON request body.
    #[arg(long, value_name = "PATH", conflicts_with = "body_json")]
    body_file: Option<PathBuf>,
}

/// Entry point for the async CLI.
///
/// Parses command-line arguments, builds a client, dispatches the subcommand
/// and prints JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = build_client(&cli).context("failed to create SmartData client")?;

    let output = run(&client, &cli.command)
        .await
        .context("SmartData call failed")?;

    print_json(&output, cli.compact).context("failed to print JSON output")?;
    Ok(())
}

fn build_client(cli: &Cli) -> Result<SmartDataClient> {
    let mut config = ClientConfig::new(Credentials::new(&cli.login, &cli.password));
    if let Some(url) = &cli.out_url {
        config = config.with_out_api(url);
    }
    if let Some(url) = &cli.in_url {
        config = config.with_in_api(url);
    }
    if let Some(url) = &cli.proxy {
        config = config.with_proxy(url);
    }
    Ok(SmartDataClient::from_config(config)?)
}

async fn run(client: &SmartDataClient, command: &Command) -> Result<Value> {
    let value = match command {
        Command::Streams(page) => serde_json::to_value(client.streams(page_params(page)).await?)?,
        Command::Stream { id } => serde_json::to_value(client.stream(id).await?)?,
        Command::StreamData(args) => {
            let query = DataQuery {
                query: args.query.clone(),
                from: args.page.from,
                size: args.page.size,
                token: args.token.clone(),
                ..DataQuery::default()
            };
            client.stream(&args.id).await?.data(Some(query.into())).await?
        }
        Command::StreamFields { id } => client.stream(id).await?.fields().await?,
        Command::StreamValues { id, field, query } => {
            let mut values = ValuesQuery::new(field);
            if let Some(query) = query {
                values = values.matching(query);
            }
            client.stream(id).await?.values(Some(values.into())).await?
        }
        Command::Sources(page) => serde_json::to_value(client.sources(page_params(page)).await?)?,
        Command::Source { id } => serde_json::to_value(client.source(id).await?)?,
        Command::SourceFields { id } => source(client, id).await?.fields().await?,
        Command::UpdateSource { id, body } => {
            let Some(data) = parse_body(body).context("failed to parse request body input")?
            else {
                bail!("update-source requires --body-json or --body-file");
            };
            serde_json::to_value(source(client, id).await?.update(data).await?)?
        }
        Command::DeleteSource { id } => {
            source(client, id).await?.delete().await?;
            Value::Null
        }
        Command::MappingPreview {
            id,
            real_path,
            mapped_to,
        } => {
            source(client, id)
                .await?
                .mapping_preview(real_path, mapped_to)
                .await?
        }
        Command::Request(args) => send_request(client, args).await?,
    };
    Ok(value)
}

async fn source(client: &SmartDataClient, id: &str) -> Result<DataSource> {
    client
        .source(id)
        .await
        .with_context(|| format!("failed to fetch source '{id}'"))
}

fn page_params(page: &PageArgs) -> Option<Value> {
    if page.from.is_none() && page.size.is_none() {
        return None;
    }
    Some(
        Pagination {
            from: page.from,
            size: page.size,
        }
        .into(),
    )
}

/// Sends a raw request using api root + method + path.
async fn send_request(client: &SmartDataClient, args: &RequestArgs) -> Result<Value> {
    // Validate method eagerly so CLI errors are explicit before any network call.
    let method = Method::from_str(&args.method.to_ascii_uppercase())
        .with_context(|| format!("invalid HTTP method '{}'", args.method))?;
    let api = match args.api {
        ApiRoot::In => Api::In,
        ApiRoot::Out => Api::Out,
    };

    let mut options = RequestOptions::new().with_method(method);
    if let Some(body) = parse_body(&args.body).context("failed to parse request body input")? {
        options = options.with_params(body);
    } else if !args.param.is_empty() {
        let pairs = parse_pairs(&args.param, "--param")?;
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        options = options.with_params(map);
    }

    let value = client
        .request_json(api, &args.path, options)
        .await
        .with_context(|| format!("HTTP request failed for path '{}'", args.path))?;
    Ok(value)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
///
/// Returns an error when a value does not include `=` or has an empty key.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Parses an optional JSON body from inline text or a file path.
fn parse_body(body: &BodyInput) -> Result<Option<Value>> {
    match (&body.body_json, &body.body_file) {
        (Some(raw), None) => serde_json::from_str(raw)
            .context("failed to parse JSON from --body-json")
            .map(Some),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read --body-file '{}'", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| {
                    format!("failed to parse JSON in --body-file '{}'", path.display())
                })
                .map(Some)
        }
        (None, None) => Ok(None),
        (Some(_), Some(_)) => bail!("use only one of --body-json or --body-file"),
    }
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
