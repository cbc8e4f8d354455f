//! Command-line client for the TokenInout API.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::{json, Value};
use std::io::{self, Read};
use std::time::{Duration, Instant};
use tokeninout_core::text::normalize_optional_nonempty;
use tokeninout_core::DEFAULT_CLI_SERVER_URL;


#[derive(Parser)]
#[command(name = "tio", about = "TokenInout content CLI", version)]
struct Cli {
    /// Server URL (can also be set via TIO_SERVER env var)
    #[arg(short, long, env = "TIO_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List indexed articles
    List {
        /// Rebuild the index before listing
        #[arg(long)]
        sync: bool,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print one article
    Get {
        path: String,
    },
    /// Replace an article's title, description and body
    Update {
        path: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Read the body from a file instead of stdin
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Rebuild the article index from the content repository
    ///
    /// The server answers with the stored index when the rebuild fails, so a
    /// failed sync is only visible in the server log.
    Sync,
    /// Show resources and the newest articles
    Home,
}

fn log_timing(timing: bool, label: &str, request: Duration, parse: Duration) {
    if !timing {
        return;
    }
    let total = request + parse;
    eprintln!(
        "[timing] {}: request {:.1} ms, parse {:.1} ms, total {:.1} ms",
        label,
        request.as_secs_f64() * 1000.0,
        parse.as_secs_f64() * 1000.0,
        total.as_secs_f64() * 1000.0
    );
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value.get("error").and_then(Value::as_str).unwrap_or(body);
        return match value.get("kind").and_then(Value::as_str) {
            Some(kind) => format!("{} ({})", message, kind),
            None => message.to_string(),
        };
    }

    body.to_string()
}

async fn ensure_success_or_exit(res: reqwest::Response, action: &str) -> reqwest::Response {
    let status = res.status();
    if status.is_success() {
        return res;
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    eprintln!("{} failed ({}): {}", action, status, message);
    std::process::exit(1);
}

async fn send_json(
    request: reqwest::RequestBuilder,
    action: &str,
    timing: bool,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request_start = Instant::now();
    let res = request.send().await?;
    let request_elapsed = request_start.elapsed();
    let res = ensure_success_or_exit(res, action).await;

    let parse_start = Instant::now();
    let value: Value = res.json().await?;
    log_timing(
        timing,
        &action.to_lowercase(),
        request_elapsed,
        parse_start.elapsed(),
    );
    Ok(value)
}

fn print_or_exit(action: &str, output: Result<String, String>) {
    match output {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

fn to_pretty(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn record_fields(record: &Value) -> Option<(&str, &str, &str)> {
    let date = record.get("date").and_then(Value::as_str).unwrap_or("");
    let title = record.get("title").and_then(Value::as_str).unwrap_or("");
    let path = record.get("path").and_then(Value::as_str)?;
    Some((date, title, path))
}

fn format_index_output(records: &[Value], limit: Option<usize>, json: bool) -> Result<String, String> {
    let shown = &records[..limit.unwrap_or(records.len()).min(records.len())];
    if json {
        return to_pretty(&Value::Array(shown.to_vec()));
    }

    let mut rows = Vec::with_capacity(shown.len());
    for (index, record) in shown.iter().enumerate() {
        let Some((date, title, path)) = record_fields(record) else {
            return Err(format!(
                "response item {} missing 'path' field",
                index
            ));
        };
        rows.push(format!("{:<10} {:<40} {}", date, title, path));
    }
    Ok(rows.join("\n"))
}

fn format_article_output(document: &Value, json: bool) -> Result<String, String> {
    if json {
        return to_pretty(document);
    }

    let content = document
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| "response missing 'content' field".to_string())?;
    match document.get("title").and_then(Value::as_str) {
        Some(title) => Ok(format!("# {}\n\n{}", title, content)),
        None => Ok(content.to_string()),
    }
}

fn format_update_output(path: &str, response: &Value, json: bool) -> Result<String, String> {
    if json {
        return to_pretty(response);
    }
    Ok(format!("Updated article: {}", path))
}

fn format_sync_output(records: &[Value], json: bool) -> Result<String, String> {
    if json {
        return to_pretty(&Value::Array(records.to_vec()));
    }
    Ok(format!("Index has {} article(s)", records.len()))
}

fn format_home_output(feed: &Value, json: bool) -> Result<String, String> {
    if json {
        return to_pretty(feed);
    }

    let mut lines = vec!["Resources:".to_string()];
    for resource in feed
        .get("resources")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
    {
        let name = resource.get("name").and_then(Value::as_str).unwrap_or("?");
        let url = resource.get("url").and_then(Value::as_str).unwrap_or("");
        lines.push(format!("  {:<24} {}", name, url));
    }

    lines.push("Latest articles:".to_string());
    let articles = feed
        .get("articles")
        .and_then(Value::as_array)
        .ok_or_else(|| "response missing 'articles' field".to_string())?;
    let rows = format_index_output(articles, None, false)?;
    lines.extend(rows.lines().map(|row| format!("  {}", row)));
    Ok(lines.join("\n"))
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn api_url_or_exit(server: &str, action: &str, segments: &[&str]) -> reqwest::Url {
    match api_url(server, segments) {
        Ok(url) => url,
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn resolve_server(server: Option<String>) -> String {
    normalize_optional_nonempty(server).unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn read_body(file: Option<String>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn as_records(value: Value, action: &str) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        _ => {
            eprintln!("{} failed: expected a JSON array", action);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let server = normalize_server(resolve_server(server));
    let articles = || api_url_or_exit(&server, "Request", &["api", "articles"]);

    match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
        Commands::List { sync, limit } => {
            let mut request = client.get(articles());
            if sync {
                request = request.query(&[("sync", "true")]);
            }
            let records = as_records(send_json(request, "List", timing).await?, "List");
            print_or_exit("List", format_index_output(&records, limit, json));
        }
        Commands::Get { path } => {
            let request = client.get(articles()).query(&[("path", path.as_str())]);
            let document = send_json(request, "Get", timing).await?;
            print_or_exit("Get", format_article_output(&document, json));
        }
        Commands::Update {
            path,
            title,
            description,
            file,
        } => {
            let content = read_body(file)?;
            let body = json!({
                "article": {
                    "path": path,
                    "title": title,
                    "description": description,
                    "content": content,
                }
            });
            let response = send_json(client.post(articles()).json(&body), "Update", timing).await?;
            print_or_exit("Update", format_update_output(&path, &response, json));
        }
        Commands::Sync => {
            let request = client.get(articles()).query(&[("sync", "true")]);
            let records = as_records(send_json(request, "Sync", timing).await?, "Sync");
            print_or_exit("Sync", format_sync_output(&records, json));
        }
        Commands::Home => {
            let endpoint = api_url_or_exit(&server, "Home", &["api", "home"]);
            let feed = send_json(client.get(endpoint), "Home", timing).await?;
            print_or_exit("Home", format_home_output(&feed, json));
        }
    }

    Ok(())
}
