//! Purpose: `intake` CLI entry point: demo server and one-shot body decoding.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: `decode` prints exactly one JSON document on stdout.
//! Invariants: Operational errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`; 1 means a classified decode failure.
use std::fs::File;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;

mod serve;

use intake::api::{
    BodyLimit, DEFAULT_MAX_BODY_BYTES, DecodeRequest, Error, ErrorKind, FailureKind,
    ResponseEmitter, TracingLogger, decode, to_exit_code,
};
use serve::{Person, ServeConfig, init_tracing, serve};

const EXIT_DECODE_FAILED: i32 = 1;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(exit_code);
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `intake --help` for usage."));
            }
        },
    };

    init_tracing();

    match cli.command {
        Command::Serve(args) => run_serve(args),
        Command::Decode(args) => run_decode(args),
    }
}

#[derive(Parser)]
#[command(
    name = "intake",
    version,
    about = "Decode JSON request bodies with classified HTTP failures",
    long_about = None,
    after_help = r#"EXAMPLES
  $ intake serve --bind 127.0.0.1:9780
  $ curl -d '{"name":"Ada","age":36}' http://127.0.0.1:9780/v0/people
  $ echo '{"name":"Ada","age":"thirty"}' | intake decode --strict"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Serve the demo person endpoints over HTTP (loopback by default)")]
    Serve(ServeRunArgs),
    #[command(about = "Decode one person record from a file or stdin")]
    Decode(DecodeArgs),
}

#[derive(Args)]
struct ServeRunArgs {
    #[arg(long, default_value = "127.0.0.1:9780", help = "Bind address")]
    bind: String,
    #[arg(long, help = "Allow non-loopback binds")]
    allow_non_loopback: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, help = "Max request body size in bytes")]
    max_body_bytes: u64,
}

#[derive(Args)]
struct DecodeArgs {
    #[arg(help = "Input file (default: stdin)", value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
    #[arg(long, help = "Reject fields the person schema does not define")]
    strict: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, help = "Max input size in bytes")]
    max_body_bytes: u64,
}

fn run_serve(args: ServeRunArgs) -> Result<i32, Error> {
    let bind: SocketAddr = args.bind.parse().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid bind address: {}", args.bind))
            .with_hint("Use host:port, e.g. 127.0.0.1:9780.")
    })?;
    let config = ServeConfig {
        bind,
        allow_non_loopback: args.allow_non_loopback,
        max_body_bytes: args.max_body_bytes,
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to start async runtime")
                .with_source(err)
        })?;
    runtime.block_on(serve(config))?;
    Ok(0)
}

/// Captures the decoder's single response write for printing.
#[derive(Default)]
struct CapturedResponse {
    status: Option<u16>,
    message: Option<String>,
}

impl ResponseEmitter for CapturedResponse {
    fn write_bad_request(&mut self, message: &str) {
        self.write_error(400, message);
    }

    fn write_error(&mut self, status: u16, message: &str) {
        self.status = Some(status);
        self.message = Some(message.to_string());
    }

    fn write_internal_error(&mut self, message: &str) {
        self.write_error(500, message);
    }
}

fn run_decode(args: DecodeArgs) -> Result<i32, Error> {
    let limit = BodyLimit::new(args.max_body_bytes).ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message("--max-body-bytes must be greater than zero")
            .with_hint("Use a positive value like 1048576.")
    })?;
    let source: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(File::open(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to open {}", path.display()))
                .with_source(err)
        })?),
        None => Box::new(io::stdin().lock()),
    };

    let mut person = Person::default();
    let mut captured = CapturedResponse::default();
    let request = DecodeRequest::new(&mut person, limit.reader(source)).strict(args.strict);
    match decode(request, &mut captured, &TracingLogger) {
        Ok(()) => {
            emit_json(&json!({ "ok": true, "value": person }))?;
            Ok(0)
        }
        Err(kind) => {
            emit_json(&failure_json(&kind, &captured))?;
            Ok(EXIT_DECODE_FAILED)
        }
    }
}

fn failure_json(kind: &FailureKind, captured: &CapturedResponse) -> Value {
    json!({
        "error": {
            "kind": kind.label(),
            "status": captured.status.unwrap_or_else(|| kind.status()),
            "message": captured.message.clone().unwrap_or_else(|| kind.message()),
        }
    })
}

fn emit_json(value: &Value) -> Result<(), Error> {
    let text = serde_json::to_string_pretty(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output")
            .with_source(err)
    })?;
    println!("{text}");
    Ok(())
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error: ").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_error(err: &Error) {
    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

#[cfg(test)]
mod tests {
    use super::{CapturedResponse, error_json, failure_json};
    use intake::api::{Error, ErrorKind, FailureKind, ResponseEmitter};

    #[test]
    fn error_json_includes_hint_and_causes() {
        let err = Error::new(ErrorKind::Io)
            .with_message("failed to open body.json")
            .with_hint("Check the path.")
            .with_source(std::io::Error::other("no such file"));
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Io");
        assert_eq!(value["error"]["hint"], "Check the path.");
        assert_eq!(value["error"]["causes"][0], "no such file");
    }

    #[test]
    fn failure_json_uses_captured_write() {
        let mut captured = CapturedResponse::default();
        captured.write_error(413, "request body must not be larger than 1MB");
        let value = failure_json(&FailureKind::BodyTooLarge { limit: 1024 * 1024 }, &captured);
        assert_eq!(value["error"]["kind"], "BodyTooLarge");
        assert_eq!(value["error"]["status"], 413);
        assert_eq!(
            value["error"]["message"],
            "request body must not be larger than 1MB"
        );
    }
}
