//! # flagfig demo application
//!
//! A sample CLI tool that exercises flagfig end to end. It does not fetch or
//! serve anything; every command prints what it was asked to do.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagfig_demo -- get https://example.com
//! cargo run --example flagfig_demo -- --describe serve
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                 | How to exercise it                                                       |
//! |-------------------------|--------------------------------------------------------------------------|
//! | Defaults                | `cargo run --example flagfig_demo -- get url`                            |
//! | Env binding             | `DEMO_TIMEOUT=5s cargo run --example flagfig_demo -- get url`            |
//! | Env list delimiter      | `DEMO_TAGS=a,b cargo run --example flagfig_demo -- get url`              |
//! | Namespaced group        | `cargo run --example flagfig_demo -- --server.port 9000 serve`           |
//! | Namespaced env          | `DEMO_SERVER_HOST=0.0.0.0 cargo run --example flagfig_demo -- serve`     |
//! | Short cluster           | `cargo run --example flagfig_demo -- -vt 2s get url`                     |
//! | Map option              | `cargo run --example flagfig_demo -- get -H accept:json -H x:1 url`      |
//! | Choices                 | `cargo run --example flagfig_demo -- get --method PATCH url` (rejected)  |
//! | Command alias           | `cargo run --example flagfig_demo -- g url`                              |
//! | Defaults file           | `ENV_FILENAME=demo.env cargo run --example flagfig_demo -- get url`      |
//! | Schema description      | `cargo run --example flagfig_demo -- --describe serve`                   |
//! | Debug logging           | `RUST_LOG=flagfig=debug cargo run --example flagfig_demo -- get url`     |

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use flagfig::{BoxError, Command, Commander, Describe, Field, Flagfig, Group, Options};

#[derive(Debug, Default)]
struct Demo {
    verbose: bool,
    describe: bool,
    timeout: Duration,
    tags: Vec<String>,
    server: Server,
    get: Get,
    serve: Serve,
}

#[derive(Debug, Default)]
struct Server {
    host: String,
    port: u16,
}

#[derive(Debug, Default)]
struct Get {
    method: String,
    headers: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Serve {
    workers: Option<usize>,
}

impl Options for Demo {
    fn describe(d: &mut Describe<Self>) {
        d.field(
            Field::new("verbose", |o: &mut Self| &mut o.verbose)
                .long("verbose")
                .short('v')
                .description("Print the parsed options"),
        )
        .field(
            Field::new("describe", |o: &mut Self| &mut o.describe)
                .long("describe")
                .description("Print the option schema as JSON"),
        )
        .field(
            Field::new("timeout", |o: &mut Self| &mut o.timeout)
                .long("timeout")
                .short('t')
                .env("DEMO_TIMEOUT")
                .default("30s")
                .value_name("DURATION"),
        )
        .field(
            Field::new("tags", |o: &mut Self| &mut o.tags)
                .long("tag")
                .env("DEMO_TAGS")
                .env_delim(','),
        )
        .group(
            Group::new("Server", |o: &mut Self| &mut o.server)
                .namespace("server")
                .env_namespace("DEMO_SERVER"),
        )
        .command(
            Command::new("get", |o: &mut Self| &mut o.get)
                .alias("g")
                .description("Fetch a URL"),
        )
        .command(Command::new("serve", |o: &mut Self| &mut o.serve).description("Run a server"));
    }
}

impl Options for Server {
    fn describe(d: &mut Describe<Self>) {
        d.field(
            Field::new("host", |o: &mut Self| &mut o.host)
                .long("host")
                .env("HOST")
                .default("127.0.0.1"),
        )
        .field(
            Field::new("port", |o: &mut Self| &mut o.port)
                .long("port")
                .env("PORT")
                .default("8080"),
        );
    }
}

impl Options for Get {
    fn describe(d: &mut Describe<Self>) {
        d.field(
            Field::new("method", |o: &mut Self| &mut o.method)
                .long("method")
                .short('X')
                .default("GET")
                .choices(["GET", "HEAD", "POST"]),
        )
        .field(
            Field::new("headers", |o: &mut Self| &mut o.headers)
                .long("header")
                .short('H')
                .value_name("NAME:VALUE"),
        );
    }
}

impl Commander for Get {
    fn execute(&mut self, args: &[String]) -> Result<(), BoxError> {
        let [url] = args else {
            return Err(format!("get expects one URL, got {}", args.len()).into());
        };
        println!("{} {url}", self.method);
        for (name, value) in &self.headers {
            println!("  {name}: {value}");
        }
        Ok(())
    }
}

impl Options for Serve {
    fn describe(d: &mut Describe<Self>) {
        d.field(
            Field::new("workers", |o: &mut Self| &mut o.workers)
                .long("workers")
                .short('w')
                .optional_value("4"),
        );
    }
}

impl Commander for Serve {
    fn execute(&mut self, _args: &[String]) -> Result<(), BoxError> {
        match self.workers {
            Some(n) => println!("serving with {n} workers"),
            None => println!("serving single-threaded"),
        }
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let mut parser = match Flagfig::parser::<Demo>().build() {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut demo = Demo::default();
    if parser.parse(&mut demo).is_err() {
        return ExitCode::FAILURE;
    }

    if demo.describe {
        match parser.describe_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
    if demo.verbose {
        info!(?demo, "parsed options");
        println!(
            "timeout={:?} tags={:?} server={}:{}",
            demo.timeout, demo.tags, demo.server.host, demo.server.port
        );
    }
    ExitCode::SUCCESS
}
