//! CupidDB CLI Client
//!
//! Command-line interface for interacting with a CupidDB server.

use std::time::Duration;

use arrow::util::pretty::pretty_format_batches;
use clap::{Parser, Subcommand};
use cupiddb::{Client, ClientConfig, CupidError, FilterLogic, Query, RowFilter, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// CupidDB CLI
#[derive(Parser, Debug)]
#[command(name = "cupiddb-cli")]
#[command(about = "CLI for the CupidDB key-value store")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, env = "CUPIDDB_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, env = "CUPIDDB_PORT", default_value = "5995")]
    port: u16,

    /// Payload read chunk size in KiB
    #[arg(long, default_value = "64")]
    chunk_kb: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        key: String,
    },

    /// Store an integer
    SetInt {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
        /// Time to live in seconds (0 = never expires)
        #[arg(short, long, default_value = "0")]
        ttl: f64,
    },

    /// Store a float
    SetFloat {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(short, long, default_value = "0")]
        ttl: f64,
    },

    /// Store a string as a blob
    SetStr {
        key: String,
        value: String,
        #[arg(short, long, default_value = "0")]
        ttl: f64,
    },

    /// Add to an integer value
    Incr {
        key: String,
        #[arg(allow_negative_numbers = true, default_value = "1")]
        delta: i64,
    },

    /// Add to a float value
    IncrFloat {
        key: String,
        #[arg(allow_negative_numbers = true, default_value = "1.0")]
        delta: f64,
    },

    /// Delete a key
    Del {
        key: String,
    },

    /// Delete several keys
    DelMany {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Reset the TTL of a key
    Touch {
        key: String,
        /// New time to live in seconds (0 = never expires)
        ttl: f64,
    },

    /// Show the remaining TTL of a key
    Ttl {
        key: String,
    },

    /// List keys, optionally matching a glob pattern
    Keys {
        pattern: Option<String>,
    },

    /// Query a table value
    Query {
        key: String,

        /// Columns to return (default: all)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Row filter as column:op:type:value, e.g. c0:gte:float:0.5
        #[arg(short, long)]
        filter: Vec<String>,

        /// Combine filters with OR instead of AND
        #[arg(long)]
        or: bool,

        /// Cache the result on the server for this many seconds
        #[arg(long, default_value = "0")]
        cache: f64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,cupiddb=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> cupiddb::Result<()> {
    let config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .chunk_kb(args.chunk_kb)
        .build();

    let client = Client::connect(&config)?;
    let result = execute(&client, args.command);
    client.close()?;
    result
}

fn execute(client: &Client, command: Commands) -> cupiddb::Result<()> {
    match command {
        Commands::Get { key } => match client.get(&key)? {
            Some(Value::Integer(v)) => println!("{}", v),
            Some(Value::Float(v)) => println!("{}", v),
            Some(value @ Value::Blob(_)) => match value.decode_blob::<String>() {
                Ok(text) => println!("{}", text),
                Err(_) => println!("<blob>"),
            },
            Some(Value::Table(table)) => print_table(&table)?,
            None => println!("(nil)"),
        },
        Commands::SetInt { key, value, ttl } => {
            client.set_int(&key, value, seconds(ttl)?)?;
            println!("OK");
        }
        Commands::SetFloat { key, value, ttl } => {
            client.set_float(&key, value, seconds(ttl)?)?;
            println!("OK");
        }
        Commands::SetStr { key, value, ttl } => {
            client.set_blob(&key, &value, seconds(ttl)?)?;
            println!("OK");
        }
        Commands::Incr { key, delta } => println!("{}", client.incr(&key, delta)?),
        Commands::IncrFloat { key, delta } => println!("{}", client.incr_float(&key, delta)?),
        Commands::Del { key } => println!("{}", client.delete(&key)?),
        Commands::DelMany { keys } => println!("{}", client.delete_many(keys)?),
        Commands::Touch { key, ttl } => println!("{}", client.touch(&key, seconds(ttl)?)?),
        Commands::Ttl { key } => match client.ttl(&key)? {
            Some(ttl) => println!("{}", ttl),
            None => println!("(nil)"),
        },
        Commands::Keys { pattern } => {
            let keys = match pattern {
                Some(pattern) => client.keys_matching(&pattern)?,
                None => client.keys()?,
            };
            for key in keys {
                println!("{}", key);
            }
        }
        Commands::Query {
            key,
            columns,
            filter,
            or,
            cache,
        } => {
            let filters = filter
                .iter()
                .map(|text| parse_filter(text))
                .collect::<cupiddb::Result<Vec<_>>>()?;
            let query = Query::new(key)
                .columns(columns)
                .filters(filters)
                .logic(if or { FilterLogic::Or } else { FilterLogic::And })
                .cache_for(seconds(cache)?);

            match client.query(query)? {
                Some(table) => print_table(&table)?,
                None => println!("(nil)"),
            }
        }
    }
    Ok(())
}

/// Parse `column:op:type:value`; the value may itself contain colons
fn parse_filter(text: &str) -> cupiddb::Result<RowFilter> {
    let parts: Vec<&str> = text.splitn(4, ':').collect();
    let [column, op, data_type, value] = parts[..] else {
        return Err(CupidError::InvalidFilter(format!(
            "expected column:op:type:value, got {:?}",
            text
        )));
    };
    let data_type: cupiddb::FilterType = data_type.parse()?;
    RowFilter::typed(column, op.parse()?, data_type.parse_value(value)?, data_type)
}

fn seconds(secs: f64) -> cupiddb::Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| CupidError::Config(format!("invalid duration {}: {}", secs, e)))
}

fn print_table(table: &arrow::record_batch::RecordBatch) -> cupiddb::Result<()> {
    println!("{}", pretty_format_batches(std::slice::from_ref(table))?);
    Ok(())
}
