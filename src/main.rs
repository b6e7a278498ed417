use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Table as ComfyTable};
use rtdbsql::{Connection, ConnectionConfig, LogConfig, MemoryStore, QueryResult, Row, Statement, Store};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// rtdbsql - SQL shell over a JSON key-value store
#[derive(Parser, Debug)]
#[command(name = "rtdbsql")]
#[command(about = "Run SQL against a schemaless hierarchical JSON store", long_about = None)]
struct Args {
    /// Config file (default: /etc/rtdbsql/rtdbsql.toml or ./rtdbsql.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON document backing the store
    #[arg(long)]
    data: Option<PathBuf>,

    /// Path under which tables live, e.g. app/prod
    #[arg(long)]
    root: Option<String>,

    /// Account email submitted to the store
    #[arg(short = 'U', long)]
    user: Option<String>,

    #[arg(short = 'W', long)]
    password: Option<String>,

    /// Run these statements (separated by ';') and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write the store back to the data file on exit
    #[arg(long)]
    save: bool,
}

impl Args {
    /// CLI args override everything else
    fn apply(&self, mut config: ConnectionConfig) -> ConnectionConfig {
        if let Some(root) = &self.root {
            config.root.clone_from(root);
        }
        if let Some(user) = &self.user {
            config.username = Some(user.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(data) = &self.data {
            config.data_file = Some(data.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.apply(ConnectionConfig::load(args.config.as_deref())?);
    LogConfig::default().with_level(config.log_level.clone()).init();

    let mut store = match &config.data_file {
        Some(path) if path.exists() => MemoryStore::from_file(&config.root, path)?,
        _ => MemoryStore::new(&config.root),
    };
    let credentials = config.credentials().unwrap_or_default();
    if config.username.is_some() {
        store = store.with_credentials(credentials.clone());
    }
    let store = Arc::new(store);

    let conn = Connection::open(Arc::clone(&store) as Arc<dyn Store>, credentials);
    conn.ready().await?;

    let outcome = match &args.command {
        Some(sql) => run_batch(&conn, sql, args.json).await,
        None => run_repl(&conn, args.json).await,
    };

    if args.save {
        if let Some(path) = &config.data_file {
            store.save_to(path).await?;
            info!(path = %path.display(), "Store saved");
        }
    }

    conn.close().await?;
    outcome
}

async fn run_batch(conn: &Connection, sql: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    for statement in split_statements(sql) {
        let result = conn.query(statement).await?;
        print!("{}", format_result(&result, json)?);
    }
    Ok(())
}

async fn run_repl(conn: &Connection, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;

    let history_file = dirs::home_dir().map(|mut p| {
        p.push(".rtdbsql_history");
        p
    });
    if let Some(ref path) = history_file {
        let _ = rl.load_history(path); // Ignore error if file doesn't exist
    }

    println!("rtdbsql {} - type \\? for help, \\q to quit.", env!("CARGO_PKG_VERSION"));

    loop {
        match rl.readline("rtdbsql> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "\\q" | "\\quit" | "quit" | "exit" => break,
                    "\\?" | "\\h" | "\\help" => {
                        print_help();
                        continue;
                    }
                    _ => {}
                }

                for statement in split_statements(line) {
                    match conn.query(statement).await {
                        Ok(result) => match format_result(&result, json) {
                            Ok(text) => print!("{text}"),
                            Err(e) => eprintln!("Error: {e}"),
                        },
                        Err(e) => eprintln!("Error: {e}"),
                    }
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    if let Some(ref path) = history_file {
        let _ = rl.save_history(path);
    }
    debug!("REPL finished");
    Ok(())
}

fn print_help() {
    println!("Meta-commands:");
    println!("  \\q, \\quit          - Quit");
    println!("  \\?, \\h, \\help      - Show this help");
    println!("\nSQL: SELECT ... [JOIN ... ON ...] [WHERE] [GROUP BY] [ORDER BY] [LIMIT],");
    println!("     INSERT INTO t (cols) VALUES (...), UPDATE t SET ..., DELETE FROM t,");
    println!("     CREATE TABLE t, DROP TABLE t");
}

/// Split on `;` outside of quoted strings and identifiers
fn split_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in sql.char_indices() {
        match (quote, c) {
            (None, '\'' | '"' | '`') => quote = Some(c),
            (Some(q), _) if q == c => quote = None,
            (None, ';') => {
                statements.push(&sql[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    statements.push(&sql[start..]);

    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn format_result(result: &QueryResult, json: bool) -> Result<String, serde_json::Error> {
    Ok(match result {
        QueryResult::Rows(rows) if json => {
            let values: Vec<serde_json::Value> = rows.iter().map(serde_json::Value::from).collect();
            format!("{}\n", serde_json::to_string_pretty(&values)?)
        }
        QueryResult::Rows(rows) => format_rows(rows),
        QueryResult::Ids(ids) if json => {
            format!("{}\n", serde_json::to_string(ids)?)
        }
        QueryResult::Ids(ids) => {
            let mut out = String::new();
            for id in ids {
                out.push_str(&format!("{id}\n"));
            }
            out.push_str(&format!("({} rows affected)\n", ids.len()));
            out
        }
        QueryResult::Success(msg) => format!("{msg}\n"),
        QueryResult::Statement(Statement::Other { verb, .. }) => {
            format!("{} ignored\n", verb.to_uppercase())
        }
        QueryResult::Statement(stmt) => format!("{} ignored\n", stmt.kind().to_uppercase()),
    })
}

/// Rows are schemaless: the header is every column seen, in first-seen order
fn format_rows(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "(0 rows)\n".to_string();
    }

    let mut columns: Vec<&String> = Vec::new();
    for row in rows {
        for column in row.columns() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }

    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);
    table.set_header(columns.iter().map(|c| Cell::new(c)));
    for row in rows {
        table.add_row(columns.iter().map(|c| Cell::new(row.get(c))));
    }

    format!("{}\n({} rows)\n", table, rows.len())
}
