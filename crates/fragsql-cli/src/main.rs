//! fragsql CLI
//!
//! Builds statements from JSON arguments and either prints or runs them.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use fragsql_core::{Combinator, Fragment, Input, QueryBuilder, Value};
use fragsql_db::{dialect_for, ConnectionInfo, Db, DbOptions, QueryResult, SqlMode, SqliteExecutor};

/// Build and run parameterized SQL from loosely-typed arguments.
#[derive(Parser)]
#[command(name = "fragsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Dialect used by `render` (sqlite, mysql, generic).
    #[arg(long, default_value = "sqlite")]
    dialect: String,

    /// Quote MySQL identifiers with backticks instead of double quotes.
    #[arg(long)]
    native_quotes: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a statement and its parameters without connecting.
    Render {
        #[command(subcommand)]
        statement: StatementCommand,
    },

    #[command(flatten)]
    Statement(StatementCommand),

    /// Quote a literal with the database's native escaping.
    Quote {
        /// Value to quote; JSON numbers and null are recognized.
        value: String,
    },

    /// Run raw SQL.
    Exec {
        /// SQL text with `?` placeholders.
        sql: String,

        /// JSON array of parameters.
        #[arg(short, long)]
        params: Option<String>,
    },
}

#[derive(Subcommand)]
enum StatementCommand {
    /// Select rows.
    Select {
        #[command(flatten)]
        query: QueryArgs,

        /// Columns or expressions to select.
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Insert one row (JSON object) or many (JSON array of objects).
    Insert {
        /// Target table.
        table: String,

        /// Row payload.
        #[arg(long)]
        data: String,

        /// Conflict handling.
        #[arg(long, value_enum, default_value_t = InsertMode::Insert)]
        mode: InsertMode,
    },

    /// Update rows.
    Update {
        #[command(flatten)]
        query: QueryArgs,

        /// JSON object of assignments.
        #[arg(long)]
        set: String,

        /// Allow updating without conditions.
        #[arg(long)]
        risky: bool,
    },

    /// Delete rows.
    Delete {
        #[command(flatten)]
        query: QueryArgs,

        /// Allow deleting without conditions.
        #[arg(long)]
        risky: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InsertMode {
    Insert,
    Replace,
    Ignore,
}

#[derive(Args)]
struct QueryArgs {
    /// Target table.
    table: String,

    /// Condition as JSON: an object, a `[field, value]` or
    /// `[field, comparator, value]` array, or raw SQL text. Repeatable.
    #[arg(short, long = "where")]
    wheres: Vec<String>,

    /// Condition starting a new OR group. Repeatable.
    #[arg(long)]
    or_where: Vec<String>,

    /// ORDER BY spec, e.g. `name`, `-created_at`, `age desc`. Repeatable.
    #[arg(long, allow_hyphen_values = true)]
    order: Vec<String>,

    /// GROUP BY spec. Repeatable.
    #[arg(long)]
    group: Vec<String>,

    /// Maximum number of rows.
    #[arg(long)]
    limit: Option<u64>,

    /// Rows to skip.
    #[arg(long)]
    offset: Option<u64>,
}

/// Parses JSON, treating anything that is not JSON as a plain string.
fn parse_json(s: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(s)
        .map_or_else(|_| Value::from(s), Value::from)
}

impl QueryArgs {
    fn apply(self, builder: QueryBuilder) -> QueryBuilder {
        let mut builder = builder.from(&self.table);
        for condition in &self.wheres {
            builder = builder.where_value(parse_json(condition));
        }
        for condition in &self.or_where {
            builder = builder.or_group().where_value(parse_json(condition));
        }
        for spec in &self.order {
            builder = builder.order(spec);
        }
        for spec in &self.group {
            builder = builder.group(spec);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if let Some(offset) = self.offset {
            builder = builder.offset(offset);
        }
        builder
    }
}

impl StatementCommand {
    fn apply(self, builder: QueryBuilder) -> anyhow::Result<QueryBuilder> {
        Ok(match self {
            Self::Select { query, columns } => {
                let builder = query.apply(builder);
                if columns.is_empty() {
                    builder
                } else {
                    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                    builder.columns(&columns)
                }
            }
            Self::Insert { table, data, mode } => {
                let payload = Input::from_value(parse_json(&data)).context("invalid --data")?;
                let builder = builder.from(&table);
                match mode {
                    InsertMode::Insert => builder.insert(payload),
                    InsertMode::Replace => builder.replace(payload),
                    InsertMode::Ignore => builder.insert_ignore(payload),
                }
            }
            Self::Update { query, set, risky } => {
                let payload = Input::from_value(parse_json(&set)).context("invalid --set")?;
                let builder = query.apply(builder).update(payload);
                if risky {
                    builder.risky()
                } else {
                    builder
                }
            }
            Self::Delete { query, risky } => {
                let builder = query.apply(builder).delete();
                if risky {
                    builder.risky()
                } else {
                    builder
                }
            }
        })
    }
}

async fn connect(database: &str, options: DbOptions) -> anyhow::Result<Db<SqliteExecutor>> {
    Db::connect(ConnectionInfo::new(database), options)
        .await
        .with_context(|| format!("failed to connect to {database}"))
}

fn print_result(mut result: QueryResult) -> anyhow::Result<()> {
    if result.columns().is_empty() {
        info!("{} row(s) affected", result.rows_affected());
        if let Some(id) = result.last_insert_id() {
            debug!(id, "Last insert id");
        }
    } else {
        let rows = result.fetch_all();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = DbOptions::default().sql_mode(if cli.native_quotes {
        SqlMode::Native
    } else {
        SqlMode::Ansi
    });

    match cli.command {
        Commands::Render { statement } => {
            let dialect = dialect_for(&cli.dialect, options.sql_mode)?;
            let statement = statement.apply(QueryBuilder::with_dialect(dialect))?.build()?;
            println!("{}", statement.sql());
            println!("{}", serde_json::to_string(statement.params())?);
            debug!("{}", statement.to_inline_sql());
        }
        Commands::Statement(statement) => {
            let db = connect(&cli.database, options).await?;
            let builder = statement.apply(db.builder())?;
            print_result(db.query(&builder).await?)?;
        }
        Commands::Quote { value } => {
            let db = connect(&cli.database, options).await?;
            let value = parse_json(&value).into_scalar()?;
            println!("{}", db.quote(&value).await?);
        }
        Commands::Exec { sql, params } => {
            let db = connect(&cli.database, options).await?;
            let params = match params.as_deref().map(parse_json) {
                Some(Value::List(values)) => values,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            let fragment = Fragment::conform((sql, params), Combinator::Newline)?;
            print_result(db.exec(fragment).await?)?;
        }
    }

    Ok(())
}
