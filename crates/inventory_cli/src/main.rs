//! Inventory command-line entry point.
//!
//! # Responsibility
//! - Open the configured database and dispatch one use case per invocation.
//! - Print API responses as pretty JSON; non-success statuses exit non-zero.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inventory_api::{
    employee_create, employee_index, employee_remove, employee_update, equipment_assign,
    equipment_categories, equipment_create, equipment_delete, equipment_export, equipment_index,
    equipment_restore, equipment_show, equipment_unassign, equipment_update, ApiResponse,
};
use inventory_core::db::open_db;
use inventory_core::{default_log_level, init_logging, load_fixtures, EquipmentFilter};
use log::info;
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "inventory", about = "Equipment inventory CLI", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "INVENTORY_DB_PATH", default_value = "inventory.sqlite3")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "INVENTORY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, env = "INVENTORY_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load demo employees and equipment
    Seed,
    /// List active equipment
    List(FilterArgs),
    /// List distinct categories of active equipment
    Categories,
    /// Export active equipment as csv or json
    Export(ExportArgs),
    Equipment(EquipmentCommand),
    Employee(EmployeeCommand),
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Exact category match
    #[arg(long)]
    category: Option<String>,

    /// Only equipment assigned to this employee UUID
    #[arg(long)]
    employee: Option<Uuid>,

    /// Created on or after this day (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Created on or before this day (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn into_filter(self) -> EquipmentFilter {
        EquipmentFilter {
            category: self.category,
            employee_id: self.employee,
            date_from: self.from,
            date_to: self.to,
        }
    }
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output format: csv or json
    format: String,

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Debug, Args)]
struct EquipmentCommand {
    #[command(subcommand)]
    command: EquipmentSubcommand,
}

#[derive(Debug, Subcommand)]
enum EquipmentSubcommand {
    Add(EquipmentArgs),
    /// Show one equipment record, soft-deleted included
    Show { id: String },
    /// Replace the writable fields of equipment
    Edit {
        id: String,
        #[command(flatten)]
        fields: EquipmentArgs,
    },
    /// Soft-delete equipment by UUID
    Delete { id: String },
    /// Restore soft-deleted equipment by UUID
    Restore { id: String },
    /// Assign equipment to an employee
    Assign { id: String, employee: String },
    /// Clear the assignment of equipment
    Unassign { id: String },
}

#[derive(Debug, Args)]
struct EquipmentArgs {
    /// Unique equipment number
    #[arg(long)]
    number: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Employee UUID to assign
    #[arg(long)]
    employee: Option<Uuid>,
}

impl EquipmentArgs {
    fn to_body(&self) -> String {
        json!({
            "name": self.name,
            "category": self.category,
            "number": self.number,
            "description": self.description,
            "employee": self.employee.map(|id| json!({ "id": id.to_string() })),
        })
        .to_string()
    }
}

#[derive(Debug, Args)]
struct EmployeeCommand {
    #[command(subcommand)]
    command: EmployeeSubcommand,
}

#[derive(Debug, Subcommand)]
enum EmployeeSubcommand {
    Add(EmployeeArgs),
    /// Replace an employee's fields, keeping its id
    Edit {
        id: String,
        #[command(flatten)]
        fields: EmployeeArgs,
    },
    List,
    /// Remove an employee, unassigning their equipment first
    Remove { id: String },
}

#[derive(Debug, Args)]
struct EmployeeArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    email: String,

    /// Hire date (YYYY-MM-DD)
    #[arg(long)]
    hired_at: NaiveDate,
}

impl EmployeeArgs {
    fn to_body(&self) -> String {
        json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "hiredAt": self.hired_at.format("%Y-%m-%d").to_string(),
        })
        .to_string()
    }
}

fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|error| format!("failed to init logging: {error}"))?;
    }

    let conn = open_db(&cli.db).map_err(|error| error.to_string())?;
    info!(
        "event=cli_command module=cli status=start db={}",
        cli.db.display()
    );

    match cli.command {
        Commands::Seed => seed(&conn),
        Commands::List(filter) => print_response(equipment_index(&conn, &filter.into_filter())),
        Commands::Categories => print_response(equipment_categories(&conn)),
        Commands::Export(args) => export(&conn, args),
        Commands::Equipment(command) => run_equipment(&conn, command.command),
        Commands::Employee(command) => run_employee(&conn, command.command),
    }
}

fn seed(conn: &Connection) -> Result<(), String> {
    let summary =
        load_fixtures(conn).map_err(|error| format!("failed to load fixtures: {error}"))?;
    println!(
        "seeded employees={} equipment={}",
        summary.employee_ids.len(),
        summary.equipment_ids.len()
    );
    Ok(())
}

fn export(conn: &Connection, args: ExportArgs) -> Result<(), String> {
    let response = equipment_export(conn, &args.format, &args.filter.into_filter());
    if response.status != 200 {
        return Err(format!(
            "export failed ({}): {}",
            response.status,
            String::from_utf8_lossy(&response.body)
        ));
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, &response.body)
                .map_err(|error| format!("failed to write {}: {error}", path.display()))?;
            println!(
                "wrote {} ({} bytes, {})",
                path.display(),
                response.body.len(),
                response.content_type
            );
        }
        None => print!("{}", String::from_utf8_lossy(&response.body)),
    }
    Ok(())
}

fn run_equipment(conn: &Connection, command: EquipmentSubcommand) -> Result<(), String> {
    let response = match command {
        EquipmentSubcommand::Add(args) => equipment_create(conn, &args.to_body()),
        EquipmentSubcommand::Show { id } => equipment_show(conn, &id),
        EquipmentSubcommand::Edit { id, fields } => equipment_update(conn, &id, &fields.to_body()),
        EquipmentSubcommand::Delete { id } => equipment_delete(conn, &id),
        EquipmentSubcommand::Restore { id } => equipment_restore(conn, &id),
        EquipmentSubcommand::Assign { id, employee } => equipment_assign(conn, &id, &employee),
        EquipmentSubcommand::Unassign { id } => equipment_unassign(conn, &id),
    };
    print_response(response)
}

fn run_employee(conn: &Connection, command: EmployeeSubcommand) -> Result<(), String> {
    let response = match command {
        EmployeeSubcommand::Add(args) => employee_create(conn, &args.to_body()),
        EmployeeSubcommand::Edit { id, fields } => employee_update(conn, &id, &fields.to_body()),
        EmployeeSubcommand::List => employee_index(conn),
        EmployeeSubcommand::Remove { id } => employee_remove(conn, &id),
    };
    print_response(response)
}

fn print_response(response: ApiResponse) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(&response.body)
        .map_err(|error| format!("failed to render response: {error}"))?;
    if !response.is_success() {
        return Err(format!("request failed ({}): {rendered}", response.status));
    }
    println!("{rendered}");
    Ok(())
}
