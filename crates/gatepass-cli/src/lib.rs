//! Embeddable gate-pass command surface.
//!
//! The `gp` binary is a thin wrapper; host programs can embed the same
//! behavior through:
//! - [`run_cli`] for full parsed CLI execution.
//! - [`run_command_with_db`] for direct [`Command`] execution against a DB path.
//! - [`run_command`] for execution against an existing [`SqliteGatePassStore`].
//!
//! Every subcommand assumes the caller has already authenticated the actor
//! and checked their role; `--actor` is trusted input here, the same way
//! the original role-gated route handlers received a pre-verified user.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gatepass_core::{
    CreateGatePassRequest, GatePassStatus, GatePassType, HrEmployee, MaterialItem, Role,
    TransitionRequest,
};
use gatepass_store_sqlite::SqliteGatePassStore;

#[derive(Debug, Parser)]
#[command(name = "gp")]
#[command(about = "Gate pass approval workflow CLI")]
pub struct Cli {
    #[arg(long, default_value = "./gatepass.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// User management (admin surface).
    User {
        #[command(subcommand)]
        command: Box<UserCommand>,
    },
    /// Submit a new gate pass (client surface).
    Create(CreateArgs),
    /// Store manager decisions on pending requests.
    Store {
        #[command(subcommand)]
        command: Box<StoreCommand>,
    },
    /// Director decisions on store-verified requests.
    Director {
        #[command(subcommand)]
        command: Box<DirectorCommand>,
    },
    /// Security gate updates on director-approved requests.
    Security {
        #[command(subcommand)]
        command: Box<SecurityCommand>,
    },
    /// One gate pass with its line items.
    Show(IdArgs),
    /// All gate passes in one status, oldest first.
    Inbox(InboxArgs),
    /// All gate passes owned by one requester, newest first.
    Mine(MineArgs),
    /// Status history for one gate pass, oldest first.
    History(IdArgs),
    /// Approval step log for one gate pass, oldest first.
    Steps(IdArgs),
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    Add(UserAddArgs),
}

#[derive(Debug, Args)]
pub struct UserAddArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    role: RoleArg,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    requestor: i64,
    #[arg(long)]
    pass_type: PassTypeArg,
    #[arg(long)]
    date: String,
    #[arg(long)]
    destination: String,
    #[arg(long)]
    plate: Option<String>,
    #[arg(long)]
    returnable: bool,
    #[arg(long)]
    expected_return_date: Option<String>,
    #[arg(long)]
    employees: Option<u32>,
    #[arg(long)]
    time_duration: Option<String>,
    /// Material line item as CODE:NAME:QTY:UOM. Repeatable.
    #[arg(long = "item")]
    items: Vec<String>,
    /// Employee row as CODE:NAME:GENDER:POSITION:DURATION. Repeatable.
    #[arg(long = "employee")]
    employee_rows: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    Verify(DecisionArgs),
    Reject(DecisionArgs),
}

#[derive(Debug, Subcommand)]
pub enum DirectorCommand {
    Approve(DecisionArgs),
    Reject(DecisionArgs),
}

#[derive(Debug, Subcommand)]
pub enum SecurityCommand {
    Exit(DecisionArgs),
    Return(DecisionArgs),
}

#[derive(Debug, Args)]
pub struct DecisionArgs {
    #[arg(long)]
    id: i64,
    #[arg(long)]
    actor: i64,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    #[arg(long)]
    id: i64,
}

#[derive(Debug, Args)]
pub struct InboxArgs {
    #[arg(long)]
    status: StatusArg,
}

#[derive(Debug, Args)]
pub struct MineArgs {
    #[arg(long)]
    requestor: i64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Client,
    StoreManager,
    Director,
    Security,
    Admin,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PassTypeArg {
    Material,
    HumanResource,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Draft,
    PendingStoreVerification,
    VerifiedByStore,
    RejectedByStore,
    ApprovedByDirector,
    RejectedByDirector,
    Exited,
    Returned,
}

impl From<StatusArg> for GatePassStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Draft => Self::Draft,
            StatusArg::PendingStoreVerification => Self::PendingStoreVerification,
            StatusArg::VerifiedByStore => Self::VerifiedByStore,
            StatusArg::RejectedByStore => Self::RejectedByStore,
            StatusArg::ApprovedByDirector => Self::ApprovedByDirector,
            StatusArg::RejectedByDirector => Self::RejectedByDirector,
            StatusArg::Exited => Self::Exited,
            StatusArg::Returned => Self::Returned,
        }
    }
}

/// Executes the parsed top-level CLI command graph.
///
/// # Errors
/// Returns an error when the store cannot be opened or migrated, or when
/// the requested command fails.
pub fn run_cli(cli: Cli) -> Result<()> {
    run_command_with_db(&cli.db, cli.command)
}

/// Executes a parsed command using the provided `SQLite` DB path.
///
/// # Errors
/// Returns an error when store open/migrate fails or the command fails.
pub fn run_command_with_db(db_path: &std::path::Path, command: Command) -> Result<()> {
    let mut store = SqliteGatePassStore::open(db_path)?;
    store.migrate()?;
    run_command(command, &mut store)
}

/// Executes a parsed command against an existing store handle.
///
/// # Errors
/// Returns an error when validation, persistence, or retrieval fails.
pub fn run_command(command: Command, store: &mut SqliteGatePassStore) -> Result<()> {
    match command {
        Command::User { command } => match *command {
            UserCommand::Add(args) => {
                let role = match args.role {
                    RoleArg::Client => Role::Client,
                    RoleArg::StoreManager => Role::StoreManager,
                    RoleArg::Director => Role::Director,
                    RoleArg::Security => Role::Security,
                    RoleArg::Admin => Role::Admin,
                };
                let user_id = store.add_user(&args.full_name, role)?;
                let user = store
                    .get_user(user_id)?
                    .ok_or_else(|| anyhow!("user {user_id} vanished after insert"))?;
                println!("{}", serde_json::to_string_pretty(&user)?);
                Ok(())
            }
        },
        Command::Create(args) => {
            let request = build_create_request(&args)?;
            let gate_pass_id = store.create(args.requestor, &request)?;
            print_detail(store, gate_pass_id)
        }
        Command::Store { command } => match *command {
            StoreCommand::Verify(args) => run_decision(
                store,
                &args,
                GatePassStatus::PendingStoreVerification,
                GatePassStatus::VerifiedByStore,
                "Verified by store manager",
            ),
            StoreCommand::Reject(args) => run_decision(
                store,
                &args,
                GatePassStatus::PendingStoreVerification,
                GatePassStatus::RejectedByStore,
                "Rejected by store manager",
            ),
        },
        Command::Director { command } => match *command {
            DirectorCommand::Approve(args) => run_decision(
                store,
                &args,
                GatePassStatus::VerifiedByStore,
                GatePassStatus::ApprovedByDirector,
                "Approved by director",
            ),
            DirectorCommand::Reject(args) => run_decision(
                store,
                &args,
                GatePassStatus::VerifiedByStore,
                GatePassStatus::RejectedByDirector,
                "Rejected by director",
            ),
        },
        Command::Security { command } => match *command {
            SecurityCommand::Exit(args) => run_decision(
                store,
                &args,
                GatePassStatus::ApprovedByDirector,
                GatePassStatus::Exited,
                "Marked as exited by security",
            ),
            SecurityCommand::Return(args) => run_decision(
                store,
                &args,
                GatePassStatus::ApprovedByDirector,
                GatePassStatus::Returned,
                "Marked as returned by security",
            ),
        },
        Command::Show(args) => print_detail(store, args.id),
        Command::Inbox(args) => {
            let passes = store.list_by_status(args.status.into())?;
            println!("{}", serde_json::to_string_pretty(&passes)?);
            Ok(())
        }
        Command::Mine(args) => {
            let passes = store.list_for_requester(args.requestor)?;
            println!("{}", serde_json::to_string_pretty(&passes)?);
            Ok(())
        }
        Command::History(args) => {
            let history = store.history(args.id)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
            Ok(())
        }
        Command::Steps(args) => {
            let steps = store.approval_steps(args.id)?;
            println!("{}", serde_json::to_string_pretty(&steps)?);
            Ok(())
        }
    }
}

fn run_decision(
    store: &mut SqliteGatePassStore,
    args: &DecisionArgs,
    expected_from: GatePassStatus,
    to: GatePassStatus,
    default_note: &str,
) -> Result<()> {
    let request = TransitionRequest {
        gate_pass_id: args.id,
        expected_from,
        to,
        actor_user_id: args.actor,
        note: Some(
            args.note
                .clone()
                .unwrap_or_else(|| default_note.to_string()),
        ),
    };
    store.transition(&request)?;
    print_detail(store, args.id)
}

fn print_detail(store: &SqliteGatePassStore, gate_pass_id: i64) -> Result<()> {
    let detail = store
        .get(gate_pass_id)?
        .ok_or_else(|| anyhow!("gate pass {gate_pass_id} not found"))?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

fn build_create_request(args: &CreateArgs) -> Result<CreateGatePassRequest> {
    let material_items = args
        .items
        .iter()
        .map(|raw| parse_material_item(raw))
        .collect::<Result<Vec<_>>>()?;
    let hr_employees = args
        .employee_rows
        .iter()
        .map(|raw| parse_employee(raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(CreateGatePassRequest {
        pass_type: match args.pass_type {
            PassTypeArg::Material => GatePassType::Material,
            PassTypeArg::HumanResource => GatePassType::HumanResource,
        },
        gate_pass_date: args.date.clone(),
        destination: args.destination.clone(),
        vehicle_plate_number: args.plate.clone(),
        returnable: args.returnable,
        expected_return_date: args.expected_return_date.clone(),
        number_of_employees: args.employees,
        time_duration: args.time_duration.clone(),
        material_items,
        hr_employees,
    })
}

fn parse_material_item(raw: &str) -> Result<MaterialItem> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [code, name, quantity, uom] = parts.as_slice() else {
        return Err(anyhow!("--item must be in CODE:NAME:QTY:UOM format, got {raw}"));
    };

    let quantity: f64 = quantity
        .parse()
        .with_context(|| format!("invalid item quantity: {quantity}"))?;

    Ok(MaterialItem {
        item_code: (*code).to_string(),
        item_name: (*name).to_string(),
        quantity,
        unit_of_measurement: (*uom).to_string(),
    })
}

fn parse_employee(raw: &str) -> Result<HrEmployee> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [code, name, gender, position, duration] = parts.as_slice() else {
        return Err(anyhow!(
            "--employee must be in CODE:NAME:GENDER:POSITION:DURATION format, got {raw}"
        ));
    };

    Ok(HrEmployee {
        employee_code: (*code).to_string(),
        full_name: (*name).to_string(),
        gender: (*gender).to_string(),
        position: (*position).to_string(),
        time_duration: (*duration).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_item_arg_round_trips() {
        let item = match parse_material_item("ITM-1:Steel pipe:4.5:pcs") {
            Ok(value) => value,
            Err(err) => panic!("parse failed: {err}"),
        };
        assert_eq!(item.item_code, "ITM-1");
        assert_eq!(item.item_name, "Steel pipe");
        assert!((item.quantity - 4.5).abs() < f64::EPSILON);
        assert_eq!(item.unit_of_measurement, "pcs");
    }

    #[test]
    fn malformed_item_arg_is_rejected() {
        assert!(parse_material_item("only:three:parts").is_err());
        assert!(parse_material_item("a:b:not-a-number:pcs").is_err());
        assert!(parse_material_item("a:b:1:pcs:extra").is_err());
    }

    #[test]
    fn employee_arg_round_trips() {
        let employee = match parse_employee("EMP-9:R. Tesfaye:F:Electrician:2 days") {
            Ok(value) => value,
            Err(err) => panic!("parse failed: {err}"),
        };
        assert_eq!(employee.employee_code, "EMP-9");
        assert_eq!(employee.position, "Electrician");
    }

    #[test]
    fn malformed_employee_arg_is_rejected() {
        assert!(parse_employee("EMP-9:name:F:pos").is_err());
    }
}
