//! `SQLite` persistence and the transactional transition engine for gate
//! passes.
//!
//! Every workflow edge routes through [`SqliteGatePassStore::transition`]:
//! a single IMMEDIATE transaction that checks the expected-status
//! precondition, flips the status, and appends one `status_history` row
//! plus one `approval_steps` row. Both audit tables are append-only,
//! enforced by triggers.

#![allow(clippy::missing_errors_doc)]

use std::path::Path;

use gatepass_core::{
    format_rfc3339, now_utc, parse_rfc3339_utc, ApprovalStep, CreateGatePassRequest, GatePass,
    GatePassDetail, GatePassError, GatePassStatus, GatePassType, HrEmployee, MaterialItem,
    ReturnStatus, Role, StatusHistoryEntry, StepAction, TransitionRequest, User, WorkflowStep,
    SYSTEM_ACTOR,
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use ulid::Ulid;

const GATEPASS_MIGRATION_VERSION: i64 = 1;

/// Note recorded on the creation audit rows, mirroring the submit step.
const SUBMIT_NOTE: &str = "Client submitted request";

const SCHEMA_GATEPASS_V1: &str = r"
CREATE TABLE IF NOT EXISTS users (
  user_id INTEGER PRIMARY KEY AUTOINCREMENT,
  full_name TEXT NOT NULL,
  role TEXT NOT NULL CHECK (
    role IN ('CLIENT', 'STORE_MANAGER', 'DIRECTOR', 'SECURITY', 'ADMIN')
  ),
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gate_passes (
  gate_pass_id INTEGER PRIMARY KEY AUTOINCREMENT,
  pass_type TEXT NOT NULL CHECK (pass_type IN ('MATERIAL', 'HUMAN_RESOURCE')),
  requestor_id INTEGER NOT NULL,
  gate_pass_date TEXT NOT NULL,
  destination TEXT NOT NULL,
  vehicle_plate_number TEXT,
  returnable INTEGER NOT NULL DEFAULT 0 CHECK (returnable IN (0, 1)),
  expected_return_date TEXT,
  number_of_employees INTEGER CHECK (number_of_employees >= 1 OR number_of_employees IS NULL),
  time_duration TEXT,
  status TEXT NOT NULL CHECK (
    status IN (
      'DRAFT',
      'PENDING_STORE_VERIFICATION',
      'VERIFIED_BY_STORE',
      'REJECTED_BY_STORE',
      'APPROVED_BY_DIRECTOR',
      'REJECTED_BY_DIRECTOR',
      'EXITED',
      'RETURNED'
    )
  ),
  return_status TEXT NOT NULL CHECK (
    return_status IN ('PENDING_RETURN', 'NOT_APPLICABLE')
  ),
  created_at TEXT NOT NULL,
  FOREIGN KEY (requestor_id) REFERENCES users(user_id)
);

CREATE INDEX IF NOT EXISTS idx_gate_passes_status
  ON gate_passes(status, gate_pass_id);
CREATE INDEX IF NOT EXISTS idx_gate_passes_requestor
  ON gate_passes(requestor_id, gate_pass_id);

CREATE TABLE IF NOT EXISTS material_items (
  item_seq INTEGER PRIMARY KEY AUTOINCREMENT,
  gate_pass_id INTEGER NOT NULL,
  item_code TEXT NOT NULL,
  item_name TEXT NOT NULL,
  quantity REAL NOT NULL CHECK (quantity > 0),
  unit_of_measurement TEXT NOT NULL,
  FOREIGN KEY (gate_pass_id) REFERENCES gate_passes(gate_pass_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_material_items_gate_pass
  ON material_items(gate_pass_id, item_seq);

CREATE TABLE IF NOT EXISTS hr_employees (
  employee_seq INTEGER PRIMARY KEY AUTOINCREMENT,
  gate_pass_id INTEGER NOT NULL,
  employee_code TEXT NOT NULL,
  full_name TEXT NOT NULL,
  gender TEXT NOT NULL,
  position TEXT NOT NULL,
  time_duration TEXT NOT NULL,
  FOREIGN KEY (gate_pass_id) REFERENCES gate_passes(gate_pass_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_hr_employees_gate_pass
  ON hr_employees(gate_pass_id, employee_seq);

CREATE TABLE IF NOT EXISTS status_history (
  entry_seq INTEGER PRIMARY KEY AUTOINCREMENT,
  entry_id TEXT NOT NULL UNIQUE,
  gate_pass_id INTEGER NOT NULL,
  from_status TEXT CHECK (
    from_status IN (
      'DRAFT',
      'PENDING_STORE_VERIFICATION',
      'VERIFIED_BY_STORE',
      'REJECTED_BY_STORE',
      'APPROVED_BY_DIRECTOR',
      'REJECTED_BY_DIRECTOR',
      'EXITED',
      'RETURNED'
    ) OR from_status IS NULL
  ),
  to_status TEXT NOT NULL CHECK (
    to_status IN (
      'DRAFT',
      'PENDING_STORE_VERIFICATION',
      'VERIFIED_BY_STORE',
      'REJECTED_BY_STORE',
      'APPROVED_BY_DIRECTOR',
      'REJECTED_BY_DIRECTOR',
      'EXITED',
      'RETURNED'
    )
  ),
  actor_user_id INTEGER,
  note TEXT,
  recorded_at TEXT NOT NULL,
  FOREIGN KEY (gate_pass_id) REFERENCES gate_passes(gate_pass_id) ON DELETE CASCADE,
  FOREIGN KEY (actor_user_id) REFERENCES users(user_id)
);

CREATE TRIGGER IF NOT EXISTS trg_status_history_no_update
BEFORE UPDATE ON status_history
BEGIN
  SELECT RAISE(FAIL, 'status_history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS trg_status_history_no_delete
BEFORE DELETE ON status_history
BEGIN
  SELECT RAISE(FAIL, 'status_history is append-only');
END;

CREATE INDEX IF NOT EXISTS idx_status_history_gate_pass
  ON status_history(gate_pass_id, entry_seq);

CREATE TABLE IF NOT EXISTS approval_steps (
  step_seq INTEGER PRIMARY KEY AUTOINCREMENT,
  entry_id TEXT NOT NULL UNIQUE,
  gate_pass_id INTEGER NOT NULL,
  step TEXT NOT NULL CHECK (
    step IN ('CLIENT_SUBMIT', 'STORE_VERIFY', 'DIRECTOR_APPROVE', 'SECURITY_UPDATE')
  ),
  action TEXT NOT NULL CHECK (
    action IN ('SUBMITTED', 'VERIFIED', 'REJECTED', 'APPROVED', 'EXITED', 'RETURNED')
  ),
  actor_user_id INTEGER,
  note TEXT,
  recorded_at TEXT NOT NULL,
  FOREIGN KEY (gate_pass_id) REFERENCES gate_passes(gate_pass_id) ON DELETE CASCADE,
  FOREIGN KEY (actor_user_id) REFERENCES users(user_id)
);

CREATE TRIGGER IF NOT EXISTS trg_approval_steps_no_update
BEFORE UPDATE ON approval_steps
BEGIN
  SELECT RAISE(FAIL, 'approval_steps is append-only');
END;

CREATE TRIGGER IF NOT EXISTS trg_approval_steps_no_delete
BEFORE DELETE ON approval_steps
BEGIN
  SELECT RAISE(FAIL, 'approval_steps is append-only');
END;

CREATE INDEX IF NOT EXISTS idx_approval_steps_gate_pass
  ON approval_steps(gate_pass_id, step_seq);
";

pub struct SqliteGatePassStore {
    conn: Connection,
}

impl SqliteGatePassStore {
    pub fn open(path: &Path) -> Result<Self, GatePassError> {
        let conn = Connection::open(path).map_err(|err| {
            storage(&format!("failed to open sqlite database at {}", path.display()), &err)
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|err| storage("failed to configure sqlite pragmas", &err))?;

        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<(), GatePassError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version INTEGER PRIMARY KEY,
                    applied_at TEXT NOT NULL
                );",
            )
            .map_err(|err| storage("failed to ensure schema_migrations exists", &err))?;

        self.conn
            .execute_batch(SCHEMA_GATEPASS_V1)
            .map_err(|err| storage("failed to apply gate pass schema", &err))?;

        let now = format_rfc3339(now_utc())?;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
                params![GATEPASS_MIGRATION_VERSION, now],
            )
            .map_err(|err| storage("failed to register gate pass schema migration", &err))?;

        Ok(())
    }

    pub fn add_user(&self, full_name: &str, role: Role) -> Result<i64, GatePassError> {
        if full_name.trim().is_empty() {
            return Err(GatePassError::Validation(
                "full_name MUST be provided".to_string(),
            ));
        }

        let now = format_rfc3339(now_utc())?;
        self.conn
            .execute(
                "INSERT INTO users(full_name, role, created_at) VALUES (?1, ?2, ?3)",
                params![full_name.trim(), role.as_str(), now],
            )
            .map_err(|err| storage("failed to insert user", &err))?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>, GatePassError> {
        self.conn
            .query_row(
                "SELECT user_id, full_name, role FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let role_raw: String = row.get(2)?;
                    let role = Role::parse(&role_raw)
                        .ok_or_else(|| invalid_column(2, &format!("invalid role: {role_raw}")))?;
                    Ok(User {
                        user_id: row.get(0)?,
                        full_name: row.get(1)?,
                        role,
                    })
                },
            )
            .optional()
            .map_err(|err| storage("failed to read user", &err))
    }

    /// Creates the gate-pass aggregate in one IMMEDIATE transaction: the
    /// header, its line items, and the two initial audit rows. On any
    /// failure nothing is persisted.
    pub fn create(
        &mut self,
        requestor_id: i64,
        request: &CreateGatePassRequest,
    ) -> Result<i64, GatePassError> {
        request.validate()?;

        let created_at = format_rfc3339(now_utc())?;
        let employee_count = request.employee_count();
        let return_status = ReturnStatus::for_returnable(request.returnable);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| storage("failed to start creation transaction", &err))?;

        let requestor_exists = tx
            .query_row(
                "SELECT 1 FROM users WHERE user_id = ?1",
                params![requestor_id],
                |_| Ok(()),
            )
            .optional()
            .map_err(|err| storage("failed to check requestor", &err))?
            .is_some();
        if !requestor_exists {
            return Err(GatePassError::Validation(format!(
                "requestor {requestor_id} is not a registered user"
            )));
        }

        tx.execute(
            "INSERT INTO gate_passes(
                pass_type, requestor_id, gate_pass_date, destination,
                vehicle_plate_number, returnable, expected_return_date,
                number_of_employees, time_duration, status, return_status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                request.pass_type.as_str(),
                requestor_id,
                request.gate_pass_date,
                request.destination,
                request.vehicle_plate_number,
                i64::from(request.returnable),
                request.expected_return_date,
                employee_count.map(i64::from),
                request.time_duration,
                GatePassStatus::PendingStoreVerification.as_str(),
                return_status.as_str(),
                created_at,
            ],
        )
        .map_err(|err| storage("failed to insert gate pass header", &err))?;

        let gate_pass_id = tx.last_insert_rowid();

        for item in &request.material_items {
            tx.execute(
                "INSERT INTO material_items(
                    gate_pass_id, item_code, item_name, quantity, unit_of_measurement
                 ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    gate_pass_id,
                    item.item_code,
                    item.item_name,
                    item.quantity,
                    item.unit_of_measurement,
                ],
            )
            .map_err(|err| storage("failed to insert material item", &err))?;
        }

        for employee in &request.hr_employees {
            tx.execute(
                "INSERT INTO hr_employees(
                    gate_pass_id, employee_code, full_name, gender, position, time_duration
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    gate_pass_id,
                    employee.employee_code,
                    employee.full_name,
                    employee.gender,
                    employee.position,
                    employee.time_duration,
                ],
            )
            .map_err(|err| storage("failed to insert employee row", &err))?;
        }

        append_history(
            &tx,
            gate_pass_id,
            None,
            GatePassStatus::PendingStoreVerification,
            Some(requestor_id),
            Some(SUBMIT_NOTE),
            &created_at,
        )?;
        append_step(
            &tx,
            gate_pass_id,
            WorkflowStep::ClientSubmit,
            StepAction::Submitted,
            Some(requestor_id),
            Some(SUBMIT_NOTE),
            &created_at,
        )?;

        tx.commit()
            .map_err(|err| storage("failed to commit creation transaction", &err))?;

        Ok(gate_pass_id)
    }

    /// The transition engine. One IMMEDIATE transaction per call: sqlite's
    /// writer lock serializes concurrent transitions on the same database,
    /// so the expected-status check below turns a racing second actor into
    /// a deterministic [`GatePassError::Conflict`].
    pub fn transition(&mut self, request: &TransitionRequest) -> Result<(), GatePassError> {
        let rule = request.validate()?;
        let recorded_at = format_rfc3339(now_utc())?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| storage("failed to start transition transaction", &err))?;

        let current_raw: Option<String> = tx
            .query_row(
                "SELECT status FROM gate_passes WHERE gate_pass_id = ?1",
                params![request.gate_pass_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| storage("failed to read gate pass status", &err))?;

        let Some(current_raw) = current_raw else {
            return Err(GatePassError::NotFound(request.gate_pass_id));
        };

        let actual = GatePassStatus::parse(&current_raw)
            .ok_or_else(|| GatePassError::Storage(format!("invalid persisted status: {current_raw}")))?;

        if actual != request.expected_from {
            // Dropping the transaction rolls back; the losing actor sees
            // both statuses and can re-fetch before retrying.
            return Err(GatePassError::Conflict {
                gate_pass_id: request.gate_pass_id,
                expected: request.expected_from,
                actual,
            });
        }

        tx.execute(
            "UPDATE gate_passes SET status = ?1 WHERE gate_pass_id = ?2",
            params![request.to.as_str(), request.gate_pass_id],
        )
        .map_err(|err| storage("failed to update gate pass status", &err))?;

        append_history(
            &tx,
            request.gate_pass_id,
            Some(request.expected_from),
            request.to,
            Some(request.actor_user_id),
            request.note.as_deref(),
            &recorded_at,
        )?;
        append_step(
            &tx,
            request.gate_pass_id,
            rule.step,
            rule.action,
            Some(request.actor_user_id),
            request.note.as_deref(),
            &recorded_at,
        )?;

        tx.commit()
            .map_err(|err| storage("failed to commit transition transaction", &err))?;

        Ok(())
    }

    pub fn get(&self, gate_pass_id: i64) -> Result<Option<GatePassDetail>, GatePassError> {
        let header = self
            .conn
            .query_row(
                &format!("{GATE_PASS_SELECT} WHERE gp.gate_pass_id = ?1"),
                params![gate_pass_id],
                parse_gate_pass_row,
            )
            .optional()
            .map_err(|err| storage("failed to read gate pass", &err))?;

        let Some(gate_pass) = header else {
            return Ok(None);
        };

        let material_items = self.material_items(gate_pass_id)?;
        let hr_employees = self.hr_employees(gate_pass_id)?;

        Ok(Some(GatePassDetail {
            gate_pass,
            material_items,
            hr_employees,
        }))
    }

    /// The per-role inbox: every gate pass currently in exactly `status`,
    /// oldest first.
    pub fn list_by_status(
        &self,
        status: GatePassStatus,
    ) -> Result<Vec<GatePass>, GatePassError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{GATE_PASS_SELECT} WHERE gp.status = ?1 ORDER BY gp.gate_pass_id ASC"
            ))
            .map_err(|err| storage("failed to prepare status query", &err))?;

        let rows = stmt
            .query_map(params![status.as_str()], parse_gate_pass_row)
            .map_err(|err| storage("failed to query gate passes by status", &err))?;

        collect_rows(rows)
    }

    /// The requester's own history view, newest first.
    pub fn list_for_requester(
        &self,
        requestor_id: i64,
    ) -> Result<Vec<GatePass>, GatePassError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{GATE_PASS_SELECT} WHERE gp.requestor_id = ?1 ORDER BY gp.gate_pass_id DESC"
            ))
            .map_err(|err| storage("failed to prepare requester query", &err))?;

        let rows = stmt
            .query_map(params![requestor_id], parse_gate_pass_row)
            .map_err(|err| storage("failed to query gate passes by requester", &err))?;

        collect_rows(rows)
    }

    /// Audit replay: every status change for one gate pass, oldest first,
    /// with the actor's display name joined in.
    pub fn history(&self, gate_pass_id: i64) -> Result<Vec<StatusHistoryEntry>, GatePassError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT
                    h.entry_seq, h.entry_id, h.gate_pass_id, h.from_status, h.to_status,
                    h.actor_user_id, u.full_name, h.note, h.recorded_at
                 FROM status_history h
                 LEFT JOIN users u ON h.actor_user_id = u.user_id
                 WHERE h.gate_pass_id = ?1
                 ORDER BY h.entry_seq ASC",
            )
            .map_err(|err| storage("failed to prepare history query", &err))?;

        let rows = stmt
            .query_map(params![gate_pass_id], parse_history_row)
            .map_err(|err| storage("failed to query status history", &err))?;

        collect_rows(rows)
    }

    /// The step-keyed audit log parallel to [`Self::history`].
    pub fn approval_steps(
        &self,
        gate_pass_id: i64,
    ) -> Result<Vec<ApprovalStep>, GatePassError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT
                    s.step_seq, s.entry_id, s.gate_pass_id, s.step, s.action,
                    s.actor_user_id, u.full_name, s.note, s.recorded_at
                 FROM approval_steps s
                 LEFT JOIN users u ON s.actor_user_id = u.user_id
                 WHERE s.gate_pass_id = ?1
                 ORDER BY s.step_seq ASC",
            )
            .map_err(|err| storage("failed to prepare approval step query", &err))?;

        let rows = stmt
            .query_map(params![gate_pass_id], parse_step_row)
            .map_err(|err| storage("failed to query approval steps", &err))?;

        collect_rows(rows)
    }

    fn material_items(&self, gate_pass_id: i64) -> Result<Vec<MaterialItem>, GatePassError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT item_code, item_name, quantity, unit_of_measurement
                 FROM material_items
                 WHERE gate_pass_id = ?1
                 ORDER BY item_seq ASC",
            )
            .map_err(|err| storage("failed to prepare material item query", &err))?;

        let rows = stmt
            .query_map(params![gate_pass_id], |row| {
                Ok(MaterialItem {
                    item_code: row.get(0)?,
                    item_name: row.get(1)?,
                    quantity: row.get(2)?,
                    unit_of_measurement: row.get(3)?,
                })
            })
            .map_err(|err| storage("failed to query material items", &err))?;

        collect_rows(rows)
    }

    fn hr_employees(&self, gate_pass_id: i64) -> Result<Vec<HrEmployee>, GatePassError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT employee_code, full_name, gender, position, time_duration
                 FROM hr_employees
                 WHERE gate_pass_id = ?1
                 ORDER BY employee_seq ASC",
            )
            .map_err(|err| storage("failed to prepare employee query", &err))?;

        let rows = stmt
            .query_map(params![gate_pass_id], |row| {
                Ok(HrEmployee {
                    employee_code: row.get(0)?,
                    full_name: row.get(1)?,
                    gender: row.get(2)?,
                    position: row.get(3)?,
                    time_duration: row.get(4)?,
                })
            })
            .map_err(|err| storage("failed to query employees", &err))?;

        collect_rows(rows)
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

const GATE_PASS_SELECT: &str = "SELECT
    gp.gate_pass_id, gp.pass_type, gp.requestor_id, u.full_name,
    gp.gate_pass_date, gp.destination, gp.vehicle_plate_number,
    gp.returnable, gp.expected_return_date, gp.number_of_employees,
    gp.time_duration, gp.status, gp.return_status, gp.created_at
 FROM gate_passes gp
 LEFT JOIN users u ON gp.requestor_id = u.user_id";

fn append_history(
    tx: &rusqlite::Transaction<'_>,
    gate_pass_id: i64,
    from_status: Option<GatePassStatus>,
    to_status: GatePassStatus,
    actor_user_id: Option<i64>,
    note: Option<&str>,
    recorded_at: &str,
) -> Result<(), GatePassError> {
    tx.execute(
        "INSERT INTO status_history(
            entry_id, gate_pass_id, from_status, to_status, actor_user_id, note, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            Ulid::new().to_string(),
            gate_pass_id,
            from_status.map(GatePassStatus::as_str),
            to_status.as_str(),
            actor_user_id,
            note,
            recorded_at,
        ],
    )
    .map_err(|err| storage("failed to append status history", &err))?;
    Ok(())
}

fn append_step(
    tx: &rusqlite::Transaction<'_>,
    gate_pass_id: i64,
    step: WorkflowStep,
    action: StepAction,
    actor_user_id: Option<i64>,
    note: Option<&str>,
    recorded_at: &str,
) -> Result<(), GatePassError> {
    tx.execute(
        "INSERT INTO approval_steps(
            entry_id, gate_pass_id, step, action, actor_user_id, note, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            Ulid::new().to_string(),
            gate_pass_id,
            step.as_str(),
            action.as_str(),
            actor_user_id,
            note,
            recorded_at,
        ],
    )
    .map_err(|err| storage("failed to append approval step", &err))?;
    Ok(())
}

fn parse_gate_pass_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GatePass> {
    let pass_type_raw: String = row.get(1)?;
    let pass_type = GatePassType::parse(&pass_type_raw)
        .ok_or_else(|| invalid_column(1, &format!("invalid pass_type: {pass_type_raw}")))?;

    let status_raw: String = row.get(11)?;
    let status = GatePassStatus::parse(&status_raw)
        .ok_or_else(|| invalid_column(11, &format!("invalid status: {status_raw}")))?;

    let return_status_raw: String = row.get(12)?;
    let return_status = ReturnStatus::parse(&return_status_raw)
        .ok_or_else(|| invalid_column(12, &format!("invalid return_status: {return_status_raw}")))?;

    let number_of_employees = row
        .get::<_, Option<i64>>(9)?
        .map(|value| {
            u32::try_from(value)
                .map_err(|_| invalid_column(9, &format!("invalid employee count: {value}")))
        })
        .transpose()?;

    let created_raw: String = row.get(13)?;
    let created_at = parse_rfc3339_utc(&created_raw)
        .map_err(|err| invalid_column(13, &err.to_string()))?;

    Ok(GatePass {
        gate_pass_id: row.get(0)?,
        pass_type,
        requestor_id: row.get(2)?,
        requestor_name: row.get(3)?,
        gate_pass_date: row.get(4)?,
        destination: row.get(5)?,
        vehicle_plate_number: row.get(6)?,
        returnable: row.get::<_, i64>(7)? == 1,
        expected_return_date: row.get(8)?,
        number_of_employees,
        time_duration: row.get(10)?,
        status,
        return_status,
        created_at,
    })
}

fn parse_history_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusHistoryEntry> {
    let entry_id_raw: String = row.get(1)?;
    let entry_id = Ulid::from_string(&entry_id_raw)
        .map_err(|_| invalid_column(1, &format!("invalid entry_id ULID: {entry_id_raw}")))?;

    let from_status = row
        .get::<_, Option<String>>(3)?
        .map(|raw| {
            GatePassStatus::parse(&raw)
                .ok_or_else(|| invalid_column(3, &format!("invalid from_status: {raw}")))
        })
        .transpose()?;

    let to_raw: String = row.get(4)?;
    let to_status = GatePassStatus::parse(&to_raw)
        .ok_or_else(|| invalid_column(4, &format!("invalid to_status: {to_raw}")))?;

    let recorded_raw: String = row.get(8)?;
    let recorded_at =
        parse_rfc3339_utc(&recorded_raw).map_err(|err| invalid_column(8, &err.to_string()))?;

    let actor_name: Option<String> = row.get(6)?;

    Ok(StatusHistoryEntry {
        entry_seq: row.get(0)?,
        entry_id,
        gate_pass_id: row.get(2)?,
        from_status,
        to_status,
        actor_user_id: row.get(5)?,
        actor_name: actor_name.unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
        note: row.get(7)?,
        recorded_at,
    })
}

fn parse_step_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApprovalStep> {
    let entry_id_raw: String = row.get(1)?;
    let entry_id = Ulid::from_string(&entry_id_raw)
        .map_err(|_| invalid_column(1, &format!("invalid entry_id ULID: {entry_id_raw}")))?;

    let step_raw: String = row.get(3)?;
    let step = WorkflowStep::parse(&step_raw)
        .ok_or_else(|| invalid_column(3, &format!("invalid step: {step_raw}")))?;

    let action_raw: String = row.get(4)?;
    let action = StepAction::parse(&action_raw)
        .ok_or_else(|| invalid_column(4, &format!("invalid action: {action_raw}")))?;

    let recorded_raw: String = row.get(8)?;
    let recorded_at =
        parse_rfc3339_utc(&recorded_raw).map_err(|err| invalid_column(8, &err.to_string()))?;

    let actor_name: Option<String> = row.get(6)?;

    Ok(ApprovalStep {
        step_seq: row.get(0)?,
        entry_id,
        gate_pass_id: row.get(2)?,
        step,
        action,
        actor_user_id: row.get(5)?,
        actor_name: actor_name.unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
        note: row.get(7)?,
        recorded_at,
    })
}

fn invalid_column(index: usize, message: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            message.to_string(),
        )),
    )
}

fn storage(context: &str, err: &dyn std::fmt::Display) -> GatePassError {
    GatePassError::Storage(format!("{context}: {err}"))
}

fn collect_rows<T>(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>>,
) -> Result<Vec<T>, GatePassError> {
    let mut values = Vec::new();
    for row in rows {
        values.push(row.map_err(|err| storage("failed to read row", &err))?);
    }
    Ok(values)
}
