//! Domain model for the gate-pass approval workflow.
//!
//! Everything in this crate is pure data: the status vocabulary, the
//! declarative transition table, input validation, and the error taxonomy.
//! Persistence and transaction discipline live in
//! `gatepass-store-sqlite`; this crate performs no I/O.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use ulid::Ulid;

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum GatePassError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("gate pass {0} not found")]
    NotFound(i64),
    #[error("conflict on gate pass {gate_pass_id}: expected status {expected} but found {actual}")]
    Conflict {
        gate_pass_id: i64,
        expected: GatePassStatus,
        actual: GatePassStatus,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatePassStatus {
    /// Reserved initial state. No operation produces it, but persisted
    /// rows may still reference it.
    Draft,
    PendingStoreVerification,
    VerifiedByStore,
    RejectedByStore,
    ApprovedByDirector,
    RejectedByDirector,
    Exited,
    Returned,
}

impl GatePassStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingStoreVerification => "PENDING_STORE_VERIFICATION",
            Self::VerifiedByStore => "VERIFIED_BY_STORE",
            Self::RejectedByStore => "REJECTED_BY_STORE",
            Self::ApprovedByDirector => "APPROVED_BY_DIRECTOR",
            Self::RejectedByDirector => "REJECTED_BY_DIRECTOR",
            Self::Exited => "EXITED",
            Self::Returned => "RETURNED",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(Self::Draft),
            "PENDING_STORE_VERIFICATION" => Some(Self::PendingStoreVerification),
            "VERIFIED_BY_STORE" => Some(Self::VerifiedByStore),
            "REJECTED_BY_STORE" => Some(Self::RejectedByStore),
            "APPROVED_BY_DIRECTOR" => Some(Self::ApprovedByDirector),
            "REJECTED_BY_DIRECTOR" => Some(Self::RejectedByDirector),
            "EXITED" => Some(Self::Exited),
            "RETURNED" => Some(Self::Returned),
            _ => None,
        }
    }

    /// A status with no outgoing edge in [`TRANSITION_RULES`].
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !TRANSITION_RULES.iter().any(|rule| rule.from == self)
    }
}

impl Display for GatePassStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatePassType {
    Material,
    HumanResource,
}

impl GatePassType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Material => "MATERIAL",
            Self::HumanResource => "HUMAN_RESOURCE",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MATERIAL" => Some(Self::Material),
            "HUMAN_RESOURCE" => Some(Self::HumanResource),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    PendingReturn,
    NotApplicable,
}

impl ReturnStatus {
    /// Derived once at creation and never re-derived afterwards, matching
    /// the observed behavior of the workflow: the `RETURNED` transition
    /// does not touch this field.
    #[must_use]
    pub fn for_returnable(returnable: bool) -> Self {
        if returnable {
            Self::PendingReturn
        } else {
            Self::NotApplicable
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingReturn => "PENDING_RETURN",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING_RETURN" => Some(Self::PendingReturn),
            "NOT_APPLICABLE" => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    StoreManager,
    Director,
    Security,
    /// Manages user records only; never drives a workflow transition.
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::StoreManager => "STORE_MANAGER",
            Self::Director => "DIRECTOR",
            Self::Security => "SECURITY",
            Self::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CLIENT" => Some(Self::Client),
            "STORE_MANAGER" => Some(Self::StoreManager),
            "DIRECTOR" => Some(Self::Director),
            "SECURITY" => Some(Self::Security),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStep {
    ClientSubmit,
    StoreVerify,
    DirectorApprove,
    SecurityUpdate,
}

impl WorkflowStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientSubmit => "CLIENT_SUBMIT",
            Self::StoreVerify => "STORE_VERIFY",
            Self::DirectorApprove => "DIRECTOR_APPROVE",
            Self::SecurityUpdate => "SECURITY_UPDATE",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CLIENT_SUBMIT" => Some(Self::ClientSubmit),
            "STORE_VERIFY" => Some(Self::StoreVerify),
            "DIRECTOR_APPROVE" => Some(Self::DirectorApprove),
            "SECURITY_UPDATE" => Some(Self::SecurityUpdate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepAction {
    Submitted,
    Verified,
    Rejected,
    Approved,
    Exited,
    Returned,
}

impl StepAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
            Self::Approved => "APPROVED",
            Self::Exited => "EXITED",
            Self::Returned => "RETURNED",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SUBMITTED" => Some(Self::Submitted),
            "VERIFIED" => Some(Self::Verified),
            "REJECTED" => Some(Self::Rejected),
            "APPROVED" => Some(Self::Approved),
            "EXITED" => Some(Self::Exited),
            "RETURNED" => Some(Self::Returned),
            _ => None,
        }
    }
}

/// One directed edge in the approval workflow graph.
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
pub struct TransitionRule {
    pub from: GatePassStatus,
    pub to: GatePassStatus,
    pub required_role: Role,
    pub step: WorkflowStep,
    pub action: StepAction,
}

/// The six non-creation edges of the workflow. Creation itself lands a
/// gate pass directly in `PENDING_STORE_VERIFICATION` with a
/// `CLIENT_SUBMIT/SUBMITTED` approval step; it is not representable as an
/// edge because there is no `from` status.
pub const TRANSITION_RULES: &[TransitionRule] = &[
    TransitionRule {
        from: GatePassStatus::PendingStoreVerification,
        to: GatePassStatus::VerifiedByStore,
        required_role: Role::StoreManager,
        step: WorkflowStep::StoreVerify,
        action: StepAction::Verified,
    },
    TransitionRule {
        from: GatePassStatus::PendingStoreVerification,
        to: GatePassStatus::RejectedByStore,
        required_role: Role::StoreManager,
        step: WorkflowStep::StoreVerify,
        action: StepAction::Rejected,
    },
    TransitionRule {
        from: GatePassStatus::VerifiedByStore,
        to: GatePassStatus::ApprovedByDirector,
        required_role: Role::Director,
        step: WorkflowStep::DirectorApprove,
        action: StepAction::Approved,
    },
    TransitionRule {
        from: GatePassStatus::VerifiedByStore,
        to: GatePassStatus::RejectedByDirector,
        required_role: Role::Director,
        step: WorkflowStep::DirectorApprove,
        action: StepAction::Rejected,
    },
    TransitionRule {
        from: GatePassStatus::ApprovedByDirector,
        to: GatePassStatus::Exited,
        required_role: Role::Security,
        step: WorkflowStep::SecurityUpdate,
        action: StepAction::Exited,
    },
    TransitionRule {
        from: GatePassStatus::ApprovedByDirector,
        to: GatePassStatus::Returned,
        required_role: Role::Security,
        step: WorkflowStep::SecurityUpdate,
        action: StepAction::Returned,
    },
];

/// Looks up the workflow edge for a `(from, to)` status pair.
#[must_use]
pub fn transition_rule(
    from: GatePassStatus,
    to: GatePassStatus,
) -> Option<&'static TransitionRule> {
    TRANSITION_RULES
        .iter()
        .find(|rule| rule.from == from && rule.to == to)
}

/// All edges leaving `from`. Empty for terminal states and `DRAFT`.
#[must_use]
pub fn transitions_from(from: GatePassStatus) -> Vec<&'static TransitionRule> {
    TRANSITION_RULES
        .iter()
        .filter(|rule| rule.from == from)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialItem {
    pub item_code: String,
    pub item_name: String,
    pub quantity: f64,
    pub unit_of_measurement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct HrEmployee {
    pub employee_code: String,
    pub full_name: String,
    pub gender: String,
    pub position: String,
    pub time_duration: String,
}

/// Creation payload for one gate pass, line items included. Validated as a
/// whole before the creation transaction begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateGatePassRequest {
    pub pass_type: GatePassType,
    pub gate_pass_date: String,
    pub destination: String,
    pub vehicle_plate_number: Option<String>,
    pub returnable: bool,
    pub expected_return_date: Option<String>,
    pub number_of_employees: Option<u32>,
    pub time_duration: Option<String>,
    pub material_items: Vec<MaterialItem>,
    pub hr_employees: Vec<HrEmployee>,
}

impl CreateGatePassRequest {
    /// Validates the creation payload.
    ///
    /// # Errors
    /// Returns [`GatePassError::Validation`] when required fields are
    /// blank, the line items do not match the pass type, or a returnable
    /// request omits its expected return date.
    pub fn validate(&self) -> Result<(), GatePassError> {
        if self.gate_pass_date.trim().is_empty() {
            return Err(GatePassError::Validation(
                "gate_pass_date MUST be provided".to_string(),
            ));
        }

        if self.destination.trim().is_empty() {
            return Err(GatePassError::Validation(
                "destination MUST be provided".to_string(),
            ));
        }

        match self.pass_type {
            GatePassType::Material => {
                if self.material_items.is_empty() {
                    return Err(GatePassError::Validation(
                        "at least one material item is required for MATERIAL requests".to_string(),
                    ));
                }
                if !self.hr_employees.is_empty() {
                    return Err(GatePassError::Validation(
                        "employee rows are not allowed on MATERIAL requests".to_string(),
                    ));
                }
            }
            GatePassType::HumanResource => {
                if self.hr_employees.is_empty() {
                    return Err(GatePassError::Validation(
                        "at least one employee is required for HUMAN_RESOURCE requests"
                            .to_string(),
                    ));
                }
                if !self.material_items.is_empty() {
                    return Err(GatePassError::Validation(
                        "material items are not allowed on HUMAN_RESOURCE requests".to_string(),
                    ));
                }
            }
        }

        if self.returnable && self.expected_return_date.is_none() {
            return Err(GatePassError::Validation(
                "expected_return_date is required for returnable requests".to_string(),
            ));
        }

        for item in &self.material_items {
            if item.item_name.trim().is_empty() {
                return Err(GatePassError::Validation(
                    "material item name MUST be provided".to_string(),
                ));
            }
            if item.quantity <= 0.0 {
                return Err(GatePassError::Validation(format!(
                    "material item {} quantity MUST be > 0",
                    item.item_name
                )));
            }
        }

        for employee in &self.hr_employees {
            if employee.full_name.trim().is_empty() {
                return Err(GatePassError::Validation(
                    "employee full name MUST be provided".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Employee headcount recorded on the header for HR passes: the
    /// explicit count when supplied, otherwise the roster length.
    #[must_use]
    pub fn employee_count(&self) -> Option<u32> {
        match self.pass_type {
            GatePassType::Material => None,
            GatePassType::HumanResource => {
                let roster = u32::try_from(self.hr_employees.len()).unwrap_or(u32::MAX);
                Some(self.number_of_employees.unwrap_or(roster))
            }
        }
    }
}

/// One atomic status change, validated against [`TRANSITION_RULES`]
/// before any I/O happens.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TransitionRequest {
    pub gate_pass_id: i64,
    pub expected_from: GatePassStatus,
    pub to: GatePassStatus,
    pub actor_user_id: i64,
    pub note: Option<String>,
}

impl TransitionRequest {
    /// Resolves the workflow edge this request targets.
    ///
    /// # Errors
    /// Returns [`GatePassError::Validation`] when `(expected_from, to)`
    /// is not an edge of the workflow graph. Keeping this check here is
    /// what makes path conformance enforceable in one place: every
    /// caller routes through the same table.
    pub fn validate(&self) -> Result<&'static TransitionRule, GatePassError> {
        transition_rule(self.expected_from, self.to).ok_or_else(|| {
            GatePassError::Validation(format!(
                "no workflow transition from {} to {}",
                self.expected_from, self.to
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatePass {
    pub gate_pass_id: i64,
    pub pass_type: GatePassType,
    pub requestor_id: i64,
    pub requestor_name: Option<String>,
    pub gate_pass_date: String,
    pub destination: String,
    pub vehicle_plate_number: Option<String>,
    pub returnable: bool,
    pub expected_return_date: Option<String>,
    pub number_of_employees: Option<u32>,
    pub time_duration: Option<String>,
    pub status: GatePassStatus,
    pub return_status: ReturnStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Aggregate read view: header plus its owned line items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatePassDetail {
    pub gate_pass: GatePass,
    pub material_items: Vec<MaterialItem>,
    pub hr_employees: Vec<HrEmployee>,
}

/// Sentinel actor display when a history row has no user attached.
pub const SYSTEM_ACTOR: &str = "System";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub entry_seq: i64,
    pub entry_id: Ulid,
    pub gate_pass_id: i64,
    pub from_status: Option<GatePassStatus>,
    pub to_status: GatePassStatus,
    pub actor_user_id: Option<i64>,
    pub actor_name: String,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalStep {
    pub step_seq: i64,
    pub entry_id: Ulid,
    pub gate_pass_id: i64,
    pub step: WorkflowStep,
    pub action: StepAction,
    pub actor_user_id: Option<i64>,
    pub actor_name: String,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// Parses an RFC3339 timestamp, rejecting anything not in UTC.
///
/// # Errors
/// Returns [`GatePassError::Validation`] on malformed input or a
/// non-`Z` offset.
pub fn parse_rfc3339_utc(value: &str) -> Result<OffsetDateTime, GatePassError> {
    let parsed = OffsetDateTime::parse(value, &time::format_description::well_known::Rfc3339)
        .map_err(|err| GatePassError::Validation(format!("invalid RFC3339 timestamp: {err}")))?;

    if parsed.offset() != UtcOffset::UTC {
        return Err(GatePassError::Validation(
            "timestamp MUST use UTC offset Z".to_string(),
        ));
    }

    Ok(parsed)
}

/// Formats a timestamp as RFC3339 after normalizing to UTC.
///
/// # Errors
/// Returns [`GatePassError::Validation`] when formatting fails.
pub fn format_rfc3339(value: OffsetDateTime) -> Result<String, GatePassError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|err| {
            GatePassError::Validation(format!("failed to format RFC3339 timestamp: {err}"))
        })
}

#[must_use]
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(UtcOffset::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn must_ok<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    fn material_request() -> CreateGatePassRequest {
        CreateGatePassRequest {
            pass_type: GatePassType::Material,
            gate_pass_date: "2026-03-02".to_string(),
            destination: "Central Warehouse".to_string(),
            vehicle_plate_number: Some("AB-1234".to_string()),
            returnable: false,
            expected_return_date: None,
            number_of_employees: None,
            time_duration: None,
            material_items: vec![MaterialItem {
                item_code: "ITM-001".to_string(),
                item_name: "Steel pipe".to_string(),
                quantity: 4.0,
                unit_of_measurement: "pcs".to_string(),
            }],
            hr_employees: Vec::new(),
        }
    }

    fn hr_request() -> CreateGatePassRequest {
        CreateGatePassRequest {
            pass_type: GatePassType::HumanResource,
            gate_pass_date: "2026-03-02".to_string(),
            destination: "Site B".to_string(),
            vehicle_plate_number: None,
            returnable: false,
            expected_return_date: None,
            number_of_employees: None,
            time_duration: Some("2 days".to_string()),
            material_items: Vec::new(),
            hr_employees: vec![HrEmployee {
                employee_code: "EMP-9".to_string(),
                full_name: "R. Tesfaye".to_string(),
                gender: "F".to_string(),
                position: "Electrician".to_string(),
                time_duration: "2 days".to_string(),
            }],
        }
    }

    #[test]
    fn transition_table_has_exactly_six_edges() {
        assert_eq!(TRANSITION_RULES.len(), 6);
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for status in [
            GatePassStatus::RejectedByStore,
            GatePassStatus::RejectedByDirector,
            GatePassStatus::Exited,
            GatePassStatus::Returned,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
            assert!(transitions_from(status).is_empty());
        }
    }

    #[test]
    fn non_terminal_states_fan_out_two_ways() {
        for status in [
            GatePassStatus::PendingStoreVerification,
            GatePassStatus::VerifiedByStore,
            GatePassStatus::ApprovedByDirector,
        ] {
            assert!(!status.is_terminal());
            assert_eq!(transitions_from(status).len(), 2);
        }
    }

    #[test]
    fn draft_is_reserved_and_isolated() {
        assert!(GatePassStatus::Draft.is_terminal());
        assert!(transition_rule(GatePassStatus::Draft, GatePassStatus::PendingStoreVerification)
            .is_none());
        assert_eq!(GatePassStatus::parse("DRAFT"), Some(GatePassStatus::Draft));
    }

    #[test]
    fn status_round_trips_through_wire_strings() {
        for status in [
            GatePassStatus::Draft,
            GatePassStatus::PendingStoreVerification,
            GatePassStatus::VerifiedByStore,
            GatePassStatus::RejectedByStore,
            GatePassStatus::ApprovedByDirector,
            GatePassStatus::RejectedByDirector,
            GatePassStatus::Exited,
            GatePassStatus::Returned,
        ] {
            assert_eq!(GatePassStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GatePassStatus::parse("SHIPPED"), None);
    }

    #[test]
    fn transition_rule_resolves_role_step_and_action() {
        let rule = match transition_rule(
            GatePassStatus::PendingStoreVerification,
            GatePassStatus::VerifiedByStore,
        ) {
            Some(rule) => rule,
            None => panic!("store verify edge missing"),
        };
        assert_eq!(rule.required_role, Role::StoreManager);
        assert_eq!(rule.step, WorkflowStep::StoreVerify);
        assert_eq!(rule.action, StepAction::Verified);
    }

    #[test]
    fn off_graph_transition_request_fails_validation() {
        let request = TransitionRequest {
            gate_pass_id: 1,
            expected_from: GatePassStatus::PendingStoreVerification,
            to: GatePassStatus::Exited,
            actor_user_id: 7,
            note: None,
        };
        match request.validate() {
            Err(GatePassError::Validation(message)) => {
                assert!(message.contains("PENDING_STORE_VERIFICATION"));
                assert!(message.contains("EXITED"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_material_request_passes() {
        must_ok(material_request().validate());
    }

    #[test]
    fn valid_hr_request_passes() {
        must_ok(hr_request().validate());
    }

    #[test]
    fn blank_destination_is_rejected() {
        let mut request = material_request();
        request.destination = "  ".to_string();
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn blank_date_is_rejected() {
        let mut request = material_request();
        request.gate_pass_date = String::new();
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn material_request_without_items_is_rejected() {
        let mut request = material_request();
        request.material_items.clear();
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn hr_request_without_employees_is_rejected() {
        let mut request = hr_request();
        request.hr_employees.clear();
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn mismatched_line_items_are_rejected() {
        let mut request = material_request();
        request.hr_employees = hr_request().hr_employees;
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn returnable_without_return_date_is_rejected() {
        let mut request = material_request();
        request.returnable = true;
        request.expected_return_date = None;
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn returnable_with_return_date_passes() {
        let mut request = material_request();
        request.returnable = true;
        request.expected_return_date = Some("2026-03-09".to_string());
        must_ok(request.validate());
    }

    #[test]
    fn zero_quantity_item_is_rejected() {
        let mut request = material_request();
        request.material_items[0].quantity = 0.0;
        assert!(matches!(
            request.validate(),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn employee_count_defaults_to_roster_length() {
        let request = hr_request();
        assert_eq!(request.employee_count(), Some(1));

        let mut explicit = hr_request();
        explicit.number_of_employees = Some(12);
        assert_eq!(explicit.employee_count(), Some(12));

        assert_eq!(material_request().employee_count(), None);
    }

    #[test]
    fn return_status_derives_from_returnable_flag() {
        assert_eq!(
            ReturnStatus::for_returnable(true),
            ReturnStatus::PendingReturn
        );
        assert_eq!(
            ReturnStatus::for_returnable(false),
            ReturnStatus::NotApplicable
        );
    }

    #[test]
    fn parse_rfc3339_utc_rejects_non_utc_offsets() {
        must_ok(parse_rfc3339_utc("2026-03-02T10:00:00Z"));
        assert!(matches!(
            parse_rfc3339_utc("2026-03-02T10:00:00+03:00"),
            Err(GatePassError::Validation(_))
        ));
        assert!(matches!(
            parse_rfc3339_utc("not-a-timestamp"),
            Err(GatePassError::Validation(_))
        ));
    }

    #[test]
    fn format_rfc3339_normalizes_to_utc() {
        let parsed = must_ok(parse_rfc3339_utc("2026-03-02T10:00:00Z"));
        assert_eq!(must_ok(format_rfc3339(parsed)), "2026-03-02T10:00:00Z");
    }

    #[test]
    fn conflict_error_reports_both_statuses() {
        let err = GatePassError::Conflict {
            gate_pass_id: 42,
            expected: GatePassStatus::PendingStoreVerification,
            actual: GatePassStatus::VerifiedByStore,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("42"));
        assert!(rendered.contains("PENDING_STORE_VERIFICATION"));
        assert!(rendered.contains("VERIFIED_BY_STORE"));
    }
}
