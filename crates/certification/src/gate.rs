//! Certification gate resolution.
//!
//! Gates run in a fixed order:
//! ```text
//! practical_tasks → written_exam → oral_board → certificate_issued
//! ```
//! A gate is done when its evidence is present, the first gate that is not
//! done is active, and every gate after it is locked.

use qualtrack_core::{CoreError, Enrollment, GateKind, Program, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Observable state of one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Passed
    Done,
    /// The next step to work on
    Active,
    /// Not reachable yet
    Locked,
}

impl GateState {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Done => "done",
            GateState::Active => "active",
            GateState::Locked => "locked",
        }
    }
}

/// State of one gate for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    /// 1-based position in the flow
    pub step: u32,

    /// Which gate
    pub gate: GateKind,

    /// Resolved state
    pub state: GateState,
}

fn has_evidence(gate: GateKind, practical_complete: bool, enrollment: &Enrollment) -> bool {
    match gate {
        GateKind::PracticalTasks => practical_complete,
        GateKind::WrittenExam => enrollment.written_exam_date.is_some(),
        // a certificate is only issued after a passed board
        GateKind::OralBoard => {
            enrollment.oral_board_date.is_some() || enrollment.certificate_number.is_some()
        }
        GateKind::CertificateIssued => enrollment.certificate_number.is_some(),
    }
}

/// Resolve every gate of the program's certification flow.
///
/// `practical_complete` is the pace analysis `complete` flag. Evidence for a
/// gate while an earlier gate is not done (for example a written exam date
/// on a student whose practical tasks are incomplete) is rejected with
/// [`CoreError::InvalidArgument`].
pub fn resolve_gates(
    program: &Program,
    practical_complete: bool,
    enrollment: &Enrollment,
) -> Result<Vec<GateStatus>> {
    let mut statuses = Vec::with_capacity(program.certification_flow.len());
    let mut pending: Option<GateKind> = None;

    for gate in &program.certification_flow {
        let done = has_evidence(gate.name, practical_complete, enrollment);

        let state = match (done, pending) {
            (true, None) => GateState::Done,
            (true, Some(missing)) => {
                warn!(
                    student = %enrollment.student_id,
                    gate = %gate.name,
                    missing = %missing,
                    "Gate evidence recorded out of order"
                );
                return Err(CoreError::invalid(format!(
                    "student {} has {} recorded but {} is not done",
                    enrollment.student_id, gate.name, missing
                )));
            }
            (false, None) => {
                pending = Some(gate.name);
                GateState::Active
            }
            (false, Some(_)) => GateState::Locked,
        };

        statuses.push(GateStatus {
            step: gate.step,
            gate: gate.name,
            state,
        });
    }

    Ok(statuses)
}

/// The active gate, or `None` once every gate is done.
pub fn current_gate(statuses: &[GateStatus]) -> Option<GateKind> {
    statuses
        .iter()
        .find(|s| s.state == GateState::Active)
        .map(|s| s.gate)
}
