//! Built-in shop qualification curriculum.

use crate::id::{CategoryId, TaskId};
use crate::schedule::{Category, Program, Schedule, Task};

/// Program window of the standard curriculum.
pub const STANDARD_TIME_LIMIT_MONTHS: u32 = 36;

const CURRICULUM: &[(&str, &[&str])] = &[
    (
        "Shop Safety",
        &[
            "Select and inspect personal protective equipment for the job",
            "Apply lockout/tagout to an energized system",
            "Locate and operate fire suppression equipment",
            "Read and apply a safety data sheet",
            "Set up and inspect a ladder or work stand",
            "Handle and store compressed gas cylinders",
            "Contain and clean up a fluid spill",
            "Report a hazard through the shop reporting system",
        ],
    ),
    (
        "Hand & Power Tools",
        &[
            "Select and use wrenches and sockets to specification",
            "Apply torque with a calibrated torque wrench",
            "Drill holes to size with a pneumatic drill",
            "Countersink holes to flush-fit depth",
            "Cut and deburr material with hand shears and files",
            "Use a rivet gun and bucking bar",
            "Operate a bench grinder safely",
            "Verify tool calibration status before use",
            "Perform tool control inventory at shift end",
        ],
    ),
    (
        "Measurement & Inspection",
        &[
            "Measure with a vernier caliper",
            "Measure with an outside micrometer",
            "Use a dial indicator to check runout",
            "Check gaps with feeler gauges",
            "Perform a visual inspection with mirror and light",
            "Perform a dye penetrant inspection",
            "Record measurements against allowable limits",
            "Identify corrosion types and extent",
        ],
    ),
    (
        "Hardware & Fasteners",
        &[
            "Identify bolts, nuts and washers by part number",
            "Install and safety a castellated nut with a cotter pin",
            "Install safety wire in a double-twist pattern",
            "Install a self-locking nut and check prevailing torque",
            "Install and remove blind rivets",
            "Install solid shank rivets to specification",
            "Remove a damaged fastener without damaging structure",
            "Install a threaded insert",
            "Install quick-release fasteners",
        ],
    ),
    (
        "Sheet Metal & Structures",
        &[
            "Lay out a flat pattern with bend allowance",
            "Form a bend on a cornice brake",
            "Fabricate a doubler repair",
            "Fabricate a flush patch repair",
            "Perform rivet layout for edge distance and pitch",
            "Treat and prime bare aluminum",
            "Repair a damaged stringer section",
            "Inspect and repair a composite panel edge",
            "Apply sealant to a faying surface",
        ],
    ),
    (
        "Electrical Wiring",
        &[
            "Strip and crimp a terminal to a wire",
            "Solder a splice and apply heat shrink",
            "Measure voltage, current and resistance with a multimeter",
            "Perform a continuity check on a harness",
            "Install and secure a wire bundle with clamps",
            "Assemble and pin a circular connector",
            "Inspect and replace a circuit breaker",
            "Bond a component and verify bonding resistance",
        ],
    ),
    (
        "Fluid Lines & Fittings",
        &[
            "Cut and flare rigid tubing",
            "Bend rigid tubing without kinking",
            "Fabricate a flexible hose assembly",
            "Install a line with correct torque and alignment",
            "Pressure test a fluid line for leaks",
            "Install and inspect O-ring seals",
            "Service a hydraulic reservoir",
        ],
    ),
    (
        "Documentation & Records",
        &[
            "Locate a procedure in the maintenance manual",
            "Look up a part in the illustrated parts catalog",
            "Complete a work order entry",
            "Record a maintenance release",
            "Complete a discrepancy write-up",
            "Perform a records review for a component",
            "Apply an applicable directive to an inspection",
        ],
    ),
];

impl Schedule {
    /// The standard curriculum: 8 categories, 65 tasks, 36-month window and
    /// the four-gate certification flow.
    pub fn standard() -> Self {
        let categories = CURRICULUM
            .iter()
            .zip(1u32..)
            .map(|((title, tasks), id)| {
                let id = CategoryId(id);
                Category {
                    id,
                    title: (*title).to_string(),
                    tasks: tasks
                        .iter()
                        .zip(1u32..)
                        .map(|(desc, seq)| Task::new(TaskId::for_category(id, seq), *desc))
                        .collect(),
                }
            })
            .collect();

        Schedule::new(categories, Program::new(STANDARD_TIME_LIMIT_MONTHS))
            .expect("built-in curriculum must satisfy schedule invariants")
    }
}
