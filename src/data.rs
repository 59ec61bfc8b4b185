use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Type aliases for clarity
pub type CourseId = String;
pub type SectionId = String;
pub type RoomId = String;
pub type InstructorId = String;
pub type TimeSlotId = String;

/// Which parts a course is taught in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CourseType {
    Lecture,
    Lab,
    #[serde(alias = "Lecture and Lab")]
    LectureAndLab,
}

impl CourseType {
    /// The unit kinds a course of this type needs, lecture first.
    pub fn unit_kinds(self) -> &'static [UnitKind] {
        match self {
            CourseType::Lecture => &[UnitKind::Lecture],
            CourseType::Lab => &[UnitKind::Lab],
            CourseType::LectureAndLab => &[UnitKind::Lecture, UnitKind::Lab],
        }
    }
}

/// Kind of a teaching unit, and of the room it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum UnitKind {
    Lecture,
    Lab,
}

impl UnitKind {
    /// Instructor role that may teach this kind of unit.
    pub fn required_role(self) -> Role {
        match self {
            UnitKind::Lecture => Role::Senior,
            UnitKind::Lab => Role::Junior,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Lecture => f.write_str("Lecture"),
            UnitKind::Lab => f.write_str("Lab"),
        }
    }
}

/// Seniority of an instructor. Seniors give lectures, juniors run labs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Role {
    Senior,
    Junior,
}

/// A course from the catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(rename = "type")]
    pub course_type: CourseType,
}

/// An instructor with their qualifications and availability.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: InstructorId,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub qualified_courses: Vec<CourseId>,
    /// Day on which the instructor cannot teach at all.
    #[serde(default)]
    pub forbidden_day: Option<String>,
}

impl Instructor {
    /// Name shown in exported timetables, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_qualified_for(&self, course: &str) -> bool {
        self.qualified_courses.iter().any(|c| c.trim() == course)
    }
}

/// A physical room with a given capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub kind: UnitKind,
    pub capacity: u32,
}

/// A bookable slot of the weekly grid.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Left empty in the input to have an id generated from the slot position.
    #[serde(default)]
    pub id: TimeSlotId,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

/// A cohort of students enrolled in a common set of courses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub student_count: u32,
    #[serde(default)]
    pub courses: Vec<CourseId>,
}

/// Maps each day to the ids of its time slots, in input order.
pub type DayIndex = HashMap<String, Vec<TimeSlotId>>;

/// The complete input for the timetabling problem.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub rooms: Vec<Room>,
    pub time_slots: Vec<TimeSlot>,
    pub sections: Vec<Section>,
}

impl SchedulingInput {
    /// Gives every time slot without an id the id `TS<position>`.
    pub fn assign_missing_slot_ids(&mut self) {
        for (position, slot) in self.time_slots.iter_mut().enumerate() {
            if slot.id.trim().is_empty() {
                slot.id = format!("TS{position}");
            }
        }
    }

    pub fn day_index(&self) -> DayIndex {
        self.time_slots
            .iter()
            .map(|slot| (slot.day.clone(), slot.id.clone()))
            .into_group_map()
    }
}

/// Identity of a teaching unit: the scheduling variable.
///
/// `sections` keeps the input order of the covered sections. Equality and
/// hashing are structural, so two units are the same exactly when course,
/// kind and covered sections all agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitId {
    pub course: CourseId,
    pub kind: UnitKind,
    pub sections: Vec<SectionId>,
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.course, self.kind, self.sections.join(","))
    }
}

/// One value of a unit's domain: where, when and by whom it is taught.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub time_slot: TimeSlotId,
    pub room: RoomId,
    pub instructor: InstructorId,
}

/// A teaching unit together with the candidate chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledUnit {
    pub unit: UnitId,
    pub candidate: Candidate,
}

/// One row of the flattened timetable: a unit as seen by one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub section_id: SectionId,
    pub course_id: CourseId,
    pub unit_kind: UnitKind,
    pub instructor_name: String,
    pub room_id: RoomId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    DataReference,
    LookupInconsistency,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::DataReference => f.write_str("Data Reference"),
            WarningKind::LookupInconsistency => f.write_str("Lookup Inconsistency"),
        }
    }
}

/// A problem that was skipped over rather than failing the solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub kind: WarningKind,
    pub description: String,
}

impl Warning {
    pub fn new(kind: WarningKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.description)
    }
}

/// Why a unit ended up without any candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyDomain {
    pub unit: UnitId,
    pub reason: String,
}

impl fmt::Display for EmptyDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.reason)
    }
}

/// Counters collected over one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveStats {
    pub units: usize,
    pub pairs: usize,
    pub initial_candidates: usize,
    pub pruned_candidates: usize,
    pub nodes: u64,
    pub backtracks: u64,
    pub elapsed_ms: u64,
}

/// The final output of the solver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub entries: Vec<ScheduleEntry>,
    pub units: Vec<ScheduledUnit>,
    pub warnings: Vec<Warning>,
    pub stats: SolveStats,
}
