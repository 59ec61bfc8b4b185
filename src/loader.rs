use crate::data::{
    Course, CourseType, Instructor, Role, Room, SchedulingInput, Section, TimeSlot, UnitKind,
};
use crate::error::LoadError;
use log::{info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

// Tables expected in a CSV data folder.
pub const COURSES_CSV: &str = "Courses.csv";
pub const INSTRUCTORS_CSV: &str = "Instructor.csv";
pub const ROOMS_CSV: &str = "Rooms.csv";
pub const TIME_SLOTS_CSV: &str = "TimeSlots.csv";
pub const SECTIONS_CSV: &str = "Sections.csv";

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a timetabling problem from a JSON document on disk.
pub fn read_input(path: &Path) -> Result<SchedulingInput, LoadError> {
    let mut input: SchedulingInput = read_json_file(path)?;
    input.assign_missing_slot_ids();
    log_loaded(&input, path);
    Ok(input)
}

/// Reads a JSON document, or a CSV data folder when `path` is a directory.
pub fn load_input(path: &Path) -> Result<SchedulingInput, LoadError> {
    if path.is_dir() {
        read_csv_dir(path)
    } else {
        read_input(path)
    }
}

fn log_loaded(input: &SchedulingInput, path: &Path) {
    info!(
        "Loaded {} courses, {} instructors, {} rooms, {} time slots and {} sections from {}",
        input.courses.len(),
        input.instructors.len(),
        input.rooms.len(),
        input.time_slots.len(),
        input.sections.len(),
        path.display()
    );
}

#[derive(Debug, Deserialize)]
struct CourseRow {
    #[serde(rename = "CourseID")]
    id: String,
    #[serde(rename = "Type")]
    course_type: CourseType,
}

#[derive(Debug, Deserialize)]
struct InstructorRow {
    #[serde(rename = "InstructorID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Role", default)]
    role: Option<Role>,
    /// "Not on <day>" or "Anytime".
    #[serde(rename = "PreferredSlots", default)]
    preferred_slots: Option<String>,
    #[serde(rename = "QualifiedCourses", default)]
    qualified_courses: String,
}

#[derive(Debug, Deserialize)]
struct RoomRow {
    #[serde(rename = "RoomID")]
    id: String,
    #[serde(rename = "Type")]
    kind: UnitKind,
    #[serde(rename = "Capacity")]
    capacity: u32,
}

#[derive(Debug, Deserialize)]
struct TimeSlotRow {
    #[serde(rename = "TimeSlotID", default)]
    id: String,
    #[serde(rename = "Day")]
    day: String,
    #[serde(rename = "StartTime")]
    start_time: String,
    #[serde(rename = "EndTime")]
    end_time: String,
}

#[derive(Debug, Deserialize)]
struct SectionRow {
    #[serde(rename = "SectionID", alias = "SecrionID")]
    id: String,
    #[serde(rename = "StudentCount")]
    student_count: u32,
    #[serde(rename = "Courses", default)]
    courses: String,
}

fn read_csv_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    reader.deserialize().collect::<Result<Vec<T>, _>>().map_err(csv_error)
}

/// Splits a cell such as `"CSC111, MTH101"` into its entries.
fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// The day named by a `"Not on <day>"` preference; any other text means no restriction.
fn forbidden_day(preference: Option<&str>) -> Option<String> {
    let (_, day) = preference?.split_once("Not on")?;
    let day = day.trim();
    (!day.is_empty()).then(|| day.to_string())
}

/// Role from the `Role` column, else from the id prefix (`PROF…` senior, `AP…` junior).
fn instructor_role(row: &InstructorRow) -> Option<Role> {
    row.role.or_else(|| {
        if row.id.starts_with("PROF") {
            Some(Role::Senior)
        } else if row.id.starts_with("AP") {
            Some(Role::Junior)
        } else {
            None
        }
    })
}

/// Reads a timetabling problem from a folder of CSV tables.
///
/// Lists inside a cell (`QualifiedCourses`, `Courses`) are comma separated.
/// Time slots without a `TimeSlotID` column get `TS<position>` ids, and the
/// misspelt `SecrionID` header is accepted for sections. Instructors whose
/// role can be neither read nor inferred are left out with a warning.
pub fn read_csv_dir(dir: &Path) -> Result<SchedulingInput, LoadError> {
    let courses = read_csv_table::<CourseRow>(&dir.join(COURSES_CSV))?
        .into_iter()
        .map(|row| Course {
            id: row.id,
            course_type: row.course_type,
        })
        .collect();

    let mut instructors = Vec::new();
    for row in read_csv_table::<InstructorRow>(&dir.join(INSTRUCTORS_CSV))? {
        let Some(role) = instructor_role(&row) else {
            warn!("Skipping instructor {}: no Role column and no PROF/AP id prefix", row.id);
            continue;
        };
        instructors.push(Instructor {
            forbidden_day: forbidden_day(row.preferred_slots.as_deref()),
            qualified_courses: split_list(&row.qualified_courses),
            name: row.name.filter(|name| !name.is_empty()),
            id: row.id,
            role,
        });
    }

    let rooms = read_csv_table::<RoomRow>(&dir.join(ROOMS_CSV))?
        .into_iter()
        .map(|row| Room {
            id: row.id,
            kind: row.kind,
            capacity: row.capacity,
        })
        .collect();

    let time_slots = read_csv_table::<TimeSlotRow>(&dir.join(TIME_SLOTS_CSV))?
        .into_iter()
        .map(|row| TimeSlot {
            id: row.id,
            day: row.day,
            start_time: row.start_time,
            end_time: row.end_time,
        })
        .collect();

    let sections = read_csv_table::<SectionRow>(&dir.join(SECTIONS_CSV))?
        .into_iter()
        .map(|row| Section {
            courses: split_list(&row.courses),
            id: row.id,
            student_count: row.student_count,
        })
        .collect();

    let mut input = SchedulingInput {
        courses,
        instructors,
        rooms,
        time_slots,
        sections,
    };
    input.assign_missing_slot_ids();
    log_loaded(&input, dir);
    Ok(input)
}
