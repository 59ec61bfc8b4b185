//! Enumeration of the candidate triples a single teaching unit may take.
//!
//! Only unary rules are applied here (room kind and capacity, instructor
//! role and qualification, forbidden days). Everything that relates two
//! units is left to the consistency predicate.

use crate::data::{Candidate, DayIndex, Instructor, Room, SchedulingInput, TimeSlot, UnitKind};
use itertools::iproduct;

/// What one teaching unit needs from a room and an instructor.
#[derive(Debug, Clone, Copy)]
pub struct Requirement<'a> {
    pub course: &'a str,
    pub kind: UnitKind,
    /// Students that must fit in the room.
    pub demand: u64,
}

pub fn eligible_rooms<'a>(rooms: &'a [Room], requirement: &Requirement<'_>) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|room| room.kind == requirement.kind && u64::from(room.capacity) >= requirement.demand)
        .collect()
}

pub fn eligible_instructors<'a>(
    instructors: &'a [Instructor],
    requirement: &Requirement<'_>,
) -> Vec<&'a Instructor> {
    let role = requirement.kind.required_role();
    instructors
        .iter()
        .filter(|instructor| instructor.role == role && instructor.is_qualified_for(requirement.course))
        .collect()
}

/// False when the slot lies on the instructor's forbidden day.
fn is_available(instructor: &Instructor, slot: &TimeSlot, day_index: &DayIndex) -> bool {
    match instructor.forbidden_day.as_deref() {
        None => true,
        Some(day) => !day_index
            .get(day.trim())
            .is_some_and(|slots| slots.contains(&slot.id)),
    }
}

/// Every (slot, room, instructor) triple allowed for the unit, slot-major.
///
/// An empty result is a legitimate answer; [`shortfall`] explains it.
pub fn generate(
    input: &SchedulingInput,
    day_index: &DayIndex,
    requirement: &Requirement<'_>,
) -> Vec<Candidate> {
    let rooms = eligible_rooms(&input.rooms, requirement);
    let instructors = eligible_instructors(&input.instructors, requirement);

    iproduct!(input.time_slots.iter(), rooms.iter(), instructors.iter())
        .filter(|(slot, _, instructor)| is_available(instructor, slot, day_index))
        .map(|(slot, room, instructor)| Candidate {
            time_slot: slot.id.clone(),
            room: room.id.clone(),
            instructor: instructor.id.clone(),
        })
        .collect()
}

/// Human-readable reason why [`generate`] would come back empty, if it would.
pub fn shortfall(
    input: &SchedulingInput,
    day_index: &DayIndex,
    requirement: &Requirement<'_>,
) -> Option<String> {
    if input.time_slots.is_empty() {
        return Some("no time slots are defined".to_string());
    }
    if eligible_rooms(&input.rooms, requirement).is_empty() {
        return Some(format!(
            "no eligible room: no {} room with capacity >= {}",
            requirement.kind, requirement.demand
        ));
    }
    let instructors = eligible_instructors(&input.instructors, requirement);
    if instructors.is_empty() {
        return Some(format!(
            "no eligible instructor: no {:?} instructor qualified for {}",
            requirement.kind.required_role(),
            requirement.course
        ));
    }
    let any_available = instructors.iter().any(|instructor| {
        input
            .time_slots
            .iter()
            .any(|slot| is_available(instructor, slot, day_index))
    });
    if !any_available {
        return Some("every eligible instructor is unavailable in every time slot".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Role, TimeSlot};

    fn slot(id: &str, day: &str) -> TimeSlot {
        TimeSlot {
            id: id.into(),
            day: day.into(),
            start_time: "9:00".into(),
            end_time: "10:30".into(),
        }
    }

    fn instructor(id: &str, role: Role, forbidden_day: Option<&str>) -> Instructor {
        Instructor {
            id: id.into(),
            name: None,
            role,
            qualified_courses: vec!["CSC111".into()],
            forbidden_day: forbidden_day.map(str::to_string),
        }
    }

    fn sample_input() -> SchedulingInput {
        SchedulingInput {
            courses: Vec::new(),
            instructors: vec![
                instructor("PROF1", Role::Senior, None),
                instructor("PROF2", Role::Senior, Some("Monday")),
                instructor("AP1", Role::Junior, None),
            ],
            rooms: vec![
                Room { id: "HALL".into(), kind: UnitKind::Lecture, capacity: 80 },
                Room { id: "SMALL".into(), kind: UnitKind::Lecture, capacity: 20 },
                Room { id: "LAB1".into(), kind: UnitKind::Lab, capacity: 30 },
            ],
            time_slots: vec![slot("T1", "Sunday"), slot("T2", "Monday")],
            sections: Vec::new(),
        }
    }

    #[test]
    fn test_lecture_candidates_respect_capacity_role_and_forbidden_day() {
        let input = sample_input();
        let index = input.day_index();
        let requirement = Requirement { course: "CSC111", kind: UnitKind::Lecture, demand: 50 };

        let candidates = generate(&input, &index, &requirement);
        let triples: Vec<(&str, &str, &str)> = candidates
            .iter()
            .map(|c| (c.time_slot.as_str(), c.room.as_str(), c.instructor.as_str()))
            .collect();

        // SMALL is too small, AP1 is junior, PROF2 never teaches on Monday.
        assert_eq!(
            triples,
            vec![
                ("T1", "HALL", "PROF1"),
                ("T1", "HALL", "PROF2"),
                ("T2", "HALL", "PROF1"),
            ]
        );
        assert!(shortfall(&input, &index, &requirement).is_none());
    }

    #[test]
    fn test_lab_candidates_use_junior_instructors() {
        let input = sample_input();
        let index = input.day_index();
        let requirement = Requirement { course: "CSC111", kind: UnitKind::Lab, demand: 25 };

        let candidates = generate(&input, &index, &requirement);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.room == "LAB1" && c.instructor == "AP1"));
    }

    #[test]
    fn test_no_room_is_empty_not_error() {
        let input = sample_input();
        let index = input.day_index();
        let requirement = Requirement { course: "CSC111", kind: UnitKind::Lab, demand: 31 };

        assert!(generate(&input, &index, &requirement).is_empty());
        let reason = shortfall(&input, &index, &requirement).unwrap();
        assert!(reason.starts_with("no eligible room"), "{reason}");
    }

    #[test]
    fn test_unqualified_course_reports_instructor_shortfall() {
        let input = sample_input();
        let index = input.day_index();
        let requirement = Requirement { course: "MTH101", kind: UnitKind::Lecture, demand: 10 };

        assert!(generate(&input, &index, &requirement).is_empty());
        let reason = shortfall(&input, &index, &requirement).unwrap();
        assert!(reason.starts_with("no eligible instructor"), "{reason}");
    }

    #[test]
    fn test_forbidden_day_can_empty_the_domain() {
        let mut input = sample_input();
        input.time_slots = vec![slot("T2", "Monday")];
        input.instructors = vec![instructor("PROF2", Role::Senior, Some("Monday"))];
        let index = input.day_index();
        let requirement = Requirement { course: "CSC111", kind: UnitKind::Lecture, demand: 10 };

        assert!(generate(&input, &index, &requirement).is_empty());
        assert_eq!(
            shortfall(&input, &index, &requirement).as_deref(),
            Some("every eligible instructor is unavailable in every time slot")
        );
    }
}
