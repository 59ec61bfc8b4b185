//! Turns a schedule into timetable rows and writes the domain dump.

use crate::data::{
    Instructor, InstructorId, SchedulingInput, ScheduleEntry, TimeSlot, TimeSlotId, Warning,
    WarningKind,
};
use crate::network::Network;
use crate::search::Schedule;
use itertools::Itertools;
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::iter;
use std::path::Path;

/// One entry per (unit, covered section), sorted by slot order then section.
///
/// A unit whose time slot or instructor is unknown to `input` is skipped
/// with a lookup warning; the rest of the export goes on.
pub fn flatten(schedule: &Schedule, input: &SchedulingInput) -> (Vec<ScheduleEntry>, Vec<Warning>) {
    let slots: HashMap<&TimeSlotId, (usize, &TimeSlot)> = input
        .time_slots
        .iter()
        .enumerate()
        .map(|(position, slot)| (&slot.id, (position, slot)))
        .collect();
    let instructors: HashMap<&InstructorId, &Instructor> =
        input.instructors.iter().map(|i| (&i.id, i)).collect();

    let mut rows: Vec<(usize, ScheduleEntry)> = Vec::new();
    let mut warnings = Vec::new();

    for assigned in schedule.iter() {
        let candidate = &assigned.candidate;
        let (Some(&(position, slot)), Some(instructor)) = (
            slots.get(&candidate.time_slot),
            instructors.get(&candidate.instructor),
        ) else {
            let warning = Warning::new(
                WarningKind::LookupInconsistency,
                format!(
                    "{} refers to time slot {} / instructor {} missing from the input",
                    assigned.unit, candidate.time_slot, candidate.instructor
                ),
            );
            warn!("{}", warning);
            warnings.push(warning);
            continue;
        };

        for section in &assigned.unit.sections {
            rows.push((
                position,
                ScheduleEntry {
                    day: slot.day.clone(),
                    start_time: slot.start_time.clone(),
                    end_time: slot.end_time.clone(),
                    section_id: section.clone(),
                    course_id: assigned.unit.course.clone(),
                    unit_kind: assigned.unit.kind,
                    instructor_name: instructor.display_name().to_string(),
                    room_id: candidate.room.clone(),
                },
            ));
        }
    }

    rows.sort_by(|(pa, a), (pb, b)| {
        pa.cmp(pb)
            .then_with(|| a.section_id.cmp(&b.section_id))
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    (rows.into_iter().map(|(_, entry)| entry).collect(), warnings)
}

/// Text listing of every unit with its candidate count.
pub fn render_dump(network: &Network) -> String {
    let reasons: HashMap<_, _> = network
        .diagnostics()
        .iter()
        .map(|d| (&d.unit, d.reason.as_str()))
        .collect();

    let header = format!(
        "# {} teaching units, {} candidates",
        network.len(),
        network.candidate_total()
    );
    let units = network.units().iter().enumerate().map(|(index, unit)| {
        let size = network.domain(index).len();
        match reasons.get(&unit.id) {
            Some(reason) => format!("{}: EMPTY DOMAIN: {}", unit.id, reason),
            None if size == 0 => format!("{}: EMPTY DOMAIN: no valid combination for this unit", unit.id),
            None => format!("{}: {} candidates (demand {})", unit.id, size, unit.demand),
        }
    });
    let warnings = network.warnings().iter().map(ToString::to_string);

    let mut out = iter::once(header).chain(units).chain(warnings).join("\n");
    out.push('\n');
    out
}

pub fn write_dump(network: &Network, path: &Path) -> io::Result<()> {
    fs::write(path, render_dump(network))?;
    info!("Wrote domain diagnostics to {}", path.display());
    Ok(())
}

/// Writes the flattened timetable as CSV, one row per entry with a header line.
pub fn write_timetable_csv(entries: &[ScheduleEntry], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    info!("Wrote {} timetable rows to {}", entries.len(), path.display());
    Ok(())
}
