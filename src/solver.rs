use crate::ac3::propagate;
use crate::config::SolverConfig;
use crate::data::{SchedulingInput, SchedulingOutput, SolveStats};
use crate::error::{SolveError, SolveFailure};
use crate::export::{flatten, write_dump};
use crate::network::Network;
use crate::search::{search, SearchBudget, SearchOutcome};
use crate::variables::build_network;
use log::{info, warn};
use std::time::Instant;

/// Solves the timetabling problem: build, propagate, then search.
///
/// Returns the flattened timetable on success. Each failure class has its
/// own error variant, so callers can tell an over-constrained input found
/// at build time from a wipe-out in AC-3 or an exhausted search. Build
/// warnings and counters travel with the failure as well.
pub fn solve(input: &SchedulingInput, config: &SolverConfig) -> Result<SchedulingOutput, SolveFailure> {
    let start_time = Instant::now();

    let mut network = build_network(input, config);
    if let Some(path) = config.diagnostics_path() {
        if let Err(e) = write_dump(&network, path) {
            warn!("Could not write domain diagnostics to {}: {}", path.display(), e);
        }
    }

    let mut stats = SolveStats {
        units: network.len(),
        pairs: network.pairs().len(),
        initial_candidates: network.candidate_total(),
        ..SolveStats::default()
    };
    let fail = |error: SolveError, network: &Network, mut stats: SolveStats| {
        stats.elapsed_ms = start_time.elapsed().as_millis() as u64;
        SolveFailure {
            error,
            warnings: network.warnings().to_vec(),
            stats,
        }
    };

    if !network.diagnostics().is_empty() {
        info!("Halting: {} units have empty domains", network.diagnostics().len());
        let error = SolveError::EmptyDomains {
            diagnostics: network.diagnostics().to_vec(),
        };
        return Err(fail(error, &network, stats));
    }

    if let Err(wipeout) = propagate(&mut network) {
        let unit = network.unit(wipeout.unit).id.clone();
        info!("No solution possible: AC-3 emptied the domain of [{}]", unit);
        stats.pruned_candidates = network.candidate_total();
        return Err(fail(SolveError::Unsatisfiable { unit }, &network, stats));
    }
    stats.pruned_candidates = network.candidate_total();

    let (outcome, search_stats) = search(&network, &SearchBudget::from_config(config));
    stats.nodes = search_stats.nodes;
    stats.backtracks = search_stats.backtracks;

    let schedule = match outcome {
        SearchOutcome::Solved(schedule) => schedule,
        SearchOutcome::Exhausted => {
            let error = SolveError::NoSolution {
                nodes: search_stats.nodes,
            };
            return Err(fail(error, &network, stats));
        }
        SearchOutcome::Aborted => {
            let error = SolveError::SearchAborted {
                nodes: search_stats.nodes,
            };
            return Err(fail(error, &network, stats));
        }
    };

    let (entries, export_warnings) = flatten(&schedule, input);
    let mut warnings = network.warnings().to_vec();
    warnings.extend(export_warnings);

    stats.elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!("Solution found in {:.2?}", start_time.elapsed());

    Ok(SchedulingOutput {
        entries,
        units: schedule.into_units(),
        warnings,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::is_consistent;
    use crate::data::{
        Course, CourseType, Instructor, Role, Room, Section, TimeSlot, UnitKind, WarningKind,
    };

    fn slot(id: &str, day: &str) -> TimeSlot {
        TimeSlot {
            id: id.into(),
            day: day.into(),
            start_time: format!("{id}-start"),
            end_time: format!("{id}-end"),
        }
    }

    fn instructor(id: &str, role: Role, courses: &[&str], forbidden_day: Option<&str>) -> Instructor {
        Instructor {
            id: id.into(),
            name: Some(format!("{id} name")),
            role,
            qualified_courses: courses.iter().map(|c| c.to_string()).collect(),
            forbidden_day: forbidden_day.map(str::to_string),
        }
    }

    fn room(id: &str, kind: UnitKind, capacity: u32) -> Room {
        Room {
            id: id.into(),
            kind,
            capacity,
        }
    }

    fn section(id: &str, students: u32, courses: &[&str]) -> Section {
        Section {
            id: id.into(),
            student_count: students,
            courses: courses.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Two sections of one lecture-and-lab course, one instructor of each role.
    fn scenario_a() -> SchedulingInput {
        SchedulingInput {
            courses: vec![Course {
                id: "CSC111".into(),
                course_type: CourseType::LectureAndLab,
            }],
            instructors: vec![
                instructor("PROF1", Role::Senior, &["CSC111"], None),
                instructor("AP1", Role::Junior, &["CSC111"], None),
            ],
            rooms: vec![
                room("HALL", UnitKind::Lecture, 60),
                room("LAB1", UnitKind::Lab, 30),
            ],
            time_slots: vec![slot("T1", "Sunday"), slot("T2", "Sunday"), slot("T3", "Monday")],
            sections: vec![
                section("S1", 30, &["CSC111"]),
                section("S2", 25, &["CSC111"]),
            ],
        }
    }

    #[test]
    fn test_scenario_a_single_grouped_lecture_and_two_labs() {
        let output = solve(&scenario_a(), &SolverConfig::default()).unwrap();

        assert_eq!(output.units.len(), 3);
        let lectures: Vec<_> = output
            .units
            .iter()
            .filter(|u| u.unit.kind == UnitKind::Lecture)
            .collect();
        assert_eq!(lectures.len(), 1);
        assert_eq!(lectures[0].unit.sections, vec!["S1".to_string(), "S2".to_string()]);

        // Every unit shares a section or the lab instructor with another,
        // so all three must sit in different slots.
        let mut slots: Vec<&str> = output
            .units
            .iter()
            .map(|u| u.candidate.time_slot.as_str())
            .collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 3);

        // One row per (unit, covered section).
        assert_eq!(output.entries.len(), 4);
        assert!(output.warnings.is_empty());
        assert_eq!(output.stats.units, 3);
        assert_eq!(output.stats.pairs, 3);
        assert!(output.stats.pruned_candidates <= output.stats.initial_candidates);
    }

    #[test]
    fn test_scenario_b_forbidden_day_empties_domain() {
        let mut input = scenario_a();
        // The only slot falls on the only senior instructor's forbidden day.
        input.time_slots = vec![slot("T3", "Monday")];
        input.instructors[0].forbidden_day = Some("Monday".into());

        let err = solve(&input, &SolverConfig::default()).unwrap_err();
        let SolveError::EmptyDomains { diagnostics } = &err.error else {
            panic!("expected empty domains, got {err:?}");
        };
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].unit.to_string(), "CSC111 Lecture (S1,S2)");
        assert!(diagnostics[0].reason.contains("unavailable"));
    }

    #[test]
    fn test_scenario_c_wipeout_is_unsatisfiable() {
        // Two lab units, one room, one junior instructor, one slot.
        let mut input = scenario_a();
        input.courses[0].course_type = CourseType::Lab;
        input.time_slots = vec![slot("T1", "Sunday")];

        let err = solve(&input, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err.error, SolveError::Unsatisfiable { .. }), "{err:?}");
        assert_eq!(err.reason(), "unsatisfiable");
        // Propagation failed, so the search never tried a single candidate.
        assert_eq!(err.stats.nodes, 0);
        assert_eq!(err.stats.backtracks, 0);
        assert_eq!(err.stats.units, 2);
        assert!(err.stats.pruned_candidates < err.stats.initial_candidates);
    }

    #[test]
    fn test_scenario_d_arc_consistent_but_no_solution() {
        // Three single-section lab units sharing one junior instructor across
        // two slots with two lab rooms: every arc has support, but three units
        // cannot fit into two slots with one instructor.
        let input = SchedulingInput {
            courses: vec![Course {
                id: "PHY103".into(),
                course_type: CourseType::Lab,
            }],
            instructors: vec![instructor("AP1", Role::Junior, &["PHY103"], None)],
            rooms: vec![room("LAB1", UnitKind::Lab, 30), room("LAB2", UnitKind::Lab, 30)],
            time_slots: vec![slot("T1", "Sunday"), slot("T2", "Sunday")],
            sections: vec![
                section("S1", 20, &["PHY103"]),
                section("S2", 20, &["PHY103"]),
                section("S3", 20, &["PHY103"]),
            ],
        };

        let err = solve(&input, &SolverConfig::default()).unwrap_err();
        let SolveError::NoSolution { nodes } = &err.error else {
            panic!("expected no solution, got {err:?}");
        };
        assert!(*nodes > 0);
        assert_eq!(err.stats.nodes, *nodes);
        assert!(err.stats.backtracks > 0);
    }

    #[test]
    fn test_node_budget_reports_aborted() {
        let input = SchedulingInput {
            courses: vec![Course {
                id: "PHY103".into(),
                course_type: CourseType::Lab,
            }],
            instructors: vec![instructor("AP1", Role::Junior, &["PHY103"], None)],
            rooms: vec![room("LAB1", UnitKind::Lab, 30), room("LAB2", UnitKind::Lab, 30)],
            time_slots: vec![slot("T1", "Sunday"), slot("T2", "Sunday")],
            sections: vec![
                section("S1", 20, &["PHY103"]),
                section("S2", 20, &["PHY103"]),
                section("S3", 20, &["PHY103"]),
            ],
        };

        let err = solve(&input, &SolverConfig::default().with_max_nodes(2)).unwrap_err();
        assert!(matches!(err.error, SolveError::SearchAborted { nodes: 2 }), "{err:?}");
    }

    #[test]
    fn test_unknown_course_warning_reaches_output() {
        let mut input = scenario_a();
        input.sections[0].courses.push("ART999".into());

        let output = solve(&input, &SolverConfig::default()).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, WarningKind::DataReference);
    }

    #[test]
    fn test_unknown_course_warning_survives_failure() {
        let mut input = scenario_a();
        input.sections[0].courses.push("ART999".into());
        input.rooms[1].capacity = 10;

        let err = solve(&input, &SolverConfig::default()).unwrap_err();
        assert_eq!(err.reason(), "emptyDomains");
        assert_eq!(err.warnings.len(), 1);
        assert_eq!(err.warnings[0].kind, WarningKind::DataReference);
        assert!(err.warnings[0].description.contains("ART999"));
    }

    #[test]
    fn test_larger_timetable_is_pairwise_consistent() {
        let courses = ["CSC111", "MTH101", "PHY103", "ENG100"];
        let input = SchedulingInput {
            courses: vec![
                Course { id: "CSC111".into(), course_type: CourseType::LectureAndLab },
                Course { id: "MTH101".into(), course_type: CourseType::Lecture },
                Course { id: "PHY103".into(), course_type: CourseType::LectureAndLab },
                Course { id: "ENG100".into(), course_type: CourseType::Lecture },
            ],
            instructors: vec![
                instructor("PROF1", Role::Senior, &courses, None),
                instructor("PROF2", Role::Senior, &courses, Some("Sunday")),
                instructor("PROF3", Role::Senior, &["MTH101", "ENG100"], Some("Monday")),
                instructor("AP1", Role::Junior, &courses, None),
                instructor("AP2", Role::Junior, &["PHY103"], Some("Tuesday")),
            ],
            rooms: vec![
                room("HALL1", UnitKind::Lecture, 80),
                room("HALL2", UnitKind::Lecture, 60),
                room("LAB1", UnitKind::Lab, 30),
                room("LAB2", UnitKind::Lab, 35),
            ],
            time_slots: ["Sunday", "Monday", "Tuesday"]
                .iter()
                .flat_map(|day| (0..3).map(move |i| slot(&format!("{day}-{i}"), day)))
                .collect(),
            sections: vec![
                section("S1", 30, &["CSC111", "MTH101", "PHY103"]),
                section("S2", 28, &["CSC111", "MTH101", "ENG100"]),
                section("S3", 25, &["CSC111", "PHY103", "ENG100"]),
                section("S4", 22, &["MTH101", "PHY103"]),
            ],
        };

        let output = solve(&input, &SolverConfig::default()).unwrap();
        let sections_of = |i: usize| &output.units[i].unit.sections;
        for i in 0..output.units.len() {
            for j in (i + 1)..output.units.len() {
                let share = sections_of(i).iter().any(|s| sections_of(j).contains(s));
                assert!(
                    is_consistent(&output.units[i].candidate, &output.units[j].candidate, share),
                    "{} clashes with {}",
                    output.units[i].unit,
                    output.units[j].unit
                );
            }
        }
        for entry in &output.entries {
            if entry.instructor_name == "PROF2 name" {
                assert_ne!(entry.day, "Sunday");
            }
            if entry.instructor_name == "PROF3 name" {
                assert_ne!(entry.day, "Monday");
            }
        }
    }
}
