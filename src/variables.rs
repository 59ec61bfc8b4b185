//! Builds teaching-unit variables and their domains from the input records.

use crate::candidates::{self, Requirement};
use crate::config::SolverConfig;
use crate::data::{
    Course, EmptyDomain, SchedulingInput, Section, UnitId, UnitKind, Warning, WarningKind,
};
use crate::network::{Network, Unit};
use itertools::Itertools;
use log::{info, trace, warn};
use std::collections::HashMap;

/// Turns courses and sections into a constraint network.
///
/// Courses are visited in order of their first appearance in the section
/// enrolment lists. Lectures cover batches of `group_size` sections in input
/// order, labs cover a single section. Problems are collected rather than
/// returned early: a section enrolled in an unknown course or a repeated
/// section id becomes a warning (only the first row with an id is used), a unit with no candidate becomes a diagnostic, and building
/// carries on either way.
pub fn build_network(input: &SchedulingInput, config: &SolverConfig) -> Network {
    let day_index = input.day_index();
    let group_size = config.group_size();

    // lookups
    let course_map: HashMap<&str, &Course> =
        input.courses.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut warnings = Vec::new();
    let mut section_positions: HashMap<&str, usize> = HashMap::new();
    let mut sections: Vec<&Section> = Vec::with_capacity(input.sections.len());
    for (position, section) in input.sections.iter().enumerate() {
        if section_positions.contains_key(section.id.as_str()) {
            let warning = Warning::new(
                WarningKind::DataReference,
                format!(
                    "section id {} is defined more than once; row {} is ignored",
                    section.id, position
                ),
            );
            warn!("{}", warning);
            warnings.push(warning);
            continue;
        }
        section_positions.insert(section.id.as_str(), position);
        sections.push(section);
    }

    let enrolments: Vec<(&str, &Section)> = sections
        .iter()
        .copied()
        .flat_map(|section| section.courses.iter().map(move |course| (course.trim(), section)))
        .filter(|(course, _)| !course.is_empty())
        .unique_by(|(course, section)| (course.to_string(), section.id.clone()))
        .collect();
    let course_order: Vec<&str> = enrolments.iter().map(|(course, _)| *course).unique().collect();
    let course_sections: HashMap<&str, Vec<&Section>> = enrolments.into_iter().into_group_map();

    info!(
        "Formulating CSP for {} enrolled courses over {} sections (lecture group size {})",
        course_order.len(),
        sections.len(),
        group_size
    );

    let mut units = Vec::new();
    let mut domains = Vec::new();
    let mut diagnostics = Vec::new();

    for course_id in course_order {
        let enrolled = &course_sections[course_id];
        let Some(course) = course_map.get(course_id) else {
            for section in enrolled {
                let warning = Warning::new(
                    WarningKind::DataReference,
                    format!("section {} references unknown course {}", section.id, course_id),
                );
                warn!("{}", warning);
                warnings.push(warning);
            }
            continue;
        };

        for &kind in course.course_type.unit_kinds() {
            let batch = match kind {
                UnitKind::Lecture => group_size,
                UnitKind::Lab => 1,
            };
            for chunk in enrolled.chunks(batch) {
                let id = UnitId {
                    course: course.id.clone(),
                    kind,
                    sections: chunk.iter().map(|s| s.id.clone()).collect(),
                };
                let demand: u64 = chunk.iter().map(|s| u64::from(s.student_count)).sum();
                let mut members: Vec<usize> = chunk
                    .iter()
                    .filter_map(|s| section_positions.get(s.id.as_str()).copied())
                    .collect();
                members.sort_unstable();
                members.dedup();

                let requirement = Requirement {
                    course: &course.id,
                    kind,
                    demand,
                };
                let domain = candidates::generate(input, &day_index, &requirement);
                if domain.is_empty() {
                    let reason = candidates::shortfall(input, &day_index, &requirement)
                        .unwrap_or_else(|| "no valid combination for this unit".to_string());
                    warn!("Domain is empty for [{}]: {}", id, reason);
                    diagnostics.push(EmptyDomain {
                        unit: id.clone(),
                        reason,
                    });
                } else {
                    trace!("[{}] needs {} seats, {} candidates", id, demand, domain.len());
                }

                units.push(Unit { id, demand, members });
                domains.push(domain);
            }
        }
    }

    let network = Network::new(units, domains, diagnostics, warnings);
    info!(
        "Built {} teaching units, {} constraint pairs and {} candidates ({} empty domains)",
        network.len(),
        network.pairs().len(),
        network.candidate_total(),
        network.diagnostics().len()
    );
    network
}
