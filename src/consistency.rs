use crate::data::Candidate;

/// The only constraint of the network.
///
/// Two units clash when they meet in the same time slot and either share
/// the room, share the instructor, or cover a common section. The section
/// part is passed in precomputed so this stays a pure function of the two
/// candidates.
pub fn is_consistent(a: &Candidate, b: &Candidate, share_section: bool) -> bool {
    if a.time_slot != b.time_slot {
        return true;
    }
    !(a.instructor == b.instructor || a.room == b.room || share_section)
}
