use super::{OuedraogoCounts, StudySite, ouedraogo_site};
use crate::error::Result;

// Digitized by J. Gerardin from Ouedraogo et al., JID 2015.
// Entries are counts of individual observations.
const COUNTS: OuedraogoCounts = [
    (
        "start_wet",
        [[2, 0, 0, 0, 1, 1], [4, 1, 2, 3, 2, 6], [7, 9, 4, 2, 4, 1]],
        [[0, 0, 0, 5, 0, 0], [3, 9, 8, 1, 0, 0], [16, 4, 6, 1, 0, 0]],
    ),
    (
        "peak_wet",
        [[0, 1, 0, 1, 1, 0], [13, 1, 0, 3, 0, 1], [9, 12, 3, 0, 1, 0]],
        [[1, 0, 1, 1, 0, 0], [2, 4, 8, 4, 1, 0], [7, 10, 5, 3, 0, 0]],
    ),
    (
        "end_wet",
        [[1, 0, 0, 0, 1, 0], [8, 1, 1, 6, 3, 1], [10, 11, 4, 2, 0, 0]],
        [[1, 0, 0, 1, 0, 0], [7, 9, 3, 1, 0, 0], [14, 10, 3, 0, 0, 0]],
    ),
];

pub fn laye() -> Result<StudySite> {
    ouedraogo_site("Laye", &COUNTS)
}
