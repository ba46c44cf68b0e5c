use super::{OuedraogoCounts, StudySite, ouedraogo_site};
use crate::error::Result;

// Digitized by J. Gerardin from Ouedraogo et al., JID 2015.
// Entries are counts of individual observations.
const COUNTS: OuedraogoCounts = [
    (
        "start_wet",
        [[1, 0, 0, 2, 2, 3], [2, 1, 0, 2, 0, 4], [9, 5, 4, 4, 2, 3]],
        [[0, 1, 4, 2, 2, 0], [0, 1, 4, 6, 0, 0], [12, 8, 3, 4, 0, 0]],
    ),
    (
        "peak_wet",
        [[1, 2, 0, 1, 3, 1], [2, 5, 2, 3, 1, 1], [6, 8, 4, 4, 0, 2]],
        [[1, 3, 2, 2, 0, 0], [0, 8, 0, 3, 0, 0], [11, 10, 2, 2, 0, 0]],
    ),
    (
        "end_wet",
        [[1, 1, 0, 4, 3, 1], [4, 1, 2, 4, 2, 1], [6, 9, 6, 2, 2, 0]],
        [[2, 3, 2, 2, 1, 0], [2, 5, 4, 2, 1, 0], [14, 7, 4, 0, 0, 0]],
    ),
];

pub fn dapelogo() -> Result<StudySite> {
    ouedraogo_site("Dapelogo", &COUNTS)
}
