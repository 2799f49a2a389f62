use std::collections::{HashMap, VecDeque};

use crate::error::KernelError;

use super::assemble::{CellId, FacetId, Subdivision};

/// Assigns every cell its membership in each shell.
///
/// Flood-fills from the unbounded cell, which lies outside every shell.
/// Crossing a facet that lies on a face of shell `k` toggles membership in
/// `k`. Reaching a cell twice with different memberships means the shell does
/// not enclose a volume.
///
/// # Errors
///
/// Returns [`KernelError::InconsistentClassification`] on a membership
/// conflict, and [`KernelError::Subdivision`] if some cell cannot be reached.
pub(super) fn propagate_membership(space: &mut Subdivision) -> Result<(), KernelError> {
    let mut incident: HashMap<CellId, Vec<FacetId>> = HashMap::new();
    for (id, facet) in &space.facets {
        for cell in facet.cells {
            incident.entry(cell).or_default().push(id);
        }
    }

    let mut visited: HashMap<CellId, Vec<bool>> = HashMap::new();
    let mut queue = VecDeque::new();
    visited.insert(space.unbounded, vec![false; space.shell_count()]);
    queue.push_back(space.unbounded);

    while let Some(cell) = queue.pop_front() {
        let Some(inside) = visited.get(&cell).cloned() else {
            continue;
        };
        for facet_id in incident.get(&cell).map(Vec::as_slice).unwrap_or_default() {
            let Some(facet) = space.facets.get(*facet_id) else {
                continue;
            };
            let other = if facet.cells[0] == cell {
                facet.cells[1]
            } else {
                facet.cells[0]
            };

            let mut expected = inside.clone();
            for &shell in &facet.covered_by {
                expected[shell] = !expected[shell];
            }

            match visited.get(&other) {
                Some(known) => {
                    if let Some(shell) = (0..expected.len()).find(|&k| known[k] != expected[k]) {
                        return Err(KernelError::InconsistentClassification { shell });
                    }
                }
                None => {
                    visited.insert(other, expected);
                    queue.push_back(other);
                }
            }
        }
    }

    if visited.len() != space.cells.len() {
        return Err(KernelError::Subdivision(format!(
            "{} of {} cells unreachable from the outside",
            space.cells.len() - visited.len(),
            space.cells.len()
        )));
    }

    for (id, inside) in visited {
        if let Some(cell) = space.cells.get_mut(id) {
            cell.inside = inside;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::fixtures::exact_box;
    use crate::operations::boolean::Subdivision;

    #[test]
    fn every_cell_receives_a_membership() {
        let space = Subdivision::build(&[
            exact_box([0.0; 3], [3.0; 3]),
            exact_box([1.0, 1.0, 1.0], [2.0, 2.0, 2.0]),
        ])
        .unwrap();
        let inside_inner = space.cells.values().filter(|c| c.is_inside(1)).count();
        let inside_outer = space.cells.values().filter(|c| c.is_inside(0)).count();
        assert_eq!(inside_inner, 1);
        assert!(inside_outer > inside_inner);
    }

    #[test]
    fn cells_outside_all_shells_are_outside() {
        let space = Subdivision::build(&[exact_box([0.0; 3], [1.0; 3])]).unwrap();
        let outside = space.cells.values().filter(|c| !c.is_inside(0)).count();
        assert_eq!(outside, space.cell_count() - 1);
    }
}
