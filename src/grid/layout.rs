//! ASCII building layouts for tests and the runner
//!
//! ```text
//! #####
//! #@..E
//! #####
//! ```
//! `.` room, `@` room cell holding a start position, `E` exit, `S` save
//! area, `D` door. `#` and spaces are not part of the building.

use crate::core::error::{EvacError, Result};
use crate::core::types::{CellId, RoomId};
use crate::grid::cell::{CellKind, DEFAULT_EXIT_ATTRACTIVITY};
use crate::grid::map::Grid;

/// A parsed single-room building
#[derive(Debug, Clone)]
pub struct Layout {
    pub grid: Grid,
    pub room: RoomId,
    /// Start cells in reading order
    pub starts: Vec<CellId>,
}

pub fn parse_layout(text: &str) -> Result<Layout> {
    let mut local = Vec::new();
    let mut kinds = Vec::new();

    for (y, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let kind = match ch {
                '#' | ' ' => continue,
                '.' | '@' => CellKind::Room,
                'E' => CellKind::Exit {
                    attractivity: DEFAULT_EXIT_ATTRACTIVITY,
                },
                'S' => CellKind::Save,
                'D' => CellKind::Door,
                other => {
                    return Err(EvacError::LayoutError(format!(
                        "unexpected '{}' at ({}, {})",
                        other, x, y
                    )))
                }
            };
            local.push((x as i32, y as i32));
            kinds.push((kind, ch == '@'));
        }
    }

    if local.is_empty() {
        return Err(EvacError::LayoutError("layout has no cells".into()));
    }

    let mut grid = Grid::new();
    let room = grid.add_sparse_room(0, (0, 0), &local)?;
    let mut starts = Vec::new();

    for (&(x, y), (kind, is_start)) in local.iter().zip(kinds) {
        let id = grid
            .room_cell(room, x, y)
            .ok_or_else(|| EvacError::LayoutError(format!("cell ({}, {}) missing", x, y)))?;
        grid.set_kind(id, kind)?;
        if is_start {
            starts.push(id);
        }
    }

    Ok(Layout { grid, room, starts })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corridor() {
        let layout = parse_layout("E.@").unwrap();
        assert_eq!(layout.grid.len(), 3);
        assert_eq!(layout.starts.len(), 1);

        let exit = layout.grid.room_cell(layout.room, 0, 0).unwrap();
        assert!(layout.grid.cell(exit).unwrap().kind.is_exit());
        assert_eq!(layout.grid.cell(layout.starts[0]).unwrap().x, 2);
    }

    #[test]
    fn test_walls_are_not_cells() {
        let layout = parse_layout("###\n#.E\n###").unwrap();
        assert_eq!(layout.grid.len(), 2);
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        assert!(matches!(parse_layout("..?"), Err(EvacError::LayoutError(_))));
    }
}
