use crate::error::SolveError;
use crate::types::{Block, Placement, Rect};

/// Expands a block decomposition into concrete item placements.
///
/// Each block is tiled homogeneously in whichever item orientation yields
/// the larger grid, unrotated winning ties. Output order is deterministic:
/// blocks in input order, then row-major within each block (x axis outer,
/// y axis inner). Blocks too small for either orientation contribute
/// nothing.
pub fn expand(blocks: &[Block], item: Rect) -> Result<Vec<Placement>, SolveError> {
    if item.length == 0 || item.width == 0 {
        return Err(SolveError::EmptyItem {
            length: item.length,
            width: item.width,
        });
    }

    let mut placements = Vec::new();
    for block in blocks {
        let upright = (block.length / item.length) as u64 * (block.width / item.width) as u64;
        let sideways = (block.length / item.width) as u64 * (block.width / item.length) as u64;
        let (tile, rotated) = if sideways > upright {
            (item.rotated(), true)
        } else {
            (item, false)
        };

        for i in 0..block.length / tile.length {
            for j in 0..block.width / tile.width {
                placements.push(Placement {
                    rect: tile,
                    x: block.x + i * tile.length,
                    y: block.y + j * tile.width,
                    rotated,
                });
            }
        }
    }

    Ok(placements)
}
