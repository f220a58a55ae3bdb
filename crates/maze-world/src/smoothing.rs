//! Median despeckling of a binary cell grid.
//!
//! The filter is square with side `window`. For an even window the footprint
//! leans towards negative offsets (`-w/2 ..= w - w/2 - 1`), out-of-grid
//! samples are mirrored with the edge cell repeated (`d c b a | a b c d`),
//! and the output is the element of rank `w² / 2` in the ascending window,
//! so ties between walls and floor resolve to wall.

use crate::chunk::CellState;

/// Applies the median filter to a row-major `size × size` grid.
///
/// A window of 0 or 1 returns the input unchanged.
#[must_use]
pub fn median_filter(cells: &[CellState], size: u32, window: u32) -> Vec<CellState> {
    if window <= 1 || size == 0 {
        return cells.to_vec();
    }

    let n = size as i64;
    let w = i64::from(window);
    let lo = -(w / 2);
    let hi = w - w / 2 - 1;
    // Walkable sorts before Blocked, so the ranked element is a wall exactly
    // when the window holds no more than `rank` walkable cells.
    let rank = (w * w / 2) as usize;

    let mut out = Vec::with_capacity(cells.len());
    for y in 0..n {
        for x in 0..n {
            let mut walkable = 0usize;
            for dy in lo..=hi {
                let sy = reflect(y + dy, n);
                for dx in lo..=hi {
                    let sx = reflect(x + dx, n);
                    if cells[(sy * n + sx) as usize] == CellState::Walkable {
                        walkable += 1;
                    }
                }
            }
            out.push(if walkable <= rank {
                CellState::Blocked
            } else {
                CellState::Walkable
            });
        }
    }
    out
}

/// Mirrors an index into `[0, n)` with the edge sample repeated.
fn reflect(mut i: i64, n: i64) -> i64 {
    if n == 1 {
        return 0;
    }
    let period = 2 * n;
    i = i.rem_euclid(period);
    if i >= n {
        period - i - 1
    } else {
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::CellState::{Blocked as B, Walkable as W};

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(-3, 2), 1);
        assert_eq!(reflect(7, 1), 0);
    }

    #[test]
    fn test_isolated_wall_removed() {
        let mut cells = vec![W; 16];
        cells[5] = B;
        assert_eq!(median_filter(&cells, 4, 4), vec![W; 16]);
    }

    #[test]
    fn test_isolated_floor_filled() {
        let mut cells = vec![B; 36];
        cells[14] = W;
        assert_eq!(median_filter(&cells, 6, 4), vec![B; 36]);
    }

    #[test]
    fn test_uniform_grids_unchanged() {
        assert_eq!(median_filter(&[W; 16], 4, 4), vec![W; 16]);
        assert_eq!(median_filter(&[B; 16], 4, 4), vec![B; 16]);
    }

    #[test]
    fn test_window_one_is_identity() {
        let cells = vec![W, B, B, W];
        assert_eq!(median_filter(&cells, 2, 1), cells);
        assert_eq!(median_filter(&cells, 2, 0), cells);
    }

    #[test]
    fn test_even_window_leans_negative() {
        // Columns 0 and 1 are walls; the window for column 2 covers
        // columns 0..=3 and holds an 8/8 tie, which resolves to wall.
        let row = [B, B, W, W];
        let cells: Vec<_> = (0..4).flat_map(|_| row).collect();
        let expected_row = [B, B, B, W];
        let expected: Vec<_> = (0..4).flat_map(|_| expected_row).collect();
        assert_eq!(median_filter(&cells, 4, 4), expected);
    }

    #[test]
    fn test_odd_window_majority() {
        let cells = vec![
            W, W, W, //
            B, B, B, //
            B, B, B,
        ];
        let out = median_filter(&cells, 3, 3);
        // Top row mirrors itself, so it sees two floor rows out of three.
        assert_eq!(&out[0..3], &[W, W, W]);
        assert_eq!(&out[3..9], &[B, B, B, B, B, B]);
    }
}
