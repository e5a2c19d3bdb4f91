//! Band Evaluation
//!
//! Counts the eight toroidal neighbours of every interior cell and applies the
//! Game of Life rule. Columns wrap using the band's own width; rows wrap through
//! the halo rows, or inside the band itself when it carries no halos.

use crate::board::{ALIVE, DEAD, Row};
use crate::error::{LifeError, Result};

/// Exactly 3 neighbours: alive. Exactly 2: unchanged. Otherwise: dead.
pub fn next_cell_state(neighbours: u8, current: u8) -> u8 {
    match neighbours {
        3 => ALIVE,
        2 => current,
        _ => DEAD,
    }
}

/// Returns the next generation of the band's interior rows.
///
/// With `includes_halos` the first and last rows are read-only context and are
/// not part of the result. Without it the band is treated as a complete torus.
pub fn compute_band(band: &[Row], includes_halos: bool) -> Result<Vec<Row>> {
    let width = match band.first() {
        Some(row) if !row.is_empty() => row.len(),
        _ => return Err(LifeError::Config("band is empty".to_string())),
    };
    if band.iter().any(|row| row.len() != width) {
        return Err(LifeError::Config("band rows differ in width".to_string()));
    }
    if includes_halos && band.len() < 3 {
        return Err(LifeError::Config(format!(
            "band with halos needs at least 3 rows, got {}",
            band.len()
        )));
    }

    let height = band.len();
    let interior = if includes_halos { 1..height - 1 } else { 0..height };

    let mut next = Vec::with_capacity(interior.len());
    for y in interior {
        let above = &band[(y + height - 1) % height];
        let row = &band[y];
        let below = &band[(y + 1) % height];

        let mut next_row = vec![DEAD; width];
        for (x, cell) in next_row.iter_mut().enumerate() {
            let left = (x + width - 1) % width;
            let right = (x + 1) % width;

            #[rustfmt::skip]
            let neighbours = [
                above[left], above[x], above[right],
                row[left], row[right],
                below[left], below[x], below[right],
            ]
            .iter()
            .filter(|&&c| c == ALIVE)
            .count() as u8;

            *cell = next_cell_state(neighbours, row[x]);
        }
        next.push(next_row);
    }

    Ok(next)
}
