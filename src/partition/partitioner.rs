use crate::board::{Board, Row};
use crate::error::{LifeError, Result};

/// One worker's share of a turn: interior rows plus a halo row on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    /// Position of this band in reassembly order.
    pub index: usize,
    /// Board row of the first interior row.
    pub first_row: usize,
    /// `interior_len + 2` rows: top halo, interior, bottom halo.
    pub rows: Vec<Row>,
}

impl Band {
    pub fn interior_len(&self) -> usize {
        self.rows.len().saturating_sub(2)
    }

    pub fn interior(&self) -> &[Row] {
        let end = self.rows.len().saturating_sub(1);
        &self.rows[1.min(end)..end]
    }

    pub fn top_halo(&self) -> &Row {
        &self.rows[0]
    }

    pub fn bottom_halo(&self) -> &Row {
        &self.rows[self.rows.len() - 1]
    }
}

/// Divides `board` into `worker_count` padded bands.
///
/// Deterministic in `(board.height(), worker_count)`: the same inputs always
/// yield the same band boundaries, which is what lets a failed turn be
/// re-dispatched after the pool is rebuilt.
pub fn partition(board: &Board, worker_count: usize) -> Result<Vec<Band>> {
    let height = board.height();

    if worker_count == 0 {
        return Err(LifeError::Config("cannot partition across zero workers".to_string()));
    }
    if height < worker_count {
        return Err(LifeError::Config(format!(
            "board has {} rows, fewer than {} workers",
            height, worker_count
        )));
    }

    let rows = board.rows();
    let base = height / worker_count;
    let remainder = height % worker_count;

    let mut bands = Vec::with_capacity(worker_count);
    let mut offset = 0;

    for index in 0..worker_count {
        let len = base + usize::from(index < remainder);
        let first = offset;
        let last = first + len - 1;

        let mut band_rows = Vec::with_capacity(len + 2);
        band_rows.push(rows[(first + height - 1) % height].clone());
        band_rows.extend_from_slice(&rows[first..=last]);
        band_rows.push(rows[(last + 1) % height].clone());

        bands.push(Band {
            index,
            first_row: first,
            rows: band_rows,
        });

        offset += len;
    }

    Ok(bands)
}

/// Concatenates band interiors, already ordered by band index, into the next board.
///
/// A row count different from `expected_height` is an internal invariant
/// violation and is never tolerated.
pub fn reassemble<I>(expected_height: usize, interiors: I) -> Result<Board>
where
    I: IntoIterator<Item = Vec<Row>>,
{
    let mut rows = Vec::with_capacity(expected_height);
    for interior in interiors {
        rows.extend(interior);
    }

    if rows.len() != expected_height {
        return Err(LifeError::Reassembly {
            expected: expected_height,
            actual: rows.len(),
        });
    }

    Board::from_rows(rows)
}
