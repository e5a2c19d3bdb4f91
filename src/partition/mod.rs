//! Board Partitioning
//!
//! Splits a board into contiguous row bands, one per worker, and stitches the
//! computed interiors back together in band order.
//!
//! ## Layout
//! With `H` rows and `N` workers, `base = H / N` and `remainder = H % N`. The first
//! `remainder` bands carry `base + 1` rows, the rest `base`. Every band is padded
//! with one halo row above and one below, taken from the neighbouring rows with
//! toroidal wrap-around, so a worker can evaluate its boundary rows without
//! talking to its neighbours.

pub mod partitioner;


pub use partitioner::{Band, partition, reassemble};
