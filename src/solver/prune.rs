use crate::prelude::*;

const UNVISITED: u8 = 0xff;

/// Exact distance-to-target of every value of a (combined) coordinate.
///
/// Built breadth-first from the target set, so every entry is the true
/// distance in the projected puzzle and never exceeds the real one.
pub struct PruningTable {
    name: String,
    data: Box<[u8]>,
}

impl PruningTable {
    /// `neighbours(coord, out)` pushes every coordinate one step away from
    /// `coord`. Steps must be closed under inversion.
    pub fn build(
        name: &str,
        size: usize,
        targets: impl IntoIterator<Item = usize>,
        mut neighbours: impl FnMut(usize, &mut Vec<usize>),
    ) -> Result<PruningTable> {
        let start = std::time::Instant::now();
        let mut data = vec![UNVISITED; size];

        let mut frontier: Vec<usize> = Vec::new();
        for t in targets {
            if data[t] == UNVISITED {
                data[t] = 0;
                frontier.push(t);
            }
        }

        let mut visited = frontier.len();
        let mut depth = 0u8;
        let mut scratch = Vec::new();
        while !frontier.is_empty() {
            log::debug!(
                "{}: depth {}, {} of {} visited",
                name,
                depth,
                visited,
                size
            );
            depth += 1;
            let mut next = Vec::new();
            for &coord in &frontier {
                scratch.clear();
                neighbours(coord, &mut scratch);
                for &n in &scratch {
                    if data[n] == UNVISITED {
                        data[n] = depth;
                        next.push(n);
                    }
                }
            }
            visited += next.len();
            frontier = next;
        }

        if visited != size {
            return Err(ScrambleError::UnreachableTarget {
                table: name.to_string(),
                missing: size - visited,
                size,
            });
        }

        log::info!(
            "Built pruning table {} ({} entries, max depth {}) in {:?}",
            name,
            size,
            depth.saturating_sub(1),
            start.elapsed()
        );
        Ok(PruningTable {
            name: name.to_string(),
            data: data.into_boxed_slice(),
        })
    }

    /// Rehydrates a table written by [`PruningTable::as_bytes`].
    pub fn from_bytes(name: &str, size: usize, bytes: Vec<u8>) -> Result<PruningTable, CacheError> {
        if bytes.len() != size || bytes.iter().any(|&b| b == UNVISITED) {
            return Err(CacheError::Malformed);
        }
        Ok(PruningTable {
            name: name.to_string(),
            data: bytes.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn distance(&self, coord: usize) -> u8 {
        self.data[coord]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn max_distance(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}
