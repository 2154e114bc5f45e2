//! Stitches the stream of square segments into line strings and rings.
//!
//! Segments arrive keyed by level index, in raster scan order. For each
//! level the merger keeps a list of open chains; a new segment extends the
//! chain whose tail meets its start (or whose head meets its end), after
//! which the extended chain may in turn join another chain. A chain whose
//! head meets its tail is emitted at once as a closed ring.
//!
//! Squares orient every segment consistently (the band, or the high side of
//! the level, on the positive side), so chains are only ever joined tail to
//! head and rings come out with a well defined winding.
//!
//! Endpoints are matched exactly. Squares sharing an edge compute the same
//! crossing bit for bit, and a sample sitting on a level may place two
//! crossings much closer together than any fixed tolerance.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::geometry::{normalize_ring, LineString, Point};
use crate::level_generator::LevelGenerator;
use crate::writer::{LineWriter, SegmentWriter};

#[derive(Debug)]
struct Chain {
    points: VecDeque<Point>,
    /// Extended during the current raster row.
    merged: bool,
}

impl Chain {
    fn new(start: Point, end: Point) -> Self {
        Self {
            points: VecDeque::from([start, end]),
            merged: true,
        }
    }

    fn head(&self) -> Point {
        self.points[0]
    }

    fn tail(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    fn is_closed(&self) -> bool {
        self.points.len() > 3 && self.head() == self.tail()
    }
}

/// Segment writer assembling line strings for a [`LineWriter`].
pub struct SegmentMerger<'a, W, G: ?Sized> {
    writer: W,
    levels: &'a G,
    polygonize: bool,
    lines: BTreeMap<i32, Vec<Chain>>,
    emitted: usize,
}

impl<'a, W: LineWriter, G: LevelGenerator + ?Sized> SegmentMerger<'a, W, G> {
    pub fn new(writer: W, levels: &'a G, polygonize: bool) -> Self {
        Self {
            writer,
            levels,
            polygonize,
            lines: BTreeMap::new(),
            emitted: 0,
        }
    }

    /// Number of chains still waiting for more segments.
    pub fn open_chains(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    /// Flush every remaining chain as an open line and return the writer.
    pub fn finish(mut self) -> W {
        let lines = std::mem::take(&mut self.lines);
        for (level_idx, chains) in lines {
            if self.polygonize && !chains.is_empty() {
                debug!(
                    level_idx = level_idx,
                    count = chains.len(),
                    "remaining unclosed contour"
                );
            }
            for chain in chains {
                self.emit(level_idx, chain, false);
            }
        }
        debug!(lines = self.emitted, polygonize = self.polygonize, "segment merger finished");
        self.writer
    }

    fn emit(&mut self, level_idx: i32, chain: Chain, closed: bool) {
        let mut line: LineString = chain.points.into();
        if closed {
            // make the ring exactly closed before rotating it
            let last = line.len() - 1;
            line[last] = line[0];
            normalize_ring(&mut line);
        }
        self.emitted += 1;
        let level = self.levels.level(level_idx);
        if closed && self.polygonize {
            let floor = self.levels.band_floor(level_idx);
            self.writer.add_band_ring(floor, level, line);
        } else {
            self.writer.add_line(level, line, closed);
        }
    }

    fn merge_segment(&mut self, level_idx: i32, start: Point, end: Point) {
        if start == end {
            debug!(x = start.x, y = start.y, "degenerate segment");
            return;
        }

        let chains = self.lines.entry(level_idx).or_default();

        // scan from the most recent chains, they are the likeliest to match
        if let Some(i) = chains.iter().rposition(|c| c.tail() == start) {
            chains[i].points.push_back(end);
            chains[i].merged = true;
            self.close_or_join_tail(level_idx, i);
        } else if let Some(i) = chains.iter().rposition(|c| c.head() == end) {
            chains[i].points.push_front(start);
            chains[i].merged = true;
            self.close_or_join_head(level_idx, i);
        } else {
            chains.push(Chain::new(start, end));
        }
    }

    /// Chain `i` grew at its tail: close it, or append the chain starting there.
    fn close_or_join_tail(&mut self, level_idx: i32, i: usize) {
        let Some(chains) = self.lines.get_mut(&level_idx) else {
            return;
        };
        if chains[i].is_closed() {
            let chain = chains.swap_remove(i);
            self.emit(level_idx, chain, true);
            return;
        }
        let tail = chains[i].tail();
        let Some(j) = chains
            .iter()
            .enumerate()
            .rposition(|(k, c)| k != i && c.head() == tail)
        else {
            return;
        };
        let mut other = chains.remove(j);
        let i = if j < i { i - 1 } else { i };
        other.points.pop_front();
        chains[i].points.extend(other.points);
        if chains[i].is_closed() {
            let chain = chains.swap_remove(i);
            self.emit(level_idx, chain, true);
        }
    }

    /// Chain `i` grew at its head: close it, or append it to the chain ending there.
    fn close_or_join_head(&mut self, level_idx: i32, i: usize) {
        let Some(chains) = self.lines.get_mut(&level_idx) else {
            return;
        };
        if chains[i].is_closed() {
            let chain = chains.swap_remove(i);
            self.emit(level_idx, chain, true);
            return;
        }
        let head = chains[i].head();
        let Some(j) = chains
            .iter()
            .enumerate()
            .rposition(|(k, c)| k != i && c.tail() == head)
        else {
            return;
        };
        let mut chain = chains.remove(i);
        let j = if i < j { j - 1 } else { j };
        chain.points.pop_front();
        chains[j].points.extend(chain.points);
        chains[j].merged = true;
        if chains[j].is_closed() {
            let chain = chains.swap_remove(j);
            self.emit(level_idx, chain, true);
        }
    }
}

impl<W: LineWriter, G: LevelGenerator + ?Sized> SegmentWriter for SegmentMerger<'_, W, G> {
    fn polygonize(&self) -> bool {
        self.polygonize
    }

    fn add_segment(&mut self, level_idx: i32, start: Point, end: Point) {
        self.merge_segment(level_idx, start, end);
    }

    fn add_border_segment(&mut self, level_idx: i32, start: Point, end: Point) {
        self.merge_segment(level_idx, start, end);
    }

    fn beginning_of_line(&mut self) {
        if self.polygonize {
            return;
        }
        for chain in self.lines.values_mut().flatten() {
            chain.merged = false;
        }
    }

    fn end_of_line(&mut self) {
        if self.polygonize {
            return;
        }
        // a chain left untouched by a whole row cannot grow any more
        let mut done = Vec::new();
        for (&level_idx, chains) in self.lines.iter_mut() {
            let mut k = 0;
            while k < chains.len() {
                if chains[k].merged {
                    k += 1;
                } else {
                    done.push((level_idx, chains.remove(k)));
                }
            }
        }
        self.lines.retain(|_, chains| !chains.is_empty());
        for (level_idx, chain) in done {
            self.emit(level_idx, chain, false);
        }
    }
}
