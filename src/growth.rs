// src/growth.rs - Best-neighbour selection, growth step and sweep driver

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dither::TraversalOrder;
use crate::neighbours::{neighbours, PixelGrid};
use crate::segment::{merge_cost, Coord, Segment};
use crate::state::SegmentationState;

/// When the sweep driver stops
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerminationPolicy {
    /// Sweep until a full sweep merges nothing (bounded by `max_sweeps`)
    #[default]
    Converge,
    /// Sweep once; if anything changed, sweep exactly once more and stop
    TwoSweep,
}

/// Parameters of one segmentation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthParams {
    /// Largest merge cost that may still be accepted
    pub threshold: f64,
    pub order: TraversalOrder,
    pub termination: TerminationPolicy,
    /// Upper bound on sweeps under `TerminationPolicy::Converge`
    pub max_sweeps: usize,
}

impl GrowthParams {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            threshold: 20.0,
            order: TraversalOrder::default(),
            termination: TerminationPolicy::default(),
            max_sweeps: 64,
        }
    }
}

/// Outcome of the sweep driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrowthReport {
    pub sweeps: usize,
    pub merges: usize,
    /// True when the last sweep left the state unchanged
    pub converged: bool,
}

/// Growth operations bound to one pixel grid and one set of parameters
pub struct RegionGrower<'a> {
    grid: &'a PixelGrid,
    params: GrowthParams,
}

impl<'a> RegionGrower<'a> {
    pub fn new(grid: &'a PixelGrid, params: GrowthParams) -> Self {
        Self { grid, params }
    }

    /// Current root neighbours of `segment`
    pub fn neighbours(&self, state: &SegmentationState, segment: &Segment) -> BTreeSet<Segment> {
        neighbours(self.grid, state, segment)
    }

    /// Neighbours tied for the cheapest merge, provided that cost is within the threshold
    pub fn best_neighbours(&self, state: &SegmentationState, segment: &Segment) -> BTreeSet<Segment> {
        let costed: Vec<(Segment, f64)> = self
            .neighbours(state, segment)
            .into_iter()
            .map(|candidate| {
                let cost = merge_cost(segment, &candidate);
                (candidate, cost)
            })
            .collect();

        let best = costed
            .iter()
            .map(|(_, cost)| *cost)
            .fold(f64::INFINITY, f64::min);
        let threshold = self.params.threshold;

        if costed.is_empty() || best > threshold {
            return BTreeSet::new();
        }

        costed
            .into_iter()
            .filter(|(_, cost)| *cost <= best && *cost <= threshold)
            .map(|(candidate, _)| candidate)
            .collect()
    }

    /// Grow from a root segment.
    ///
    /// Merges with the first mutual best neighbour if there is one. Otherwise
    /// moves on to the first best neighbour and tries again from there. Returns
    /// the new parent, or `None` when the walk ends without a merge.
    pub fn try_grow(&self, state: &mut SegmentationState, segment: Segment) -> Option<Segment> {
        let mut current = segment;
        let mut hops = 0;

        loop {
            let best = self.best_neighbours(state, &current);

            let partner = best
                .iter()
                .find(|candidate| self.best_neighbours(state, candidate).contains(&current))
                .cloned();
            if let Some(partner) = partner {
                return Some(state.merge(&current, &partner));
            }

            // Costs strictly decrease along the walk, so no root is visited twice
            current = best.into_iter().next()?;
            hops += 1;
            assert!(
                hops <= self.grid.len(),
                "growth walk did not terminate after {} hops",
                hops
            );
        }
    }

    /// Grow from whichever root currently owns `coord`
    pub fn grow_at(&self, state: &mut SegmentationState, coord: Coord) -> Option<Segment> {
        let root = state.find_root(self.grid.pixel_at(coord));
        self.try_grow(state, root)
    }

    /// One pass of the growth step over `order`; returns the number of merges
    pub fn sweep(&self, state: &mut SegmentationState, order: &[Coord]) -> usize {
        let mut merges = 0;
        for &coord in order {
            if self.grow_at(state, coord).is_some() {
                merges += 1;
            }
        }
        merges
    }

    /// Repeat sweeps according to the termination policy
    pub fn run(&self, state: &mut SegmentationState, order: &[Coord]) -> GrowthReport {
        let mut report = GrowthReport::default();

        let max_sweeps = match self.params.termination {
            TerminationPolicy::TwoSweep => 2,
            TerminationPolicy::Converge => self.params.max_sweeps,
        };

        while report.sweeps < max_sweeps {
            let merges = self.sweep(state, order);
            report.sweeps += 1;
            report.merges += merges;
            debug!(
                "Sweep {}: {} merges, {} parent links",
                report.sweeps,
                merges,
                state.len()
            );

            // Links are only ever added, so no merges means an unchanged state
            if merges == 0 {
                report.converged = true;
                break;
            }
        }

        if !report.converged && self.params.termination == TerminationPolicy::Converge {
            warn!(
                "Growth stopped after {} sweeps without reaching a fixpoint",
                report.sweeps
            );
        }

        report
    }
}
