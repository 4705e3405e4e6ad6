use super::{Parents, Tangle, TangleError, FIRST_TRANSACTION, GENESIS};
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use tracing::debug;

#[derive(Debug, PartialEq, Serialize)]
pub struct Stats {
    pub avg_dag_depth: f64,
    pub avg_txs_per_depth: f64,
    pub avg_ref: f64,
    pub incoming_rate: f64,
    pub inter_txn_delay: f64,
}

impl Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "AVG DAG DEPTH: {:.3}", self.avg_dag_depth)?;
        writeln!(f, "AVG TXS PER DEPTH: {:.3}", self.avg_txs_per_depth)?;
        writeln!(f, "AVG REF: {:.3}", self.avg_ref)?;
        writeln!(f, "TRANSACTION RATE: {:.3}", self.incoming_rate)?;
        write!(f, "TRANSACTION DELAY: {:.1}", self.inter_txn_delay)
    }
}

/// True shortest and longest path lengths to genesis. Diagnostic only.
#[derive(Debug, PartialEq, Serialize)]
pub struct DepthProfile {
    pub avg_exact_depth: f64,
    pub max_depth: usize,
}

impl Display for DepthProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "AVG EXACT DAG DEPTH: {:.3}", self.avg_exact_depth)?;
        write!(f, "MAX DAG DEPTH: {}", self.max_depth)
    }
}

impl Tangle {
    /// Computes every statistic, failing on the first undefined one.
    ///
    /// The last added transaction is assumed to be the one farthest from
    /// genesis.
    pub fn compute_stats(&self) -> Result<Stats, TangleError> {
        let stats = Stats {
            avg_dag_depth: self.avg_dag_depth()?,
            avg_txs_per_depth: self.avg_txs_per_depth()?,
            avg_ref: self.avg_ref()?,
            incoming_rate: self.incoming_rate(),
            inter_txn_delay: self.inter_txn_delay()?,
        };
        debug!(?stats, "computed stats");
        Ok(stats)
    }

    /// Twin-walk depth: the shorter of the always-left and always-right
    /// parent chains from `id` down to genesis. This is not the shortest
    /// path when the best route mixes left and right parents.
    pub fn depth(&self, id: usize) -> Result<usize, TangleError> {
        self.check_range(id)?;
        Ok(self.twin_walk(id))
    }

    pub fn avg_dag_depth(&self) -> Result<f64, TangleError> {
        let count = self.nonempty_count()?;
        let depth_sum: usize = (0..self.slots.len()).map(|id| self.twin_walk(id)).sum();
        Ok(depth_sum as f64 / count as f64)
    }

    /// Transactions per depth level, taking the depth of the last added
    /// transaction as the depth of the whole tangle. Genesis is excluded.
    pub fn avg_txs_per_depth(&self) -> Result<f64, TangleError> {
        let last = self.last_vertex().ok_or(TangleError::EmptyInput)?;
        let depth = self.twin_walk(last);
        if depth == 0 {
            return Err(TangleError::DivisionUndefined("avg txs per depth"));
        }
        Ok(self.vertex_count() as f64 / depth as f64)
    }

    pub fn avg_ref(&self) -> Result<f64, TangleError> {
        let count = self.nonempty_count()?;
        Ok(self.edge_count() as f64 / count as f64)
    }

    /// Transactions per time unit, where the time units are the sum of every
    /// transaction's timestamp. Zero when all timestamps are zero.
    pub fn incoming_rate(&self) -> f64 {
        let total_time: u128 = self
            .slots
            .iter()
            .filter_map(|slot| slot.map(|tx| u128::from(tx.timestamp)))
            .sum();
        if total_time == 0 {
            return 0.0;
        }
        self.vertex_count() as f64 / total_time as f64
    }

    /// Timestamp gap between the last two added transactions. A single
    /// transaction is measured against genesis.
    pub fn inter_txn_delay(&self) -> Result<f64, TangleError> {
        let last = self.last_vertex().ok_or(TangleError::EmptyInput)?;
        let last_time = self.stamp(last).unwrap_or(0);
        let previous_time = self.stamp(last - 1).unwrap_or(0);
        Ok(last_time as f64 - previous_time as f64)
    }

    pub fn depth_profile(&self) -> Result<DepthProfile, TangleError> {
        self.nonempty_count()?;

        // parents always precede their children, so one forward pass suffices
        let mut shortest: Vec<Option<usize>> = vec![None; self.slots.len()];
        let mut longest: Vec<Option<usize>> = vec![None; self.slots.len()];
        shortest[GENESIS] = Some(0);
        longest[GENESIS] = Some(0);
        for id in FIRST_TRANSACTION..self.slots.len() {
            if let Some(Parents { left, right }) = self.parents(id) {
                let reach = |depths: &[Option<usize>]| {
                    let left = depths[left].map(|d| d + 1);
                    let right = depths[right].map(|d| d + 1);
                    (left, right)
                };
                shortest[id] = match reach(&shortest) {
                    (Some(l), Some(r)) => Some(l.min(r)),
                    (l, r) => l.or(r),
                };
                longest[id] = match reach(&longest) {
                    (Some(l), Some(r)) => Some(l.max(r)),
                    (l, r) => l.or(r),
                };
            }
        }

        let reachable: Vec<usize> = shortest[FIRST_TRANSACTION..]
            .iter()
            .filter_map(|d| *d)
            .collect();
        if reachable.is_empty() {
            return Err(TangleError::DivisionUndefined("avg exact dag depth"));
        }
        let depth_sum: usize = reachable.iter().sum();
        Ok(DepthProfile {
            avg_exact_depth: depth_sum as f64 / reachable.len() as f64,
            max_depth: longest.into_iter().flatten().max().unwrap_or(0),
        })
    }

    fn nonempty_count(&self) -> Result<usize, TangleError> {
        match self.vertex_count() {
            0 => Err(TangleError::EmptyInput),
            count => Ok(count),
        }
    }

    fn twin_walk(&self, id: usize) -> usize {
        let trunk = self.walk(id, |p| p.left);
        let branch = self.walk(id, |p| p.right);
        trunk.min(branch)
    }

    // Genesis and the placeholder have no parents, so every walk stops there.
    fn walk<F>(&self, start: usize, next: F) -> usize
    where
        F: Fn(&Parents) -> usize,
    {
        let mut steps = 0;
        let mut vertex = start;
        while let Some(parents) = self.parents(vertex) {
            steps += 1;
            vertex = next(&parents);
        }
        steps
    }
}
