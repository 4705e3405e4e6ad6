pub mod error;
pub mod parse;
pub mod stats;

pub use error::TangleError;

use std::convert::TryFrom;
use std::fmt;
use std::fmt::Display;
use tracing::{debug, trace, warn};

/// Reserved slot, never a real transaction.
pub const PLACEHOLDER: usize = 0;
/// The root transaction. Has no parents and timestamp 0.
pub const GENESIS: usize = 1;
/// Vertex id of the first regular transaction.
pub const FIRST_TRANSACTION: usize = 2;

/// Maps a 0-based record index from the input to its vertex id.
pub fn vertex_id(index: usize) -> usize {
    index + FIRST_TRANSACTION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parents {
    pub left: usize,  // trunk
    pub right: usize, // branch
}

/// One input line: the two parents and arrival time of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub left: usize,
    pub right: usize,
    pub timestamp: u64,
}

impl Record {
    pub fn new(left: usize, right: usize, timestamp: u64) -> Self {
        Record {
            left,
            right,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transaction {
    parents: Parents,
    timestamp: u64,
}

/// Two-parent transaction DAG. Slot `i` holds the edges of vertex `i`;
/// genesis and the placeholder never hold edges.
#[derive(Debug, PartialEq)]
pub struct Tangle {
    slots: Vec<Option<Transaction>>,
    edges: usize,
    next: usize,
}

impl Tangle {
    /// Allocates `slots` vertices, each with no edges.
    pub fn new(slots: i64) -> Result<Self, TangleError> {
        if slots < 0 {
            return Err(TangleError::NegativeVertexCount(slots));
        }
        let len = usize::try_from(slots).map_err(|_| TangleError::TooManyVertices(slots))?;
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(len)
            .map_err(|_| TangleError::TooManyVertices(slots))?;
        storage.resize(len, None);
        Ok(Tangle {
            slots: storage,
            edges: 0,
            next: FIRST_TRANSACTION,
        })
    }

    fn with_slots(slots: usize) -> Self {
        Tangle {
            slots: vec![None; slots],
            edges: 0,
            next: FIRST_TRANSACTION,
        }
    }

    /// Builds the whole graph, record `i` becoming vertex `vertex_id(i)`.
    pub fn from_records(records: &[Record]) -> Result<Self, TangleError> {
        let mut tangle = Self::with_slots(records.len() + FIRST_TRANSACTION);
        for (index, record) in records.iter().enumerate() {
            tangle.add_transaction(
                vertex_id(index),
                record.left,
                record.right,
                record.timestamp,
            )?;
        }
        debug!(
            vertices = tangle.vertex_count(),
            edges = tangle.edge_count(),
            "built tangle"
        );
        Ok(tangle)
    }

    /// Records that `id` approves `left` and `right`. Transactions must be
    /// added in id order and may only reference vertices added before them.
    /// Nothing is modified when an error is returned.
    pub fn add_transaction(
        &mut self,
        id: usize,
        left: usize,
        right: usize,
        timestamp: u64,
    ) -> Result<(), TangleError> {
        for &vertex in &[id, left, right] {
            self.check_range(vertex)?;
        }
        if id != self.next {
            return Err(TangleError::OutOfOrder {
                id,
                expected: self.next,
            });
        }
        for &parent in &[left, right] {
            if parent >= id {
                return Err(TangleError::FutureRef { id, parent });
            }
        }

        let previous = self.stamp(id - 1).unwrap_or(0);
        if timestamp < previous {
            warn!(id, timestamp, previous, "timestamp earlier than previous transaction");
        }

        trace!(id, left, right, timestamp, "add transaction");
        self.slots[id] = Some(Transaction {
            parents: Parents { left, right },
            timestamp,
        });
        self.edges += 2;
        self.next += 1;
        Ok(())
    }

    /// Parents of `id`, or `None` for genesis, the placeholder and slots
    /// not yet filled.
    pub fn neighbors(&self, id: usize) -> Result<Option<Parents>, TangleError> {
        self.check_range(id)?;
        Ok(self.parents(id))
    }

    pub fn timestamp(&self, id: usize) -> Result<Option<u64>, TangleError> {
        self.check_range(id)?;
        Ok(self.stamp(id))
    }

    /// Number of regular transactions, i.e. slots minus the placeholder and
    /// genesis.
    pub fn vertex_count(&self) -> usize {
        self.slots.len().saturating_sub(FIRST_TRANSACTION)
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// The most recently added transaction.
    pub fn last_vertex(&self) -> Option<usize> {
        if self.next > FIRST_TRANSACTION {
            Some(self.next - 1)
        } else {
            None
        }
    }

    fn check_range(&self, vertex: usize) -> Result<(), TangleError> {
        if vertex >= self.slots.len() {
            return Err(TangleError::VertexOutOfRange {
                vertex,
                bound: self.slots.len().saturating_sub(1),
            });
        }
        Ok(())
    }

    fn parents(&self, id: usize) -> Option<Parents> {
        self.slots.get(id).and_then(|slot| slot.map(|tx| tx.parents))
    }

    fn stamp(&self, id: usize) -> Option<u64> {
        match id {
            GENESIS if self.slots.len() > GENESIS => Some(0),
            _ => self.slots.get(id).and_then(|slot| slot.map(|tx| tx.timestamp)),
        }
    }
}

impl Display for Tangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} vertices, {} edges",
            self.vertex_count(),
            self.edge_count()
        )?;
        for (id, slot) in self.slots.iter().enumerate() {
            write!(f, "{}:", id)?;
            if let Some(tx) = slot {
                write!(f, " {} {}", tx.parents.left, tx.parents.right)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_b() -> Tangle {
        Tangle::from_records(&[
            Record::new(1, 1, 0),
            Record::new(1, 2, 5),
            Record::new(2, 3, 9),
        ])
        .expect("tangle should build")
    }

    #[test]
    fn test_new_negative() {
        let err = Tangle::new(-1).err().unwrap();
        assert!(matches!(err, TangleError::NegativeVertexCount(-1)));
    }

    #[test]
    fn test_new_too_large() {
        let err = Tangle::new(i64::MAX).err().unwrap();
        assert!(matches!(err, TangleError::TooManyVertices(i64::MAX)));
    }

    #[test]
    fn test_new_empty() {
        let tangle = Tangle::new(0).unwrap();
        assert_eq!(tangle.vertex_count(), 0);
        assert_eq!(tangle.edge_count(), 0);
        assert_eq!(tangle.last_vertex(), None);
    }

    #[test]
    fn test_vertex_id() {
        assert_eq!(vertex_id(0), FIRST_TRANSACTION);
        assert_eq!(vertex_id(3), 5);
    }

    #[test]
    fn test_add_transaction() {
        let mut tangle = Tangle::new(4).unwrap();
        tangle.add_transaction(2, 1, 1, 0).unwrap();
        tangle.add_transaction(3, 1, 2, 4).unwrap();
        assert_eq!(tangle.vertex_count(), 2);
        assert_eq!(tangle.edge_count(), 4);
        assert_eq!(
            tangle.neighbors(3).unwrap(),
            Some(Parents { left: 1, right: 2 })
        );
        assert_eq!(tangle.timestamp(3).unwrap(), Some(4));
        assert_eq!(tangle.last_vertex(), Some(3));
    }

    #[test]
    fn test_add_transaction_out_of_range() {
        let mut tangle = Tangle::new(3).unwrap();
        let err = tangle.add_transaction(2, 1, 3, 0).err().unwrap();
        assert!(matches!(
            err,
            TangleError::VertexOutOfRange {
                vertex: 3,
                bound: 2
            }
        ));
        assert_eq!(tangle, Tangle::new(3).unwrap());
    }

    #[test]
    fn test_add_transaction_out_of_order() {
        let mut tangle = Tangle::new(4).unwrap();
        let err = tangle.add_transaction(3, 1, 1, 0).err().unwrap();
        assert!(matches!(
            err,
            TangleError::OutOfOrder {
                id: 3,
                expected: 2
            }
        ));
        assert_eq!(tangle.edge_count(), 0);
    }

    #[test]
    fn test_add_transaction_future_ref() {
        let mut tangle = Tangle::new(4).unwrap();
        let err = tangle.add_transaction(2, 1, 3, 0).err().unwrap();
        assert!(matches!(err, TangleError::FutureRef { id: 2, parent: 3 }));

        let err = tangle.add_transaction(2, 2, 1, 0).err().unwrap();
        assert!(matches!(err, TangleError::FutureRef { id: 2, parent: 2 }));
        assert_eq!(tangle.neighbors(2).unwrap(), None);
    }

    #[test]
    fn test_add_transaction_non_monotonic_timestamp() {
        let mut tangle = Tangle::new(4).unwrap();
        tangle.add_transaction(2, 1, 1, 5).unwrap();
        tangle.add_transaction(3, 2, 2, 1).unwrap();
        assert_eq!(tangle.timestamp(3).unwrap(), Some(1));
    }

    #[test]
    fn test_from_records() {
        let tangle = scenario_b();
        assert_eq!(tangle.vertex_count(), 3);
        assert_eq!(tangle.edge_count(), 6);
        assert_eq!(tangle.last_vertex(), Some(4));
        assert_eq!(
            tangle.neighbors(4).unwrap(),
            Some(Parents { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_from_records_invalid() {
        let err = Tangle::from_records(&[Record::new(1, 1, 0), Record::new(1, 7, 1)])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TangleError::VertexOutOfRange {
                vertex: 7,
                bound: 3
            }
        ));
    }

    #[test]
    fn test_neighbors_reserved() {
        let tangle = scenario_b();
        assert_eq!(tangle.neighbors(PLACEHOLDER).unwrap(), None);
        assert_eq!(tangle.neighbors(GENESIS).unwrap(), None);
        assert_eq!(tangle.timestamp(GENESIS).unwrap(), Some(0));
        assert_eq!(tangle.timestamp(PLACEHOLDER).unwrap(), None);
    }

    #[test]
    fn test_neighbors_out_of_range() {
        let tangle = scenario_b();
        let err = tangle.neighbors(5).err().unwrap();
        assert!(matches!(
            err,
            TangleError::VertexOutOfRange {
                vertex: 5,
                bound: 4
            }
        ));
        assert!(tangle.timestamp(5).is_err());
    }

    #[test]
    fn test_render() {
        assert_eq!(
            scenario_b().to_string(),
            "3 vertices, 6 edges\n0:\n1:\n2: 1 1\n3: 1 2\n4: 2 3\n"
        );
    }
}
