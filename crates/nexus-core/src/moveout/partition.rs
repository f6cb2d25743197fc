//! Pending/completed partitioning of moveout lists.

use crate::models::MoveoutList;

/// Lists grouped by status, in server order.
///
/// Lists whose status is neither pending nor completed land in `other` and
/// are not shown until the server corrects them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    pub pending: Vec<MoveoutList>,
    pub completed: Vec<MoveoutList>,
    pub other: Vec<MoveoutList>,
}

impl Partitions {
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a full list collection by status.
pub fn partition(lists: Vec<MoveoutList>) -> Partitions {
    let mut partitions = Partitions::default();
    for list in lists {
        if list.status.is_pending() {
            partitions.pending.push(list);
        } else if list.status.is_completed() {
            partitions.completed.push(list);
        } else {
            tracing::debug!(
                "Excluding moveout list {} with status '{}'",
                list.id,
                list.status
            );
            partitions.other.push(list);
        }
    }
    partitions
}
