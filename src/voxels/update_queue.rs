use glam::IVec3;
use log::warn;

/// Block coordinates waiting for liquid re-evaluation.
///
/// `drain` hands out everything queued so far. Anything enqueued while the
/// caller works through that batch lands behind the boundary and is only
/// returned by the next drain, so re-queueing during processing is never lost
/// and never processed twice in the same tick.
pub struct UpdateQueue {
    pending: Vec<IVec3>,
    capacity: usize,
}

impl UpdateQueue {
    pub fn new(capacity: usize) -> UpdateQueue {
        Self {
            pending: Vec::new(),
            capacity,
        }
    }

    /// No-op if the coordinate is already waiting for the next drain
    pub fn enqueue(&mut self, coords: IVec3) {
        // Linear scan is fine for realistic per-tick volumes
        if self.pending.contains(&coords) {
            return;
        }
        if self.pending.len() >= self.capacity {
            warn!("Update queue full ({}), dropping {coords}", self.capacity);
            return;
        }
        self.pending.push(coords);
    }

    pub fn drain(&mut self) -> Vec<IVec3> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;
    use proptest::prelude::*;

    use super::UpdateQueue;

    #[test]
    fn test_duplicate_enqueue_drains_once() {
        let mut queue = UpdateQueue::new(16);
        queue.enqueue(IVec3::new(1, 2, 3));
        queue.enqueue(IVec3::new(1, 2, 3));
        assert_eq!(queue.drain(), vec![IVec3::new(1, 2, 3)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_during_processing_survives_to_next_drain() {
        let mut queue = UpdateQueue::new(16);
        queue.enqueue(IVec3::ZERO);
        queue.enqueue(IVec3::X);
        let batch = queue.drain();
        for coords in &batch {
            // Re-queue the drained coordinate plus a new neighbour
            queue.enqueue(*coords);
            queue.enqueue(*coords + IVec3::Y);
        }
        assert_eq!(batch, vec![IVec3::ZERO, IVec3::X]);
        assert_eq!(
            queue.drain(),
            vec![IVec3::ZERO, IVec3::Y, IVec3::X, IVec3::X + IVec3::Y]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_full_queue_truncates() {
        let mut queue = UpdateQueue::new(2);
        queue.enqueue(IVec3::ZERO);
        queue.enqueue(IVec3::X);
        queue.enqueue(IVec3::Y);
        assert_eq!(queue.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_drain_yields_each_coordinate_once(
            coords in prop::collection::vec((-4i32..4, 0i32..4, -4i32..4), 0..64)
        ) {
            let mut queue = UpdateQueue::new(1024);
            for (x, y, z) in &coords {
                queue.enqueue(IVec3::new(*x, *y, *z));
            }
            let drained = queue.drain();
            let mut unique: Vec<IVec3> = coords.iter().map(|(x, y, z)| IVec3::new(*x, *y, *z)).collect();
            unique.sort_by_key(|c| (c.x, c.y, c.z));
            unique.dedup();
            let mut sorted = drained.clone();
            sorted.sort_by_key(|c| (c.x, c.y, c.z));
            prop_assert_eq!(sorted, unique);
        }
    }
}
