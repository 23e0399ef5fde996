//! Stack of live instances shown during one transition.
//!
//! A growing marker stacks each new frame above the previous one and
//! retires from the bottom. A shrinking marker does the reverse: frames go
//! underneath the larger image and the top is retired, so the marker
//! appears to recede rather than pop.

use std::collections::VecDeque;

use crate::surface::InstanceHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Growing,
    Shrinking,
}

impl Direction {
    /// Growth is judged by pixel area of the first and last frames.
    pub fn classify(first_area: u64, last_area: u64) -> Self {
        if last_area < first_area {
            Direction::Shrinking
        } else {
            Direction::Growing
        }
    }

    fn sign(self) -> f32 {
        match self {
            Direction::Growing => 1.0,
            Direction::Shrinking => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedInstance {
    pub handle: InstanceHandle,
    /// Frame number shown; 0 is the marker's original image.
    pub frame: usize,
}

/// Bounded stack of instances, ordered bottom to top.
#[derive(Debug, Clone)]
pub struct FrameQueue {
    instances: VecDeque<QueuedInstance>,
    direction: Direction,
    depth: usize,
    base_z: f32,
    z_span: f32,
    frame_count: usize,
}

impl FrameQueue {
    /// Queue holding only the marker's original instance.
    pub fn new(
        original: InstanceHandle,
        direction: Direction,
        depth: usize,
        base_z: f32,
        z_span: f32,
        frame_count: usize,
    ) -> Self {
        let mut instances = VecDeque::with_capacity(depth + 1);
        instances.push_back(QueuedInstance {
            handle: original,
            frame: 0,
        });
        Self {
            instances,
            direction,
            depth: depth.max(1),
            base_z,
            z_span,
            frame_count,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Z-index for frame `k` of `frame_count`.
    ///
    /// Frames spread strictly between the base and `base ± span`, in
    /// growing order for a growing marker and falling order for a
    /// shrinking one.
    pub fn z_for(&self, frame: usize) -> f32 {
        let fraction = frame as f32 / (self.frame_count + 1) as f32;
        self.base_z + self.direction.sign() * self.z_span * fraction
    }

    /// Add an instance on the leading side: top when growing, bottom when
    /// shrinking.
    pub fn push(&mut self, handle: InstanceHandle, frame: usize) {
        let queued = QueuedInstance { handle, frame };
        match self.direction {
            Direction::Growing => self.instances.push_back(queued),
            Direction::Shrinking => self.instances.push_front(queued),
        }
    }

    /// Remove from the trailing side until within depth.
    ///
    /// A shrinking queue additionally retires top instances older than
    /// `visible_frame`, so the frame on top tracks the animation even when
    /// a placement was dropped.
    pub fn retire_excess(&mut self, visible_frame: usize) -> Vec<InstanceHandle> {
        let mut retired = Vec::new();
        match self.direction {
            Direction::Growing => {
                while self.instances.len() > self.depth {
                    if let Some(q) = self.instances.pop_front() {
                        retired.push(q.handle);
                    }
                }
            }
            Direction::Shrinking => {
                while self.instances.len() > 1 {
                    let stale = self
                        .instances
                        .back()
                        .map_or(false, |top| top.frame < visible_frame);
                    if self.instances.len() <= self.depth && !stale {
                        break;
                    }
                    if let Some(q) = self.instances.pop_back() {
                        retired.push(q.handle);
                    }
                }
            }
        }
        retired
    }

    /// Most recently pushed instance.
    pub fn newest(&self) -> Option<QueuedInstance> {
        match self.direction {
            Direction::Growing => self.instances.back().copied(),
            Direction::Shrinking => self.instances.front().copied(),
        }
    }

    /// Empty the queue, returning every handle bottom to top.
    pub fn drain(&mut self) -> Vec<InstanceHandle> {
        self.instances.drain(..).map(|q| q.handle).collect()
    }

    /// Handles bottom to top.
    pub fn handles(&self) -> Vec<InstanceHandle> {
        self.instances.iter().map(|q| q.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(n: u64) -> InstanceHandle {
        InstanceHandle(n)
    }

    #[test]
    fn test_classify() {
        assert_eq!(Direction::classify(100, 200), Direction::Growing);
        assert_eq!(Direction::classify(100, 100), Direction::Growing);
        assert_eq!(Direction::classify(200, 100), Direction::Shrinking);
    }

    #[test]
    fn test_growing_retires_bottom() {
        let mut queue = FrameQueue::new(h(0), Direction::Growing, 3, 0.0, 1.0, 10);
        for k in 1..=3 {
            queue.push(h(k), k as usize);
        }
        assert_eq!(queue.retire_excess(3), vec![h(0)]);
        assert_eq!(queue.handles(), vec![h(1), h(2), h(3)]);
        assert_eq!(queue.newest().unwrap().handle, h(3));
    }

    #[test]
    fn test_shrinking_retires_top() {
        let mut queue = FrameQueue::new(h(0), Direction::Shrinking, 3, 0.0, 1.0, 10);
        queue.push(h(1), 1);
        queue.push(h(2), 2);
        assert!(queue.retire_excess(0).is_empty());
        assert_eq!(queue.handles(), vec![h(2), h(1), h(0)]);

        queue.push(h(3), 3);
        assert_eq!(queue.retire_excess(1), vec![h(0)]);
        assert_eq!(queue.handles(), vec![h(3), h(2), h(1)]);
        assert_eq!(queue.newest().unwrap().handle, h(3));
    }

    #[test]
    fn test_shrinking_retires_stale_top_after_dropped_frame() {
        let mut queue = FrameQueue::new(h(0), Direction::Shrinking, 3, 0.0, 1.0, 10);
        queue.push(h(1), 1);
        queue.push(h(2), 2);
        // Frame 3 was rejected; frame 1 should still be on top at index 1.
        assert_eq!(queue.retire_excess(1), vec![h(0)]);
        assert_eq!(queue.handles(), vec![h(2), h(1)]);
    }

    #[test]
    fn test_z_monotonic_and_bounded() {
        let grow = FrameQueue::new(h(0), Direction::Growing, 3, 5.0, 1.0, 12);
        let shrink = FrameQueue::new(h(0), Direction::Shrinking, 3, 5.0, 1.0, 12);
        for k in 1..12 {
            assert!(grow.z_for(k + 1) > grow.z_for(k));
            assert!(shrink.z_for(k + 1) < shrink.z_for(k));
        }
        assert!(grow.z_for(12) < 6.0 && grow.z_for(1) > 5.0);
        assert!(shrink.z_for(12) > 4.0 && shrink.z_for(1) < 5.0);
    }

    #[test]
    fn test_never_retires_last_instance() {
        let mut queue = FrameQueue::new(h(0), Direction::Shrinking, 2, 0.0, 1.0, 4);
        assert!(queue.retire_excess(4).is_empty());
        assert_eq!(queue.len(), 1);
    }
}
