//! Root progress indication.
//!
//! It is hard to give meaningful progress for a proof-number search. What is shown here is the
//! current `(phi, delta)` of every root child, updated whenever a child of the root changes its
//! bounds. This is useful except when a single root child remains and the search is stuck several
//! plies below it.

use std::fmt;
use std::time::{Duration, Instant};

use crate::core::{Bounds, ChildSet};

/// Receives root progress snapshots. Purely observational.
pub trait ProgressSink<M> {
    /// `active` is the root child currently being searched, if any.
    fn emit(&mut self, active: Option<usize>, children: &ChildSet<M>, bounds: &[Bounds]);
}

#[derive(Debug, Clone, Copy, Default)]
/// Writes snapshots to the log at `info` level.
pub struct LogProgress;

impl<M: fmt::Debug + Copy> ProgressSink<M> for LogProgress {
    fn emit(&mut self, active: Option<usize>, children: &ChildSet<M>, bounds: &[Bounds]) {
        let mut labels = Vec::with_capacity(children.len());
        let mut losses = 0;
        for (i, b) in bounds.iter().enumerate() {
            let forced = if children.group(i).len() > 1 { "*" } else { "" };
            let value = if b.is_winning() {
                losses += 1;
                "L".to_string()
            } else if b.is_losing() {
                "W".to_string()
            } else {
                b.to_string()
            };
            labels.push(format!("{:?}{forced} {value}", children.first_move(i)));
        }
        if let Some(i) = active {
            log::info!("progress: searching {:?}", children.group(i));
        }
        log::info!("progress: {}", labels.join(", "));
        log::info!("progress: {losses}/{} proven losses", children.len());
    }
}

/// Root child bounds plus write throttling in front of a [`ProgressSink`].
pub(crate) struct RootProgress<'s, M> {
    sink: &'s mut dyn ProgressSink<M>,
    children: ChildSet<M>,
    bounds: Vec<Bounds>,
    active: Option<usize>,
    active_at_last_write: Option<usize>,
    last_write: Option<Instant>,
    delay: Duration,
}

impl<'s, M: Copy> RootProgress<'s, M> {
    pub fn new(sink: &'s mut dyn ProgressSink<M>, delay: Duration) -> Self {
        Self {
            sink,
            children: ChildSet::default(),
            bounds: Vec::new(),
            active: None,
            active_at_last_write: None,
            last_write: None,
            delay,
        }
    }

    pub fn set_children(&mut self, children: &ChildSet<M>, bounds: Vec<Bounds>) {
        self.children = children.clone();
        self.bounds = bounds;
    }

    /// Replaces the bounds of every root child.
    pub fn set_bounds(&mut self, bounds: &[Bounds]) {
        self.bounds.clear();
        self.bounds.extend_from_slice(bounds);
    }

    pub fn play(&mut self, index: usize) {
        self.active = Some(index);
    }

    pub fn undo(&mut self) {
        self.active = None;
    }

    /// Bounds of the root child currently being searched.
    pub fn update_current(&mut self, bounds: Bounds) {
        if let Some(i) = self.active {
            if let Some(slot) = self.bounds.get_mut(i) {
                *slot = bounds;
            }
        }
    }

    /// Writes unless the same child was written less than `delay` ago.
    pub fn write(&mut self) {
        let now = Instant::now();
        if self.active_at_last_write == self.active {
            if let Some(last) = self.last_write {
                if now.duration_since(last) < self.delay {
                    return;
                }
            }
        }
        self.last_write = Some(now);
        self.active_at_last_write = self.active;
        self.do_write();
    }

    pub fn write_forced(&mut self) {
        self.do_write();
    }

    fn do_write(&mut self) {
        self.sink.emit(self.active, &self.children, &self.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        emitted: Vec<(Option<usize>, Vec<Bounds>)>,
    }

    impl ProgressSink<u32> for Counting {
        fn emit(&mut self, active: Option<usize>, _children: &ChildSet<u32>, bounds: &[Bounds]) {
            self.emitted.push((active, bounds.to_vec()));
        }
    }

    #[test]
    fn repeated_writes_for_same_child_are_throttled() {
        let mut sink = Counting::default();
        {
            let mut progress: RootProgress<'_, u32> =
                RootProgress::new(&mut sink, Duration::from_secs(3600));
            progress.set_children(
                &ChildSet::from_moves([1u32, 2]),
                vec![Bounds::new(1, 1), Bounds::new(1, 2)],
            );
            progress.play(0);
            progress.update_current(Bounds::new(2, 3));
            progress.write();
            progress.write();
            progress.undo();
            progress.play(1);
            progress.write();
            progress.write_forced();
        }
        assert_eq!(sink.emitted.len(), 3);
        assert_eq!(sink.emitted[0].0, Some(0));
        assert_eq!(sink.emitted[0].1[0], Bounds::new(2, 3));
        assert_eq!(sink.emitted[1].0, Some(1));
    }
}
