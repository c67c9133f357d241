use crate::{
    controls::Controls,
    heap::HeapStore,
    plan::{Step, SwapPlan, apply},
    presentation::{Highlight, Presentation},
};

/// Delay scale for the pause that follows a swap.
const AFTER_SWAP: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Every step was played.
    Completed,
    /// The run was stopped before the step at this cursor.
    Cancelled(usize),
}

/// Plays a swap plan against a view, one step at a time.
///
/// The driver knows nothing of heap order: it highlights what the plan
/// tells it to, waits between steps, and applies each swap to the store
/// once the view has finished moving the two nodes. Before every step it
/// checks in with `Controls`, suspending while paused and giving up once
/// stopped.
pub struct AnimationDriver<'a, P: Presentation> {
    controls: Controls,
    port: &'a P,
    cursor: usize,
    swaps: usize,
}

impl<'a, P: Presentation> AnimationDriver<'a, P> {
    pub fn new(controls: Controls, port: &'a P) -> AnimationDriver<'a, P> {
        AnimationDriver {
            controls,
            port,
            cursor: 0,
            swaps: 0,
        }
    }

    /// Index of the next step to play.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn swaps_applied(&self) -> usize {
        self.swaps
    }

    /// Play from the cursor to the end of `plan`. The run must already have
    /// been started on the controls; it is stopped again on return.
    pub async fn play(&mut self, heap: &mut HeapStore, plan: &SwapPlan) -> Playback {
        let _guard = self.controls.run_guard();
        let steps = plan.steps();
        while self.cursor < steps.len() {
            if !self.controls.checkpoint().await {
                log::info!(
                    "animation stopped at step {} of {}",
                    self.cursor,
                    steps.len()
                );
                return Playback::Cancelled(self.cursor);
            }
            self.play_step(heap, &steps[self.cursor]).await;
            self.cursor += 1;
        }
        log::debug!("animation complete after {} swaps", self.swaps);
        Playback::Completed
    }

    async fn play_step(&mut self, heap: &mut HeapStore, step: &Step) {
        match step {
            Step::Visit(i) => {
                self.port.highlight(&[*i], Highlight::Active);
                self.controls.wait(1.0).await;
            }
            Step::Compare(nodes) => {
                self.port.highlight(nodes, Highlight::Comparing);
                self.controls.wait(1.0).await;
            }
            Step::Swap(r) => {
                self.port.highlight(&[r.low, r.high], Highlight::Swapping);
                self.controls.wait(1.0).await;
                self.port.animate_swap(r.low, r.high).await;
                apply(heap, step);
                self.swaps += 1;
                self.port.refresh(heap);
                self.port.highlight(&[r.low], Highlight::Settled);
                self.controls.wait(AFTER_SWAP).await;
            }
            Step::Settle(nodes) => {
                self.port.highlight(nodes, Highlight::Settled);
                self.controls.wait(1.0).await;
            }
            Step::Detach(i) => {
                apply(heap, step);
                self.port.refresh(heap);
                self.port.highlight(&[*i], Highlight::Sorted);
                self.controls.wait(AFTER_SWAP).await;
            }
            Step::Boundary => {
                log::debug!("phase boundary at step {}", self.cursor);
            }
        }
    }
}
