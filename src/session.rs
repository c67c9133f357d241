use rand::{SeedableRng, rngs::StdRng};

use crate::{
    animate::{AnimationDriver, Playback},
    controls::{AlgoStatus, Controls},
    errors::HeapError,
    heap::HeapStore,
    mode::HeapMode,
    options::CommonOptions,
    plan::{BuildStyle, Operation, SwapPlan, plan},
    practice::{PracticeSession, Selection, Verdict},
    presentation::{Highlight, Presentation},
};

pub const MIN_LEVELS: usize = 2;
pub const MAX_LEVELS: usize = 6;

/// Number of nodes in a full tree with `levels` levels.
pub fn levels_to_size(levels: usize) -> usize {
    (1 << levels) - 1
}

/// Who carries out a planned operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// The animation plays the swaps.
    Auto,
    /// The user finds the swaps by picking nodes.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run is active; nothing was started.
    Rejected,
    Completed,
    /// Stopped before the step at this cursor.
    Cancelled(usize),
    /// A practice session is waiting for selections.
    Practising,
    /// The plan had no swaps, so practice was over as soon as it began.
    PracticeComplete(Verdict),
}

/// One heap together with everything operating on it.
///
/// The session is the only writer of its heap: an animation borrows it
/// mutably for the length of the run, and practice selections go through
/// `select`. Pausing, resuming, stopping and speed changes are made through
/// the handle returned by `controls`, which may be used from elsewhere
/// while a run is in flight.
pub struct HeapSession {
    store: HeapStore,
    mode: HeapMode,
    levels: usize,
    controls: Controls,
    rng: StdRng,
    plan: Option<SwapPlan>,
    practice: Option<PracticeSession>,
}

impl HeapSession {
    pub fn new(options: &CommonOptions) -> Result<HeapSession, HeapError> {
        options.check()?;
        let controls = Controls::new(options.base_delay(), options.speed)?;
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        // explicit values replace the generated heap, whatever the level count
        let levels = options.levels.clamp(MIN_LEVELS, MAX_LEVELS);
        let mut session = HeapSession::with_rng(levels, options.mode, controls, rng)?;
        if !options.values.is_empty() {
            session.load(options.values.clone())?;
        }
        Ok(session)
    }

    pub fn with_rng(
        levels: usize,
        mode: HeapMode,
        controls: Controls,
        rng: StdRng,
    ) -> Result<HeapSession, HeapError> {
        check_levels(levels)?;
        let mut rng = rng;
        let store = HeapStore::init(levels_to_size(levels), &mut rng)?;
        Ok(HeapSession {
            store,
            mode,
            levels,
            controls,
            rng,
            plan: None,
            practice: None,
        })
    }

    pub fn store(&self) -> &HeapStore {
        &self.store
    }

    pub fn mode(&self) -> HeapMode {
        self.mode
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn status(&self) -> AlgoStatus {
        self.controls.status()
    }

    /// A handle for pausing, resuming, stopping and changing speed.
    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    /// The plan of the most recent operation.
    pub fn plan(&self) -> Option<&SwapPlan> {
        self.plan.as_ref()
    }

    pub fn practice(&self) -> Option<&PracticeSession> {
        self.practice.as_ref()
    }

    pub fn pause(&self) -> bool {
        self.controls.pause()
    }

    pub fn resume(&self) -> bool {
        self.controls.resume()
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), HeapError> {
        self.controls.set_speed(speed)
    }

    /// Regenerate the heap with `levels` levels under `mode`.
    ///
    /// Returns `Ok(false)` without touching anything while a run is active.
    /// Bad level counts are rejected and the current heap is kept.
    pub fn configure(&mut self, levels: usize, mode: HeapMode) -> Result<bool, HeapError> {
        check_levels(levels)?;
        if !self.controls.is_stopped() {
            log::debug!("ignoring reconfiguration while {}", self.controls.status());
            return Ok(false);
        }
        let store = HeapStore::init(levels_to_size(levels), &mut self.rng)?;
        self.levels = levels;
        self.mode = mode;
        self.replace(store);
        log::info!("new {}-heap with {} levels: {}", mode, levels, self.store);
        Ok(true)
    }

    /// Regenerate the heap with `size` nodes, which need not fill the last level.
    pub fn resize(&mut self, size: usize) -> Result<bool, HeapError> {
        if !self.controls.is_stopped() {
            log::debug!("ignoring resize while {}", self.controls.status());
            return Ok(false);
        }
        let store = HeapStore::init(size, &mut self.rng)?;
        self.replace(store);
        Ok(true)
    }

    /// Replace the heap with the given values, which must be distinct and below 100.
    ///
    /// Returns `Ok(false)` without touching anything while a run is active.
    pub fn load(&mut self, values: Vec<u32>) -> Result<bool, HeapError> {
        let store = HeapStore::from_values(values)?;
        if !self.controls.is_stopped() {
            log::debug!("ignoring load while {}", self.controls.status());
            return Ok(false);
        }
        self.replace(store);
        Ok(true)
    }

    pub async fn start_build<P: Presentation>(
        &mut self,
        style: BuildStyle,
        controller: Controller,
        port: &P,
    ) -> RunOutcome {
        self.start(Operation::Build(style), controller, port).await
    }

    pub async fn start_remove<P: Presentation>(
        &mut self,
        controller: Controller,
        port: &P,
    ) -> RunOutcome {
        self.start(Operation::Remove, controller, port).await
    }

    pub async fn start_heapsort<P: Presentation>(
        &mut self,
        controller: Controller,
        port: &P,
    ) -> RunOutcome {
        self.start(Operation::HeapSort, controller, port).await
    }

    /// Plan `op` and hand it to the animation or to a practice session.
    pub async fn start<P: Presentation>(
        &mut self,
        op: Operation,
        controller: Controller,
        port: &P,
    ) -> RunOutcome {
        if !self.controls.is_stopped() {
            log::debug!("ignoring {} while {}", op, self.controls.status());
            return RunOutcome::Rejected;
        }
        let planned = plan(&self.store, self.mode, op);
        log::info!(
            "{}: {} swaps in {} phase(s)",
            op,
            planned.plan.len(),
            planned.plan.phases()
        );
        self.practice = None;
        self.plan = Some(planned.plan.clone());

        match controller {
            Controller::Auto => {
                if !self.controls.start() {
                    return RunOutcome::Rejected;
                }
                let mut driver = AnimationDriver::new(self.controls.clone(), port);
                match driver.play(&mut self.store, &planned.plan).await {
                    Playback::Completed => {
                        log::info!("{} complete: {}", op, self.store);
                        RunOutcome::Completed
                    }
                    Playback::Cancelled(at) => RunOutcome::Cancelled(at),
                }
            }
            Controller::Manual => {
                let session = PracticeSession::new(planned.plan, &mut self.store);
                port.refresh(&self.store);
                if session.is_complete() {
                    let verdict = session.verdict();
                    port.notify(&verdict.to_string());
                    return RunOutcome::PracticeComplete(verdict);
                }
                self.practice = Some(session);
                RunOutcome::Practising
            }
        }
    }

    /// Feed one user selection to the practice session, if there is one.
    pub async fn select<P: Presentation>(
        &mut self,
        index: usize,
        port: &P,
    ) -> Option<Result<Selection, HeapError>> {
        let session = self.practice.as_mut()?;
        let res = session.select(&mut self.store, index);
        match &res {
            Ok(Selection::Selected(i)) => port.highlight(&[*i], Highlight::Selected),
            Ok(Selection::Deselected(i)) => port.highlight(&[*i], Highlight::Plain),
            Ok(Selection::Swapped(r)) => {
                port.highlight(&[r.low, r.high], Highlight::Swapping);
                port.animate_swap(r.low, r.high).await;
                port.refresh(&self.store);
                port.highlight(&[r.low, r.high], Highlight::Plain);
            }
            Ok(Selection::Complete(r, verdict)) => {
                port.highlight(&[r.low, r.high], Highlight::Swapping);
                port.animate_swap(r.low, r.high).await;
                port.refresh(&self.store);
                port.highlight(&[r.low, r.high], Highlight::Plain);
                log::info!("practice complete with {} mistake(s)", verdict.mistakes());
                port.notify(&verdict.to_string());
                self.practice = None;
            }
            Err(e) => {
                port.notify(&e.to_string());
                if let HeapError::InvalidMove(i, j) | HeapError::IncorrectMove(i, j) = e {
                    port.highlight(&[*i, *j], Highlight::Plain);
                }
            }
        }
        Some(res)
    }

    fn replace(&mut self, store: HeapStore) {
        self.store = store;
        self.plan = None;
        self.practice = None;
    }
}

fn check_levels(levels: usize) -> Result<(), HeapError> {
    if (MIN_LEVELS..=MAX_LEVELS).contains(&levels) {
        Ok(())
    } else {
        Err(HeapError::BadLevels(levels))
    }
}
