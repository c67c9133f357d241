use std::fmt::Display;

use crate::{
    errors::HeapError,
    heap::{HeapStore, is_parent_child},
    plan::{Step, SwapPlan, SwapRecord, apply},
};

/// How a finished practice session went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Perfect,
    Minor,
    Finished(usize),
    TryAgain(usize),
}

impl Verdict {
    pub fn from_mistakes(mistakes: usize) -> Verdict {
        match mistakes {
            0 => Verdict::Perfect,
            1 => Verdict::Minor,
            2..=3 => Verdict::Finished(mistakes),
            _ => Verdict::TryAgain(mistakes),
        }
    }

    pub fn mistakes(&self) -> usize {
        match self {
            Verdict::Perfect => 0,
            Verdict::Minor => 1,
            Verdict::Finished(n) | Verdict::TryAgain(n) => *n,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Perfect => write!(f, "Perfect!"),
            Verdict::Minor => write!(f, "Nice Work! You made 1 mistake."),
            Verdict::Finished(n) => write!(f, "Finished! You made {} mistakes.", n),
            Verdict::TryAgain(n) => {
                write!(f, "Finished! You made {} mistakes. Try again!", n)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected(usize),
    Deselected(usize),
    /// The pair was the next swap and has been applied.
    Swapped(SwapRecord),
    /// The pair was the last swap; the session is over.
    Complete(SwapRecord, Verdict),
}

/// A user working through a swap plan by picking pairs of nodes.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    plan: SwapPlan,
    cursor: usize,
    toggled: Vec<usize>,
    mistakes: usize,
}

impl PracticeSession {
    /// Start at the first swap of `plan`. Detaches ahead of it are applied to `heap`.
    pub fn new(plan: SwapPlan, heap: &mut HeapStore) -> PracticeSession {
        let mut session = PracticeSession {
            plan,
            cursor: 0,
            toggled: Vec::with_capacity(2),
            mistakes: 0,
        };
        session.skip_to_swap(heap);
        session
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    pub fn toggled(&self) -> &[usize] {
        &self.toggled
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.plan.steps().len()
    }

    /// The swap the user has to find next.
    pub fn expected(&self) -> Option<SwapRecord> {
        match self.plan.steps().get(self.cursor) {
            Some(Step::Swap(r)) => Some(*r),
            _ => None,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_mistakes(self.mistakes)
    }

    /// Toggle `index`; once two nodes are picked, check them against the plan.
    ///
    /// A wrong pair counts as a mistake and comes back as `InvalidMove` when
    /// the two nodes are not parent and child within the heap, or as
    /// `IncorrectMove` when they are but it is not their turn. Either way the
    /// selection is cleared and the session carries on.
    pub fn select(&mut self, heap: &mut HeapStore, index: usize) -> Result<Selection, HeapError> {
        assert!(!self.is_complete(), "practice session already complete");
        assert!(
            index >= 1 && index <= heap.capacity(),
            "selected index {} out of range 1..={}",
            index,
            heap.capacity()
        );

        if let Some(pos) = self.toggled.iter().position(|i| *i == index) {
            self.toggled.remove(pos);
            return Ok(Selection::Deselected(index));
        }
        self.toggled.push(index);
        if self.toggled.len() < 2 {
            return Ok(Selection::Selected(index));
        }

        let pair = SwapRecord::new(self.toggled[0], self.toggled[1]);
        self.toggled.clear();
        let expected = match self.expected() {
            Some(r) => r,
            None => unreachable!("practice cursor rests on a swap until complete"),
        };

        if pair == expected {
            apply(heap, &Step::Swap(pair));
            self.cursor += 1;
            self.skip_to_swap(heap);
            if self.is_complete() {
                Ok(Selection::Complete(pair, self.verdict()))
            } else {
                Ok(Selection::Swapped(pair))
            }
        } else {
            self.mistakes += 1;
            log::debug!("wrong pair {} (expected {})", pair, expected);
            if !is_parent_child(pair.low, pair.high) || pair.high > heap.len() {
                Err(HeapError::InvalidMove(pair.low, pair.high))
            } else {
                Err(HeapError::IncorrectMove(pair.low, pair.high))
            }
        }
    }

    fn skip_to_swap(&mut self, heap: &mut HeapStore) {
        let steps = self.plan.steps();
        while self.cursor < steps.len() {
            let step = &steps[self.cursor];
            if let Step::Swap(_) = step {
                break;
            }
            apply(heap, step);
            self.cursor += 1;
        }
    }
}
