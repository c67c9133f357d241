use std::fmt::Display;

use clap::ValueEnum;

use crate::{
    heap::{HeapStore, parent},
    mode::HeapMode,
};

/// One canonical swap, stored with the lower index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapRecord {
    pub low: usize,
    pub high: usize,
}

impl SwapRecord {
    pub fn new(i: usize, j: usize) -> SwapRecord {
        if i < j {
            SwapRecord { low: i, high: j }
        } else {
            SwapRecord { low: j, high: i }
        }
    }
}

impl Display for SwapRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The node a sift is currently working on.
    Visit(usize),
    /// A parent and the children it is weighed against.
    Compare(Vec<usize>),
    Swap(SwapRecord),
    /// Nodes now in order with respect to each other.
    Settle(Vec<usize>),
    /// The node at this index leaves the logical heap.
    Detach(usize),
    /// Separates independent phases of a heapsort.
    Boundary,
}

/// The canonical, replayable description of one heap operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapPlan {
    steps: Vec<Step>,
}

impl SwapPlan {
    pub fn new() -> SwapPlan {
        SwapPlan { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn records(&self) -> impl Iterator<Item = SwapRecord> {
        self.steps.iter().filter_map(|step| match step {
            Step::Swap(r) => Some(*r),
            _ => None,
        })
    }

    /// Number of swap records. Annotations, detaches and boundaries don't count.
    pub fn len(&self) -> usize {
        self.records().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of phases separated by boundaries.
    pub fn phases(&self) -> usize {
        if self.steps.is_empty() {
            0
        } else {
            1 + self.steps.iter().filter(|s| **s == Step::Boundary).count()
        }
    }

    /// Apply every swap and detach, in order, to a copy of `initial`.
    pub fn replay(&self, initial: &HeapStore) -> HeapStore {
        let mut heap = initial.clone();
        for step in self.steps.iter() {
            apply(&mut heap, step);
        }
        heap
    }

    fn push(&mut self, step: Step) {
        self.steps.push(step);
    }
}

/// Perform the heap mutation a step describes, if any.
pub fn apply(heap: &mut HeapStore, step: &Step) {
    match step {
        Step::Swap(r) => heap.swap_values(r.low, r.high),
        Step::Detach(i) => {
            debug_assert_eq!(*i, heap.len());
            heap.detach();
        }
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildStyle {
    /// Sift down every internal node, last first.
    BottomUp,
    /// Sift up every node, second first.
    TopDown,
}

impl Display for BuildStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStyle::BottomUp => write!(f, "bottom-up"),
            BuildStyle::TopDown => write!(f, "top-down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Build(BuildStyle),
    Remove,
    HeapSort,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Build(style) => write!(f, "build ({})", style),
            Operation::Remove => write!(f, "remove"),
            Operation::HeapSort => write!(f, "heapsort"),
        }
    }
}

/// The outcome of planning an operation.
#[derive(Debug, Clone)]
pub struct Planned {
    pub plan: SwapPlan,
    /// The heap after the plan has been carried out.
    pub heap: HeapStore,
    /// Values taken off the root, in order of removal.
    pub extracted: Vec<u32>,
}

pub fn plan(heap: &HeapStore, mode: HeapMode, op: Operation) -> Planned {
    let mut planner = Planner::new(heap, mode);
    match op {
        Operation::Build(BuildStyle::BottomUp) => planner.build_bottom_up(),
        Operation::Build(BuildStyle::TopDown) => planner.build_top_down(),
        Operation::Remove => planner.remove_root(),
        Operation::HeapSort => planner.heap_sort(),
    }
    planner.finish()
}

struct Planner {
    heap: HeapStore,
    mode: HeapMode,
    plan: SwapPlan,
    extracted: Vec<u32>,
}

impl Planner {
    fn new(heap: &HeapStore, mode: HeapMode) -> Planner {
        Planner {
            heap: heap.clone(),
            mode,
            plan: SwapPlan::new(),
            extracted: Vec::new(),
        }
    }

    fn finish(self) -> Planned {
        Planned {
            plan: self.plan,
            heap: self.heap,
            extracted: self.extracted,
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        let step = Step::Swap(SwapRecord::new(i, j));
        apply(&mut self.heap, &step);
        self.plan.push(step);
    }

    fn build_bottom_up(&mut self) {
        let n = self.heap.len();
        if n == 0 {
            return;
        }
        // leaves are trivially heaps
        self.plan.push(Step::Settle((n / 2 + 1..=n).collect()));
        for i in (1..=n / 2).rev() {
            self.sift_down(i);
        }
    }

    fn build_top_down(&mut self) {
        let n = self.heap.len();
        for i in 2..=n {
            self.sift_up(i);
        }
    }

    fn sift_down(&mut self, p: usize) {
        let mut p = p;
        loop {
            self.plan.push(Step::Visit(p));
            let children: Vec<usize> = self.heap.children(p).collect();
            if children.is_empty() {
                self.plan.push(Step::Settle(vec![p]));
                return;
            }
            let mut nodes = vec![p];
            nodes.extend(children.iter());
            self.plan.push(Step::Compare(nodes.clone()));

            let p_val = self.heap.get(p);
            let mut best: Option<usize> = None;
            for c in children {
                let c_val = self.heap.get(c);
                if !self.mode.should_swap(c_val, p_val) {
                    continue;
                }
                // between two qualifying children only a strictly more extreme one wins
                let replace = match best {
                    Some(b) => self.mode.should_swap(c_val, self.heap.get(b)),
                    None => true,
                };
                if replace {
                    best = Some(c);
                }
            }

            match best {
                Some(c) => {
                    let others: Vec<usize> =
                        nodes.into_iter().filter(|i| *i != p && *i != c).collect();
                    if !others.is_empty() {
                        self.plan.push(Step::Settle(others));
                    }
                    self.swap(c, p);
                    p = c;
                }
                None => {
                    self.plan.push(Step::Settle(nodes));
                    return;
                }
            }
        }
    }

    fn sift_up(&mut self, c: usize) {
        let mut c = c;
        self.plan.push(Step::Visit(c));
        while c > 1 {
            let p = parent(c);
            self.plan.push(Step::Compare(vec![p, c]));
            if self.mode.should_swap(self.heap.get(c), self.heap.get(p)) {
                self.swap(c, p);
                c = p;
            } else {
                break;
            }
        }
        self.plan.push(Step::Settle(vec![c]));
    }

    fn remove_root(&mut self) {
        let n = self.heap.len();
        if n == 0 {
            return;
        }
        if let Some(root) = self.heap.front() {
            self.extracted.push(root);
        }
        if n > 1 {
            self.swap(1, n);
        }
        let step = Step::Detach(n);
        apply(&mut self.heap, &step);
        self.plan.push(step);
        if n > 2 {
            self.sift_down(1);
        }
    }

    fn heap_sort(&mut self) {
        if self.heap.is_empty() {
            return;
        }
        if !self.heap.is_heap(self.mode) {
            self.build_bottom_up();
            self.plan.push(Step::Boundary);
        }
        while !self.heap.is_empty() {
            self.remove_root();
            if !self.heap.is_empty() {
                self.plan.push(Step::Boundary);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn random_heaps(seed: u64) -> Vec<HeapStore> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut res = Vec::new();
        for _ in 0..25 {
            for size in [1, 2, 3, 5, 7, 10, 15, 31, 63] {
                res.push(HeapStore::init(size, &mut rng).unwrap());
            }
        }
        res
    }

    fn built(values: Vec<u32>, mode: HeapMode) -> HeapStore {
        let h = HeapStore::new(values);
        plan(&h, mode, Operation::Build(BuildStyle::BottomUp)).heap
    }

    #[test]
    fn swap_record_is_sorted() {
        assert_eq!(SwapRecord::new(6, 3), SwapRecord { low: 3, high: 6 });
        assert_eq!(SwapRecord::new(3, 6), SwapRecord { low: 3, high: 6 });
        assert_eq!(SwapRecord::new(6, 3).to_string(), "(3, 6)");
    }

    #[test]
    fn builds_establish_heap_order() {
        for mode in [HeapMode::Min, HeapMode::Max] {
            for style in [BuildStyle::BottomUp, BuildStyle::TopDown] {
                for h in random_heaps(19) {
                    let res = plan(&h, mode, Operation::Build(style));
                    assert!(res.heap.is_heap(mode), "{:?} {:?} {}", mode, style, h);
                    assert_eq!(res.heap.len(), h.len());
                    assert!(res.extracted.is_empty());
                }
            }
        }
    }

    #[test]
    fn replay_reproduces_final_heap() {
        let ops = [
            Operation::Build(BuildStyle::BottomUp),
            Operation::Build(BuildStyle::TopDown),
            Operation::Remove,
            Operation::HeapSort,
        ];
        for mode in [HeapMode::Min, HeapMode::Max] {
            for op in ops {
                for h in random_heaps(23) {
                    let res = plan(&h, mode, op);
                    assert_eq!(res.plan.replay(&h), res.heap);
                }
            }
        }
    }

    #[test]
    fn ordered_subtrees_are_left_alone() {
        let h = HeapStore::new(vec![50, 30, 20, 10, 5, 15, 25]);
        let res = plan(&h, HeapMode::Max, Operation::Build(BuildStyle::BottomUp));
        let swaps: Vec<SwapRecord> = res.plan.records().collect();
        // only 25 under 20 is out of order; the subtree at 2 is untouched
        assert_eq!(swaps, vec![SwapRecord::new(3, 7)]);
        assert!(swaps.iter().all(|r| ![2, 4, 5].contains(&r.low)));
        assert!(swaps.iter().all(|r| ![2, 4, 5].contains(&r.high)));
        assert_eq!(res.heap.get(1), 50);
        assert_eq!(res.heap.values(), &[50, 30, 25, 10, 5, 15, 20]);

        let ordered = res.heap.clone();
        let again = plan(&ordered, HeapMode::Max, Operation::Build(BuildStyle::BottomUp));
        assert!(again.plan.is_empty());
        assert_eq!(again.heap, ordered);
    }

    #[test]
    fn bottom_up_order() {
        let h = HeapStore::new(vec![9, 8, 7, 6, 5, 4, 3]);
        let res = plan(&h, HeapMode::Min, Operation::Build(BuildStyle::BottomUp));
        let swaps: Vec<SwapRecord> = res.plan.records().collect();
        assert_eq!(
            swaps,
            vec![
                SwapRecord::new(3, 7),
                SwapRecord::new(2, 5),
                SwapRecord::new(1, 3),
                SwapRecord::new(3, 6),
            ]
        );
        assert_eq!(res.heap.values(), &[3, 5, 4, 6, 8, 9, 7]);
    }

    #[test]
    fn top_down_order() {
        let h = HeapStore::new(vec![9, 8, 7]);
        let res = plan(&h, HeapMode::Min, Operation::Build(BuildStyle::TopDown));
        let swaps: Vec<SwapRecord> = res.plan.records().collect();
        assert_eq!(swaps, vec![SwapRecord::new(1, 2), SwapRecord::new(1, 3)]);
        assert_eq!(res.heap.values(), &[7, 9, 8]);
    }

    #[test]
    fn sift_down_prefers_more_extreme_child() {
        // both children beat the parent; the right one beats the left
        let h = HeapStore::new(vec![9, 5, 3]);
        let res = plan(&h, HeapMode::Min, Operation::Build(BuildStyle::BottomUp));
        assert_eq!(res.plan.records().collect::<Vec<_>>(), vec![SwapRecord::new(1, 3)]);

        let h = HeapStore::new(vec![1, 5, 3]);
        let res = plan(&h, HeapMode::Max, Operation::Build(BuildStyle::BottomUp));
        assert_eq!(res.plan.records().collect::<Vec<_>>(), vec![SwapRecord::new(1, 2)]);

        // only the right child qualifies
        let h = HeapStore::new(vec![4, 6, 3]);
        let res = plan(&h, HeapMode::Min, Operation::Build(BuildStyle::BottomUp));
        assert_eq!(res.plan.records().collect::<Vec<_>>(), vec![SwapRecord::new(1, 3)]);
    }

    #[test]
    fn tied_children_keep_left() {
        let h = HeapStore::new(vec![9, 2, 2]);
        let res = plan(&h, HeapMode::Min, Operation::Build(BuildStyle::BottomUp));
        assert_eq!(res.plan.records().collect::<Vec<_>>(), vec![SwapRecord::new(1, 2)]);
    }

    #[test]
    fn equal_values_never_swap() {
        let h = HeapStore::new(vec![4, 4, 4, 4, 4]);
        for op in [
            Operation::Build(BuildStyle::BottomUp),
            Operation::Build(BuildStyle::TopDown),
        ] {
            assert!(plan(&h, HeapMode::Min, op).plan.is_empty());
            assert!(plan(&h, HeapMode::Max, op).plan.is_empty());
        }
    }

    #[test]
    fn single_child_is_compared() {
        let h = HeapStore::new(vec![9, 8, 7, 1]);
        let res = plan(&h, HeapMode::Min, Operation::Build(BuildStyle::BottomUp));
        assert!(res.plan.steps().contains(&Step::Compare(vec![2, 4])));
        assert!(res.heap.is_heap(HeapMode::Min));
    }

    #[test]
    fn empty_heap_is_a_no_op() {
        let h = HeapStore::new(vec![]);
        for op in [
            Operation::Build(BuildStyle::BottomUp),
            Operation::Build(BuildStyle::TopDown),
            Operation::Remove,
            Operation::HeapSort,
        ] {
            let res = plan(&h, HeapMode::Max, op);
            assert!(res.plan.steps().is_empty());
            assert_eq!(res.heap, h);
        }
    }

    #[test]
    fn remove_single() {
        let h = HeapStore::new(vec![42]);
        let res = plan(&h, HeapMode::Max, Operation::Remove);
        assert!(res.plan.is_empty());
        assert_eq!(res.plan.steps(), &[Step::Detach(1)]);
        assert_eq!(res.heap.len(), 0);
        assert_eq!(res.extracted, vec![42]);
    }

    #[test]
    fn remove_restores_order() {
        for mode in [HeapMode::Min, HeapMode::Max] {
            for h in random_heaps(29) {
                if h.len() < 2 {
                    continue;
                }
                let h = plan(&h, mode, Operation::Build(BuildStyle::BottomUp)).heap;
                let res = plan(&h, mode, Operation::Remove);
                assert_eq!(res.heap.len(), h.len() - 1);
                assert!(res.heap.is_heap(mode));
                assert_eq!(res.plan.records().next(), Some(SwapRecord::new(1, h.len())));

                let rest = res.heap.heap();
                let expected = match mode {
                    HeapMode::Min => rest.iter().min(),
                    HeapMode::Max => rest.iter().max(),
                };
                assert_eq!(res.heap.front(), expected.copied());
                assert_eq!(res.extracted, vec![h.get(1)]);
            }
        }
    }

    #[test]
    fn remove_from_pair() {
        let h = built(vec![3, 8], HeapMode::Max);
        let res = plan(&h, HeapMode::Max, Operation::Remove);
        assert_eq!(
            res.plan.steps(),
            &[Step::Swap(SwapRecord::new(1, 2)), Step::Detach(2)]
        );
        assert_eq!(res.heap.heap(), &[3]);
        assert_eq!(res.heap.detached(), &[8]);
    }

    #[test]
    fn heap_sort_sorts() {
        for h in random_heaps(31) {
            let res = plan(&h, HeapMode::Max, Operation::HeapSort);
            assert!(res.heap.is_empty());
            let mut ascending = h.values().to_vec();
            ascending.sort();
            assert_eq!(res.heap.values(), ascending.as_slice());
            let mut descending = ascending.clone();
            descending.reverse();
            assert_eq!(res.extracted, descending);

            let res = plan(&h, HeapMode::Min, Operation::HeapSort);
            assert_eq!(res.heap.values(), descending.as_slice());
            assert_eq!(res.extracted, ascending);
        }
    }

    #[test]
    fn heap_sort_phases() {
        let h = built(vec![7, 3, 5, 1, 2, 4, 6], HeapMode::Max);
        let res = plan(&h, HeapMode::Max, Operation::HeapSort);
        // one remove phase per element, no build phase for an ordered heap
        assert_eq!(res.plan.phases(), 7);
        assert_ne!(res.plan.steps().last(), Some(&Step::Boundary));

        let h = HeapStore::new(vec![1, 2, 3, 4, 5, 6, 7]);
        let res = plan(&h, HeapMode::Max, Operation::HeapSort);
        assert_eq!(res.plan.phases(), 8);
        assert_eq!(res.heap.values(), &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn every_phase_starts_by_moving_the_last_node() {
        let h = built(vec![10, 40, 30, 20, 60, 50, 70], HeapMode::Min);
        let res = plan(&h, HeapMode::Min, Operation::HeapSort);
        let mut n = h.len();
        let mut at_phase_start = true;
        for step in res.plan.steps() {
            match step {
                Step::Boundary => at_phase_start = true,
                Step::Swap(r) if at_phase_start => {
                    assert_eq!(*r, SwapRecord::new(1, n));
                    at_phase_start = false;
                }
                Step::Detach(i) => {
                    assert_eq!(*i, n);
                    n -= 1;
                    at_phase_start = false;
                }
                _ => {}
            }
        }
        assert_eq!(n, 0);
    }
}
