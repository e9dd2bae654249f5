//! Resolution of [`ExpressionRef`]s down to concrete cells.
//!
//! Labels are followed through the injected [`LabelStore`], transitively, until they reach a
//! cell or a range. Unknown labels, cycles and over-long chains all resolve to nothing: callers
//! doing dependency tracking treat "no such label" as an empty dependency set, not a failure.

use std::ops::ControlFlow;

use formula_refs::{CellRef, ExpressionRef, LabelName, LabelStore, RangeRef, RangeToCellStore};
use smallvec::SmallVec;

use crate::ResolverSettings;

/// Labels on the current resolution path, outermost first.
type LabelChain = SmallVec<[LabelName; 8]>;

/// How a range contributes cells to the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    /// Only the range's `begin`.
    First,
    /// Every contained cell, row-major.
    Every,
    /// Only the cells the range store recorded for the range, row-major.
    Populated,
}

/// Resolves expression references against a label store and a range-to-cells store.
///
/// The resolver only borrows its collaborators; lookups are issued one at a time and no
/// consistency is assumed between successive lookups of one chain.
#[derive(Clone, Copy)]
pub struct ReferenceResolver<'a> {
    labels: &'a dyn LabelStore,
    ranges: &'a dyn RangeToCellStore,
    settings: ResolverSettings,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(labels: &'a dyn LabelStore, ranges: &'a dyn RangeToCellStore) -> Self {
        Self::with_settings(labels, ranges, ResolverSettings::default())
    }

    pub fn with_settings(
        labels: &'a dyn LabelStore,
        ranges: &'a dyn RangeToCellStore,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            labels,
            ranges,
            settings,
        }
    }

    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// The first cell `expr` denotes, or `None` when it denotes nothing resolvable.
    ///
    /// A range yields its `begin`.
    pub fn resolve_cell(&self, expr: &ExpressionRef) -> Option<CellRef> {
        let mut first = None;
        self.walk(
            expr,
            Expansion::First,
            &mut LabelChain::new(),
            &mut |cell| {
                first = Some(cell);
                ControlFlow::Break(())
            },
        );
        first
    }

    /// Feed every cell `expr` denotes to `sink`, ranges enumerated row-major.
    pub fn resolve_cells<F>(&self, expr: &ExpressionRef, sink: &mut F)
    where
        F: FnMut(CellRef),
    {
        self.walk(expr, Expansion::Every, &mut LabelChain::new(), &mut |cell| {
            sink(cell);
            ControlFlow::Continue(())
        });
    }

    pub fn collect_cells(&self, expr: &ExpressionRef) -> Vec<CellRef> {
        let mut cells = Vec::new();
        self.resolve_cells(expr, &mut |cell| cells.push(cell));
        cells
    }

    /// Like [`ReferenceResolver::resolve_cells`], but a range only yields the cells previously
    /// recorded for it in the range store.
    ///
    /// Recorded cells outside the range are skipped.
    pub fn resolve_populated_cells<F>(&self, expr: &ExpressionRef, sink: &mut F)
    where
        F: FnMut(CellRef),
    {
        self.walk(
            expr,
            Expansion::Populated,
            &mut LabelChain::new(),
            &mut |cell| {
                sink(cell);
                ControlFlow::Continue(())
            },
        );
    }

    fn walk(
        &self,
        expr: &ExpressionRef,
        expansion: Expansion,
        chain: &mut LabelChain,
        sink: &mut dyn FnMut(CellRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        match expr {
            ExpressionRef::Cell(cell) => sink(*cell),
            ExpressionRef::Range(range) => self.expand_range(*range, expansion, sink),
            ExpressionRef::Label(label) => self.follow_label(label, expansion, chain, sink),
        }
    }

    fn expand_range(
        &self,
        range: RangeRef,
        expansion: Expansion,
        sink: &mut dyn FnMut(CellRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        match expansion {
            Expansion::First => sink(range.begin()),
            Expansion::Every => {
                for cell in range.cells() {
                    sink(cell)?;
                }
                ControlFlow::Continue(())
            }
            Expansion::Populated => {
                let mut cells: Vec<CellRef> = self
                    .ranges
                    .find_values(&range)
                    .into_iter()
                    .filter(|cell| range.contains(*cell))
                    .collect();
                cells.sort_by_key(|cell| (cell.row(), cell.column()));
                for cell in cells {
                    sink(cell)?;
                }
                ControlFlow::Continue(())
            }
        }
    }

    fn follow_label(
        &self,
        label: &LabelName,
        expansion: Expansion,
        chain: &mut LabelChain,
        sink: &mut dyn FnMut(CellRef) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        if chain.contains(label) {
            log::warn!(
                "label cycle detected: {} -> {label}; resolving to nothing",
                chain
                    .iter()
                    .map(LabelName::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
            return ControlFlow::Continue(());
        }
        if chain.len() >= self.settings.max_label_depth.get() {
            log::warn!(
                "label `{label}` exceeds the maximum chain depth of {}; resolving to nothing",
                self.settings.max_label_depth
            );
            return ControlFlow::Continue(());
        }

        let Some(mapping) = self.labels.load(label) else {
            log::debug!("label `{label}` is not defined");
            return ControlFlow::Continue(());
        };

        chain.push(label.clone());
        let flow = self.walk(mapping.reference(), expansion, chain, sink);
        chain.pop();
        flow
    }
}
