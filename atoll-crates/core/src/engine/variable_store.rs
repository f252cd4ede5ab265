use std::fmt::Debug;

use super::IntVar;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::KeyedVec;
use crate::propagation::IntView;
use crate::propagation::VarId;
use crate::propagation::VarViewId;
use crate::propagation::ViewId;

/// Owns the variables and views of a solver.
///
/// The store hands out read-only access publicly; only the engine can create or write variables.
/// Views are resolved on every read by applying the view functions along the parent chain.
#[derive(Default)]
pub struct VariableStore {
    int_vars: KeyedVec<VarId, IntVar>,
    int_views: KeyedVec<ViewId, Box<dyn IntView>>,
    /// The variable at the bottom of the parent chain of every view.
    view_sources: KeyedVec<ViewId, VarId>,
}

impl VariableStore {
    pub(crate) fn create_int_var(
        &mut self,
        timestamp: Timestamp,
        initial_value: i64,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Result<VarId, EngineError> {
        let var = IntVar::new(timestamp, initial_value, lower_bound, upper_bound)?;
        Ok(self.int_vars.push(var))
    }

    pub(crate) fn create_int_view(&mut self, view: Box<dyn IntView>) -> Result<ViewId, EngineError> {
        view.validate()?;
        let parent = view.parent();
        if !self.contains(parent) {
            return Err(EngineError::UnknownId(parent));
        }

        let source = self.source_id(parent);
        let _ = self.view_sources.push(source);
        Ok(self.int_views.push(view))
    }

    pub fn num_vars(&self) -> usize {
        self.int_vars.len()
    }

    pub fn num_views(&self) -> usize {
        self.int_views.len()
    }

    /// Whether `id` refers to a variable or view in this store.
    pub fn contains(&self, id: VarViewId) -> bool {
        match id {
            VarViewId::Var(var) => self.int_vars.get(var).is_some(),
            VarViewId::View(view) => self.int_views.get(view).is_some(),
        }
    }

    /// The variable at the bottom of the parent chain of `id`; a variable is its own source.
    pub fn source_id(&self, id: VarViewId) -> VarId {
        match id {
            VarViewId::Var(var) => var,
            VarViewId::View(view) => self.view_sources[view],
        }
    }

    pub fn value(&self, timestamp: Timestamp, id: VarViewId) -> i64 {
        match id {
            VarViewId::Var(var) => self.int_vars[var].value(timestamp),
            VarViewId::View(view) => {
                let view = &self.int_views[view];
                view.compute(self.value(timestamp, view.parent()))
            }
        }
    }

    pub fn committed_value(&self, id: VarViewId) -> i64 {
        match id {
            VarViewId::Var(var) => self.int_vars[var].committed_value(),
            VarViewId::View(view) => {
                let view = &self.int_views[view];
                view.compute(self.committed_value(view.parent()))
            }
        }
    }

    /// The bounds of `id` as `(lower_bound, upper_bound)`.
    pub fn bounds(&self, id: VarViewId) -> (i64, i64) {
        match id {
            VarViewId::Var(var) => {
                let var = &self.int_vars[var];
                (var.lower_bound(), var.upper_bound())
            }
            VarViewId::View(view) => {
                let view = &self.int_views[view];
                let (lower_bound, upper_bound) = self.bounds(view.parent());
                view.compute_bounds(lower_bound, upper_bound)
            }
        }
    }

    pub fn lower_bound(&self, id: VarViewId) -> i64 {
        self.bounds(id).0
    }

    pub fn upper_bound(&self, id: VarViewId) -> i64 {
        self.bounds(id).1
    }

    pub(crate) fn int_var(&self, var: VarId) -> &IntVar {
        &self.int_vars[var]
    }

    pub(crate) fn int_var_mut(&mut self, var: VarId) -> &mut IntVar {
        &mut self.int_vars[var]
    }

    pub(crate) fn var_ids(&self) -> impl Iterator<Item = VarId> {
        self.int_vars.keys()
    }

    pub(crate) fn int_vars_mut(&mut self) -> impl Iterator<Item = &mut IntVar> {
        self.int_vars.iter_mut()
    }
}

impl Debug for VariableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let views: Vec<_> = self.int_views.iter().map(|view| view.name()).collect();

        f.debug_struct("VariableStore")
            .field("int_vars", &self.int_vars)
            .field("int_views", &views)
            .field("view_sources", &self.view_sources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::VariableStore;
    use crate::basic_types::EngineError;
    use crate::basic_types::Timestamp;
    use crate::propagation::VarViewId;
    use crate::propagation::ViewId;
    use crate::views::IntOffsetView;
    use crate::views::ScalarView;

    #[test]
    fn views_resolve_through_their_parent_chain() {
        let mut store = VariableStore::default();
        let var = store.create_int_var(Timestamp::NULL, 2, 0, 4).unwrap();

        let offset = store
            .create_int_view(Box::new(IntOffsetView::new(var.into(), 3)))
            .unwrap();
        let scaled = store
            .create_int_view(Box::new(ScalarView::new(offset.into(), -2)))
            .unwrap();

        assert_eq!(store.source_id(scaled.into()), var);
        assert_eq!(store.committed_value(scaled.into()), -10);
        assert_eq!(store.bounds(scaled.into()), (-14, -6));
    }

    #[test]
    fn view_on_unknown_parent_is_rejected() {
        let mut store = VariableStore::default();
        let missing = VarViewId::View(ViewId(4));

        let result = store.create_int_view(Box::new(IntOffsetView::new(missing, 1)));

        assert_eq!(result, Err(EngineError::UnknownId(missing)));
        assert_eq!(store.num_views(), 0);
    }
}
