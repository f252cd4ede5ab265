use crate::containers::StorageKey;

/// Identifies a stored integer variable.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarId(pub(crate) u32);

/// Identifies a view, which derives its value from a parent variable or view on every read.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u32);

/// Either a [`VarId`] or a [`ViewId`].
///
/// Almost every operation of the solver accepts both; whenever the engine needs a stored slot it
/// resolves a view to its *source*, the variable at the bottom of its parent chain.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum VarViewId {
    Var(VarId),
    View(ViewId),
}

impl VarViewId {
    pub fn is_var(self) -> bool {
        matches!(self, VarViewId::Var(_))
    }

    pub fn is_view(self) -> bool {
        matches!(self, VarViewId::View(_))
    }

    pub fn as_var(self) -> Option<VarId> {
        match self {
            VarViewId::Var(var) => Some(var),
            VarViewId::View(_) => None,
        }
    }

    pub fn as_view(self) -> Option<ViewId> {
        match self {
            VarViewId::Var(_) => None,
            VarViewId::View(view) => Some(view),
        }
    }
}

impl From<VarId> for VarViewId {
    fn from(value: VarId) -> Self {
        VarViewId::Var(value)
    }
}

impl From<ViewId> for VarViewId {
    fn from(value: ViewId) -> Self {
        VarViewId::View(value)
    }
}

impl StorageKey for VarId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VarId(index as u32)
    }
}

impl StorageKey for ViewId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        ViewId(index as u32)
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ViewId({})", self.0)
    }
}

impl std::fmt::Display for VarViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarViewId::Var(var) => var.fmt(f),
            VarViewId::View(view) => view.fmt(f),
        }
    }
}
