use super::clamped_index;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::StorageKey;
use crate::propagation::BoundsContext;
use crate::propagation::CommittableInt;
use crate::propagation::InputCursor;
use crate::propagation::Invariant;
use crate::propagation::InvariantContext;
use crate::propagation::LocalId;
use crate::propagation::ReadValues;
use crate::propagation::RegistrationContext;
use crate::propagation::VarViewId;

/// Defines `output = matrix[row_index - row_offset][column_index - column_offset]`, where indices
/// outside the matrix select the nearest row or column.
///
/// The cells are dynamic inputs in row-major order, of which only the selected cell is active.
/// The row index and the column index follow the cells as static inputs.
#[derive(Clone, Debug)]
pub struct Element2dVar {
    output: VarViewId,
    row_index: VarViewId,
    column_index: VarViewId,
    /// The cells in row-major order.
    cells: Vec<VarViewId>,
    num_rows: usize,
    num_columns: usize,
    /// Whether every row has `num_columns` cells.
    is_rectangular: bool,
    row_offset: i64,
    column_offset: i64,
    /// The position in `cells` of the active cell.
    active: CommittableInt,
    cursor: InputCursor,
}

impl Element2dVar {
    pub fn new(
        output: VarViewId,
        row_index: VarViewId,
        column_index: VarViewId,
        matrix: Vec<Vec<VarViewId>>,
        row_offset: i64,
        column_offset: i64,
    ) -> Self {
        let num_rows = matrix.len();
        let num_columns = matrix.first().map_or(0, Vec::len);
        let is_rectangular = matrix.iter().all(|row| row.len() == num_columns);

        Element2dVar {
            output,
            row_index,
            column_index,
            cells: matrix.into_iter().flatten().collect(),
            num_rows,
            num_columns,
            is_rectangular,
            row_offset,
            column_offset,
            active: CommittableInt::new(Timestamp::NULL, 0),
            cursor: InputCursor::default(),
        }
    }

    fn row_index_local_id(&self) -> usize {
        self.cells.len()
    }

    fn column_index_local_id(&self) -> usize {
        self.cells.len() + 1
    }

    fn selected(&self, context: &InvariantContext<'_>) -> usize {
        let row = clamped_index(context.value(self.row_index), self.row_offset, self.num_rows);
        let column = clamped_index(
            context.value(self.column_index),
            self.column_offset,
            self.num_columns,
        );
        row * self.num_columns + column
    }

    fn select(&mut self, context: &mut InvariantContext<'_>) {
        let timestamp = context.timestamp();
        let selected = self.selected(context);
        let active = self.active.value(timestamp) as usize;

        if selected != active {
            context.make_dynamic_input_inactive(LocalId::create_from_index(active));
            context.make_dynamic_input_active(LocalId::create_from_index(selected));
            self.active.set_value(timestamp, selected as i64);
        }

        let value = context.value(self.cells[selected]);
        context.update_value(self.output, value);
    }

    fn update_from_active_cell(&self, context: &mut InvariantContext<'_>) {
        let active = self.active.value(context.timestamp()) as usize;
        let value = context.value(self.cells[active]);
        context.update_value(self.output, value);
    }
}

impl Invariant for Element2dVar {
    fn name(&self) -> &str {
        "Element2dVar"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        let reason = if self.cells.is_empty() {
            Some("the matrix is empty")
        } else if !self.is_rectangular {
            Some("the rows of the matrix differ in length")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(EngineError::InvalidArguments {
                name: "Element2dVar",
                reason,
            });
        }

        for &cell in self.cells.iter() {
            let _ = context.register_dynamic_input(cell)?;
        }
        let _ = context.register_static_input(self.row_index)?;
        let _ = context.register_static_input(self.column_index)?;
        let _ = context.register_defined_var(self.output)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let index_range = |context: &BoundsContext<'_>, id: VarViewId, offset: i64, len: usize| {
            clamped_index(context.lower_bound(id), offset, len)
                ..=clamped_index(context.upper_bound(id), offset, len)
        };
        let rows = index_range(&context, self.row_index, self.row_offset, self.num_rows);
        let columns = index_range(
            &context,
            self.column_index,
            self.column_offset,
            self.num_columns,
        );

        let mut lower_bound = i64::MAX;
        let mut upper_bound = i64::MIN;
        for row in rows {
            for column in columns.clone() {
                let cell = self.cells[row * self.num_columns + column];
                lower_bound = lower_bound.min(context.lower_bound(cell));
                upper_bound = upper_bound.max(context.upper_bound(cell));
            }
        }

        context.set_bounds(self.output, lower_bound, upper_bound)
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        let selected = self.selected(&context);

        context.make_all_dynamic_inputs_inactive();
        context.make_dynamic_input_active(LocalId::create_from_index(selected));
        self.active.set_value(context.timestamp(), selected as i64);

        self.update_from_active_cell(&mut context);
    }

    fn notify_input_changed(&mut self, mut context: InvariantContext<'_>, local_id: LocalId) {
        let local_index = local_id.index();
        if local_index == self.row_index_local_id() || local_index == self.column_index_local_id()
        {
            self.select(&mut context);
        } else if local_index == self.active.value(context.timestamp()) as usize {
            self.update_from_active_cell(&mut context);
        }
    }

    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId> {
        match self.cursor.advance(context.timestamp()) {
            0 => Some(self.row_index),
            1 => Some(self.column_index),
            2 => Some(self.cells[self.selected(&context)]),
            _ => None,
        }
    }

    fn notify_current_input_changed(&mut self, mut context: InvariantContext<'_>) {
        match self.cursor.position(context.timestamp()) {
            Some(0) | Some(1) => self.select(&mut context),
            Some(2) => self.update_from_active_cell(&mut context),
            _ => {}
        }
    }

    fn commit(&mut self, timestamp: Timestamp) {
        self.active.commit_if(timestamp);
    }
}
