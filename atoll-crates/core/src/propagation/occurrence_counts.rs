use log::debug;

use super::CommittableInt;
use crate::basic_types::Timestamp;
use crate::containers::HashMap;

/// The largest range of values which is counted in a table.
const MAX_TABLE_SIZE: usize = 1 << 20;

/// The number of occurrences of every value, as [`CommittableInt`]s.
///
/// Values in the range given to [`OccurrenceCounts::for_range`] are counted in a table. Any other
/// value, such as one that lies outside the domain of its variable, is counted in a map.
#[derive(Clone, Debug, Default)]
pub(crate) struct OccurrenceCounts {
    /// The value counted by `table[0]`.
    offset: i64,
    table: Vec<CommittableInt>,
    outside_table: HashMap<i64, CommittableInt>,
}

impl OccurrenceCounts {
    /// Creates zero counts with a table for `lower_bound..=upper_bound`. If the range is too
    /// wide, every value is counted in the map instead.
    pub(crate) fn for_range(timestamp: Timestamp, lower_bound: i64, upper_bound: i64) -> Self {
        let table_size = upper_bound
            .checked_sub(lower_bound)
            .and_then(|width| width.checked_add(1))
            .and_then(|size| usize::try_from(size).ok())
            .filter(|&size| size <= MAX_TABLE_SIZE);

        if table_size.is_none() {
            debug!("Counting the values in [{lower_bound}, {upper_bound}] without a table");
        }

        OccurrenceCounts {
            offset: lower_bound,
            table: vec![CommittableInt::new(timestamp, 0); table_size.unwrap_or(0)],
            outside_table: HashMap::default(),
        }
    }

    fn table_index(&self, value: i64) -> Option<usize> {
        let index = usize::try_from(value.checked_sub(self.offset)?).ok()?;
        (index < self.table.len()).then_some(index)
    }

    /// The number of occurrences of `value` at `timestamp`.
    pub(crate) fn get(&self, timestamp: Timestamp, value: i64) -> i64 {
        match self.table_index(value) {
            Some(index) => self.table[index].value(timestamp),
            None => self
                .outside_table
                .get(&value)
                .map_or(0, |count| count.value(timestamp)),
        }
    }

    /// Adds `delta` occurrences of `value` and returns the old and the new count.
    pub(crate) fn add(&mut self, timestamp: Timestamp, value: i64, delta: i64) -> (i64, i64) {
        let count = match self.table_index(value) {
            Some(index) => &mut self.table[index],
            None => self
                .outside_table
                .entry(value)
                .or_insert_with(|| CommittableInt::new(timestamp, 0)),
        };

        let old_count = count.value(timestamp);
        (old_count, count.inc_value(timestamp, delta))
    }

    /// Sets every count to zero at `timestamp`.
    pub(crate) fn reset(&mut self, timestamp: Timestamp) {
        self.table
            .iter_mut()
            .chain(self.outside_table.values_mut())
            .for_each(|count| count.set_value(timestamp, 0));
    }

    pub(crate) fn commit_if(&mut self, timestamp: Timestamp) {
        self.table
            .iter_mut()
            .chain(self.outside_table.values_mut())
            .for_each(|count| count.commit_if(timestamp));
        self.outside_table
            .retain(|_, count| count.committed_value() != 0);
    }
}
