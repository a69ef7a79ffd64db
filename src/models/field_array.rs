use crate::error::{DashboardError, Result};
use uuid::Uuid;

/// Identity of a row that survives inserts and removals of other rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey(Uuid);

impl RowKey {
    fn new() -> Self {
        RowKey(Uuid::new_v4())
    }
}

/// Hook run on every row whose position may have changed.
pub trait ArrayItem {
    fn renumber(&mut self, _position: usize) {}
}

#[derive(Debug, Clone, PartialEq)]
struct Row<T> {
    key: RowKey,
    value: T,
}

/// Ordered collection of repeated sub-entities (sections, days).
///
/// Rows are only added at the end and removed by position; there is no
/// reorder operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray<T> {
    rows: Vec<Row<T>>,
}

impl<T> Default for FieldArray<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: ArrayItem> FieldArray<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let mut array = Self::new();
        for value in values {
            array.append(value);
        }
        array
    }

    /// Adds `value` at the end and returns its key.
    pub fn append(&mut self, mut value: T) -> RowKey {
        let key = RowKey::new();
        value.renumber(self.rows.len());
        self.rows.push(Row { key, value });
        key
    }

    /// Removes the row at `position`, renumbering every row after it.
    pub fn remove(&mut self, position: usize) -> Result<T> {
        if position >= self.rows.len() {
            tracing::error!(
                "Field array remove out of bounds: position {} of {}",
                position,
                self.rows.len()
            );
            return Err(DashboardError::Logic(format!(
                "cannot remove row {} from an array of {}",
                position,
                self.rows.len()
            )));
        }

        let removed = self.rows.remove(position);
        for (offset, row) in self.rows.iter_mut().enumerate().skip(position) {
            row.value.renumber(offset);
        }
        Ok(removed.value)
    }

    pub fn remove_by_key(&mut self, key: RowKey) -> Result<T> {
        let position = self
            .position_of(key)
            .ok_or_else(|| DashboardError::Logic("unknown row key".to_string()))?;
        self.remove(position)
    }
}

impl<T> FieldArray<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.rows.get(position).map(|row| &row.value)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut T> {
        self.rows.get_mut(position).map(|row| &mut row.value)
    }

    pub fn key_at(&self, position: usize) -> Option<RowKey> {
        self.rows.get(position).map(|row| row.key)
    }

    pub fn position_of(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key == key)
    }

    pub fn get_by_key(&self, key: RowKey) -> Option<&T> {
        self.rows.iter().find(|row| row.key == key).map(|row| &row.value)
    }

    pub fn get_mut_by_key(&mut self, key: RowKey) -> Option<&mut T> {
        self.rows
            .iter_mut()
            .find(|row| row.key == key)
            .map(|row| &mut row.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.rows.iter().map(|row| row.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|row| &row.value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.iter_mut().map(|row| &mut row.value)
    }
}
