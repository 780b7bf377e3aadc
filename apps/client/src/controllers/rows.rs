//! Editable repeating sections (education entries, skill groups, ...).
//!
//! A section always holds at least one row so the form never renders empty.
//! Rows left blank are dropped when the draft is turned into a payload.

use crate::errors::ClientError;

/// One editable row of text fields.
pub trait FormRow: Clone + Default {
    /// Field names accepted by `set_field`, in display order.
    const FIELDS: &'static [&'static str];

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ClientError>;

    /// True when every field is empty or whitespace.
    fn is_blank(&self) -> bool;
}

pub(crate) fn unknown_field(field: &str) -> ClientError {
    ClientError::Validation(format!("Unknown field '{field}'"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowList<T> {
    rows: Vec<T>,
}

impl<T: FormRow> RowList<T> {
    pub fn new() -> Self {
        Self {
            rows: vec![T::default()],
        }
    }

    /// Builds a list from loaded rows, falling back to one blank row.
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Self::new()
        } else {
            Self { rows }
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_row(&mut self, template: T) {
        self.rows.push(template);
    }

    pub fn update_row(&mut self, index: usize, field: &str, value: &str) -> Result<(), ClientError> {
        let len = self.rows.len();
        let row = self.rows.get_mut(index).ok_or_else(|| {
            ClientError::Validation(format!("Row {index} out of range (section has {len})"))
        })?;
        row.set_field(field, value)
    }

    /// Removes a row. Does nothing when it is the last one or the index is out
    /// of range; returns whether a row was removed.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    /// Rows with some content, in order.
    pub fn filled(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().filter(|row| !row.is_blank())
    }
}

impl<T: FormRow> Default for RowList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a section so callers can edit it by name.
pub trait RowEditor {
    fn len(&self) -> usize;
    fn fields(&self) -> &'static [&'static str];
    fn add_blank(&mut self);
    fn update_row(&mut self, index: usize, field: &str, value: &str) -> Result<(), ClientError>;
    fn remove_row(&mut self, index: usize) -> bool;
}

impl<T: FormRow> RowEditor for RowList<T> {
    fn len(&self) -> usize {
        RowList::len(self)
    }

    fn fields(&self) -> &'static [&'static str] {
        T::FIELDS
    }

    fn add_blank(&mut self) {
        self.add_row(T::default());
    }

    fn update_row(&mut self, index: usize, field: &str, value: &str) -> Result<(), ClientError> {
        RowList::update_row(self, index, field, value)
    }

    fn remove_row(&mut self, index: usize) -> bool {
        RowList::remove_row(self, index)
    }
}
