use crate::record::{FoodItem, Order, Restaurant, User};
use serde::Serialize;

/// The rows of one loaded sheet.
///
/// Read-only once constructed: there is no way to add, change or remove a
/// row, so every aggregation sees exactly what the workbook contained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordTable<R> {
    sheet: &'static str,
    rows: Vec<R>,
}

impl<R> RecordTable<R> {
    pub fn new(sheet: &'static str, rows: Vec<R>) -> Self {
        Self { sheet, rows }
    }

    pub fn sheet(&self) -> &'static str {
        self.sheet
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<'a, R> IntoIterator for &'a RecordTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Everything loaded from the workbook.
///
/// Built once at startup and handed to every page render; `orders` and
/// `restaurants` are `None` when the workbook has no such sheet.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub food: RecordTable<FoodItem>,
    pub users: RecordTable<User>,
    pub orders: Option<RecordTable<Order>>,
    pub restaurants: Option<RecordTable<Restaurant>>,
}
