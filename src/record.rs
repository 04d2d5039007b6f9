//! Typed row schema for every sheet of the workbook.
//!
//! Each sheet maps to one record struct. Header cells are normalised and
//! matched against the columns a record needs, so a renamed or missing column
//! is reported when the workbook is loaded rather than when a chart is drawn.

use crate::error::LoadError;
use calamine::{Data, DataType};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

static EMPTY: Data = Data::Empty;

/// Placeholder some exports use for a missing rating.
const MISSING_MARKERS: [&str; 3] = ["--", "na", "nan"];

/// Lowercase a header and collapse every run of non-alphanumerics to `_`.
///
/// `"Marital Status"` and `"marital-status"` both become `marital_status`.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// A resolved column: its schema name and position in the sheet.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub index: usize,
}

/// Header row of one sheet.
#[derive(Debug, Clone)]
pub struct Header {
    sheet: &'static str,
    columns: HashMap<String, usize>,
}

impl Header {
    pub fn new(sheet: &'static str, cells: &[Data]) -> Self {
        let mut columns = HashMap::new();
        for (index, cell) in cells.iter().enumerate() {
            let name = normalize_header(&cell_to_string(cell));
            if !name.is_empty() {
                // First occurrence wins when a header is duplicated
                columns.entry(name).or_insert(index);
            }
        }
        Self { sheet, columns }
    }

    pub fn require(&self, name: &'static str) -> Result<Column, LoadError> {
        self.columns
            .get(name)
            .map(|&index| Column { name, index })
            .ok_or_else(|| LoadError::MissingColumn {
                sheet: self.sheet.to_string(),
                column: name.to_string(),
            })
    }
}

/// One data row, with its 1-based spreadsheet row number for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    sheet: &'static str,
    number: usize,
    cells: &'a [Data],
}

impl<'a> Row<'a> {
    pub fn new(sheet: &'static str, number: usize, cells: &'a [Data]) -> Self {
        Self {
            sheet,
            number,
            cells,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell_to_string(cell).trim().is_empty())
    }

    fn cell(&self, column: Column) -> &Data {
        self.cells.get(column.index).unwrap_or(&EMPTY)
    }

    fn invalid(&self, column: Column, message: impl Into<String>) -> LoadError {
        LoadError::InvalidValue {
            sheet: self.sheet.to_string(),
            row: self.number,
            column: column.name.to_string(),
            message: message.into(),
        }
    }

    /// Non-blank text; numbers are rendered the way the sheet shows them.
    pub fn text(&self, column: Column) -> Result<String, LoadError> {
        self.opt_text(column)
            .ok_or_else(|| self.invalid(column, "value is required"))
    }

    pub fn opt_text(&self, column: Column) -> Option<String> {
        let text = cell_to_string(self.cell(column));
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn int(&self, column: Column) -> Result<i64, LoadError> {
        match self.cell(column) {
            Data::Int(i) => Ok(*i),
            Data::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            Data::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|f| f.fract() == 0.0)
                            .map(|f| f as i64)
                    })
                    .ok_or_else(|| self.invalid(column, format!("expected an integer, found `{}`", s)))
            }
            Data::Empty => Err(self.invalid(column, "value is required")),
            other => Err(self.invalid(column, format!("expected an integer, found `{}`", other))),
        }
    }

    pub fn number(&self, column: Column) -> Result<f64, LoadError> {
        match self.cell(column) {
            Data::Empty => Err(self.invalid(column, "value is required")),
            cell => number_from(cell)
                .ok_or_else(|| self.invalid(column, format!("expected a number, found `{}`", cell))),
        }
    }

    /// Blank cells and placeholders such as `--` read as `None`.
    pub fn opt_number(&self, column: Column) -> Result<Option<f64>, LoadError> {
        let cell = self.cell(column);
        if let Data::String(s) = cell {
            let s = s.trim();
            if s.is_empty() || MISSING_MARKERS.contains(&s.to_lowercase().as_str()) {
                return Ok(None);
            }
        }
        match cell {
            Data::Empty => Ok(None),
            cell => number_from(cell)
                .map(Some)
                .ok_or_else(|| self.invalid(column, format!("expected a number, found `{}`", cell))),
        }
    }

    pub fn date(&self, column: Column) -> Result<NaiveDate, LoadError> {
        let cell = self.cell(column);
        let parsed = match cell {
            Data::DateTime(_) | Data::DateTimeIso(_) => cell.as_date(),
            Data::String(s) => parse_date(s.trim()),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(column, format!("expected a date, found `{}`", cell)))
    }
}

// NaN and infinities are not values a sheet can hold
fn number_from(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| {
            // "2020-06-15 00:00:00"
            s.split_whitespace().next().and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// A record type that one sheet of the workbook deserializes into.
pub trait SheetRecord: Sized {
    /// Sheet name in the workbook (matched case-insensitively).
    const SHEET: &'static str;

    /// Resolved column positions for this record.
    type Columns;

    fn columns(header: &Header) -> Result<Self::Columns, LoadError>;

    fn from_row(row: &Row<'_>, columns: &Self::Columns) -> Result<Self, LoadError>;
}

/// One entry of the `food` sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodItem {
    pub f_id: String,
    pub item: String,
    pub veg_or_non_veg: String,
}

pub struct FoodColumns {
    f_id: Column,
    item: Column,
    veg_or_non_veg: Column,
}

impl SheetRecord for FoodItem {
    const SHEET: &'static str = "food";
    type Columns = FoodColumns;

    fn columns(header: &Header) -> Result<FoodColumns, LoadError> {
        Ok(FoodColumns {
            f_id: header.require("f_id")?,
            item: header.require("item")?,
            veg_or_non_veg: header.require("veg_or_non_veg")?,
        })
    }

    fn from_row(row: &Row<'_>, columns: &FoodColumns) -> Result<Self, LoadError> {
        Ok(FoodItem {
            f_id: row.text(columns.f_id)?,
            item: row.text(columns.item)?,
            veg_or_non_veg: row.text(columns.veg_or_non_veg)?,
        })
    }
}

/// One entry of the `users` sheet. Demographic fields may be left blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub age: u32,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub occupation: Option<String>,
    pub monthly_income: Option<String>,
}

pub struct UserColumns {
    user_id: Column,
    age: Column,
    gender: Column,
    marital_status: Column,
    occupation: Column,
    monthly_income: Column,
}

impl SheetRecord for User {
    const SHEET: &'static str = "users";
    type Columns = UserColumns;

    fn columns(header: &Header) -> Result<UserColumns, LoadError> {
        Ok(UserColumns {
            user_id: header.require("user_id")?,
            age: header.require("age")?,
            gender: header.require("gender")?,
            marital_status: header.require("marital_status")?,
            occupation: header.require("occupation")?,
            monthly_income: header.require("monthly_income")?,
        })
    }

    fn from_row(row: &Row<'_>, columns: &UserColumns) -> Result<Self, LoadError> {
        let age = row.int(columns.age)?;
        let age = u32::try_from(age)
            .map_err(|_| row.invalid(columns.age, format!("age out of range: {}", age)))?;

        Ok(User {
            user_id: row.int(columns.user_id)?,
            age,
            gender: row.opt_text(columns.gender),
            marital_status: row.opt_text(columns.marital_status),
            occupation: row.opt_text(columns.occupation),
            monthly_income: row.opt_text(columns.monthly_income),
        })
    }
}

/// One entry of the optional `orders` sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_date: NaiveDate,
    pub sales_qty: i64,
    pub sales_amount: f64,
    pub user_id: i64,
    pub r_id: i64,
}

pub struct OrderColumns {
    order_date: Column,
    sales_qty: Column,
    sales_amount: Column,
    user_id: Column,
    r_id: Column,
}

impl SheetRecord for Order {
    const SHEET: &'static str = "orders";
    type Columns = OrderColumns;

    fn columns(header: &Header) -> Result<OrderColumns, LoadError> {
        Ok(OrderColumns {
            order_date: header.require("order_date")?,
            sales_qty: header.require("sales_qty")?,
            sales_amount: header.require("sales_amount")?,
            user_id: header.require("user_id")?,
            r_id: header.require("r_id")?,
        })
    }

    fn from_row(row: &Row<'_>, columns: &OrderColumns) -> Result<Self, LoadError> {
        Ok(Order {
            order_date: row.date(columns.order_date)?,
            sales_qty: row.int(columns.sales_qty)?,
            sales_amount: row.number(columns.sales_amount)?,
            user_id: row.int(columns.user_id)?,
            r_id: row.int(columns.r_id)?,
        })
    }
}

/// One entry of the optional `restaurant` sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub rating: Option<f64>,
    pub cuisine: Option<String>,
}

pub struct RestaurantColumns {
    id: Column,
    name: Column,
    city: Column,
    rating: Column,
    cuisine: Column,
}

impl SheetRecord for Restaurant {
    const SHEET: &'static str = "restaurant";
    type Columns = RestaurantColumns;

    fn columns(header: &Header) -> Result<RestaurantColumns, LoadError> {
        Ok(RestaurantColumns {
            id: header.require("id")?,
            name: header.require("name")?,
            city: header.require("city")?,
            rating: header.require("rating")?,
            cuisine: header.require("cuisine")?,
        })
    }

    fn from_row(row: &Row<'_>, columns: &RestaurantColumns) -> Result<Self, LoadError> {
        Ok(Restaurant {
            id: row.int(columns.id)?,
            name: row.text(columns.name)?,
            city: row.opt_text(columns.city),
            rating: row.opt_number(columns.rating)?,
            cuisine: row.opt_text(columns.cuisine),
        })
    }
}
