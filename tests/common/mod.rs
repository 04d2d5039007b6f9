//! Workbook fixtures shared by the integration tests.

#![allow(dead_code)]

use dashboard::config::DataConfig;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::PathBuf;
use tempfile::TempDir;

pub enum Value {
    Text(&'static str),
    Number(f64),
    /// A real date cell (serial number with a date format), as Excel stores it
    Date(u16, u8, u8),
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

macro_rules! row {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::common::Value::from($v)),*]
    };
}
pub(crate) use row;

pub struct Sheet {
    pub name: &'static str,
    pub rows: Vec<Vec<Value>>,
}

/// A workbook written to a temporary directory that lives as long as the fixture.
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    pub fn data_config(&self) -> DataConfig {
        DataConfig {
            path: self.path.clone(),
            ..DataConfig::default()
        }
    }
}

pub fn init_test_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn write_workbook(sheets: Vec<Sheet>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name).unwrap();
        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                match value {
                    Value::Text(s) => worksheet.write_string(r as u32, c as u16, *s).unwrap(),
                    Value::Number(n) => worksheet.write_number(r as u32, c as u16, *n).unwrap(),
                    Value::Date(year, month, day) => {
                        let date = ExcelDateTime::from_ymd(*year, *month, *day).unwrap();
                        worksheet
                            .write_datetime_with_format(r as u32, c as u16, &date, &date_format)
                            .unwrap()
                    }
                };
            }
        }
    }
    workbook.save(&path).unwrap();

    Fixture { _dir: dir, path }
}

pub fn food_sheet() -> Sheet {
    Sheet {
        name: "food",
        rows: vec![
            row!["Unnamed: 0", "f_id", "item", "veg_or_non_veg"],
            row![0, "fd0", "Aloo Tikki Burger", "Veg"],
            row![1, "fd1", "Chicken Biryani", "Non-veg"],
            row![2, "fd2", "Aloo Tikki Burger", "Veg"],
            row![3, "fd3", "Paneer Roll", "Veg"],
        ],
    }
}

pub fn users_sheet() -> Sheet {
    Sheet {
        name: "users",
        rows: vec![
            row![
                "user_id",
                "name",
                "email",
                "Age",
                "Gender",
                "Marital Status",
                "Occupation",
                "Monthly Income",
            ],
            row![1, "Claire", "claire@example.com", 24, "Female", "Single", "Student", "No Income"],
            row![2, "Dinesh", "dinesh@example.com", 24, "Male", "Single", "Employee", "Below Rs.10000"],
            row![3, "Farah", "farah@example.com", 30, "Female", "Married", "Employee", "More than 50000"],
        ],
    }
}

pub fn orders_sheet() -> Sheet {
    Sheet {
        name: "orders",
        rows: vec![
            row!["order_date", "sales_qty", "sales_amount", "currency", "user_id", "r_id"],
            row!["2020-06-01", 1, 350.0, "INR", 1, 567335],
            row!["2020-06-01", 2, 700.0, "INR", 2, 567335],
            row![Value::Date(2020, 7, 15), 1, 120.5, "INR", 3, 531342],
        ],
    }
}

pub fn restaurant_sheet() -> Sheet {
    Sheet {
        name: "restaurant",
        rows: vec![
            row!["id", "name", "city", "rating", "rating_count", "cost", "cuisine"],
            row![567335, "AB FOODS POINT", "Abohar", "--", "Too Few Ratings", "200", "Beverages,Pizzas"],
            row![531342, "Janta Sweet House", "Abohar", 4.4, "50+ ratings", "200", "Sweets,Bakery"],
        ],
    }
}

pub fn full_workbook() -> Fixture {
    write_workbook(vec![food_sheet(), users_sheet(), orders_sheet(), restaurant_sheet()])
}
