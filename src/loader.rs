use crate::config::DataConfig;
use crate::error::LoadError;
use crate::record::{FoodItem, Header, Order, Restaurant, Row, SheetRecord, User};
use crate::table::{Dataset, RecordTable};
use calamine::{Data, Reader, Xlsx, open_workbook};
use log::{debug, info};
use std::io::{Read, Seek};

/// Load every sheet of the workbook into typed record tables
///
/// `food` and `users` must be present; `orders` and `restaurant` are loaded
/// when the workbook has them. Each sheet is cut off at its configured row
/// cap.
///
/// # Errors
/// * `LoadError::FileNotFound` if the workbook does not exist
/// * `LoadError::MissingSheet` / `MissingColumn` for schema mismatches
/// * `LoadError::InvalidValue` for a cell that does not parse
///
/// # Examples
/// ```no_run
/// use dashboard::config::DataConfig;
/// use dashboard::loader::load_dataset;
///
/// match load_dataset(&DataConfig::default()) {
///     Ok(dataset) => println!("Loaded {} food items", dataset.food.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn load_dataset(config: &DataConfig) -> Result<Dataset, LoadError> {
    let path = &config.path;
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.clone()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|source| LoadError::Workbook {
        path: path.clone(),
        source,
    })?;

    let food = read_sheet::<FoodItem, _>(&mut workbook, config.food_rows)?
        .ok_or_else(|| LoadError::MissingSheet(FoodItem::SHEET.to_string()))?;
    let users = read_sheet::<User, _>(&mut workbook, config.user_rows)?
        .ok_or_else(|| LoadError::MissingSheet(User::SHEET.to_string()))?;
    let orders = read_sheet::<Order, _>(&mut workbook, config.order_rows)?;
    let restaurants = read_sheet::<Restaurant, _>(&mut workbook, config.restaurant_rows)?;

    info!(
        "Loaded {}: {} food items, {} users, {} orders, {} restaurants",
        path.display(),
        food.len(),
        users.len(),
        orders.as_ref().map_or(0, RecordTable::len),
        restaurants.as_ref().map_or(0, RecordTable::len),
    );

    Ok(Dataset {
        food,
        users,
        orders,
        restaurants,
    })
}

/// Read one sheet, or `None` if the workbook has no sheet of that name.
fn read_sheet<R: SheetRecord, RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    cap: usize,
) -> Result<Option<RecordTable<R>>, LoadError> {
    let Some(name) = find_sheet(&workbook.sheet_names(), R::SHEET) else {
        debug!("Workbook has no `{}` sheet", R::SHEET);
        return Ok(None);
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|source| LoadError::Sheet {
            sheet: name.clone(),
            source,
        })?;

    // Spreadsheet row number of the first row in the used range
    let first_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    parse_rows(range.rows(), first_row, cap).map(Some)
}

fn find_sheet(names: &[String], wanted: &str) -> Option<String> {
    names
        .iter()
        .find(|name| name.trim().eq_ignore_ascii_case(wanted))
        .cloned()
}

/// Turn raw sheet rows (header first) into a record table.
///
/// Fully blank rows are skipped; rows past `cap` are ignored.
pub fn parse_rows<'a, R: SheetRecord>(
    mut rows: impl Iterator<Item = &'a [Data]>,
    first_row: usize,
    cap: usize,
) -> Result<RecordTable<R>, LoadError> {
    let header_cells = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet(R::SHEET.to_string()))?;
    let header = Header::new(R::SHEET, header_cells);
    let columns = R::columns(&header)?;

    let mut records = Vec::new();
    let mut ignored = 0usize;

    for (offset, cells) in rows.enumerate() {
        let row = Row::new(R::SHEET, first_row + 1 + offset, cells);
        if row.is_blank() {
            continue;
        }
        if records.len() >= cap {
            ignored += 1;
            continue;
        }
        records.push(R::from_row(&row, &columns)?);
    }

    if ignored > 0 {
        debug!(
            "Sheet `{}`: ignored {} rows beyond the cap of {}",
            R::SHEET,
            ignored,
            cap
        );
    }

    Ok(RecordTable::new(R::SHEET, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    fn food_sheet(rows: &[(&str, &str, &str)]) -> Vec<Vec<Data>> {
        let mut sheet = vec![vec![s("f_id"), s("item"), s("veg_or_non_veg")]];
        sheet.extend(rows.iter().map(|(id, item, kind)| vec![s(id), s(item), s(kind)]));
        sheet
    }

    #[test]
    fn parses_rows_after_header() {
        let sheet = food_sheet(&[("fd0", "Dal", "Veg"), ("fd1", "Kebab", "Non-veg")]);
        let table: RecordTable<FoodItem> =
            parse_rows(sheet.iter().map(Vec::as_slice), 1, 100).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.sheet(), "food");
        assert_eq!(table.rows()[1].item, "Kebab");
    }

    #[test]
    fn honours_row_cap() {
        let sheet = food_sheet(&[
            ("fd0", "Dal", "Veg"),
            ("fd1", "Kebab", "Non-veg"),
            ("fd2", "Roti", "Veg"),
        ]);
        let table: RecordTable<FoodItem> =
            parse_rows(sheet.iter().map(Vec::as_slice), 1, 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].f_id, "fd1");
    }

    #[test]
    fn rows_past_the_cap_are_not_validated() {
        let sheet = food_sheet(&[("fd0", "Dal", "Veg"), ("fd1", "", "")]);
        let table: RecordTable<FoodItem> =
            parse_rows(sheet.iter().map(Vec::as_slice), 1, 1).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn skips_blank_rows() {
        let mut sheet = food_sheet(&[("fd0", "Dal", "Veg")]);
        sheet.push(vec![Data::Empty, Data::Empty, Data::Empty]);
        sheet.push(vec![s("fd1"), s("Roti"), s("Veg")]);
        let table: RecordTable<FoodItem> =
            parse_rows(sheet.iter().map(Vec::as_slice), 1, 100).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn invalid_value_reports_spreadsheet_row() {
        let sheet = food_sheet(&[("fd0", "Dal", "Veg"), ("fd1", "Roti", "")]);
        let err = parse_rows::<FoodItem>(sheet.iter().map(Vec::as_slice), 4, 100).unwrap_err();
        match err {
            // Header on row 4, so the second data row is row 6
            LoadError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 6);
                assert_eq!(column, "veg_or_non_veg");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sheet_is_an_error() {
        let sheet: Vec<Vec<Data>> = Vec::new();
        let err = parse_rows::<FoodItem>(sheet.iter().map(Vec::as_slice), 1, 100).unwrap_err();
        assert!(matches!(err, LoadError::EmptySheet(sheet) if sheet == "food"));
    }

    #[test]
    fn missing_file_is_reported_before_opening() {
        let config = DataConfig {
            path: "no/such/workbook.xlsx".into(),
            ..DataConfig::default()
        };
        let err = load_dataset(&config).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }

    #[test]
    fn sheet_lookup_ignores_case() {
        let names = vec!["Food".to_string(), "Users".to_string()];
        assert_eq!(find_sheet(&names, "users").as_deref(), Some("Users"));
        assert_eq!(find_sheet(&names, "orders"), None);
    }
}
