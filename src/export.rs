use crate::chart::format_number;
use crate::section::Page;
use rust_xlsxwriter::{Workbook, XlsxError};

/// Characters Excel does not allow in a worksheet name
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME: usize = 31;

// Tables and chart data in panel order, each with its title and header row
fn blocks(page: &Page) -> Vec<Block<'_>> {
    page.panels
        .iter()
        .flat_map(|panel| {
            let table = panel.table.as_ref().map(|table| Block {
                title: &panel.heading,
                header: table.header.clone(),
                rows: table
                    .rows
                    .iter()
                    .map(|row| row.iter().cloned().map(Field::Text).collect())
                    .collect(),
            });
            let chart = panel.chart.as_ref().map(|chart| {
                let (header, rows) = chart.table();
                Block {
                    title: &chart.title,
                    header,
                    rows: rows
                        .into_iter()
                        .map(|(label, values)| {
                            std::iter::once(Field::Text(label))
                                .chain(values.into_iter().map(Field::Number))
                                .collect()
                        })
                        .collect(),
                }
            });
            table.into_iter().chain(chart)
        })
        .collect()
}

struct Block<'a> {
    title: &'a str,
    header: Vec<String>,
    rows: Vec<Vec<Field>>,
}

enum Field {
    Text(String),
    Number(f64),
}

impl Field {
    fn to_text(&self) -> String {
        match self {
            Field::Text(text) => text.clone(),
            Field::Number(value) => format_number(*value),
        }
    }
}

/// Convert the tables and charts of a page to CSV
///
/// Each table or chart becomes one block: a `# title` line, a header row and
/// the data rows, with a blank line between blocks. Fields containing
/// commas, quotes or newlines are quoted.
///
/// # Examples
/// ```
/// use dashboard::export::to_csv;
/// use dashboard::section::{Page, Section};
///
/// let page = Page { section: Section::Food, title: "Food".into(), panels: Vec::new(), pagination: None };
/// assert_eq!(to_csv(&page), "");
/// ```
pub fn to_csv(page: &Page) -> String {
    let mut csv_content = String::new();

    for (i, block) in blocks(page).iter().enumerate() {
        if i > 0 {
            csv_content.push('\n');
        }
        csv_content.push_str("# ");
        csv_content.push_str(block.title);
        csv_content.push('\n');

        push_record(&mut csv_content, block.header.iter().map(String::as_str));
        for row in &block.rows {
            let fields: Vec<String> = row.iter().map(Field::to_text).collect();
            push_record(&mut csv_content, fields.iter().map(String::as_str));
        }
    }

    csv_content
}

fn push_record<'a>(csv_content: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (c, field) in fields.enumerate() {
        if c > 0 {
            csv_content.push(',');
        }
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            let escaped = field.replace('"', "\"\"");
            csv_content.push_str(&format!("\"{}\"", escaped));
        } else {
            csv_content.push_str(field);
        }
    }
    csv_content.push('\n');
}

/// Convert the tables and charts of a page to an XLSX workbook
///
/// One worksheet per block, named after its position and title. Numbers
/// stay numeric cells.
pub fn to_xlsx(page: &Page) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let blocks = blocks(page);

    for (i, block) in blocks.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(i, block.title))?;

        for (c, title) in block.header.iter().enumerate() {
            worksheet.write_string(0, c as u16, title)?;
        }
        for (r, fields) in block.rows.iter().enumerate() {
            let row = (r + 1) as u32;
            for (c, field) in fields.iter().enumerate() {
                match field {
                    Field::Text(text) => worksheet.write_string(row, c as u16, text)?,
                    Field::Number(value) => worksheet.write_number(row, c as u16, *value)?,
                };
            }
        }
    }

    if blocks.is_empty() {
        workbook.add_worksheet().set_name(page.section.label())?;
    }

    workbook.save_to_buffer()
}

/// `"3 Veg vs Non-Veg Items"`, cut to Excel's 31 character limit.
fn sheet_name(index: usize, title: &str) -> String {
    format!("{} {}", index + 1, title)
        .chars()
        .filter(|c| !INVALID_SHEET_CHARS.contains(c))
        .take(MAX_SHEET_NAME)
        .collect::<String>()
        .trim_end()
        .to_string()
}
