//! Navigation sections and the pages built for them.
//!
//! A page is plain data: headings, text, statistics tables and charts. Every
//! builder takes the dataset explicitly and recomputes its aggregates on each
//! call.

use crate::aggregate::{
    NumericSummary, cross_tab, describe_categorical, describe_numeric, frequency_count, grouped_sum,
    grouped_unique_count,
};
use crate::chart::{Chart, format_number};
use crate::config::MenuConfig;
use crate::record::{Order, Restaurant, SheetRecord};
use crate::table::{Dataset, RecordTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const NOT_STATED: &str = "Not stated";

/// The six entries of the sidebar, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Overview,
    Food,
    FoodMenu,
    Orders,
    Restaurant,
    User,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Overview,
        Section::Food,
        Section::FoodMenu,
        Section::Orders,
        Section::Restaurant,
        Section::User,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Food => "Food",
            Section::FoodMenu => "Food Menu",
            Section::Orders => "Orders",
            Section::Restaurant => "Restaurant",
            Section::User => "User",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Food => "food",
            Section::FoodMenu => "food-menu",
            Section::Orders => "orders",
            Section::Restaurant => "restaurant",
            Section::User => "user",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.slug() == slug)
    }
}

/// Query parameters a page accepts (only the Food Menu uses them).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One block of a page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Panel {
    pub heading: String,
    pub text: Option<String>,
    pub bullets: Vec<String>,
    pub table: Option<Table>,
    pub chart: Option<Chart>,
}

impl Panel {
    fn text(heading: &str, text: impl Into<String>) -> Self {
        Self {
            heading: heading.to_string(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn table(heading: &str, table: Table) -> Self {
        Self {
            heading: heading.to_string(),
            table: Some(table),
            ..Self::default()
        }
    }

    fn chart(chart: Chart) -> Self {
        Self {
            heading: chart.title.clone(),
            chart: Some(chart),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub pages: usize,
    pub total: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub section: Section,
    pub title: String,
    pub panels: Vec<Panel>,
    pub pagination: Option<Pagination>,
}

impl Page {
    fn new(section: Section, title: &str, panels: Vec<Panel>) -> Self {
        Self {
            section,
            title: title.to_string(),
            panels,
            pagination: None,
        }
    }

    /// Charts in panel order; their position is the chart index used in URLs.
    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.panels.iter().filter_map(|panel| panel.chart.as_ref())
    }

    pub fn chart(&self, index: usize) -> Option<&Chart> {
        self.charts().nth(index)
    }
}

/// Build the page for one section.
pub fn build_page(section: Section, dataset: &Dataset, menu: &MenuConfig, query: &PageQuery) -> Page {
    match section {
        Section::Overview => overview(dataset),
        Section::Food => food(dataset),
        Section::FoodMenu => food_menu(dataset, menu, query),
        Section::Orders => orders(dataset),
        Section::Restaurant => restaurant(dataset),
        Section::User => user(dataset),
    }
}

fn missing_sheet(section: Section, sheet: &str) -> Page {
    Page::new(
        section,
        section.label(),
        vec![Panel::text(
            "No data",
            format!("The workbook has no `{}` sheet.", sheet),
        )],
    )
}

fn numeric_table(column: &str, summary: Option<NumericSummary>) -> Table {
    let rows = match summary {
        Some(s) => vec![
            ("count", format_number(s.count as f64)),
            ("mean", format_number(s.mean)),
            ("std", s.std.map(format_number).unwrap_or_else(|| "-".to_string())),
            ("min", format_number(s.min)),
            ("25%", format_number(s.q25)),
            ("50%", format_number(s.median)),
            ("75%", format_number(s.q75)),
            ("max", format_number(s.max)),
        ],
        None => vec![("count", "0".to_string())],
    };

    Table {
        header: vec![String::new(), column.to_string()],
        rows: rows
            .into_iter()
            .map(|(name, value)| vec![name.to_string(), value])
            .collect(),
    }
}

fn overview(dataset: &Dataset) -> Page {
    let about = Panel::text(
        "About",
        "A food-delivery platform connecting customers, restaurant partners and \
         delivery partners. Customers discover restaurants, read and write reviews \
         and order delivery; restaurants get marketing tools and a last-mile \
         delivery service; delivery partners get flexible earning opportunities.",
    );

    let mut goals = Panel::text("Goals", "What the platform focuses on:");
    goals.bullets = vec![
        "Driving the force of Assortment".to_string(),
        "Focusing on Affordability".to_string(),
        "Boosting Accessibility for customers".to_string(),
        "Improving Quality of Food".to_string(),
    ];

    let mut rows = vec![
        vec!["Food items".to_string(), dataset.food.len().to_string()],
        vec!["Users".to_string(), dataset.users.len().to_string()],
    ];
    if let Some(orders) = &dataset.orders {
        rows.push(vec!["Orders".to_string(), orders.len().to_string()]);
        let amount: f64 = orders.iter().map(|o| o.sales_amount).sum();
        rows.push(vec!["Sales amount".to_string(), format_number(amount)]);
    }
    if let Some(restaurants) = &dataset.restaurants {
        rows.push(vec!["Restaurants".to_string(), restaurants.len().to_string()]);
    }
    let totals = Panel::table(
        "Dataset",
        Table {
            header: vec!["Sheet".to_string(), "Rows".to_string()],
            rows,
        },
    );

    Page::new(
        Section::Overview,
        "Better Food for More People",
        vec![about, goals, totals],
    )
}

fn food(dataset: &Dataset) -> Page {
    let food = &dataset.food;

    let summaries = [
        describe_categorical(food.iter().map(|f| f.item.as_str())),
        describe_categorical(food.iter().map(|f| f.veg_or_non_veg.as_str())),
    ];
    let stats_rows = ["count", "unique", "top", "freq"]
        .into_iter()
        .map(|stat| {
            let mut row = vec![stat.to_string()];
            row.extend(summaries.iter().map(|summary| match summary {
                Some(s) => match stat {
                    "count" => s.count.to_string(),
                    "unique" => s.unique.to_string(),
                    "top" => s.top.clone(),
                    _ => s.freq.to_string(),
                },
                None => "-".to_string(),
            }));
            row
        })
        .collect();
    let stats = Table {
        header: vec![String::new(), "item".to_string(), "veg_or_non_veg".to_string()],
        rows: stats_rows,
    };

    let veg_count = frequency_count(food, |f| f.veg_or_non_veg.as_str());
    let unique_items = grouped_unique_count(food, |f| f.veg_or_non_veg.as_str(), |f| f.item.as_str());

    Page::new(
        Section::Food,
        "Food",
        vec![
            Panel::table("Basic Statistics", stats),
            Panel::chart(Chart::bar(
                "Count of Veg vs Non-Veg Items",
                "Type",
                "Count",
                &veg_count,
            )),
            Panel::chart(Chart::bar(
                "Unique Items by Type",
                "Type",
                "Unique Items",
                &unique_items,
            )),
            Panel::chart(Chart::pie("Veg vs Non-Veg Items", "Type", &veg_count)),
        ],
    )
}

fn food_menu(dataset: &Dataset, menu: &MenuConfig, query: &PageQuery) -> Page {
    let kind = query
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|kind| !kind.is_empty());
    let items: Vec<_> = dataset
        .food
        .iter()
        .filter(|f| kind.is_none_or(|kind| f.veg_or_non_veg.eq_ignore_ascii_case(kind)))
        .collect();

    let page_size = menu.page_size.max(1);
    let total = items.len();
    let pages = total.div_ceil(page_size).max(1);
    let page = query.page.unwrap_or(1).clamp(1, pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);

    let listing = Table {
        header: vec!["ID".to_string(), "Item".to_string(), "Type".to_string()],
        rows: items[start..end]
            .iter()
            .map(|f| vec![f.f_id.clone(), f.item.clone(), f.veg_or_non_veg.clone()])
            .collect(),
    };
    let mut listing = Panel::table("Menu", listing);
    listing.text = Some(if total == 0 {
        "No items match.".to_string()
    } else {
        format!("Showing items {} to {} of {}", start + 1, end, total)
    });

    let popular = frequency_count(&dataset.food, |f| f.item.as_str()).top(menu.top_items);

    let mut result = Page::new(
        Section::FoodMenu,
        "Food Menu",
        vec![
            listing,
            Panel::chart(Chart::bar("Most Frequent Menu Items", "Item", "Listings", &popular)),
        ],
    );
    result.pagination = Some(Pagination {
        page,
        pages,
        total,
        prev: (page > 1).then(|| page - 1),
        next: (page < pages).then(|| page + 1),
    });
    result
}

fn orders(dataset: &Dataset) -> Page {
    let Some(orders) = &dataset.orders else {
        return missing_sheet(Section::Orders, Order::SHEET);
    };

    let amounts = numeric_table("sales_amount", describe_numeric(orders.iter().map(|o| o.sales_amount)));
    let daily = grouped_sum(orders, |o| o.order_date, |o| o.sales_amount);
    let monthly = frequency_count(orders, |o| o.order_date.format("%Y-%m").to_string()).sorted_by_key();

    Page::new(
        Section::Orders,
        "Orders",
        vec![
            Panel::table("Sales Amount Statistics", amounts),
            Panel::chart(Chart::line("Daily Sales Amount", "Date", "Sales Amount", daily)),
            Panel::chart(Chart::bar("Orders per Month", "Month", "Orders", &monthly)),
        ],
    )
}

fn restaurant(dataset: &Dataset) -> Page {
    let Some(restaurants) = &dataset.restaurants else {
        return missing_sheet(Section::Restaurant, Restaurant::SHEET);
    };

    let cities = frequency_count(restaurants, |r| r.city.as_deref().unwrap_or(NOT_STATED)).top(10);
    // Half-star buckets
    let ratings = frequency_count(restaurants, |r| r.rating.map(|v| (v * 2.0).round() as i64))
        .sorted_by_key()
        .map_keys(|bucket| match bucket {
            Some(b) => format!("{:.1}", b as f64 / 2.0),
            None => "Unrated".to_string(),
        });

    let mut panels = vec![
        Panel::chart(Chart::bar("Top Cities by Restaurants", "City", "Restaurants", &cities)),
        Panel::chart(Chart::bar("Rating Distribution", "Rating", "Restaurants", &ratings)),
    ];

    if let Some(orders) = &dataset.orders {
        panels.push(Panel::chart(busiest_restaurants(restaurants, orders)));
    }

    Page::new(Section::Restaurant, "Restaurant", panels)
}

fn busiest_restaurants(restaurants: &RecordTable<Restaurant>, orders: &RecordTable<Order>) -> Chart {
    let names: HashMap<i64, &str> = restaurants.iter().map(|r| (r.id, r.name.as_str())).collect();
    let busiest = frequency_count(orders, |o| o.r_id)
        .top(10)
        .map_keys(|id| match names.get(&id) {
            Some(name) => format!("{} (#{})", name, id),
            None => format!("#{}", id),
        });
    Chart::bar("Busiest Restaurants", "Restaurant", "Orders", &busiest)
}

fn user(dataset: &Dataset) -> Page {
    let users = &dataset.users;

    let ages = numeric_table("age", describe_numeric(users.iter().map(|u| u.age as f64)));
    let age_distribution = frequency_count(users, |u| u.age).sorted_by_key();
    let age_by_gender = cross_tab(users, |u| Some(u.age), |u| u.gender.as_deref());
    let marital = frequency_count(users, |u| u.marital_status.as_deref().unwrap_or(NOT_STATED));
    let occupation = frequency_count(users, |u| u.occupation.as_deref().unwrap_or(NOT_STATED));
    let income = frequency_count(users, |u| u.monthly_income.as_deref().unwrap_or(NOT_STATED));

    Page::new(
        Section::User,
        "User",
        vec![
            Panel::table("Age Statistics", ages),
            Panel::chart(Chart::bar("Age Distribution", "Age", "Users", &age_distribution)),
            Panel::chart(Chart::grouped_bar("Age by Gender", "Age", "Users", &age_by_gender)),
            Panel::chart(Chart::pie("Marital Status", "Marital Status", &marital)),
            Panel::chart(Chart::bar("Occupation", "Occupation", "Users", &occupation)),
            Panel::chart(Chart::bar("Monthly Income", "Monthly Income", "Users", &income)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartData;
    use crate::record::{FoodItem, User};
    use chrono::NaiveDate;

    fn dataset(with_orders: bool) -> Dataset {
        let food = [
            ("fd0", "Dal", "Veg"),
            ("fd1", "Dal", "Veg"),
            ("fd2", "Paneer Tikka", "Veg"),
            ("fd3", "Chicken Biryani", "Non-veg"),
            ("fd4", "Roti", "Veg"),
        ];
        let users = [
            (20, Some("Male"), Some("Single")),
            (20, Some("Female"), Some("Single")),
            (25, Some("Female"), None),
        ];
        let day = |d| NaiveDate::from_ymd_opt(2020, 6, d).unwrap();

        Dataset {
            food: RecordTable::new(
                "food",
                food.iter()
                    .map(|(id, item, kind)| FoodItem {
                        f_id: id.to_string(),
                        item: item.to_string(),
                        veg_or_non_veg: kind.to_string(),
                    })
                    .collect(),
            ),
            users: RecordTable::new(
                "users",
                users
                    .iter()
                    .enumerate()
                    .map(|(i, (age, gender, marital))| User {
                        user_id: i as i64 + 1,
                        age: *age,
                        gender: gender.map(str::to_string),
                        marital_status: marital.map(str::to_string),
                        occupation: Some("Student".to_string()),
                        monthly_income: None,
                    })
                    .collect(),
            ),
            orders: with_orders.then(|| {
                RecordTable::new(
                    "orders",
                    vec![
                        Order {
                            order_date: day(2),
                            sales_qty: 1,
                            sales_amount: 100.0,
                            user_id: 1,
                            r_id: 10,
                        },
                        Order {
                            order_date: day(1),
                            sales_qty: 2,
                            sales_amount: 250.0,
                            user_id: 2,
                            r_id: 10,
                        },
                        Order {
                            order_date: day(1),
                            sales_qty: 1,
                            sales_amount: 50.0,
                            user_id: 3,
                            r_id: 11,
                        },
                    ],
                )
            }),
            restaurants: Some(RecordTable::new(
                "restaurant",
                vec![
                    Restaurant {
                        id: 10,
                        name: "Tandoor".to_string(),
                        city: Some("Pune".to_string()),
                        rating: Some(4.2),
                        cuisine: None,
                    },
                    Restaurant {
                        id: 11,
                        name: "Dosa Point".to_string(),
                        city: None,
                        rating: None,
                        cuisine: None,
                    },
                ],
            )),
        }
    }

    fn page(section: Section, data: &Dataset) -> Page {
        build_page(section, data, &MenuConfig::default(), &PageQuery::default())
    }

    #[test]
    fn slugs_round_trip_for_every_section() {
        for section in Section::ALL {
            assert_eq!(Section::from_slug(section.slug()), Some(section));
        }
        assert_eq!(Section::from_slug("settings"), None);
        assert_eq!(Section::FoodMenu.label(), "Food Menu");
    }

    #[test]
    fn food_page_charts() {
        let data = dataset(true);
        let page = page(Section::Food, &data);
        assert_eq!(page.charts().count(), 3);

        let veg = page.chart(0).unwrap();
        assert_eq!(
            veg.data,
            ChartData::Categories {
                labels: vec!["Veg".to_string(), "Non-veg".to_string()],
                values: vec![4.0, 1.0],
            }
        );

        let unique = page.chart(1).unwrap();
        let (_, rows) = unique.table();
        assert_eq!(rows, vec![("Non-veg".to_string(), vec![1.0]), ("Veg".to_string(), vec![3.0])]);

        let stats = page.panels[0].table.as_ref().unwrap();
        assert_eq!(stats.rows[0], vec!["count", "5", "5"]);
        assert_eq!(stats.rows[2], vec!["top", "Dal", "Veg"]);
    }

    #[test]
    fn menu_pagination_and_filter() {
        let data = dataset(true);
        let menu = MenuConfig {
            page_size: 2,
            top_items: 1,
        };
        let query = PageQuery {
            page: Some(2),
            kind: Some("veg".to_string()),
        };
        let page = build_page(Section::FoodMenu, &data, &menu, &query);
        let pagination = page.pagination.clone().unwrap();
        assert_eq!(pagination.total, 4);
        assert_eq!(pagination.pages, 2);
        assert_eq!(pagination.prev, Some(1));
        assert_eq!(pagination.next, None);

        let listing = page.panels[0].table.as_ref().unwrap();
        assert_eq!(listing.rows.len(), 2);
        assert_eq!(listing.rows[0][0], "fd2");

        let popular = page.chart(0).unwrap();
        assert_eq!(popular.table().1, vec![("Dal".to_string(), vec![2.0])]);
    }

    #[test]
    fn menu_page_out_of_range_is_clamped() {
        let data = dataset(true);
        let query = PageQuery {
            page: Some(99),
            kind: None,
        };
        let page = build_page(Section::FoodMenu, &data, &MenuConfig::default(), &query);
        assert_eq!(page.pagination.unwrap().page, 1);
    }

    #[test]
    fn orders_page_without_sheet() {
        let data = dataset(false);
        let page = page(Section::Orders, &data);
        assert_eq!(page.charts().count(), 0);
        assert!(page.panels[0].text.as_ref().unwrap().contains("orders"));
    }

    #[test]
    fn orders_page_sums_per_day() {
        let data = dataset(true);
        let page = page(Section::Orders, &data);
        let daily = page.chart(0).unwrap();
        let (_, rows) = daily.table();
        assert_eq!(rows[0], ("2020-06-01".to_string(), vec![300.0]));
        assert_eq!(rows[1], ("2020-06-02".to_string(), vec![100.0]));

        let monthly = page.chart(1).unwrap();
        assert_eq!(monthly.table().1, vec![("2020-06".to_string(), vec![3.0])]);
    }

    #[test]
    fn restaurant_page_joins_names() {
        let data = dataset(true);
        let page = page(Section::Restaurant, &data);
        assert_eq!(page.charts().count(), 3);

        let ratings = page.chart(1).unwrap();
        let (_, rows) = ratings.table();
        assert_eq!(rows[0].0, "Unrated");
        assert_eq!(rows[1].0, "4.0");

        let busiest = page.chart(2).unwrap();
        assert_eq!(busiest.table().1[0], ("Tandoor (#10)".to_string(), vec![2.0]));
    }

    #[test]
    fn user_page_charts() {
        let data = dataset(true);
        let page = page(Section::User, &data);

        let ages = page.chart(0).unwrap();
        assert_eq!(ages.table().1, vec![("20".to_string(), vec![2.0]), ("25".to_string(), vec![1.0])]);

        let by_gender = page.chart(1).unwrap();
        let (header, rows) = by_gender.table();
        assert_eq!(header, vec!["Age", "Female", "Male"]);
        assert_eq!(rows[1], ("25".to_string(), vec![1.0, 0.0]));

        let marital = page.chart(2).unwrap();
        let (_, rows) = marital.table();
        assert_eq!(rows[0], ("Single".to_string(), vec![2.0]));
        assert_eq!(rows[1], (NOT_STATED.to_string(), vec![1.0]));
    }

    #[test]
    fn overview_lists_totals() {
        let data = dataset(true);
        let page = page(Section::Overview, &data);
        let totals = page.panels[2].table.as_ref().unwrap();
        assert!(totals.rows.contains(&vec!["Food items".to_string(), "5".to_string()]));
        assert!(totals.rows.contains(&vec!["Sales amount".to_string(), "400".to_string()]));
        assert_eq!(page.panels[1].bullets.len(), 4);
    }
}
