//! Grid presentation.
//!
//! Turns the active result set into column definitions and rows the grid
//! widget can render. Pure: recomputed on every frame.

use serde_json::Value as JsonValue;

use crate::analytics::{members, PivotRow};
use crate::config::Locale;
use crate::db::{QueryResult, Value};
use crate::view::i18n;
use crate::view::ActiveResult;

/// Result columns the grid knows how to label and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalField {
    Month,
    Employee,
    Estimates,
    Contracts,
    ConversionPercent,
}

impl LogicalField {
    /// All fields, in report order.
    pub const ALL: [LogicalField; 5] = [
        Self::Month,
        Self::Employee,
        Self::Estimates,
        Self::Contracts,
        Self::ConversionPercent,
    ];

    /// Recognizes a result column by its exact name.
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column_name() == name)
    }

    /// Column name as produced by the canonical query.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Employee => "Employee",
            Self::Estimates => "Estimates",
            Self::Contracts => "Contracts",
            Self::ConversionPercent => "ConversionPercent",
        }
    }

    /// Header label.
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Month, Locale::Ru) => "Месяц",
            (Self::Employee, Locale::Ru) => "Сотрудник",
            (Self::Estimates, Locale::Ru) => "Количество смет",
            (Self::Contracts, Locale::Ru) => "Количество договоров",
            (Self::ConversionPercent, Locale::Ru) => "Конверсия (%)",
            (Self::Month, Locale::En) => "Month",
            (Self::Employee, Locale::En) => "Employee",
            (Self::Estimates, Locale::En) => "Estimates",
            (Self::Contracts, Locale::En) => "Contracts",
            (Self::ConversionPercent, Locale::En) => "Conversion (%)",
        }
    }

    fn width(&self) -> ColumnWidth {
        match self {
            Self::Month => ColumnWidth::Fixed(12),
            Self::Employee => ColumnWidth::Flex { weight: 2, min: 18 },
            Self::Estimates | Self::Contracts | Self::ConversionPercent => ColumnWidth::Fixed(15),
        }
    }

    fn format(&self) -> CellFormat {
        match self {
            Self::Month | Self::Employee => CellFormat::Text,
            Self::Estimates | Self::Contracts => CellFormat::Numeric,
            Self::ConversionPercent => CellFormat::Percent,
        }
    }

    /// Cube member holding this field in the remote report.
    fn member(&self) -> &'static str {
        match self {
            Self::Month => members::MONTH,
            Self::Employee => members::EMPLOYEE,
            Self::Estimates => members::ESTIMATES,
            Self::Contracts => members::CONTRACTS,
            Self::ConversionPercent => members::CONVERSION_PERCENT,
        }
    }
}

/// Column width in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    Fixed(u16),
    /// Shares leftover space by weight, never narrower than `min`.
    Flex { weight: u16, min: u16 },
}

/// How cells in a column are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Text,
    /// Right-aligned number.
    Numeric,
    /// Right-aligned number followed by `%`.
    Percent,
}

impl CellFormat {
    /// Whether cells are right-aligned.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric | Self::Percent)
    }
}

/// One grid column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Key in the row record.
    pub field: String,
    pub header: String,
    pub width: ColumnWidth,
    pub format: CellFormat,
    pub sortable: bool,
    pub filterable: bool,
}

impl ColumnDef {
    fn known(field: LogicalField, locale: Locale) -> Self {
        Self {
            field: field.column_name().to_string(),
            header: field.label(locale).to_string(),
            width: field.width(),
            format: field.format(),
            sortable: true,
            filterable: true,
        }
    }

    fn for_column(name: &str, locale: Locale) -> Self {
        match LogicalField::from_column(name) {
            Some(field) => Self::known(field, locale),
            None => Self {
                field: name.to_string(),
                header: name.to_string(),
                width: ColumnWidth::Flex { weight: 1, min: 10 },
                format: CellFormat::Text,
                sortable: true,
                filterable: true,
            },
        }
    }

    /// Renders a cell of this column.
    pub fn format_cell(&self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        match self.format {
            CellFormat::Percent => format!("{}%", value),
            CellFormat::Text | CellFormat::Numeric => value.to_display_string(),
        }
    }
}

/// Rows aligned with their column definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl Grid {
    /// Looks up a cell by row index and field key.
    pub fn value(&self, row: usize, field: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c.field == field)?;
        self.rows.get(row)?.get(index)
    }
}

/// What the grid area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum GridView {
    /// The remote query is in flight.
    Loading,
    /// No rows to show (not an error).
    Empty,
    Rows(Grid),
}

impl GridView {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(grid) => grid.rows.len(),
            Self::Loading | Self::Empty => 0,
        }
    }
}

/// Derives what the grid shows from the active result set.
pub fn derive_grid(active: ActiveResult<'_>, locale: Locale) -> GridView {
    match active {
        ActiveResult::Local(result) => local_grid(result, locale),
        ActiveResult::Remote(remote) => {
            if remote.is_loading() {
                return GridView::Loading;
            }
            match remote.result() {
                Some(result) if !result.is_empty() => {
                    GridView::Rows(remote_grid(result.table_pivot(), locale))
                }
                _ => GridView::Empty,
            }
        }
    }
}

fn local_grid(result: &QueryResult, locale: Locale) -> GridView {
    if result.is_empty() {
        return GridView::Empty;
    }

    let columns = result
        .columns
        .iter()
        .map(|column| ColumnDef::for_column(&column.name, locale))
        .collect();

    GridView::Rows(Grid {
        columns,
        rows: result.rows.clone(),
    })
}

fn remote_grid(rows: &[PivotRow], locale: Locale) -> Grid {
    let columns = LogicalField::ALL
        .into_iter()
        .map(|field| ColumnDef::known(field, locale))
        .collect();

    let rows = rows
        .iter()
        .map(|row| {
            LogicalField::ALL
                .into_iter()
                .map(|field| remote_cell(row, field, locale))
                .collect()
        })
        .collect();

    Grid { columns, rows }
}

fn remote_cell(row: &PivotRow, field: LogicalField, locale: Locale) -> Value {
    let raw = row.get(field.member());
    match field {
        LogicalField::Month => Value::String(json_text(raw).unwrap_or_default()),
        LogicalField::Employee => Value::String(
            json_text(raw)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| i18n::unknown_employee(locale).to_string()),
        ),
        LogicalField::Estimates | LogicalField::Contracts | LogicalField::ConversionPercent => {
            Value::Float(json_number(raw))
        }
    }
}

fn json_text(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces a measure to a number; missing or unparsable values become 0.
fn json_number(value: Option<&JsonValue>) -> f64 {
    match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}
