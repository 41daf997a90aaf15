//! Table formatting utilities for CLI list commands
//!
//! All four entities share one table renderer. Columns come straight from
//! the entity schema, so adding a field to a schema adds it to every list
//! output format.

use console::style;
use std::io::{self, Write};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::{FieldValue, Record};
use crate::schema::{EntitySchema, FieldDef, FieldType};

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Record identity (cyan colored)
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Integer value, right aligned
    Number(i64),
    /// Decimal value with two places, right aligned
    Decimal(f64),
    /// Missing or null value
    Empty,
}

impl CellValue {
    /// Cell for one schema field of a record
    pub fn for_field(def: &FieldDef, value: Option<&FieldValue>) -> Self {
        match (def.field_type, value) {
            (_, None) | (_, Some(FieldValue::Null)) => CellValue::Empty,
            (FieldType::Integer, Some(FieldValue::Integer(n))) => CellValue::Number(*n),
            (FieldType::Decimal, Some(FieldValue::Integer(n))) => CellValue::Decimal(*n as f64),
            (FieldType::Decimal, Some(FieldValue::Decimal(d))) => CellValue::Decimal(*d),
            (_, Some(v)) if v.is_blank() => CellValue::Empty,
            (_, Some(v)) => CellValue::Text(v.to_text()),
        }
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2).max(4));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Decimal(d) => format!("{:>width$.2}", d, width = width),
            CellValue::Empty => format!("{:<width$}", style("-").dim(), width = width),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        // Escape pipe characters for markdown tables
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting, for CSV and ID output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Decimal(d) => format!("{:.2}", d),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

impl From<&FieldDef> for ColumnDef {
    fn from(def: &FieldDef) -> Self {
        ColumnDef::new(def.name, def.label, def.width)
    }
}

/// One column per schema field, in schema order
pub fn schema_columns(schema: &EntitySchema) -> Vec<ColumnDef> {
    schema.fields.iter().map(ColumnDef::from).collect()
}

/// A row of cell values for table output
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: String) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    /// Build a row holding every schema field of a record
    pub fn from_record(schema: &EntitySchema, record: &Record) -> Self {
        let id = schema
            .id_of(record)
            .map(|id| id.to_string())
            .unwrap_or_default();
        schema.fields.iter().fold(TableRow::new(id), |row, def| {
            row.cell(def.name, CellValue::for_field(def, record.get(def.name)))
        })
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    id_header: &'static str,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], id_header: &'static str) -> Self {
        Self { columns, id_header }
    }

    /// Write rows in the specified format. JSON and YAML are rendered from
    /// the records themselves by the caller; here they fall back to TSV.
    pub fn output<W: Write>(
        &self,
        out: &mut W,
        rows: &[TableRow],
        format: OutputFormat,
        visible_columns: &[&str],
    ) -> io::Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(out, rows, visible_columns),
            OutputFormat::Md => self.output_md(out, rows, visible_columns),
            OutputFormat::Id => self.output_ids(out, rows),
            _ => self.output_tsv(out, rows, visible_columns),
        }
    }

    fn visible<'c>(&'c self, visible_columns: &'c [&'c str]) -> impl Iterator<Item = &'c ColumnDef> {
        let columns: &'c [ColumnDef] = self.columns;
        columns
            .iter()
            .filter(move |col| visible_columns.contains(&col.key))
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow], visible_columns: &[&str]) -> Vec<usize> {
        let id_width = rows
            .iter()
            .map(|r| r.id.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.id_header.len());
        let mut widths = vec![id_width];

        for col in self.visible(visible_columns) {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            // Auto-size to the content plus a truncation buffer, capped at the
            // schema width but never narrower than the header
            let natural = max_content.saturating_add(2).min(col.width);
            widths.push(natural.max(col.header.len()));
        }

        widths
    }

    fn output_tsv<W: Write>(
        &self,
        out: &mut W,
        rows: &[TableRow],
        visible_columns: &[&str],
    ) -> io::Result<()> {
        let widths = self.calculate_widths(rows, visible_columns);

        let mut header_parts = vec![format!(
            "{:<width$}",
            style(self.id_header).bold().dim(),
            width = widths[0]
        )];
        for (col, width) in self.visible(visible_columns).zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        writeln!(out, "{}", header_parts.join(" ").trim_end())?;

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        writeln!(out, "{}", "-".repeat(total_width))?;

        for row in rows {
            let mut parts = vec![CellValue::Id(row.id.clone()).format_tsv(widths[0])];
            for (col, width) in self.visible(visible_columns).zip(&widths[1..]) {
                let cell = row.get(col.key).unwrap_or(&CellValue::Empty);
                parts.push(cell.format_tsv(*width));
            }
            writeln!(out, "{}", parts.join(" ").trim_end())?;
        }
        Ok(())
    }

    fn output_csv<W: Write>(
        &self,
        out: &mut W,
        rows: &[TableRow],
        visible_columns: &[&str],
    ) -> io::Result<()> {
        let mut writer = csv::Writer::from_writer(out);

        let mut headers = vec!["id"];
        headers.extend(self.visible(visible_columns).map(|col| col.key));
        writer.write_record(&headers)?;

        for row in rows {
            let mut values = vec![row.id.clone()];
            for col in self.visible(visible_columns) {
                values.push(row.get(col.key).map(CellValue::raw).unwrap_or_default());
            }
            writer.write_record(&values)?;
        }
        writer.flush()
    }

    fn output_md<W: Write>(
        &self,
        out: &mut W,
        rows: &[TableRow],
        visible_columns: &[&str],
    ) -> io::Result<()> {
        let mut headers = vec![self.id_header];
        headers.extend(self.visible(visible_columns).map(|col| col.header));
        writeln!(out, "| {} |", headers.join(" | "))?;

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        writeln!(out, "|{}|", separators.join("|"))?;

        for row in rows {
            let mut values = vec![CellValue::Id(row.id.clone()).format_md()];
            for col in self.visible(visible_columns) {
                values.push(row.get(col.key).unwrap_or(&CellValue::Empty).format_md());
            }
            writeln!(out, "| {} |", values.join(" | "))?;
        }
        Ok(())
    }

    fn output_ids<W: Write>(&self, out: &mut W, rows: &[TableRow]) -> io::Result<()> {
        for row in rows {
            writeln!(out, "{}", row.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::category;
    use crate::entities::product;

    fn categories() -> Vec<TableRow> {
        let records = [
            Record::new()
                .with("CategoryID", 1)
                .with("CategoryName", "Beverages")
                .with("Description", "Soft drinks, coffees, teas"),
            Record::new()
                .with("CategoryID", 2)
                .with("CategoryName", "Condiments")
                .with("Description", "Sweet | savory sauces"),
            Record::new().with("CategoryID", 3).with("CategoryName", "Produce"),
        ];
        records
            .iter()
            .map(|r| TableRow::from_record(&category::SCHEMA, r))
            .collect()
    }

    fn render(format: OutputFormat, visible: &[&str]) -> String {
        let columns = schema_columns(&category::SCHEMA);
        let formatter = TableFormatter::new(&columns, "ID");
        let mut out = Vec::new();
        formatter
            .output(&mut out, &categories(), format, visible)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cell_for_field_types() {
        let price = product::SCHEMA.field("Price").unwrap();
        assert_eq!(
            CellValue::for_field(price, Some(&FieldValue::Integer(18))),
            CellValue::Decimal(18.0)
        );
        assert_eq!(CellValue::for_field(price, None), CellValue::Empty);

        let supplier = product::SCHEMA.field("SupplierID").unwrap();
        assert_eq!(
            CellValue::for_field(supplier, Some(&FieldValue::Integer(4))),
            CellValue::Number(4)
        );

        let unit = product::SCHEMA.field("Unit").unwrap();
        assert_eq!(
            CellValue::for_field(unit, Some(&FieldValue::from("   "))),
            CellValue::Empty
        );
        assert_eq!(
            CellValue::for_field(unit, Some(&FieldValue::from("10 boxes"))),
            CellValue::Text("10 boxes".to_string())
        );
    }

    #[test]
    fn test_cell_value_raw_and_md() {
        assert_eq!(CellValue::Decimal(18.0).raw(), "18.00");
        assert_eq!(CellValue::Empty.raw(), "");
        assert_eq!(CellValue::Empty.format_md(), "-");
        assert_eq!(CellValue::Text("a|b|c".to_string()).format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_table_row_from_record() {
        let rows = categories();
        assert_eq!(rows[0].id, "1");
        assert_eq!(
            rows[0].get("CategoryName"),
            Some(&CellValue::Text("Beverages".to_string()))
        );
        assert_eq!(rows[2].get("Description"), Some(&CellValue::Empty));
        assert!(rows[0].get("missing").is_none());
    }

    #[test]
    fn test_markdown_output() {
        let out = render(OutputFormat::Md, &["CategoryName", "Description"]);
        insta::assert_snapshot!(out, @r"
        | ID | Category Name | Description |
        |---|---|---|
        | 1 | Beverages | Soft drinks, coffees, teas |
        | 2 | Condiments | Sweet \| savory sauces |
        | 3 | Produce | - |
        ");
    }

    #[test]
    fn test_csv_output_quotes_commas() {
        let out = render(OutputFormat::Csv, &["CategoryName", "Description"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id,CategoryName,Description");
        assert_eq!(lines[1], "1,Beverages,\"Soft drinks, coffees, teas\"");
        assert_eq!(lines[3], "3,Produce,");
    }

    #[test]
    fn test_id_output() {
        let out = render(OutputFormat::Id, &[]);
        assert_eq!(out, "1\n2\n3\n");
    }

    #[test]
    fn test_tsv_output_respects_visible_columns() {
        let out = render(OutputFormat::Tsv, &["CategoryName"]);
        let header = out.lines().next().unwrap();
        assert!(header.contains("Category Name"));
        assert!(!header.contains("Description"));
        assert!(out.contains("Condiments"));
        assert!(!out.contains("savory"));
    }

    #[test]
    fn test_column_def_from_field() {
        let columns = schema_columns(&category::SCHEMA);
        assert_eq!(columns.len(), category::SCHEMA.fields.len());
        assert_eq!(columns[0], ColumnDef::new("CategoryName", "Category Name", 25));
    }
}
