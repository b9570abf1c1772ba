//! 轻量表格
//!
//! 数据源返回的 JSON 记录经列映射后装入 `Table`，再整理为 markdown。
//! 只实现抓取器真正用到的操作：列映射、数值转换、排序、去重、去空、渲染。

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::Value;

use super::error::MacroDataError;

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// 排序规则：数值 < 文本 < 空值（空值总在最后）
    fn sort_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Null, _) => Ordering::Greater,
            (_, Cell::Null) => Ordering::Less,
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
        }
    }

    fn dedup_key(&self) -> String {
        match self {
            Cell::Null => "\u{0}null".to_string(),
            Cell::Text(s) => format!("t:{}", s),
            Cell::Number(n) => format!("n:{}", n),
        }
    }

    fn render(&self) -> String {
        match self {
            Cell::Null => "nan".to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{}", n),
        }
    }
}

/// 列的取值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 原样保留为文本
    Text,
    /// 转数值，失败置空
    Coerce,
    /// 转数值，失败报错
    Strict,
}

/// 源字段定位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// 按字段名取值
    Key(&'static str),
    /// 按字段在记录中的位置取值（依赖响应字段顺序）
    Position(usize),
}

/// 列映射：从源字段到输出列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub source: ColumnSource,
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub const fn key(key: &'static str, name: &'static str, kind: ColumnKind) -> Self {
        Self {
            source: ColumnSource::Key(key),
            name,
            kind,
        }
    }

    pub const fn nth(index: usize, name: &'static str, kind: ColumnKind) -> Self {
        Self {
            source: ColumnSource::Position(index),
            name,
            kind,
        }
    }
}

/// 把单个 JSON 值按列类型转为单元格
pub fn convert_value(value: &Value, column: &str, kind: ColumnKind) -> Result<Cell, MacroDataError> {
    match kind {
        ColumnKind::Text => Ok(match value {
            Value::Null => Cell::Null,
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }),
        ColumnKind::Coerce | ColumnKind::Strict => {
            let parsed = match value {
                Value::Null => return Ok(Cell::Null),
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            };
            match (parsed, kind) {
                (Some(n), _) if n.is_finite() => Ok(Cell::Number(n)),
                (Some(_), _) => Ok(Cell::Null),
                (None, ColumnKind::Coerce) => Ok(Cell::Null),
                (None, _) => Err(MacroDataError::Numeric {
                    column: column.to_string(),
                    value: match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                }),
            }
        }
    }
}

/// 有序列名 + 行数据
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// 按列映射从 JSON 对象数组构建表格
    pub fn from_records(records: &[Value], specs: &[ColumnSpec]) -> Result<Self, MacroDataError> {
        let mut table = Table::new(specs.iter().map(|s| s.name.to_string()).collect());
        for (row_idx, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| MacroDataError::parse(format!("第 {} 条记录不是对象", row_idx)))?;
            let mut row = Vec::with_capacity(specs.len());
            for spec in specs {
                let value = match spec.source {
                    ColumnSource::Key(key) => object.get(key).unwrap_or(&Value::Null),
                    ColumnSource::Position(pos) => {
                        object.values().nth(pos).ok_or_else(|| {
                            MacroDataError::missing_field(format!(
                                "第 {} 条记录缺少第 {} 列 ({})",
                                row_idx, pos, spec.name
                            ))
                        })?
                    }
                };
                row.push(convert_value(value, spec.name, spec.kind)?);
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), MacroDataError> {
        if row.len() != self.columns.len() {
            return Err(MacroDataError::parse(format!(
                "行宽 {} 与列数 {} 不一致",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 取某列所有单元格
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// 按列稳定升序排序；列不存在时不变
    pub fn sort_by_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.rows.sort_by(|a, b| a[idx].sort_cmp(&b[idx]));
        }
    }

    /// 按列去重，保留首次出现的行
    pub fn dedup_by_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            let mut seen = HashSet::new();
            self.rows.retain(|row| seen.insert(row[idx].dedup_key()));
        }
    }

    /// 删除含空值的行
    pub fn drop_null_rows(&mut self) {
        self.rows.retain(|row| !row.iter().any(Cell::is_null));
    }

    fn is_numeric_column(&self, idx: usize) -> bool {
        let mut any = false;
        for row in &self.rows {
            match &row[idx] {
                Cell::Number(_) => any = true,
                Cell::Null => {}
                Cell::Text(_) => return false,
            }
        }
        any
    }

    /// 渲染为 markdown 管道表格，首列为行号
    pub fn to_markdown(&self) -> String {
        let index_header = String::new();
        let mut headers = vec![index_header];
        headers.extend(self.columns.iter().cloned());

        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = vec![i.to_string()];
                cells.extend(row.iter().map(Cell::render));
                cells
            })
            .collect();

        let mut right_aligned = vec![true];
        right_aligned.extend((0..self.columns.len()).map(|i| self.is_numeric_column(i)));

        let widths: Vec<usize> = (0..headers.len())
            .map(|c| {
                body.iter()
                    .map(|r| r[c].chars().count())
                    .chain(std::iter::once(headers[c].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let pad = |text: &str, width: usize, right: bool| -> String {
            let fill = " ".repeat(width.saturating_sub(text.chars().count()));
            if right {
                format!("{}{}", fill, text)
            } else {
                format!("{}{}", text, fill)
            }
        };

        let render_line = |cells: &[String]| -> String {
            let parts: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(c, text)| format!(" {} ", pad(text, widths[c], right_aligned[c])))
                .collect();
            format!("|{}|", parts.join("|"))
        };

        let align: Vec<String> = widths
            .iter()
            .zip(&right_aligned)
            .map(|(w, right)| {
                if *right {
                    format!("{}:", "-".repeat(w + 1))
                } else {
                    format!(":{}", "-".repeat(w + 1))
                }
            })
            .collect();

        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(render_line(&headers));
        lines.push(format!("|{}|", align.join("|")));
        lines.extend(body.iter().map(|r| render_line(r)));
        lines.join("\n")
    }
}
