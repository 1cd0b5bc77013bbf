//! Query execution for the SELECT subset.
//!
//! A [`Session`] borrows a catalog and runs parsed statements against it.
//! Stages run in a fixed order: FROM/JOIN, WHERE, GROUP BY, HAVING,
//! ORDER BY, LIMIT, and finally the SELECT projection. Every table the
//! statement names is resolved before any rows are touched.

use crate::access::{Fields, Record, Value};
use crate::catalog::{Catalog, Table};
use crate::error::QueryResult;
use crate::executor::{Group, Pipeline};
use crate::sql::{CompiledExpression, Projection, SelectItem, SelectStatement};
use log::debug;

/// Rows between stages: plain records until GROUP BY, groups after it
#[derive(Debug, Clone)]
enum Stage {
    Rows(Pipeline<Record>),
    Groups(Pipeline<Group>),
}

impl Stage {
    fn len(&self) -> usize {
        match self {
            Stage::Rows(rows) => rows.len(),
            Stage::Groups(groups) => groups.len(),
        }
    }

    fn filter(&self, expr: &CompiledExpression) -> Self {
        match self {
            Stage::Rows(rows) => Stage::Rows(rows.filter_expression(expr)),
            Stage::Groups(groups) => Stage::Groups(groups.filter_expression(expr)),
        }
    }

    fn order_by(&self, column: &str, descending: bool) -> Self {
        match self {
            Stage::Rows(rows) => Stage::Rows(rows.order_by(column, descending)),
            Stage::Groups(groups) => Stage::Groups(groups.order_by(column, descending)),
        }
    }

    fn limit(&self, n: usize) -> Self {
        match self {
            Stage::Rows(rows) => Stage::Rows(rows.limit(n)),
            Stage::Groups(groups) => Stage::Groups(groups.limit(n)),
        }
    }
}

/// Runs queries against one catalog
pub struct Session<'a> {
    catalog: &'a Catalog,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Parse and execute a query
    pub fn execute(&self, sql: &str) -> QueryResult<Vec<Record>> {
        let statement = SelectStatement::parse(sql)?;
        debug!("Parsed statement: {:?}", statement);
        self.execute_statement(&statement)
    }

    pub fn execute_statement(&self, statement: &SelectStatement) -> QueryResult<Vec<Record>> {
        let from = self.catalog.resolve(&statement.from.name)?;
        let joins = statement
            .joins
            .iter()
            .map(|join| Ok((self.catalog.resolve(&join.table.name)?, join.key.as_str())))
            .collect::<QueryResult<Vec<(&Table, &str)>>>()?;

        let mut rows = from.query();
        debug!("FROM {}: {} rows", from.name(), rows.len());
        for (table, key) in joins {
            rows = rows.join(&table.query(), key);
            debug!("JOIN {} USING({}): {} rows", table.name(), key, rows.len());
        }

        if let Some(expr) = &statement.where_clause {
            rows = rows.filter_expression(expr);
            debug!("WHERE {}: {} rows", expr, rows.len());
        }

        let mut stage = if statement.is_grouped() {
            let groups = rows.group_by(&statement.group_by);
            debug!("GROUP BY {:?}: {} groups", statement.group_by, groups.len());
            Stage::Groups(groups)
        } else {
            Stage::Rows(rows)
        };

        if let Some(expr) = &statement.having {
            stage = stage.filter(expr);
            debug!("HAVING {}: {} rows", expr, stage.len());
        }

        if let Some(order) = &statement.order_by {
            stage = stage.order_by(&order.column, order.descending);
        }

        if let Some(n) = statement.limit {
            stage = stage.limit(n);
        }

        Ok(project(&statement.projection, stage))
    }
}

/// Build the result records from the final stage.
///
/// `SELECT *` over groups yields each group's flat record: key columns,
/// `COUNT` and the aggregate fields. Member rows are not part of the output,
/// so their non-key columns are absent.
fn project(projection: &Projection, stage: Stage) -> Vec<Record> {
    let items = match projection {
        Projection::All => {
            return match stage {
                Stage::Rows(rows) => rows.into_rows(),
                Stage::Groups(groups) => groups.iter().map(Group::to_record).collect(),
            }
        }
        Projection::Items(items) => items,
    };

    match stage {
        Stage::Groups(groups) => groups
            .iter()
            .map(|group| project_group(items, group))
            .collect(),
        Stage::Rows(rows) if projection.has_aggregate() => vec![summarize(items, rows.all())],
        Stage::Rows(rows) => rows
            .iter()
            .map(|row| -> Record {
                items
                    .iter()
                    .map(|item| (item.alias(), item_value(item, Some(row), rows.all())))
                    .collect()
            })
            .collect(),
    }
}

/// One output record per group. Plain columns read the group's own fields
/// first and fall back to the first member row.
fn project_group(items: &[SelectItem], group: &Group) -> Record {
    items
        .iter()
        .map(|item| {
            let value = match item {
                SelectItem::Column { name, .. } => match group.field(name) {
                    Some(value) => value.clone(),
                    None => first_value(group.first_row(), name),
                },
                SelectItem::Aggregate { .. } => item_value(item, None, group.rows()),
            };
            (item.alias(), value)
        })
        .collect()
}

/// Collapse every row into one record. Plain columns take the first row's value.
fn summarize(items: &[SelectItem], rows: &[Record]) -> Record {
    items
        .iter()
        .map(|item| (item.alias(), item_value(item, rows.first(), rows)))
        .collect()
}

fn item_value(item: &SelectItem, row: Option<&Record>, rows: &[Record]) -> Value {
    match item {
        SelectItem::Column { name, .. } => first_value(row, name),
        SelectItem::Aggregate {
            function, column, ..
        } => function.apply(column.as_deref(), rows),
    }
}

fn first_value(row: Option<&Record>, column: &str) -> Value {
    row.map(|r| r.field_or_null(column)).unwrap_or(Value::Null)
}
