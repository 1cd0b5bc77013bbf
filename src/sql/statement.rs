//! Whole-query parsing for the SELECT subset.
//!
//! The query text is scanned once. Quoted literals and parenthesised groups
//! are skipped, so a clause keyword only counts when it appears at the top
//! level outside of quotes: `WHERE name = 'select from'` stays one clause.
//! Each clause body is then tokenized with the expression lexer and turned
//! into a [`SelectStatement`].

use super::lexer::{is_word_char, tokenize};
use super::parser::CompiledExpression;
use super::token::Token;
use crate::access::Value;
use crate::error::{QueryError, QueryResult};
use crate::executor::{aggregate_field_name, AggregateFunction};
use std::fmt;

/// Clause keywords in the order the grammar allows them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Clause {
    Select,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
}

impl Clause {
    /// Single-word clause keywords. `GROUP` and `ORDER` need a following `BY`.
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Clause::Select),
            "FROM" => Some(Clause::From),
            "JOIN" => Some(Clause::Join),
            "WHERE" => Some(Clause::Where),
            "HAVING" => Some(Clause::Having),
            "LIMIT" => Some(Clause::Limit),
            _ => None,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Join => "JOIN",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
        };
        write!(f, "{}", name)
    }
}

/// Position of one clause keyword in the query text (byte offsets)
#[derive(Debug, Clone, Copy)]
struct ClauseMarker {
    clause: Clause,
    start: usize,
    end: usize,
}

/// Find every top-level clause keyword outside of quotes and parentheses
fn scan_clauses(sql: &str) -> Vec<ClauseMarker> {
    let chars: Vec<(usize, char)> = sql.char_indices().collect();
    let offset = |i: usize| chars.get(i).map_or(sql.len(), |(o, _)| *o);
    let word_end = |mut i: usize| {
        while i < chars.len() && is_word_char(chars[i].1) {
            i += 1;
        }
        i
    };

    let mut markers = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i].1;

        if let Some(q) = quote {
            if ch == '\\' && chars.get(i + 1).map(|(_, c)| *c) == Some(q) {
                i += 2;
                continue;
            }
            if ch == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                i += 1;
            }
            '(' => {
                depth += 1;
                i += 1;
            }
            ')' => {
                depth -= 1;
                i += 1;
            }
            c if is_word_char(c) => {
                let start = i;
                let end = word_end(i);
                i = end;
                if depth != 0 {
                    continue;
                }

                let word = &sql[offset(start)..offset(end)];
                if let Some(clause) = Clause::from_word(word) {
                    markers.push(ClauseMarker {
                        clause,
                        start: offset(start),
                        end: offset(end),
                    });
                    continue;
                }

                let two_word = if word.eq_ignore_ascii_case("GROUP") {
                    Some(Clause::GroupBy)
                } else if word.eq_ignore_ascii_case("ORDER") {
                    Some(Clause::OrderBy)
                } else {
                    None
                };
                if let Some(clause) = two_word {
                    let mut next = end;
                    while next < chars.len() && chars[next].1.is_whitespace() {
                        next += 1;
                    }
                    let next_end = word_end(next);
                    if sql[offset(next)..offset(next_end)].eq_ignore_ascii_case("BY") {
                        markers.push(ClauseMarker {
                            clause,
                            start: offset(start),
                            end: offset(next_end),
                        });
                        i = next_end;
                    }
                }
            }
            _ => i += 1,
        }
    }

    markers
}

/// Split the query into `(clause, body)` pairs, checking clause order
fn split_clauses(sql: &str) -> QueryResult<Vec<(Clause, &str)>> {
    let markers = scan_clauses(sql);

    let has = |clause: Clause| markers.iter().any(|m| m.clause == clause);
    if !has(Clause::Select) || !has(Clause::From) {
        return Err(QueryError::syntax("Invalid SQL: missing SELECT ... FROM"));
    }

    let first = markers[0];
    if first.clause != Clause::Select || !sql[..first.start].trim().is_empty() {
        return Err(QueryError::syntax("Query must start with SELECT"));
    }

    let mut clauses = Vec::with_capacity(markers.len());
    let mut previous: Option<Clause> = None;
    for (i, marker) in markers.iter().enumerate() {
        if let Some(prev) = previous {
            let repeated = marker.clause == prev && marker.clause != Clause::Join;
            if marker.clause < prev || repeated {
                return Err(QueryError::syntax(format!(
                    "Unexpected {} clause after {}",
                    marker.clause, prev
                )));
            }
        }
        previous = Some(marker.clause);

        let body_end = markers.get(i + 1).map_or(sql.len(), |next| next.start);
        let body = sql[marker.end..body_end].trim();
        if body.is_empty() {
            return Err(QueryError::syntax(format!("Empty {} clause", marker.clause)));
        }
        clauses.push((marker.clause, body));
    }

    Ok(clauses)
}

/// Table reference in FROM or JOIN
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

/// `JOIN <table> USING(<key>)`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: TableRef,
    pub key: String,
}

/// One entry of the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Column {
        name: String,
        alias: String,
    },
    Aggregate {
        function: AggregateFunction,
        /// `None` for `FUNC(*)` and `FUNC()`
        column: Option<String>,
        alias: String,
    },
}

impl SelectItem {
    /// Name of the output column
    pub fn alias(&self) -> &str {
        match self {
            SelectItem::Column { alias, .. } | SelectItem::Aggregate { alias, .. } => alias,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, SelectItem::Aggregate { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `SELECT *`
    All,
    Items(Vec<SelectItem>),
}

impl Projection {
    pub fn has_aggregate(&self) -> bool {
        match self {
            Projection::All => false,
            Projection::Items(items) => items.iter().any(SelectItem::is_aggregate),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// A parsed SELECT query
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub from: TableRef,
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<CompiledExpression>,
    pub group_by: Vec<String>,
    pub having: Option<CompiledExpression>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl SelectStatement {
    /// Parse query text. A trailing `;` is ignored.
    pub fn parse(sql: &str) -> QueryResult<Self> {
        let sql = sql.trim().trim_end_matches(';');

        let mut statement = SelectStatement {
            projection: Projection::All,
            from: TableRef {
                name: String::new(),
                alias: None,
            },
            joins: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: None,
            limit: None,
        };

        for (clause, body) in split_clauses(sql)? {
            match clause {
                Clause::Select => statement.projection = parse_projection(body)?,
                Clause::From => statement.from = parse_table_ref(&tokenize(body)?, "FROM")?,
                Clause::Join => statement.joins.push(parse_join(body)?),
                Clause::Where => statement.where_clause = Some(CompiledExpression::parse(body)?),
                Clause::GroupBy => statement.group_by = parse_group_by(body)?,
                Clause::Having => statement.having = Some(CompiledExpression::parse(body)?),
                Clause::OrderBy => statement.order_by = Some(parse_order_by(body)?),
                Clause::Limit => statement.limit = Some(parse_limit(body)?),
            }
        }

        Ok(statement)
    }

    /// Every table the query reads, FROM first
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.from.name.as_str())
            .chain(self.joins.iter().map(|join| join.table.name.as_str()))
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }
}

fn describe(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a token list on commas that are not inside parentheses
fn split_top_level(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut parts = vec![Vec::new()];
    let mut depth = 0i32;
    for token in tokens {
        match token {
            Token::Comma if depth == 0 => {
                parts.push(Vec::new());
                continue;
            }
            Token::LeftParen => depth += 1,
            Token::RightParen => depth -= 1,
            _ => {}
        }
        if let Some(last) = parts.last_mut() {
            last.push(token);
        }
    }
    parts
}

fn parse_table_ref(tokens: &[Token], clause: &str) -> QueryResult<TableRef> {
    let names: Option<Vec<&str>> = tokens.iter().map(Token::as_identifier).collect();
    let alias = match names.as_deref() {
        Some([_]) => None,
        Some([_, alias]) => Some(alias),
        Some([_, kw, alias]) if kw.eq_ignore_ascii_case("AS") => Some(alias),
        _ => {
            return Err(QueryError::syntax(format!(
                "Malformed {} table '{}'",
                clause,
                describe(tokens)
            )))
        }
    };
    let name = tokens[0].as_identifier().unwrap_or_default();
    Ok(TableRef {
        name: name.to_string(),
        alias: alias.map(|a| a.to_string()),
    })
}

fn parse_join(body: &str) -> QueryResult<JoinClause> {
    let tokens = tokenize(body)?;
    let Some(using) = tokens.iter().position(|t| t.is_word("USING")) else {
        return Err(QueryError::syntax(format!(
            "JOIN {} requires USING(<column>)",
            body
        )));
    };

    let table = parse_table_ref(&tokens[..using], "JOIN")?;
    let key = match &tokens[using + 1..] {
        [Token::LeftParen, Token::Identifier(key), Token::RightParen] => key.clone(),
        rest => {
            return Err(QueryError::syntax(format!(
                "Malformed USING clause '{}'",
                describe(rest)
            )))
        }
    };

    Ok(JoinClause { table, key })
}

fn parse_projection(body: &str) -> QueryResult<Projection> {
    let tokens = tokenize(body)?;
    if let [Token::Identifier(star)] = tokens.as_slice() {
        if star == "*" {
            return Ok(Projection::All);
        }
    }

    split_top_level(tokens)
        .into_iter()
        .map(parse_select_item)
        .collect::<QueryResult<Vec<_>>>()
        .map(Projection::Items)
}

/// `<col> [[AS] alias]` or `FUNC(<col>|*) [[AS] alias]`
fn parse_select_item(tokens: Vec<Token>) -> QueryResult<SelectItem> {
    let len = tokens.len();
    let (expr, alias) = match tokens.as_slice() {
        [.., as_kw, Token::Identifier(alias)] if len >= 3 && as_kw.is_word("AS") => {
            (&tokens[..len - 2], Some(alias.clone()))
        }
        [.., prev, Token::Identifier(alias)] if len >= 2 && *prev != Token::LeftParen => {
            (&tokens[..len - 1], Some(alias.clone()))
        }
        _ => (tokens.as_slice(), None),
    };

    match expr {
        [Token::Identifier(name)] => Ok(SelectItem::Column {
            alias: alias.unwrap_or_else(|| name.clone()),
            name: name.clone(),
        }),
        [Token::Identifier(func), Token::LeftParen, args @ .., Token::RightParen] => {
            let function = AggregateFunction::from_name(func).ok_or_else(|| {
                QueryError::syntax(format!("Unknown aggregate function '{}'", func))
            })?;
            let column = match args {
                [] => None,
                [Token::Identifier(c)] if c == "*" => None,
                [Token::Identifier(c)] => Some(c.clone()),
                _ => {
                    return Err(QueryError::syntax(format!(
                        "{} takes a single column or *",
                        function.name()
                    )))
                }
            };
            let alias = alias.unwrap_or_else(|| aggregate_field_name(function, column.as_deref()));
            Ok(SelectItem::Aggregate {
                function,
                column,
                alias,
            })
        }
        _ => Err(QueryError::syntax(format!(
            "Unsupported select item '{}'",
            describe(&tokens)
        ))),
    }
}

fn parse_group_by(body: &str) -> QueryResult<Vec<String>> {
    split_top_level(tokenize(body)?)
        .into_iter()
        .map(|part| match part.as_slice() {
            [Token::Identifier(column)] => Ok(column.clone()),
            _ => Err(QueryError::syntax(format!(
                "Malformed GROUP BY column '{}'",
                describe(&part)
            ))),
        })
        .collect()
}

fn parse_order_by(body: &str) -> QueryResult<OrderBy> {
    let tokens = tokenize(body)?;
    let (column, descending) = match tokens.as_slice() {
        [Token::Identifier(column)] => (column, false),
        [Token::Identifier(column), dir] if dir.is_word("ASC") => (column, false),
        [Token::Identifier(column), dir] if dir.is_word("DESC") => (column, true),
        _ => {
            return Err(QueryError::syntax(format!(
                "Malformed ORDER BY '{}'",
                body
            )))
        }
    };
    Ok(OrderBy {
        column: column.clone(),
        descending,
    })
}

fn parse_limit(body: &str) -> QueryResult<usize> {
    match tokenize(body)?.as_slice() {
        [Token::Literal(Value::Integer(n))] if *n >= 0 => Ok(*n as usize),
        _ => Err(QueryError::syntax(format!(
            "LIMIT expects a non-negative integer, got '{}'",
            body
        ))),
    }
}
