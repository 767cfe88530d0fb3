//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the bird and sighting tables.

use crate::query::SortDirection;
use crate::sql::PgBindValue;

/// Alias of the table being queried in list and count statements.
const MAIN_ALIAS: &str = "main";
/// Alias of the related table inside an EXISTS subquery.
const REL_ALIAS: &str = "rel";

/// A table known to the store: identifiers are compile-time constants or a validated schema name.
#[derive(Clone, Copy, Debug)]
pub struct Table<'a> {
    pub schema: &'a str,
    pub name: &'a str,
    pub columns: &'a [&'a str],
}

pub const BIRD_COLUMNS: &[&str] = &["id", "name", "color", "weight", "height", "created_at", "updated_at"];
pub const SIGHTING_COLUMNS: &[&str] = &["id", "bird_id", "location", "date_time", "created_at", "updated_at"];

impl<'a> Table<'a> {
    pub fn birds(schema: &'a str) -> Self {
        Table {
            schema,
            name: "birds",
            columns: BIRD_COLUMNS,
        }
    }

    pub fn sightings(schema: &'a str) -> Self {
        Table {
            schema,
            name: "sightings",
            columns: SIGHTING_COLUMNS,
        }
    }

    fn qualified(&self) -> String {
        format!("{}.{}", quoted(self.schema), quoted(self.name))
    }

    fn column_list(&self, alias: Option<&str>) -> String {
        self.columns
            .iter()
            .map(|c| match alias {
                Some(a) => format!("{}.{}", a, quoted(c)),
                None => quoted(c),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// `%value%` with LIKE wildcards in the value matched literally (escape character `\`).
pub fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Ge,
    Le,
    Lt,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Lt => "<",
        }
    }
}

/// One conjunct of a WHERE clause.
#[derive(Clone, Debug)]
pub enum Condition<'a> {
    /// Case-insensitive substring match on a column of the main table.
    Contains { column: &'a str, value: String },
    Compare {
        column: &'a str,
        op: CompareOp,
        value: PgBindValue,
    },
    /// Case-insensitive substring match on a column of a related row, joined by key.
    RelatedContains {
        related: Table<'a>,
        related_key: &'a str,
        local_key: &'a str,
        column: &'a str,
        value: String,
    },
}

fn where_clause(q: &mut QueryBuf, conditions: &[Condition<'_>]) -> String {
    let mut parts = Vec::with_capacity(conditions.len());
    for cond in conditions {
        let part = match cond {
            Condition::Contains { column, value } => {
                let n = q.push_param(PgBindValue::Text(contains_pattern(value)));
                format!("{}.{} ILIKE ${} ESCAPE '\\'", MAIN_ALIAS, quoted(column), n)
            }
            Condition::Compare { column, op, value } => {
                let n = q.push_param(value.clone());
                format!("{}.{} {} ${}", MAIN_ALIAS, quoted(column), op.as_sql(), n)
            }
            Condition::RelatedContains {
                related,
                related_key,
                local_key,
                column,
                value,
            } => {
                let n = q.push_param(PgBindValue::Text(contains_pattern(value)));
                format!(
                    "EXISTS (SELECT 1 FROM {} {} WHERE {}.{} = {}.{} AND {}.{} ILIKE ${} ESCAPE '\\')",
                    related.qualified(),
                    REL_ALIAS,
                    REL_ALIAS,
                    quoted(related_key),
                    MAIN_ALIAS,
                    quoted(local_key),
                    REL_ALIAS,
                    quoted(column),
                    n
                )
            }
        };
        parts.push(part);
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// A page SELECT and the matching COUNT(*), sharing the same WHERE clause and parameters.
#[derive(Debug)]
pub struct PagedQuery {
    pub select: QueryBuf,
    pub count: QueryBuf,
}

/// SELECT one page: conjunctive filters, ORDER BY the sort column then id, LIMIT/OFFSET.
/// NULLs sort first ascending and last descending.
pub fn select_page(
    table: &Table<'_>,
    conditions: &[Condition<'_>],
    sort_column: &str,
    direction: SortDirection,
    limit: u32,
    offset: u64,
) -> PagedQuery {
    let mut select = QueryBuf::new();
    let where_sql = where_clause(&mut select, conditions);
    let from = format!("{} {}", table.qualified(), MAIN_ALIAS);
    let nulls = match direction {
        SortDirection::Asc => "NULLS FIRST",
        SortDirection::Desc => "NULLS LAST",
    };
    let mut order = format!(
        " ORDER BY {}.{} {} {}",
        MAIN_ALIAS,
        quoted(sort_column),
        direction.as_sql(),
        nulls
    );
    if sort_column != "id" {
        order.push_str(&format!(", {}.{} ASC", MAIN_ALIAS, quoted("id")));
    }

    let count = QueryBuf {
        sql: format!("SELECT COUNT(*) FROM {}{}", from, where_sql),
        params: select.params.clone(),
    };
    select.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        table.column_list(Some(MAIN_ALIAS)),
        from,
        where_sql,
        order,
        limit,
        offset
    );
    PagedQuery { select, count }
}

/// SELECT by primary key.
pub fn select_by_id(table: &Table<'_>, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        table.column_list(None),
        table.qualified(),
        quoted("id")
    );
    q
}

pub fn exists_by_id(table: &Table<'_>, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)",
        table.qualified(),
        quoted("id")
    );
    q
}

/// SELECT rows WHERE column IN (...) ORDER BY id. Used for batch-loading owned rows.
pub fn select_by_column_in(table: &Table<'_>, column: &str, values: &[PgBindValue]) -> QueryBuf {
    let mut q = QueryBuf::new();
    if values.is_empty() {
        q.sql = format!(
            "SELECT {} FROM {} WHERE 1 = 0",
            table.column_list(None),
            table.qualified()
        );
        return q;
    }
    let placeholders: Vec<String> = values
        .iter()
        .map(|v| format!("${}", q.push_param(v.clone())))
        .collect();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
        table.column_list(None),
        table.qualified(),
        quoted(column),
        placeholders.join(", "),
        quoted("id")
    );
    q
}

/// INSERT the given columns; the id comes from the column default. Returns the full row.
pub fn insert(table: &Table<'_>, values: Vec<(&str, PgBindValue)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (col, val) in values {
        let n = q.push_param(val);
        cols.push(quoted(col));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.qualified(),
        cols.join(", "),
        placeholders.join(", "),
        table.column_list(None)
    );
    q
}

/// UPDATE by id: SET the given columns. Returns the full row, or nothing when the id is gone.
pub fn update_by_id(table: &Table<'_>, id: i64, values: Vec<(&str, PgBindValue)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let sets: Vec<String> = values
        .into_iter()
        .map(|(col, val)| format!("{} = ${}", quoted(col), q.push_param(val)))
        .collect();
    let id_param = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table.qualified(),
        sets.join(", "),
        quoted("id"),
        id_param,
        table.column_list(None)
    );
    q
}

/// DELETE by id. Owned rows go with it through the foreign key cascade.
pub fn delete_by_id(table: &Table<'_>, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(PgBindValue::I64(id));
    q.sql = format!("DELETE FROM {} WHERE {} = $1", table.qualified(), quoted("id"));
    q
}
