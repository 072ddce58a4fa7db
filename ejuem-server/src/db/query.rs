//! Query description shared by all store adapters

use serde_json::Value;
use std::fmt;

/// Column selection for a table or an embedded relation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Columns {
    #[default]
    All,
    Only(Vec<String>),
}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Columns::All => f.write_str("*"),
            Columns::Only(cols) => f.write_str(&cols.join(", ")),
        }
    }
}

/// Related table embedded into each returned row
///
/// 关系按外键约定解析：父行含 `<单数>_id` 列时为多对一（嵌入对象），
/// 否则子表含父表外键时为一对多（嵌入数组）。
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub table: String,
    pub columns: Columns,
    pub nested: Vec<Embed>,
}

impl Embed {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Columns::All,
            nested: Vec::new(),
        }
    }

    pub fn columns<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Columns::Only(cols.into_iter().map(Into::into).collect());
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.nested.push(embed);
        self
    }
}

impl fmt::Display for Embed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.table)?;
        write_select(f, &self.columns, &self.nested)?;
        f.write_str(")")
    }
}

fn write_select(f: &mut fmt::Formatter<'_>, columns: &Columns, embeds: &[Embed]) -> fmt::Result {
    write!(f, "{columns}")?;
    for embed in embeds {
        write!(f, ", {embed}")?;
    }
    Ok(())
}

/// Equality filter `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Select query: columns, embeds, equality filters and ordering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub columns: Columns,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    /// PostgREST `select=` parameter
    pub fn select_clause(&self) -> String {
        struct Select<'a>(&'a Query);
        impl fmt::Display for Select<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_select(f, &self.0.columns, &self.0.embeds)
            }
        }
        Select(self).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_clause_with_nested_embeds() {
        let query = Query::new()
            .embed(
                Embed::new("order_items").embed(Embed::new("dishes").columns(["name", "price"])),
            )
            .embed(Embed::new("users").columns(["name", "email"]));

        assert_eq!(
            query.select_clause(),
            "*, order_items(*, dishes(name, price)), users(name, email)"
        );
    }

    #[test]
    fn test_plain_select_clause() {
        assert_eq!(Query::new().select_clause(), "*");
    }

    #[test]
    fn test_filter_matches() {
        let row = serde_json::json!({ "id": "o1", "status": "listo" });
        assert!(Filter::eq("status", "listo").matches(&row));
        assert!(!Filter::eq("status", "pendiente").matches(&row));
        assert!(!Filter::eq("missing", "x").matches(&row));
    }
}
