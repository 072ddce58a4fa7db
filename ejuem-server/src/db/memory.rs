//! In-process record store
//!
//! 每张表是一个按插入顺序保存的 JSON 对象列表。插入时生成 `id` (uuid v4)
//! 与单调递增的 `created_at`，写入成功后通过 broadcast 发布变更通知。

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::query::{Columns, Direction, Embed, Filter, Query};
use super::{ChangeEvent, ChangeKind, RecordStore, StoreError, StoreResult, tables};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// (parent, child) pairs embedded as arrays; every other embed is many-to-one
/// through the parent's `<singular>_id` column
const ONE_TO_MANY: &[(&str, &str)] = &[
    (tables::ORDERS, tables::ORDER_ITEMS),
    (tables::CATEGORIES, tables::DISHES),
];

type Tables = HashMap<String, Vec<Value>>;

pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// (table, column) pairs that must be unique
    unique: Vec<(String, String)>,
    last_created_at: Mutex<DateTime<Utc>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    /// Empty store with the application's unique constraints
    pub fn new() -> Self {
        Self::with_unique_constraints([
            (tables::TABLES, "number"),
            (tables::USERS, "email"),
            (tables::CREDENTIALS, "email"),
        ])
    }

    pub fn with_unique_constraints<I>(constraints: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            tables: RwLock::new(HashMap::new()),
            unique: constraints
                .into_iter()
                .map(|(t, c)| (t.to_string(), c.to_string()))
                .collect(),
            last_created_at: Mutex::new(DateTime::<Utc>::MIN_UTC),
            changes,
        }
    }

    /// Number of rows currently stored in `table`
    pub fn count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }

    fn publish(&self, table: &str, kind: ChangeKind) {
        // 没有订阅者时发送失败，忽略即可
        let _ = self.changes.send(ChangeEvent {
            table: table.to_string(),
            kind,
        });
    }

    /// Strictly increasing timestamp, so `created_at` ordering matches insertion order
    fn next_created_at(&self) -> String {
        let mut last = self.last_created_at.lock();
        let mut now = Utc::now();
        if now <= *last {
            now = *last + Duration::microseconds(1);
        }
        *last = now;
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn check_unique(
        &self,
        table: &str,
        existing: &[Value],
        candidate: &Map<String, Value>,
        skip_id: Option<&Value>,
    ) -> StoreResult<()> {
        for (_, column) in self.unique.iter().filter(|(t, _)| t == table) {
            let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = existing.iter().any(|row| {
                row.get(column) == Some(value) && (skip_id.is_none() || row.get("id") != skip_id)
            });
            if clash {
                return Err(StoreError::Conflict(format!(
                    "{table}.{column} = {value} already exists"
                )));
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read();
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| f.matches(row)))
            .collect();

        if let Some(order) = &query.order_by {
            // sort_by 为稳定排序，相等值保持插入顺序
            matched.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        Ok(matched
            .into_iter()
            .map(|row| shape_row(&tables, table, row, &query.columns, &query.embeds))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        let mut prepared = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut obj) = row else {
                return Err(StoreError::Decode(format!(
                    "insert into {table}: row is not an object"
                )));
            };
            if obj.get("id").is_none_or(Value::is_null) {
                obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
            }
            if obj.get("created_at").is_none_or(Value::is_null) {
                obj.insert("created_at".into(), Value::String(self.next_created_at()));
            }
            prepared.push(obj);
        }

        {
            let mut tables = self.tables.write();
            let existing = tables.entry(table.to_string()).or_default();

            // 整批校验通过后才写入
            let mut staged: Vec<Value> = existing.clone();
            for obj in &prepared {
                self.check_unique(table, &staged, obj, None)?;
                staged.push(Value::Object(obj.clone()));
            }
            existing.extend(prepared.iter().cloned().map(Value::Object));
        }

        if !prepared.is_empty() {
            self.publish(table, ChangeKind::Insert);
        }
        Ok(prepared.into_iter().map(Value::Object).collect())
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> StoreResult<Vec<Value>> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::Decode(format!(
                "update {table}: patch is not an object"
            )));
        };

        let updated = {
            let mut tables = self.tables.write();
            let Some(rows) = tables.get_mut(table) else {
                return Ok(Vec::new());
            };

            let targets: Vec<usize> = rows
                .iter()
                .enumerate()
                .filter(|(_, row)| filters.iter().all(|f| f.matches(row)))
                .map(|(idx, _)| idx)
                .collect();

            for &idx in &targets {
                let candidate = merged(&rows[idx], &patch);
                self.check_unique(table, rows, &candidate, rows[idx].get("id"))?;
            }

            targets
                .into_iter()
                .map(|idx| {
                    let next = Value::Object(merged(&rows[idx], &patch));
                    rows[idx] = next.clone();
                    next
                })
                .collect::<Vec<_>>()
        };

        if !updated.is_empty() {
            self.publish(table, ChangeKind::Update);
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Value>> {
        let removed = {
            let mut tables = self.tables.write();
            let Some(rows) = tables.get_mut(table) else {
                return Ok(Vec::new());
            };
            let (removed, kept): (Vec<Value>, Vec<Value>) = rows
                .drain(..)
                .partition(|row| filters.iter().all(|f| f.matches(row)));
            *rows = kept;
            removed
        };

        if !removed.is_empty() {
            self.publish(table, ChangeKind::Delete);
        }
        Ok(removed)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        Some(self.changes.subscribe())
    }
}

fn merged(row: &Value, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut obj = row.as_object().cloned().unwrap_or_default();
    for (k, v) in patch {
        obj.insert(k.clone(), v.clone());
    }
    obj
}

/// Foreign key column that references `table`
fn foreign_key(table: &str) -> String {
    let singular = if let Some(stem) = table.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = table.strip_suffix("shes") {
        format!("{stem}sh")
    } else {
        table.trim_end_matches('s').to_string()
    };
    format!("{singular}_id")
}

/// Apply column projection and resolve embeds for one row
fn shape_row(tables: &Tables, table: &str, row: &Value, columns: &Columns, embeds: &[Embed]) -> Value {
    let mut out = match columns {
        Columns::All => row.as_object().cloned().unwrap_or_default(),
        Columns::Only(cols) => cols
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
            .collect(),
    };

    for embed in embeds {
        let related = tables.get(&embed.table).map(Vec::as_slice).unwrap_or(&[]);
        let one_to_many = ONE_TO_MANY
            .iter()
            .any(|(parent, child)| *parent == table && *child == embed.table);

        let value = if one_to_many {
            let child_fk = foreign_key(table);
            let parent_id = row.get("id");
            Value::Array(
                related
                    .iter()
                    .filter(|r| parent_id.is_some() && r.get(&child_fk) == parent_id)
                    .map(|r| shape_row(tables, &embed.table, r, &embed.columns, &embed.nested))
                    .collect(),
            )
        } else {
            // 外键缺失或为空时嵌入 null
            match row.get(foreign_key(&embed.table)).filter(|v| !v.is_null()) {
                Some(fk_value) => related
                    .iter()
                    .find(|r| r.get("id") == Some(fk_value))
                    .map(|r| shape_row(tables, &embed.table, r, &embed.columns, &embed.nested))
                    .unwrap_or(Value::Null),
                None => Value::Null,
            }
        };
        out.insert(embed.table.clone(), value);
    }

    Value::Object(out)
}

/// Ordering used by `order_by`; nulls sort last
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
