use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::schema::field::{quote_identifier, readable_form, FieldSpec};

/// A named record shape and the table that stores it
#[derive(Debug)]
pub struct SchemaDefinition {
    name: String,
    table: String,
    fields: Vec<FieldSpec>,
}

impl SchemaDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Externally visible form of a stored document
    pub fn readable(&self, stored: &Map<String, Value>) -> Map<String, Value> {
        readable_form(&self.fields, stored)
    }

    /// `CREATE TABLE IF NOT EXISTS` statement with a UUID primary key
    pub fn create_table_sql(&self) -> String {
        let mut columns = vec!["\"id\" UUID PRIMARY KEY".to_string()];
        columns.extend(self.fields.iter().map(FieldSpec::column_ddl));

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(&self.table),
            columns.join(", ")
        )
    }

    /// Quoted column list, primary key first, in field order
    pub fn column_list(&self) -> String {
        std::iter::once(quote_identifier("id"))
            .chain(self.fields.iter().map(|f| quote_identifier(f.column)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.column_list(), quote_identifier(&self.table))
    }

    /// Parameterized insert of every column (`$1` is the id) that hands back
    /// the row as stored
    pub fn insert_sql(&self) -> String {
        let columns = self.column_list();
        let placeholders: Vec<String> = (1..=self.fields.len() + 1).map(|i| format!("${}", i)).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quote_identifier(&self.table),
            columns,
            placeholders.join(", "),
            columns
        )
    }
}

/// Name-keyed registry of record shapes.
///
/// Built once at startup and passed by reference; defining a name that is
/// already registered returns the existing definition.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<SchemaDefinition>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape once; later calls with the same name are no-ops
    pub fn define(
        &self,
        name: &str,
        table: &str,
        fields: &[FieldSpec],
    ) -> Arc<SchemaDefinition> {
        // Fast path: try read lock
        if let Some(existing) = self.lookup(name) {
            return existing;
        }

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        schemas
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!("Registered schema '{}' (table {}, {} fields)", name, table, fields.len());
                Arc::new(SchemaDefinition {
                    name: name.to_string(),
                    table: table.to_string(),
                    fields: fields.to_vec(),
                })
            })
            .clone()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<SchemaDefinition>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
