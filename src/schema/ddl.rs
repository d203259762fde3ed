//! DDL parsing for schema snapshots.
//!
//! Parses CREATE TABLE, ALTER TABLE and CREATE INDEX statements to extract:
//! - Column definitions with their declared types and nullability
//! - Primary key, unique and foreign key constraints
//! - One relation per foreign key constraint

use super::{Column, Relation, Table};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Regex to extract the optional schema qualifier and name from CREATE TABLE
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), table (unquoted), schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CREATE\s+(?:(?:GLOBAL\s+|LOCAL\s+)?TEMP(?:ORARY)?\s+|UNLOGGED\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[`"]?(\w+)[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s(.]+)[\]`"]?"#)
        .unwrap()
});

/// Regex to extract the optional schema qualifier and name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?:[\[`"]?(\w+)[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s.]+)[\]`"]?"#)
        .unwrap()
});

/// Regex for the leading column name of a column definition
static COLUMN_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^\s*(?:[\[`"]([^\]`"]+)[\]`"]|([^\s,\[`"]+))\s+(.+)$"#).unwrap()
});

/// Regex for the first constraint keyword after a column type
static TYPE_TERMINATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s(?:NOT\s+NULL|NULL|PRIMARY\s+KEY|UNIQUE|REFERENCES|DEFAULT|CONSTRAINT|CHECK|AUTO_INCREMENT|AUTOINCREMENT|GENERATED|COLLATE|COMMENT|IDENTITY)\b")
        .unwrap()
});

/// Regex for PRIMARY KEY table constraint
/// Supports MSSQL CLUSTERED/NONCLUSTERED keywords: PRIMARY KEY CLUSTERED ([col])
static PRIMARY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]+)\)").unwrap()
});

/// Regex for inline PRIMARY KEY on column
static INLINE_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// Regex for inline UNIQUE on column
static INLINE_UNIQUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bUNIQUE\b").unwrap());

/// Regex for UNIQUE table constraint: UNIQUE (a, b), UNIQUE KEY name (a), UNIQUE INDEX name (a)
static UNIQUE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bUNIQUE\s*(?:(?:KEY|INDEX)\s+)?(?:[\[`"]?\w+[\]`"]?\s*)?\(([^)]+)\)"#)
        .unwrap()
});

/// Regex for FOREIGN KEY constraint with optional constraint name
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:CONSTRAINT\s+[\[`"]?([^\[\]`"\s]+)[\]`"]?\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:[\[`"]?\w+[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s(.]+)[\]`"]?\s*(?:\(([^)]+)\))?"#,
    )
    .unwrap()
});

/// Regex for inline REFERENCES on a column definition
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bREFERENCES\s+(?:[\[`"]?\w+[\]`"]?\s*\.\s*)?[\[`"]?([^\[\]`"\s(.]+)[\]`"]?\s*(?:\(([^)]+)\))?"#)
        .unwrap()
});

/// Table-level constraint keywords at the start of a body part.
/// A word boundary keeps columns such as `constraint_name` or `check_date` out.
static TABLE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:PRIMARY\s+KEY|FOREIGN\s+KEY|CONSTRAINT\b|UNIQUE\s*(?:KEY\b|INDEX\b|\()|(?:FULLTEXT|SPATIAL)\s+(?:KEY|INDEX)\b|CHECK\s*\(|EXCLUDE\s+(?:USING\b|\())")
        .unwrap()
});

/// MySQL `KEY name (cols)` / `INDEX name (cols)`. The list starts with an identifier,
/// unlike the numeric arguments of a column typed `key VARCHAR(10)`.
static NAMED_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(?:KEY|INDEX)\s*(?:[\[`"]?\w+[\]`"]?\s*)?\(\s*[\[`"]?[A-Za-z_]"#).unwrap()
});

/// Regex to detect NOT NULL constraint
static NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());

/// Regex for CREATE INDEX statement
/// Matches: CREATE [UNIQUE] [CLUSTERED|NONCLUSTERED] INDEX [CONCURRENTLY] [IF NOT EXISTS] idx_name ON [ONLY] table [USING method] (columns)
static CREATE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*CREATE\s+(UNIQUE\s+)?(?:CLUSTERED\s+|NONCLUSTERED\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[`"]?\w+[\]`"]?\s+)?ON\s+(?:ONLY\s+)?(?:[\[`"]?(\w+)[\]`"]?\s*\.\s*)?[\[`"]?(\w+)[\]`"]?\s*(?:USING\s+\w+\s*)?\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Foreign key found in a statement, before it is attached to a table
#[derive(Debug, Clone, PartialEq, Eq)]
struct ForeignKeyDef {
    columns: Vec<String>,
    referenced_table: String,
    referenced_columns: Vec<String>,
}

/// Relation whose referenced column is resolved once every table is known
#[derive(Debug)]
struct PendingRelation {
    table: usize,
    column: String,
    referenced_table: String,
    referenced_column: Option<String>,
}

/// Builder for constructing a table snapshot from DDL statements
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: Vec<Table>,
    index: AHashMap<String, usize>,
    relations: Vec<PendingRelation>,
    schema: Option<String>,
}

impl SchemaBuilder {
    /// Create a new schema builder accepting tables from every schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep schema-qualified tables that belong to `schema`
    pub fn with_schema(mut self, schema: Option<&str>) -> Self {
        self.schema = schema.map(str::to_string);
        self
    }

    /// Parse every statement of a SQL script
    pub fn parse_script(&mut self, sql: &str) {
        for stmt in split_statements(sql) {
            self.parse_statement(&stmt);
        }
    }

    /// Dispatch a single statement by its leading keywords
    pub fn parse_statement(&mut self, stmt: &str) {
        let upper = stmt.trim_start().to_uppercase();
        let handled = if upper.starts_with("CREATE") && CREATE_TABLE_NAME_RE.is_match(stmt) {
            self.parse_create_table(stmt).is_some()
        } else if upper.starts_with("ALTER TABLE") {
            self.parse_alter_table(stmt).is_some()
        } else if upper.starts_with("CREATE") && upper.contains(" INDEX ") {
            self.parse_create_index(stmt).is_some()
        } else {
            false
        };

        if !handled {
            debug!(statement = %preview(stmt), "skipping statement");
        }
    }

    /// Parse a CREATE TABLE statement and add it to the snapshot
    pub fn parse_create_table(&mut self, stmt: &str) -> Option<usize> {
        let caps = CREATE_TABLE_NAME_RE.captures(stmt)?;
        let qualifier = caps.get(1).map(|m| m.as_str());
        let table_name = caps.get(2)?.as_str().to_string();

        if !self.accepts(qualifier) {
            debug!(table = %table_name, schema = ?qualifier, "table outside requested schema");
            return None;
        }

        // Check if table already exists
        if let Some(&idx) = self.index.get(&table_name.to_lowercase()) {
            return Some(idx);
        }

        let body = extract_table_body(stmt)?;
        let idx = self.tables.len();
        self.tables.push(Table::new(table_name.clone()));
        self.index.insert(table_name.to_lowercase(), idx);

        self.parse_table_body(idx, &body);
        Some(idx)
    }

    /// Parse an ALTER TABLE statement and update an existing table
    pub fn parse_alter_table(&mut self, stmt: &str) -> Option<usize> {
        let caps = ALTER_TABLE_NAME_RE.captures(stmt)?;
        if !self.accepts(caps.get(1).map(|m| m.as_str())) {
            return None;
        }
        let idx = self.table_index(caps.get(2)?.as_str())?;

        if let Some(pk_cols) = parse_primary_key_constraint(stmt) {
            self.mark_primary_key(idx, &pk_cols);
        }
        for fk in parse_foreign_keys(stmt) {
            self.add_foreign_key(idx, fk);
        }
        for cols in parse_unique_constraints(stmt) {
            self.mark_unique(idx, &cols);
        }

        Some(idx)
    }

    /// Parse a CREATE INDEX statement; only unique indexes change the snapshot
    pub fn parse_create_index(&mut self, stmt: &str) -> Option<usize> {
        let caps = CREATE_INDEX_RE.captures(stmt)?;

        let is_unique = caps.get(1).is_some();
        if !self.accepts(caps.get(2).map(|m| m.as_str())) {
            return None;
        }
        let idx = self.table_index(caps.get(3)?.as_str())?;
        let columns = parse_column_list(caps.get(4)?.as_str());

        if is_unique {
            self.mark_unique(idx, &columns);
        }

        Some(idx)
    }

    /// Finalize the snapshot, resolving relations that omit the referenced column.
    /// Names resolved case-insensitively are rewritten to their declared spelling.
    pub fn build(mut self) -> Vec<Table> {
        for pending in std::mem::take(&mut self.relations) {
            let target = self.table_index(&pending.referenced_table);

            let referenced_column = pending
                .referenced_column
                .or_else(|| self.primary_key_of(&pending.referenced_table))
                .unwrap_or_else(|| "id".to_string());
            let (referenced_table, referenced_column) = match target {
                Some(idx) => {
                    let declared = &self.tables[idx];
                    let column = declared
                        .get_column(&referenced_column)
                        .map(|c| c.name.clone())
                        .unwrap_or(referenced_column);
                    (declared.name.clone(), column)
                }
                None => {
                    debug!(
                        table = %self.tables[pending.table].name,
                        references = %pending.referenced_table,
                        "relation target not declared in script"
                    );
                    (pending.referenced_table, referenced_column)
                }
            };

            let table = &mut self.tables[pending.table];
            let column = table
                .get_column(&pending.column)
                .map(|c| c.name.clone())
                .unwrap_or(pending.column);
            let relation = Relation::new(
                table.name.clone(),
                column,
                referenced_table,
                referenced_column,
            );
            table.relations.push(relation);
        }

        self.tables
    }

    fn accepts(&self, qualifier: Option<&str>) -> bool {
        match (&self.schema, qualifier) {
            (Some(wanted), Some(found)) => wanted.eq_ignore_ascii_case(found),
            _ => true,
        }
    }

    fn table_index(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    fn primary_key_of(&self, table: &str) -> Option<String> {
        let idx = self.table_index(table)?;
        self.tables[idx]
            .columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name.clone())
    }

    /// Parse the body of a CREATE TABLE to extract columns and constraints
    fn parse_table_body(&mut self, idx: usize, body: &str) {
        for part in split_table_body(body) {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }

            if is_table_constraint(trimmed) {
                if let Some(pk_cols) = parse_primary_key_constraint(trimmed) {
                    self.mark_primary_key(idx, &pk_cols);
                }
                for fk in parse_foreign_keys(trimmed) {
                    self.add_foreign_key(idx, fk);
                }
                for cols in parse_unique_constraints(trimmed) {
                    self.mark_unique(idx, &cols);
                }
            } else if let Some(column) = parse_column_def(trimmed) {
                let name = column.name.clone();
                self.tables[idx].columns.push(column);

                if let Some(caps) = INLINE_REFERENCES_RE.captures(trimmed) {
                    let referenced_table = caps[1].to_string();
                    let referenced_column = caps
                        .get(2)
                        .and_then(|m| parse_column_list(m.as_str()).into_iter().next());
                    self.mark_foreign_key(idx, std::slice::from_ref(&name));
                    self.relations.push(PendingRelation {
                        table: idx,
                        column: name,
                        referenced_table,
                        referenced_column,
                    });
                }
            }
        }
    }

    fn mark_primary_key(&mut self, idx: usize, columns: &[String]) {
        let table = &mut self.tables[idx];
        for name in columns {
            if let Some(col) = table.get_column_mut(name) {
                col.is_primary_key = true;
                col.is_nullable = false;
            }
        }
    }

    fn mark_foreign_key(&mut self, idx: usize, columns: &[String]) {
        let table = &mut self.tables[idx];
        for name in columns {
            if let Some(col) = table.get_column_mut(name) {
                col.is_foreign_key = true;
            }
        }
    }

    fn mark_unique(&mut self, idx: usize, columns: &[String]) {
        let table = &mut self.tables[idx];
        for name in columns {
            if let Some(col) = table.get_column_mut(name) {
                col.is_unique = true;
            }
        }
    }

    fn add_foreign_key(&mut self, idx: usize, fk: ForeignKeyDef) {
        self.mark_foreign_key(idx, &fk.columns);
        // One relation per constraint: first constrained column to first referenced column
        if let Some(column) = fk.columns.into_iter().next() {
            self.relations.push(PendingRelation {
                table: idx,
                column,
                referenced_table: fk.referenced_table,
                referenced_column: fk.referenced_columns.into_iter().next(),
            });
        }
    }
}

/// Build a snapshot from a SQL script in one call
pub fn parse_ddl(sql: &str, schema: Option<&str>) -> Vec<Table> {
    let mut builder = SchemaBuilder::new().with_schema(schema);
    builder.parse_script(sql);
    builder.build()
}

fn is_table_constraint(part: &str) -> bool {
    TABLE_CONSTRAINT_RE.is_match(part) || NAMED_INDEX_RE.is_match(part)
}

/// Extract the body of a CREATE TABLE statement (between first ( and matching ))
fn extract_table_body(stmt: &str) -> Option<String> {
    let bytes = stmt.as_bytes();
    let mut depth = 0;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if b == b'\\' && in_string {
            escape_next = true;
            continue;
        }

        if b == b'\'' {
            in_string = !in_string;
            continue;
        }

        if in_string {
            continue;
        }

        if b == b'(' {
            if depth == 0 {
                start = Some(i + 1);
            }
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(stmt[s..i].to_string());
                }
            }
        }
    }

    None
}

/// Split a SQL script into statements on `;`, skipping quoted text and comments
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;
    let mut in_dollar = false;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == '\\' && q == '\'' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if in_dollar {
            current.push(ch);
            if ch == '$' && chars.peek() == Some(&'$') {
                current.push('$');
                chars.next();
                in_dollar = false;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                current.push(ch);
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                current.push_str("$$");
                in_dollar = true;
            }
            '-' if chars.peek() == Some(&'-') => {
                // Line comment
                for c in chars.by_ref() {
                    if c == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                current.push(' ');
            }
            ';' => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}

/// Split table body by commas, respecting nested parentheses
pub fn split_table_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in body.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '\'' {
            in_string = !in_string;
            current.push(ch);
            continue;
        }

        if in_string {
            current.push(ch);
            continue;
        }

        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse a column definition; the type is kept as written
fn parse_column_def(def: &str) -> Option<Column> {
    let caps = COLUMN_NAME_RE.captures(def)?;
    let name = caps.get(1).or_else(|| caps.get(2))?.as_str().to_string();
    let rest = caps.get(3)?.as_str();

    let padded = format!(" {}", rest);
    let type_end = TYPE_TERMINATOR_RE
        .find(&padded)
        .map(|m| m.start())
        .unwrap_or(padded.len());
    let data_type = padded[..type_end].trim();
    if data_type.is_empty() {
        return None;
    }

    let mut column = Column::new(name, data_type);
    column.is_nullable = !NOT_NULL_RE.is_match(rest);
    if INLINE_PRIMARY_KEY_RE.is_match(rest) {
        column.is_primary_key = true;
        column.is_nullable = false;
    }
    if INLINE_UNIQUE_RE.is_match(rest) {
        column.is_unique = true;
    }

    Some(column)
}

/// Parse PRIMARY KEY constraint, returns column names
fn parse_primary_key_constraint(constraint: &str) -> Option<Vec<String>> {
    let caps = PRIMARY_KEY_RE.captures(constraint)?;
    let cols_str = caps.get(1)?.as_str();
    Some(parse_column_list(cols_str))
}

/// Parse UNIQUE constraints, returns one column list per constraint
fn parse_unique_constraints(stmt: &str) -> Vec<Vec<String>> {
    UNIQUE_CONSTRAINT_RE
        .captures_iter(stmt)
        .filter_map(|caps| caps.get(1))
        .map(|m| parse_column_list(m.as_str()))
        .collect()
}

/// Parse FOREIGN KEY constraints from a statement
fn parse_foreign_keys(stmt: &str) -> Vec<ForeignKeyDef> {
    let mut fks = Vec::new();

    for caps in FOREIGN_KEY_RE.captures_iter(stmt) {
        let columns = caps
            .get(2)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();
        let referenced_table = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let referenced_columns = caps
            .get(4)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();

        if !columns.is_empty() && !referenced_table.is_empty() {
            fks.push(ForeignKeyDef {
                columns,
                referenced_table,
                referenced_columns,
            });
        }
    }

    fks
}

/// Parse a comma-separated column list, stripping quotes (backticks, double quotes, brackets)
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| {
            c.trim()
                .trim_matches('`')
                .trim_matches('"')
                .trim_matches('[')
                .trim_matches(']')
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

fn preview(stmt: &str) -> String {
    let flat: String = stmt.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 60 {
        format!("{}...", flat.chars().take(60).collect::<String>())
    } else {
        flat
    }
}
