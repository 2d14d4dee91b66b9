//! SQL language settings per dialect
//!
//! Each dialect contributes keyword, boolean and type sets plus the
//! character classes the lexer uses for operators, punctuation and
//! placeholder variables. The table is built once and shared read-only.

use crate::error::{QueryLensError, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

/// Dialect used when none is given or the requested one is unknown
pub const DEFAULT_DIALECT: &str = "hive";

/// Lexer configuration for one SQL dialect
#[derive(Debug)]
pub struct LanguageSetting {
    pub name: &'static str,
    pub keywords: HashSet<&'static str>,
    pub bools: HashSet<&'static str>,
    pub types: HashSet<&'static str>,
    /// Anchored pattern for a run of operator characters
    pub operator_chars: Regex,
    /// Anchored pattern for a single punctuation character
    pub punctuation_chars: Regex,
    /// Anchored pattern for templating placeholders such as `${var}`
    pub placeholder_variable: Option<Regex>,
}

impl LanguageSetting {
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word.to_lowercase().as_str())
    }

    pub fn is_bool(&self, word: &str) -> bool {
        self.bools.contains(word.to_lowercase().as_str())
    }

    pub fn is_type(&self, word: &str) -> bool {
        self.types.contains(word.to_lowercase().as_str())
    }
}

const SQL_KEYWORDS: &[&str] = &[
    "add", "after", "all", "alter", "analyze", "and", "any", "as", "asc", "between", "by",
    "cascade", "case", "cast", "column", "columns", "comment", "commit", "create", "cross",
    "current", "database", "databases", "default", "delete", "desc", "describe", "distinct",
    "drop", "else", "end", "escape", "except", "exists", "explain", "extended",
    "fetch", "first", "following", "for", "foreign", "formatted", "from", "full", "function",
    "grant", "group", "having", "if", "ignore", "in", "index", "inner", "insert", "intersect",
    "interval", "into", "is", "join", "key", "last", "lateral", "left", "like", "limit",
    "msck", "natural", "not", "nulls", "of", "offset", "on", "or", "order", "outer", "over",
    "overwrite", "partition", "partitions", "preceding", "primary", "range", "references",
    "rename", "repair", "replace", "revoke", "right", "rollback", "row", "rows", "schema",
    "schemas", "select", "set", "show", "table", "tables", "then", "to", "truncate",
    "unbounded", "union", "update", "use", "using", "values", "view", "when", "where",
    "window", "with",
];

const HIVE_KEYWORDS: &[&str] = &[
    "bucket", "buckets", "clustered", "cluster", "delimited", "directory", "distribute",
    "external", "fields", "inpath", "lines", "load", "local", "location", "macro", "map",
    "reduce", "rlike", "serde", "serdeproperties", "sort", "sorted", "stored", "tablesample",
    "tblproperties", "temporary", "terminated", "transform", "regexp", "textfile",
    "sequencefile", "rcfile", "orc", "parquet", "avro", "inputformat", "outputformat",
];

const PRESTO_KEYWORDS: &[&str] = &[
    "catalogs", "deallocate", "execute", "functions", "grants", "ilike", "cube", "rollup",
    "grouping", "sets", "prepare", "recursive", "session", "stats", "system", "unnest",
    "tablesample", "ordinality", "zone", "at",
];

const MYSQL_KEYWORDS: &[&str] = &[
    "auto_increment", "charset", "collate", "duplicate", "engine", "ignore", "procedure",
    "regexp", "rlike", "straight_join", "unsigned", "zerofill", "status", "variables",
];

const POSTGRESQL_KEYWORDS: &[&str] = &[
    "conflict", "do", "ilike", "materialized", "nothing", "only", "recursive", "returning",
    "serial", "similar", "vacuum", "verbose",
];

const SQLITE_KEYWORDS: &[&str] = &[
    "autoincrement", "attach", "detach", "glob", "indexed", "pragma", "rowid", "vacuum",
    "without", "conflict", "abort", "fail",
];

const SQL_BOOLS: &[&str] = &["true", "false", "null"];

const SQL_TYPES: &[&str] = &[
    "bigint", "binary", "boolean", "char", "date", "decimal", "double", "float", "int",
    "integer", "numeric", "real", "smallint", "string", "timestamp", "tinyint", "varchar",
];

const HIVE_TYPES: &[&str] = &["array", "struct", "uniontype"];
const PRESTO_TYPES: &[&str] = &["array", "json", "row", "varbinary", "ipaddress", "uuid", "time"];
const MYSQL_TYPES: &[&str] = &[
    "blob", "datetime", "enum", "longtext", "mediumint", "text", "time", "year",
];
const POSTGRESQL_TYPES: &[&str] = &[
    "bytea", "jsonb", "json", "text", "uuid", "serial", "bigserial", "time",
];
const SQLITE_TYPES: &[&str] = &["blob", "text"];

fn word_set(groups: &[&[&'static str]]) -> HashSet<&'static str> {
    groups
        .iter()
        .flat_map(|group| group.iter().copied())
        .collect()
}

fn anchored(pattern: &str) -> Regex {
    Regex::new(pattern).expect("dialect patterns are static and valid")
}

struct DialectSpec {
    name: &'static str,
    keywords: &'static [&'static [&'static str]],
    types: &'static [&'static [&'static str]],
    operator_chars: &'static str,
    punctuation_chars: &'static str,
    placeholder_variable: Option<&'static str>,
}

const DIALECTS: &[DialectSpec] = &[
    DialectSpec {
        name: "hive",
        keywords: &[SQL_KEYWORDS, HIVE_KEYWORDS],
        types: &[SQL_TYPES, HIVE_TYPES],
        operator_chars: r"^[*+\-%<>!=&|^~/]+",
        punctuation_chars: r"^[.:]",
        placeholder_variable: Some(r"^\$\{[^}\s]*\}"),
    },
    DialectSpec {
        name: "sparksql",
        keywords: &[SQL_KEYWORDS, HIVE_KEYWORDS],
        types: &[SQL_TYPES, HIVE_TYPES],
        operator_chars: r"^[*+\-%<>!=&|^~/]+",
        punctuation_chars: r"^[.:]",
        placeholder_variable: Some(r"^\$\{[^}\s]*\}"),
    },
    DialectSpec {
        name: "presto",
        keywords: &[SQL_KEYWORDS, PRESTO_KEYWORDS],
        types: &[SQL_TYPES, PRESTO_TYPES],
        operator_chars: r"^[*+\-%<>!=&|^~/]+",
        punctuation_chars: r"^[.:?]",
        placeholder_variable: None,
    },
    DialectSpec {
        name: "trino",
        keywords: &[SQL_KEYWORDS, PRESTO_KEYWORDS],
        types: &[SQL_TYPES, PRESTO_TYPES],
        operator_chars: r"^[*+\-%<>!=&|^~/]+",
        punctuation_chars: r"^[.:?]",
        placeholder_variable: None,
    },
    DialectSpec {
        name: "mysql",
        keywords: &[SQL_KEYWORDS, MYSQL_KEYWORDS],
        types: &[SQL_TYPES, MYSQL_TYPES],
        operator_chars: r"^[*+\-%<>!=&|^~/:]+",
        punctuation_chars: r"^[.?@]",
        placeholder_variable: None,
    },
    DialectSpec {
        name: "postgresql",
        keywords: &[SQL_KEYWORDS, POSTGRESQL_KEYWORDS],
        types: &[SQL_TYPES, POSTGRESQL_TYPES],
        operator_chars: r"^[*+\-%<>!=&|^~/:@#?]+",
        punctuation_chars: r"^[.]",
        placeholder_variable: Some(r"^\$\d+"),
    },
    DialectSpec {
        name: "sqlite",
        keywords: &[SQL_KEYWORDS, SQLITE_KEYWORDS],
        types: &[SQL_TYPES, SQLITE_TYPES],
        operator_chars: r"^[*+\-%<>!=&|~/]+",
        punctuation_chars: r"^[.?]",
        placeholder_variable: Some(r"^[:@$][A-Za-z_]\w*"),
    },
];

fn build(spec: &DialectSpec) -> LanguageSetting {
    LanguageSetting {
        name: spec.name,
        keywords: word_set(spec.keywords),
        bools: word_set(&[SQL_BOOLS]),
        types: word_set(spec.types),
        operator_chars: anchored(spec.operator_chars),
        punctuation_chars: anchored(spec.punctuation_chars),
        placeholder_variable: spec.placeholder_variable.map(anchored),
    }
}

static LANGUAGE_SETTINGS: OnceLock<BTreeMap<&'static str, LanguageSetting>> = OnceLock::new();

fn settings() -> &'static BTreeMap<&'static str, LanguageSetting> {
    LANGUAGE_SETTINGS.get_or_init(|| DIALECTS.iter().map(|spec| (spec.name, build(spec))).collect())
}

/// Look up a dialect by name, falling back to [`DEFAULT_DIALECT`]
pub fn language_setting(dialect: &str) -> &'static LanguageSetting {
    match lookup(dialect) {
        Some(setting) => setting,
        None => {
            debug!("Unknown dialect '{}', using {}", dialect, DEFAULT_DIALECT);
            &settings()[DEFAULT_DIALECT]
        }
    }
}

/// Look up a dialect by name, rejecting unknown names
pub fn try_language_setting(dialect: &str) -> Result<&'static LanguageSetting> {
    lookup(dialect).ok_or_else(|| QueryLensError::UnknownDialect(dialect.to_string()))
}

/// Names of every registered dialect, sorted
pub fn dialect_names() -> Vec<&'static str> {
    settings().keys().copied().collect()
}

fn lookup(dialect: &str) -> Option<&'static LanguageSetting> {
    let name = dialect.trim().to_lowercase();
    // Accept editor mode names such as "text/x-hive"
    let name = name.strip_prefix("text/x-").unwrap_or(&name);
    settings().get(name)
}
