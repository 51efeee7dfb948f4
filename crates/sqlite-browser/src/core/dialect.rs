//! Best-effort textual normalization of MySQL-style dumps into a script the
//! embedded engine accepts. Each rule is a total text-to-text function; the
//! pipeline applies them in a fixed order and makes no semantic guarantees
//! beyond a single pass.

use std::sync::LazyLock;

use regex::Regex;

static VERSION_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*!.*?\*/").expect("version comment regex"));
static LOCK_TABLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^LOCK TABLES.*;").expect("lock tables regex"));
static UNLOCK_TABLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^UNLOCK TABLES;").expect("unlock tables regex"));
static ENGINE_OPTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ENGINE=[^;]*;").expect("engine options regex"));
static AUTO_INCREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAUTO_INCREMENT\b").expect("auto_increment regex"));
static ON_UPDATE_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ON UPDATE CURRENT_TIMESTAMP").expect("on update regex"));
static BARE_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bint\b").expect("int regex"));
static UNSIGNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunsigned\b").expect("unsigned regex"));
static UNIQUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)UNIQUE KEY\s+[`"']?\w+[`"']?\s*\("#).expect("unique key regex")
});
static REPEATED_SEMICOLONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";(\s*;)+").expect("semicolon regex"));
static LEADING_SEMICOLONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*;+").expect("leading semicolon regex"));

/// 1. Strips version-guarded comments: `/*!40101 ... */`.
pub fn strip_version_comments(text: &str) -> String {
    VERSION_COMMENT.replace_all(text, "").into_owned()
}

/// 2. Strips `LOCK TABLES ...;` and `UNLOCK TABLES;` lines.
pub fn strip_lock_statements(text: &str) -> String {
    let text = LOCK_TABLES.replace_all(text, "");
    UNLOCK_TABLES.replace_all(&text, "").into_owned()
}

/// 3. Drops trailing `ENGINE=...` table options, keeping the terminator.
pub fn strip_engine_options(text: &str) -> String {
    ENGINE_OPTIONS.replace_all(text, ";").into_owned()
}

/// 4. Drops the `AUTO_INCREMENT` keyword.
pub fn strip_auto_increment(text: &str) -> String {
    AUTO_INCREMENT.replace_all(text, "").into_owned()
}

/// 5. Drops `ON UPDATE CURRENT_TIMESTAMP` clauses.
pub fn strip_on_update_timestamp(text: &str) -> String {
    ON_UPDATE_TIMESTAMP.replace_all(text, "").into_owned()
}

/// 6. Rewrites the standalone word `int` to `INTEGER`.
pub fn widen_int_to_integer(text: &str) -> String {
    BARE_INT.replace_all(text, "INTEGER").into_owned()
}

/// 7. Drops the standalone word `unsigned`.
pub fn strip_unsigned(text: &str) -> String {
    UNSIGNED.replace_all(text, "").into_owned()
}

/// 8. Rewrites `UNIQUE KEY <name> (` into `UNIQUE (`.
pub fn rewrite_unique_key(text: &str) -> String {
    UNIQUE_KEY.replace_all(text, "UNIQUE (").into_owned()
}

/// 9. Unescapes `\'` into `''` and `\"` into `"`.
pub fn unescape_quotes(text: &str) -> String {
    text.replace("\\'", "''").replace("\\\"", "\"")
}

/// 10. Collapses runs of semicolons and drops any leading stray semicolon.
pub fn collapse_empty_statements(text: &str) -> String {
    let text = REPEATED_SEMICOLONS.replace_all(text, ";");
    LEADING_SEMICOLONS.replace(&text, "").into_owned()
}

/// Applies all ten rules, in order, to a foreign dump text.
pub fn convert(dump: &str) -> String {
    let rules: &[fn(&str) -> String] = &[
        strip_version_comments,
        strip_lock_statements,
        strip_engine_options,
        strip_auto_increment,
        strip_on_update_timestamp,
        widen_int_to_integer,
        strip_unsigned,
        rewrite_unique_key,
        unescape_quotes,
        collapse_empty_statements,
    ];

    let mut text = dump.to_string();
    for rule in rules {
        text = rule(&text);
    }
    text
}
