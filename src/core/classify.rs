//! Mutation classification heuristics.
//!
//! A mutation is `INTENT_EVOLUTION` when the written content introduces
//! structure that changes the program's public shape: an exported top-level
//! symbol, a class/interface/type declaration, an HTTP route registration,
//! or a database migration statement. Everything else is `AST_REFACTOR`.
//!
//! These are line-anchored regex heuristics over the post-write content,
//! not an AST pass.

use crate::core::ledger::MutationClass;
use regex::Regex;
use std::sync::LazyLock;

/// Marker patterns that promote a mutation to `INTENT_EVOLUTION`.
static EVOLUTION_MARKERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // Exported top-level symbol (ES modules)
        (
            Regex::new(
                r"(?m)^\s*export\s+(default\s+)?(abstract\s+)?(async\s+)?(const|let|var|function|class|interface|type|enum)\b",
            )
            .unwrap(),
            "exported_symbol",
        ),
        // Exported symbol (CommonJS)
        (
            Regex::new(r"(?m)^\s*(module\.exports|exports\.[A-Za-z_$][\w$]*)\s*=").unwrap(),
            "exported_symbol",
        ),
        // Class declaration
        (
            Regex::new(r"(?m)^\s*(export\s+)?(default\s+)?(abstract\s+)?class\s+[A-Za-z_$]").unwrap(),
            "type_declaration",
        ),
        // Interface / enum declaration
        (
            Regex::new(r"(?m)^\s*(export\s+)?(interface|enum)\s+[A-Za-z_$]").unwrap(),
            "type_declaration",
        ),
        // Type alias
        (
            Regex::new(r"(?m)^\s*(export\s+)?type\s+[A-Za-z_$][\w$]*(\s*<[^=]*>)?\s*=").unwrap(),
            "type_declaration",
        ),
        // HTTP route registration (app.get(...), router.post(...), ...)
        (
            Regex::new(r"\b(app|router|server)\s*\.\s*(get|post|put|patch|delete)\s*\(").unwrap(),
            "route_registration",
        ),
        // HTTP route decorators (@Get(...), @Post(...), ...)
        (
            Regex::new(r"@(Get|Post|Put|Patch|Delete)\s*\(").unwrap(),
            "route_registration",
        ),
        // SQL migration DDL
        (
            Regex::new(r"(?i)\b(create|alter|drop)\s+table\b").unwrap(),
            "migration_keyword",
        ),
        // Migration builder calls (knex/sequelize style)
        (
            Regex::new(r"\b(createTable|addColumn|dropColumn)\s*\(").unwrap(),
            "migration_keyword",
        ),
    ]
});

/// Name of the first marker the content matches, if any.
pub fn evolution_marker(content: &str) -> Option<&'static str> {
    EVOLUTION_MARKERS
        .iter()
        .find(|(pattern, _)| pattern.is_match(content))
        .map(|(_, marker)| *marker)
}

pub fn classify(content: &str) -> MutationClass {
    if evolution_marker(content).is_some() {
        MutationClass::IntentEvolution
    } else {
        MutationClass::AstRefactor
    }
}
