//! Read-only query gate
//!
//! A prefix and keyword heuristic that decides whether submitted SQL may run.
//! It is not a parser: statements that start with `SELECT` or `WITH` always
//! pass, and anything else passes unless it mentions a data-modifying keyword.

/// Reason reported when a statement is rejected
pub const REJECTION_REASON: &str = "only read queries allowed";

/// Prefixes that mark a statement as a read
const READ_PREFIXES: [&str; 2] = ["select", "with"];

/// Keywords that reject a statement when found anywhere in it (substring match)
const BLOCKED_KEYWORDS: [&str; 7] = [
    "drop", "delete", "truncate", "alter", "create", "insert", "update",
];

/// Outcome of classifying a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Rejected { reason: &'static str },
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Classify SQL text as allowed or rejected
///
/// Normalization (trim and lowercase) is used for comparison only; callers
/// execute the original text.
pub fn classify(sql: &str) -> Verdict {
    let normalized = sql.trim().to_lowercase();

    if READ_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
    {
        return Verdict::Allowed;
    }

    if BLOCKED_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
    {
        return Verdict::Rejected {
            reason: REJECTION_REASON,
        };
    }

    Verdict::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_and_with_are_allowed() {
        assert!(classify("SELECT 1 AS x").is_allowed());
        assert!(classify("  select * from users").is_allowed());
        assert!(classify("\n\tWITH t AS (SELECT 1) SELECT * FROM t").is_allowed());
    }

    #[test]
    fn read_prefix_wins_over_later_keywords() {
        assert!(classify("SELECT * FROM t; -- drop table x").is_allowed());
        assert!(classify("select 'delete me' as note").is_allowed());
        assert!(classify("WITH created AS (SELECT 1) SELECT * FROM created").is_allowed());
    }

    #[test]
    fn modifying_statements_are_rejected() {
        for sql in [
            "  UPDATE users SET x=1",
            "DROP TABLE foo",
            "delete from users",
            "TRUNCATE logs",
            "alter table t add column c int",
            "CREATE TABLE t (id int)",
            "insert into t values (1)",
        ] {
            assert_eq!(
                classify(sql),
                Verdict::Rejected {
                    reason: REJECTION_REASON
                },
                "expected rejection for {sql:?}"
            );
        }
    }

    #[test]
    fn keyword_match_is_substring_not_word() {
        // "updated_at" contains "update"
        assert!(!classify("explain analyze updated_at").is_allowed());
        assert!(!classify("show dropped").is_allowed());
    }

    #[test]
    fn other_statements_without_keywords_pass() {
        assert!(classify("explain select 1").is_allowed());
        assert!(classify("SHOW server_version").is_allowed());
        assert!(classify("").is_allowed());
    }
}
