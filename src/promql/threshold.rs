use std::sync::LazyLock;

use regex::Regex;

/// Trailing `<op> <number>` clause. Operators are any run of `<>=!`, the
/// number is an unsigned ASCII decimal literal.
static TRAILING_COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([<>=!]+)\s*([0-9]+\.?[0-9]*)\s*$").expect("static regex")
});

/// Used when the expression carries no explicit comparison: any non-zero
/// value of the reduced series fires.
pub const DEFAULT_CONDITION: &str = "$B > 0";

/// An alert expression split into the query Grafana should run and the
/// comparison it should apply to the reduced value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitExpr {
    pub base_query: String,
    pub threshold: Option<Threshold>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threshold {
    pub op: String,
    /// Kept as written so that `0.90` stays `0.90` in the math expression.
    pub value: String,
}

impl SplitExpr {
    /// Math expression evaluated against the reduced stage `B`.
    pub fn condition(&self) -> String {
        match &self.threshold {
            Some(t) => format!("$B {} {}", t.op, t.value),
            None => DEFAULT_CONDITION.to_string(),
        }
    }
}

/// Flatten an expression that came out of a YAML block scalar into one line.
///
/// A leading `|` / `|-` / `|+` marker line is dropped. Multi-line input is
/// trimmed line by line and joined with single spaces, skipping blank lines
/// and stray marker lines.
pub fn normalize_expr(expr: &str) -> String {
    let body = strip_block_marker(expr.trim_start()).trim();
    if !body.contains('\n') {
        return body.to_string();
    }
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('|'))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_block_marker(expr: &str) -> &str {
    let Some(rest) = expr.strip_prefix('|') else {
        return expr;
    };
    let rest = rest.strip_prefix(['-', '+']).unwrap_or(rest);
    match rest.split_once('\n') {
        Some((marker_tail, body)) if marker_tail.trim().is_empty() => body,
        _ => expr,
    }
}

/// Split a normalized expression at its trailing comparison, if any.
///
/// This is a heuristic over the text, not a PromQL parse: a numeric literal
/// at the very end preceded by comparison characters is always taken as the
/// threshold.
pub fn extract_threshold(expr: &str) -> SplitExpr {
    match TRAILING_COMPARISON.captures(expr) {
        Some(caps) => {
            let whole = caps.get(0).map_or(expr.len(), |m| m.start());
            SplitExpr {
                base_query: expr[..whole].trim().to_string(),
                threshold: Some(Threshold {
                    op: caps[1].to_string(),
                    value: caps[2].to_string(),
                }),
            }
        }
        None => {
            tracing::debug!(expr, "no trailing comparison, defaulting to {DEFAULT_CONDITION}");
            SplitExpr {
                base_query: expr.trim().to_string(),
                threshold: None,
            }
        }
    }
}

/// [`normalize_expr`] followed by [`extract_threshold`].
pub fn split_expr(expr: &str) -> SplitExpr {
    extract_threshold(&normalize_expr(expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_less_than() {
        let s = split_expr(r#"up{job="x"} < 1"#);
        assert_eq!(s.base_query, r#"up{job="x"}"#);
        assert_eq!(s.condition(), "$B < 1");
    }

    #[test]
    fn no_comparison_defaults_to_greater_than_zero() {
        let s = split_expr(r#"absent(up{job="x"})"#);
        assert_eq!(s.base_query, r#"absent(up{job="x"})"#);
        assert!(s.threshold.is_none());
        assert_eq!(s.condition(), "$B > 0");
    }

    #[test]
    fn multiline_block_scalar() {
        let s = split_expr("|\n  up{job=\"x\"}\n  == 0\n");
        assert_eq!(s.base_query, r#"up{job="x"}"#);
        assert_eq!(s.condition(), "$B == 0");
    }

    #[test]
    fn multiline_without_marker_is_joined() {
        assert_eq!(
            normalize_expr("sum(rate(errors_total[5m]))\n  /\n  sum(rate(requests_total[5m]))\n"),
            "sum(rate(errors_total[5m])) / sum(rate(requests_total[5m]))"
        );
    }

    #[test]
    fn chomping_indicator_marker() {
        assert_eq!(normalize_expr("|-\n  a\n  > 2"), "a > 2");
    }

    #[test]
    fn marker_only_expression_is_empty() {
        let s = split_expr("|\n");
        assert_eq!(s.base_query, "");
        assert_eq!(s.condition(), "$B > 0");
    }

    #[test]
    fn non_ascii_digits_are_not_a_threshold() {
        let s = split_expr("x > \u{0665}");
        assert_eq!(s.base_query, "x > \u{0665}");
        assert!(s.threshold.is_none());
        assert_eq!(s.condition(), "$B > 0");
    }

    #[test]
    fn pipe_operator_in_single_line_is_kept() {
        assert_eq!(normalize_expr("|x"), "|x");
    }

    #[test]
    fn compound_operators_and_decimals() {
        let s = split_expr("node_load1 >= 0.85");
        assert_eq!(s.base_query, "node_load1");
        assert_eq!(
            s.threshold,
            Some(Threshold { op: ">=".to_string(), value: "0.85".to_string() })
        );

        let s = split_expr("pg_up != 1");
        assert_eq!(s.condition(), "$B != 1");
    }

    #[test]
    fn trailing_whitespace_and_no_space_before_number() {
        let s = split_expr("rate(x[5m])>5   ");
        assert_eq!(s.base_query, "rate(x[5m])");
        assert_eq!(s.condition(), "$B > 5");
    }

    #[test]
    fn threshold_literal_is_kept_verbatim() {
        assert_eq!(split_expr("x > 90.").condition(), "$B > 90.");
        assert_eq!(split_expr("x > 0.90").condition(), "$B > 0.90");
    }

    #[test]
    fn negative_threshold_is_not_recognized() {
        let s = split_expr("temperature < -5");
        assert_eq!(s.base_query, "temperature < -5");
        assert_eq!(s.condition(), "$B > 0");
    }

    #[test]
    fn comparison_in_the_middle_is_not_a_threshold() {
        let s = split_expr("count(up == 0) by (job)");
        assert_eq!(s.base_query, "count(up == 0) by (job)");
        assert!(s.threshold.is_none());
    }
}
