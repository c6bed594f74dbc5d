//! Text-level conversion of a directed description into an undirected one.
//!
//! The transform is pure: it returns the new text and never touches the
//! source file. Persisting the result is the caller's decision.

/// Rewrite a `digraph` description into a `strict graph` one:
/// - empty attribute blocks `" [ ]"` become statement terminators `";"`
/// - `->` becomes `--`
/// - `digraph` / `strict digraph` becomes `strict graph`
pub fn rewrite_undirected(text: &str) -> String {
    text.replace(" [ ]", ";")
        .replace("->", "--")
        .replace("strict digraph", "digraph")
        .replace("digraph", "strict graph")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_petgraph_style() {
        let input = "digraph {\n    0 [ ]\n    1 [ ]\n    0 -> 1 [ ]\n}\n";
        let expected = "strict graph {\n    0;\n    1;\n    0 -- 1;\n}\n";
        assert_eq!(rewrite_undirected(input), expected);
    }

    #[test]
    fn test_rewrite_keeps_nonempty_attrs() {
        let input = "digraph g { a -> b [label=\"x\"] }";
        assert_eq!(rewrite_undirected(input), "strict graph g { a -- b [label=\"x\"] }");
    }

    #[test]
    fn test_rewrite_strict_digraph() {
        assert_eq!(rewrite_undirected("strict digraph { }"), "strict graph { }");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_undirected("digraph { a -> b [ ] }");
        assert_eq!(rewrite_undirected(&once), once);
    }
}
