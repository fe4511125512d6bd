//! Free-text organism name resolution.
//!
//! Names in the matrix usually read "common name\nLatin binomial", while
//! users type either part. A candidate matches when the normalized query is
//! contained in it, or when its first token is contained in the query. The
//! first matching candidate wins; there is no scoring.

use super::model::single_line;

/// Line breaks become single spaces, then lowercase.
pub fn normalize(name: &str) -> String {
    single_line(name).to_lowercase()
}

/// Whether `candidate` matches an already normalized query.
pub fn matches(normalized_query: &str, candidate: &str) -> bool {
    let candidate = normalize(candidate);
    if candidate.contains(normalized_query) {
        return true;
    }
    candidate
        .split_whitespace()
        .next()
        .is_some_and(|first| normalized_query.contains(first))
}

/// Position of the first candidate matching `query`, in candidate order.
///
/// An empty query is contained in every candidate; callers reject blank
/// input before resolving.
pub fn resolve<'a, I>(query: &str, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize(query);
    candidates
        .into_iter()
        .position(|candidate| matches(&query, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 3] = [
        "大肠埃希菌\nEscherichia coli",
        "肺炎克雷伯菌\nKlebsiella pneumoniae",
        "金黄色葡萄球菌(MSSA)\nStaphylococcus aureus",
    ];

    #[test]
    fn normalize_joins_lines_and_lowercases() {
        assert_eq!(normalize("Foo\nBar\r\nBAZ"), "foo bar baz");
    }

    #[test]
    fn substring_of_latin_name_matches() {
        assert_eq!(resolve("coli", NAMES), Some(0));
        assert_eq!(resolve("KLEBSIELLA", NAMES), Some(1));
        assert_eq!(resolve("staphylococcus aureus", NAMES), Some(2));
    }

    #[test]
    fn common_name_token_inside_query_matches() {
        // First token "肺炎克雷伯菌" appears in the longer query.
        assert_eq!(resolve("产ESBL肺炎克雷伯菌", NAMES), Some(1));
    }

    #[test]
    fn query_spanning_lines_matches() {
        assert_eq!(resolve("大肠埃希菌\nEscherichia coli", NAMES), Some(0));
    }

    #[test]
    fn first_match_wins() {
        let names = ["Streptococcus pyogenes", "Streptococcus pneumoniae"];
        assert_eq!(resolve("streptococcus", names), Some(0));
        assert_eq!(resolve("pneumoniae", names), Some(1));
    }

    #[test]
    fn blank_candidate_never_matches_by_token() {
        assert!(!matches("coli", "   "));
        assert_eq!(resolve("coli", ["", "E. coli"]), Some(1));
    }

    #[test]
    fn no_match() {
        assert_eq!(resolve("Candida", NAMES), None);
    }
}
