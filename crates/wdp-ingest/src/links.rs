//! External link extraction from raw wiki markup
//!
//! Wiki markup embeds external links as `[http://url description]`;
//! the opening marker also matches `[https://...]`. The scan is a plain
//! substring walk over the raw text, no markup parsing.

use crate::document::Link;

/// Opening marker of an external link candidate
const LINK_START: &str = "[http";
/// Terminator of an external link candidate
const LINK_END: char = ']';

/// Extract all external links from raw page text, in order of appearance
///
/// Candidates that yield no URL fragment are skipped; a candidate with
/// no description yields an empty one.
pub fn extract_links(page_text: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut rest = page_text;

    while let Some(start) = rest.find(LINK_START) {
        let after_marker = &rest[start + LINK_START.len()..];
        let Some(end) = after_marker.find(LINK_END) else {
            break;
        };
        if let Some(link) = parse_candidate(&after_marker[..end]) {
            links.push(link);
        }
        rest = &after_marker[end + 1..];
    }

    links
}

/// Build one link from the text between the markers
///
/// The interior splits on the first space: the first fragment gets the
/// stripped `http` prefix restored, the remainder (if any) is the
/// description.
fn parse_candidate(interior: &str) -> Option<Link> {
    let trimmed = interior.trim_start();
    if trimmed.is_empty() {
        return None;
    }

    let (url_fragment, description) = match trimmed.split_once(' ') {
        Some((first, rest)) => (first, rest),
        None => (trimmed, ""),
    };

    Some(Link {
        url: format!("http{}", url_fragment),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_with_description() {
        let links = extract_links("see [http://example.com a description] for details");
        assert_eq!(
            links,
            vec![Link {
                url: "http://example.com".to_string(),
                description: "a description".to_string(),
            }]
        );
    }

    #[test]
    fn test_bare_link_has_empty_description() {
        let links = extract_links("see [http://example.com]");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://example.com");
        assert_eq!(links[0].description, "");
    }

    #[test]
    fn test_https_links_are_matched() {
        let links = extract_links("[https://secure.example.org tls]");
        assert_eq!(links[0].url, "https://secure.example.org");
        assert_eq!(links[0].description, "tls");
    }

    #[test]
    fn test_multiple_links_in_order() {
        let links = extract_links(
            "[http://a.example first] middle [http://b.example second]",
        );
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "http://a.example");
        assert_eq!(links[1].url, "http://b.example");
    }

    #[test]
    fn test_empty_candidate_is_skipped() {
        let links = extract_links("broken [http] then [http://ok.example fine]");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://ok.example");
    }

    #[test]
    fn test_unterminated_candidate_stops_scan() {
        let links = extract_links("[http://ok.example done] trailing [http://never");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_no_links() {
        assert!(extract_links("plain text with no markup").is_empty());
    }
}
