//! Input cleaning: markup removal and whitespace normalization.

use scraper::{Html, Node};

/// Turns raw (possibly HTML-contaminated) input into plain text.
///
/// Implementations must be total and idempotent on their own output.
pub trait TextCleaner: Send + Sync {
    fn clean(&self, raw: &str) -> String;
}

/// Whitespace normalization only. Use when input is known to be plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCleaner;

impl TextCleaner for PassthroughCleaner {
    fn clean(&self, raw: &str) -> String {
        normalize_whitespace(raw)
    }
}

/// Decodes entities, drops tags and script/style bodies, then normalizes
/// whitespace. Escaped markup (`&lt;p&gt;`) is unwrapped by repeating until
/// the text stops changing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCleaner;

/// Elements whose text content is never prose.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that separate runs of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "td", "th", "tr", "ul",
];

impl TextCleaner for HtmlCleaner {
    fn clean(&self, raw: &str) -> String {
        if !raw.contains('<') && !raw.contains('&') {
            return normalize_whitespace(raw);
        }

        // One layer of entities per pass; repeat to a fixed point.
        let mut text = normalize_whitespace(&strip_markup(raw));
        loop {
            if !text.contains('<') && !text.contains('&') {
                return text;
            }
            let next = normalize_whitespace(&strip_markup(&text));
            if next == text {
                return text;
            }
            text = next;
        }
    }
}

/// Text content of an HTML fragment, entities decoded.
fn strip_markup(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let mut out = String::with_capacity(raw.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let skipped = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
                });
                if !skipped {
                    out.push_str(text);
                }
            }
            Node::Element(elem) if BLOCK_ELEMENTS.contains(&elem.name()) => out.push(' '),
            _ => {}
        }
    }
    out
}

/// Drop control characters and collapse whitespace runs to a single space.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text
        .split(|c: char| c.is_whitespace())
        .filter(|w| !w.is_empty())
    {
        let word: String = word.chars().filter(|c| !c.is_control()).collect();
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_only_normalizes_whitespace() {
        assert_eq!(
            HtmlCleaner.clean("  Hello,\n\n  world!\t Bye. "),
            "Hello, world! Bye."
        );
    }

    #[test]
    fn strips_tags_and_decodes_entities() {
        let raw = "<p>Fish &amp; chips</p><p>Salt &quot;and&quot; vinegar.</p>";
        assert_eq!(HtmlCleaner.clean(raw), "Fish & chips Salt \"and\" vinegar.");
    }

    #[test]
    fn block_elements_keep_sentences_apart() {
        let raw = "<div>First one.</div><div>Second one.</div>";
        assert_eq!(HtmlCleaner.clean(raw), "First one. Second one.");
    }

    #[test]
    fn inline_elements_do_not_split_words() {
        assert_eq!(HtmlCleaner.clean("<b>bold</b>face and <i>it</i>alic"), "boldface and italic");
    }

    #[test]
    fn script_and_style_bodies_are_dropped() {
        let raw = "<style>p { color: red; }</style><p>Visible.</p><script>alert('x')</script>";
        assert_eq!(HtmlCleaner.clean(raw), "Visible.");
    }

    #[test]
    fn escaped_markup_is_unwrapped() {
        let raw = "&lt;p&gt;Escaped &lt;b&gt;content&lt;/b&gt;.&lt;/p&gt;";
        assert_eq!(HtmlCleaner.clean(raw), "Escaped content.");
    }

    #[test]
    fn comparison_operators_survive() {
        assert_eq!(HtmlCleaner.clean("If a &lt; b then stop."), "If a < b then stop.");
    }

    #[test]
    fn control_characters_are_removed() {
        assert_eq!(PassthroughCleaner.clean("a\u{0}b\u{7}c d"), "abc d");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let raw = "<h1>Title</h1>\n<p>Body &amp; more.</p>";
        let once = HtmlCleaner.clean(raw);
        assert_eq!(HtmlCleaner.clean(&once), once);
    }

    #[test]
    fn nested_entities_are_decoded_to_a_fixed_point() {
        let once = HtmlCleaner.clean("Fish &amp;amp; chips.");
        assert_eq!(once, "Fish & chips.");
        assert_eq!(HtmlCleaner.clean(&once), once);

        let raw = "&amp;lt;b&amp;gt;Bold&amp;lt;/b&amp;gt; move.";
        let once = HtmlCleaner.clean(raw);
        assert_eq!(once, "Bold move.");
        assert_eq!(HtmlCleaner.clean(&once), once);
    }

    #[test]
    fn literal_ampersands_and_angles_are_stable() {
        let once = HtmlCleaner.clean("AT&T says 1 < 2 & 3 > 2.");
        assert_eq!(once, "AT&T says 1 < 2 & 3 > 2.");
        assert_eq!(HtmlCleaner.clean(&once), once);
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(HtmlCleaner.clean(" \n\t "), "");
        assert_eq!(HtmlCleaner.clean("<p>   </p>"), "");
    }
}
