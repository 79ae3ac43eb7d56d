// Pure text sanitization, independent of adapter and store code.
// Upstream summaries arrive as HTML fragments; the summarizer needs
// plain text before anything goes into a prompt.

use regex::Regex;

/// Strip HTML markup from a fragment: script/style blocks are removed
/// wholesale, remaining tags are dropped, common entities are decoded,
/// and whitespace runs collapse to single spaces.
pub fn strip_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let script = Regex::new(r"(?is)<script\b.*?</script>").expect("Invalid script regex");
    let style = Regex::new(r"(?is)<style\b.*?</style>").expect("Invalid style regex");
    let tag = Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex");
    let whitespace = Regex::new(r"\s+").expect("Invalid whitespace regex");

    let text = script.replace_all(input, " ");
    let text = style.replace_all(&text, " ");
    let text = tag.replace_all(&text, " ");
    let text = decode_entities(&text);
    whitespace.replace_all(&text, " ").trim().to_string()
}

/// Decode the handful of entities that actually show up in feed summaries.
fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Clean a URL for prompt inclusion: trim and drop backticks, which
/// some upstreams leak into link fields.
pub fn clean_url(url: &str) -> String {
    url.trim().replace('`', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<p>OpenAI   launches <b>new</b> model</p>\n<p>More below.</p>";
        assert_eq!(strip_html(html), "OpenAI launches new model More below.");
    }

    #[test]
    fn removes_script_and_style_blocks_entirely() {
        let html = "<style>p { color: red }</style>before<script>var x = '<b>';</script>after";
        assert_eq!(strip_html(html), "before after");
    }

    #[test]
    fn decodes_common_entities() {
        let html = "Q&amp;A: &quot;AI&quot; &lt;2024&gt; &#39;launch&#39;&nbsp;day";
        assert_eq!(strip_html(html), "Q&A: \"AI\" <2024> 'launch' day");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("no markup here"), "no markup here");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn clean_url_drops_backticks_and_padding() {
        assert_eq!(clean_url("  `https://x.test/a`  "), "https://x.test/a");
        assert_eq!(clean_url("https://x.test/b"), "https://x.test/b");
    }
}
