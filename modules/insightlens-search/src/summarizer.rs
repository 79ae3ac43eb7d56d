// LLM synthesis over a search's merged record set. The completion side is
// a semi-structured mini-protocol: a fixed output template going out, a
// line-oriented section parser coming back. Every failure mode ends in a
// well-formed SummaryResult; nothing here can fail a request.

use std::sync::Arc;

use tracing::{debug, warn};

use ai_client::CompletionAgent;
use insightlens_common::{clean_url, strip_html, Insight, SummaryResult};

const DEFAULT_MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.7;

/// How many insights feed the synthesized fallback when the completion
/// call fails outright.
const FALLBACK_SOURCES: usize = 5;

const SYSTEM_PROMPT: &str = "You are InsightLens, a competitive-intelligence and trend-analysis \
analyst. You condense raw articles, posts, and transcripts into clear, evidence-driven briefs. \
Be factual, ground every claim in the provided sources, highlight what is new and why it \
matters, and follow the requested output format exactly.";

pub struct Summarizer {
    agent: Option<Arc<dyn CompletionAgent>>,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(agent: Option<Arc<dyn CompletionAgent>>) -> Self {
        Self {
            agent,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// A summarizer with no completion provider; every call short-circuits.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Synthesize a summary for `insights` gathered under `topic`.
    ///
    /// Short-circuits, in order: no provider configured, then empty input.
    /// Neither attempts a completion call. A failed completion call
    /// degrades to a best-effort summary built from the first few insights'
    /// titles and urls, with the failure reason in `text`.
    pub async fn summarize(&self, topic: &str, insights: &[Insight]) -> SummaryResult {
        let Some(agent) = &self.agent else {
            return SummaryResult::message(
                "Summarization skipped: no completion provider configured.",
            );
        };

        if insights.is_empty() {
            return SummaryResult::message("No insights to summarize.");
        }

        let prompt = build_prompt(topic, insights);
        debug!(insights = insights.len(), prompt_chars = prompt.len(), "Requesting summary");

        match agent
            .complete(SYSTEM_PROMPT, &prompt, self.max_tokens, TEMPERATURE)
            .await
        {
            Ok(response) => parse_summary(&response),
            Err(e) => {
                warn!(error = %e, "Completion call failed, synthesizing fallback summary");
                fallback_summary(insights, &e.to_string())
            }
        }
    }
}

/// One prompt carrying every insight (1-based index, title, cleaned
/// content, cleaned url) plus the output template the parser expects.
fn build_prompt(topic: &str, insights: &[Insight]) -> String {
    let mut sections = Vec::with_capacity(insights.len());
    for (i, insight) in insights.iter().enumerate() {
        sections.push(format!(
            "Article {}:\nTitle: {}\nContent: {}\nURL: {}\n",
            i + 1,
            insight.title,
            strip_html(&insight.content),
            clean_url(&insight.url),
        ));
    }

    format!(
        "Summarize the following articles related to '{topic}'.\n\
        Provide a concise, actionable summary paragraph, then exactly 3 key insights as \
        bullet points, then exactly 3 short recommendations, then the URLs of the articles \
        you used.\n\n\
        Articles:\n{}\n\
        Format your response as follows:\n\
        Summary:\n\
        [paragraph summary]\n\
        Key Insights:\n\
        - [bullet point 1]\n\
        - [bullet point 2]\n\
        - [bullet point 3]\n\
        Recommendations:\n\
        - [recommendation 1]\n\
        - [recommendation 2]\n\
        - [recommendation 3]\n\
        Citations: [URL1, URL2, URL3, ...]\n",
        sections.join("---\n")
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Summary,
    Bullets,
    Recommendations,
    Citations,
}

/// Parse a completion response against the fixed section markers.
///
/// Tolerant by construction: markers may carry markdown heading prefixes,
/// sections may be missing or hold the wrong number of bullets, and
/// anything unrecognized outside a section is ignored. Whatever structure
/// is present comes back; deviations degrade, they never error.
pub(crate) fn parse_summary(response: &str) -> SummaryResult {
    let mut result = SummaryResult::default();
    let mut section = Section::None;

    for raw in response.lines() {
        let line = raw.trim().trim_start_matches('#').trim_start();

        if let Some(rest) = line.strip_prefix("Summary:") {
            section = Section::Summary;
            push_summary_text(&mut result.text, rest.trim());
            continue;
        }
        if line.strip_prefix("Key Insights:").is_some() {
            section = Section::Bullets;
            continue;
        }
        if line.strip_prefix("Recommendations:").is_some() {
            section = Section::Recommendations;
            continue;
        }
        if let Some(rest) = line.strip_prefix("Citations:") {
            section = Section::Citations;
            push_citations(&mut result.citations, rest);
            continue;
        }

        match section {
            Section::Summary => {
                if bullet_text(line).is_none() {
                    push_summary_text(&mut result.text, line);
                }
            }
            Section::Bullets => {
                if let Some(text) = bullet_text(line) {
                    result.bullets.push(text);
                }
            }
            Section::Recommendations => {
                if let Some(text) = bullet_text(line) {
                    result.recommendations.push(text);
                }
            }
            Section::Citations => push_citations(&mut result.citations, line),
            Section::None => {}
        }
    }

    result
}

fn push_summary_text(text: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(line);
}

fn bullet_text(line: &str) -> Option<String> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))?
        .trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Citations arrive as a comma-separated list, usually bracketed.
fn push_citations(citations: &mut Vec<String>, line: &str) {
    let line = line.trim().trim_start_matches('[').trim_end_matches(']');
    citations.extend(
        line.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    );
}

/// Best-effort summary straight from the inputs, used when the completion
/// call itself fails.
fn fallback_summary(insights: &[Insight], reason: &str) -> SummaryResult {
    let mut result = SummaryResult::message(format!(
        "Summarization degraded (completion failed: {reason}). Summary based on available insights:"
    ));

    for insight in insights.iter().take(FALLBACK_SOURCES) {
        if insight.title.len() > 5 {
            result.bullets.push(format!("Information from: {}", insight.title));
        }
        let url = clean_url(&insight.url);
        if !url.is_empty() {
            result.citations.push(url);
        }
    }
    result
        .recommendations
        .push("Review the original sources for more detailed information".to_string());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{record, MockAgent};

    // -----------------------------------------------------------------------
    // Parser
    // -----------------------------------------------------------------------

    const WELL_FORMED: &str = "\
Summary:
AI infrastructure spending is accelerating.
Vendors are consolidating around a few platforms.
Key Insights:
- Spending is up across the board
- Consolidation favors incumbents
- Open models lag on tooling
Recommendations:
- Track platform pricing changes
- Pilot one open model
- Revisit vendor contracts
Citations: [https://a.test/1, https://b.test/2]";

    #[test]
    fn parses_all_four_sections() {
        let result = parse_summary(WELL_FORMED);

        assert_eq!(
            result.text,
            "AI infrastructure spending is accelerating. Vendors are consolidating around a few platforms."
        );
        assert_eq!(result.bullets.len(), 3);
        assert_eq!(result.bullets[0], "Spending is up across the board");
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(
            result.citations,
            vec!["https://a.test/1", "https://b.test/2"]
        );
    }

    #[test]
    fn markers_match_with_markdown_heading_prefixes() {
        let response = "\
### Summary: One-line brief.
### Key Insights:
- only insight
### Recommendations:
- only recommendation
### Citations: https://c.test/3";
        let result = parse_summary(response);

        assert_eq!(result.text, "One-line brief.");
        assert_eq!(result.bullets, vec!["only insight"]);
        assert_eq!(result.recommendations, vec!["only recommendation"]);
        assert_eq!(result.citations, vec!["https://c.test/3"]);
    }

    #[test]
    fn missing_sections_degrade_to_partial_results() {
        let result = parse_summary("Summary: just a paragraph, nothing else.");
        assert_eq!(result.text, "just a paragraph, nothing else.");
        assert!(result.bullets.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.citations.is_empty());
    }

    #[test]
    fn unstructured_response_yields_empty_result() {
        let result = parse_summary("The model ignored the template entirely.");
        assert_eq!(result, SummaryResult::default());
    }

    #[test]
    fn citations_split_on_commas_across_lines() {
        let response = "Citations:\nhttps://a.test/1, https://b.test/2,\nhttps://c.test/3";
        let result = parse_summary(response);
        assert_eq!(
            result.citations,
            vec!["https://a.test/1", "https://b.test/2", "https://c.test/3"]
        );
    }

    // -----------------------------------------------------------------------
    // Short-circuits and fallbacks
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn no_provider_short_circuits_without_a_call() {
        let summarizer = Summarizer::disabled();
        let result = summarizer.summarize("ai", &[record("t", "u", "c")]).await;

        assert!(result.text.contains("skipped"));
        assert!(result.bullets.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.citations.is_empty());
    }

    #[tokio::test]
    async fn empty_insights_short_circuit_before_the_call() {
        let agent = MockAgent::returning(WELL_FORMED);
        let summarizer = Summarizer::new(Some(agent.clone()));

        let result = summarizer.summarize("ai", &[]).await;

        assert_eq!(result.text, "No insights to summarize.");
        assert!(result.bullets.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.citations.is_empty());
        assert_eq!(agent.calls(), 0, "no completion call may be attempted");
    }

    #[tokio::test]
    async fn well_formed_completion_round_trips() {
        let agent = MockAgent::returning(WELL_FORMED);
        let summarizer = Summarizer::new(Some(agent.clone()));

        let result = summarizer
            .summarize("ai", &[record("AI spend report", "https://a.test/1", "body")])
            .await;

        assert_eq!(agent.calls(), 1);
        assert_eq!(result.bullets.len(), 3);
        assert!(result.text.starts_with("AI infrastructure"));
    }

    #[tokio::test]
    async fn completion_failure_degrades_to_synthesized_fallback() {
        let agent = MockAgent::failing("connection reset");
        let summarizer = Summarizer::new(Some(agent.clone()));

        let insights = vec![
            record("Meaningful title", "https://a.test/1", "body"),
            record("x", "https://b.test/2", "body"),
        ];
        let result = summarizer.summarize("ai", &insights).await;

        assert_eq!(agent.calls(), 1);
        assert!(result.text.contains("connection reset"));
        assert_eq!(result.bullets, vec!["Information from: Meaningful title"]);
        assert_eq!(
            result.citations,
            vec!["https://a.test/1", "https://b.test/2"]
        );
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn prompt_sanitizes_content_and_urls() {
        let insights = vec![record(
            "Launch",
            "`https://a.test/1`",
            "<p>cleaned <b>body</b></p>",
        )];
        let prompt = build_prompt("ai", &insights);

        assert!(prompt.contains("Article 1:"));
        assert!(prompt.contains("Content: cleaned body"));
        assert!(prompt.contains("URL: https://a.test/1"));
        assert!(!prompt.contains("<p>"));
        assert!(!prompt.contains('`'));
    }
}
