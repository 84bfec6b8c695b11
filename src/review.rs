// Local review engine: deterministic scoring of a draft against a prompt's
// requirements.
//
// Pure functions over a draft snapshot — no I/O, no randomness, no state.
// The scoring constants are load-bearing: downstream consumers pin these
// exact weights and thresholds, so they must not be retuned.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::session::draft::Draft;
use crate::session::sections::SectionId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Tokens ignored when matching draft text against requirements: articles,
/// conjunctions, and filler that appears in nearly every answer.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "or", "to", "the", "of", "in", "on", "for", "with", "as", "at", "by",
    "from", "is", "are", "be", "can", "should", "that", "this", "it", "into", "under", "over",
    "very", "high", "low", "user", "users", "support", "system", "service", "design",
];

/// Distributed-systems vocabulary that signals architectural depth.
const ARCHITECTURE_TOKENS: &[&str] = &[
    "cache",
    "queue",
    "replication",
    "sharding",
    "latency",
    "throughput",
    "availability",
];

/// Word count at which the depth score saturates.
const DEPTH_SATURATION_WORDS: usize = 600;

/// Score awarded for requirement coverage when the prompt lists none.
const NEUTRAL_REQUIREMENT_SCORE: u32 = 20;

// ---------------------------------------------------------------------------
// ReviewResult
// ---------------------------------------------------------------------------

/// Scored feedback for one draft snapshot. Produced fresh on every review;
/// a later review replaces, never merges with, an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Overall score, clamped to 0..=100.
    pub score: u32,
    /// Whitespace-delimited token count of the full draft document.
    pub word_count: usize,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// `"<covered>/<total>"` over the prompt's requirements.
    pub requirement_coverage: String,
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

/// Lower-case, strip everything but ASCII letters/digits/whitespace, split
/// on whitespace, drop short tokens and stopwords. Duplicates collapse.
pub fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.len() > 2 && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a draft against a prompt's requirements.
///
/// Identical inputs always produce an identical result.
pub fn run_review(requirements: &[String], draft: &Draft) -> ReviewResult {
    let answered = draft.answered_sections();
    let missing = draft.missing_sections();

    let document = draft.document();
    let word_count = document.split_whitespace().count();
    let answer_tokens = token_set(&document);

    // A requirement is covered when its (stopword-filtered) token set shares
    // at least one token with the draft. Requirements that tokenize to
    // nothing can never be covered.
    let covered = requirements
        .iter()
        .filter(|req| {
            let req_tokens = token_set(req);
            !req_tokens.is_empty() && req_tokens.iter().any(|t| answer_tokens.contains(t))
        })
        .count();
    let total = requirements.len();

    let architecture_hits = ARCHITECTURE_TOKENS
        .iter()
        .filter(|t| answer_tokens.contains(**t))
        .count();

    let section_score =
        (answered.len() as f64 / SectionId::ALL.len() as f64 * 35.0).round() as u32;
    let depth_score = u32::min(
        30,
        (word_count as f64 / DEPTH_SATURATION_WORDS as f64 * 30.0).round() as u32,
    );
    let requirement_score = if total > 0 {
        (covered as f64 / total as f64 * 35.0).round() as u32
    } else {
        NEUTRAL_REQUIREMENT_SCORE
    };

    let score = u32::min(100, section_score + depth_score + requirement_score);

    let mut strengths = Vec::new();
    if answered.len() >= 6 {
        strengths.push("Good section coverage across the interview framework.".to_string());
    }
    if word_count >= 350 {
        strengths
            .push("Answer depth is strong enough for a realistic interview round.".to_string());
    }
    if architecture_hits >= 3 {
        strengths
            .push("Architecture vocabulary includes key distributed-system patterns.".to_string());
    }
    if covered >= usize::max(1, (total as f64 * 0.6).floor() as usize) {
        strengths.push("Most prompt requirements are referenced in your solution.".to_string());
    }
    if strengths.is_empty() {
        strengths.push("You have a workable foundation to iterate from.".to_string());
    }

    let mut improvements = Vec::new();
    if !missing.is_empty() {
        let named: Vec<&str> = missing.iter().take(4).map(|id| id.title()).collect();
        improvements.push(format!("Fill missing sections: {}.", named.join(", ")));
    }
    if word_count < 250 {
        improvements.push(
            "Add more concrete detail: APIs, datastore decisions, and failure handling."
                .to_string(),
        );
    }
    if covered < total {
        improvements
            .push("Map every listed requirement to an explicit design decision.".to_string());
    }
    if !answer_tokens.contains("tradeoff")
        && !answer_tokens.contains("tradeoffs")
        && !answer_tokens.contains("trade")
    {
        improvements
            .push("Include explicit trade-offs to strengthen interview reasoning.".to_string());
    }
    if !answer_tokens.contains("capacity") && !answer_tokens.contains("qps") {
        improvements.push(
            "Add quick capacity estimates (traffic, storage, and peak assumptions).".to_string(),
        );
    }

    ReviewResult {
        score,
        word_count,
        strengths,
        improvements,
        requirement_coverage: format!("{covered}/{total}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reqs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn draft_with(sections: &[(SectionId, &str)]) -> Draft {
        let mut draft = Draft::default();
        for (id, text) in sections {
            draft.set_section(*id, text.to_string());
        }
        draft
    }

    // -- tokenization --

    #[test]
    fn token_set_lowercases_and_strips_punctuation() {
        let tokens = token_set("Drivers report LOCATION, every 4-seconds!");
        assert!(tokens.contains("drivers"));
        assert!(tokens.contains("report"));
        assert!(tokens.contains("location"));
        assert!(tokens.contains("seconds"));
        // "every" survives; "4" is too short.
        assert!(tokens.contains("every"));
        assert!(!tokens.contains("4"));
    }

    #[test]
    fn token_set_drops_stopwords_and_short_tokens() {
        let tokens = token_set("the system should design a db for users");
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("system"));
        assert!(!tokens.contains("should"));
        assert!(!tokens.contains("design"));
        assert!(!tokens.contains("users"));
        assert!(!tokens.contains("db")); // length 2
        assert!(!tokens.contains("for"));
        assert!(tokens.is_empty());
    }

    #[test]
    fn token_set_collapses_duplicates() {
        let tokens = token_set("cache cache CACHE cache!");
        assert_eq!(tokens.len(), 1);
        assert!(tokens.contains("cache"));
    }

    #[test]
    fn token_set_of_empty_text_is_empty() {
        assert!(token_set("").is_empty());
        assert!(token_set("   \n\t ").is_empty());
    }

    // -- score components --

    #[test]
    fn empty_draft_with_requirements_scores_headings_only() {
        let result = run_review(
            &reqs(&["Riders can see nearby drivers on a map."]),
            &Draft::default(),
        );
        assert_eq!(result.requirement_coverage, "0/1");
        // Section and requirement scores are 0. The rendered document still
        // carries the 22 heading tokens, so depth contributes round(22/600*30) = 1.
        assert_eq!(result.word_count, 22);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn all_sections_empty_give_zero_section_score() {
        // With no requirements the neutral 20 applies; depth adds the
        // heading-token point.
        let result = run_review(&[], &Draft::default());
        assert_eq!(result.requirement_coverage, "0/0");
        assert_eq!(result.score, 21);
    }

    #[test]
    fn section_score_scales_with_answered_sections() {
        let draft = draft_with(&[
            (SectionId::Requirements, "- a requirement"),
            (SectionId::Apis, "POST /x"),
            (SectionId::HighLevelDesign, "gateway"),
            (SectionId::DataModel, "table"),
        ]);
        let result = run_review(&[], &draft);
        // 4/8 * 35 = 17.5 -> 18, plus neutral 20, plus small depth.
        assert!(result.score >= 38);
    }

    #[test]
    fn depth_score_saturates_at_600_words() {
        let body = "word ".repeat(1200);
        let draft = draft_with(&[(SectionId::DeepDive, body.as_str())]);
        let result = run_review(&[], &draft);
        let saturated = result.score;

        let body2 = "word ".repeat(5000);
        let draft2 = draft_with(&[(SectionId::DeepDive, body2.as_str())]);
        let result2 = run_review(&[], &draft2);
        assert_eq!(saturated, result2.score);
    }

    #[test]
    fn neutral_requirement_score_when_prompt_has_none() {
        let result = run_review(&[], &draft_with(&[(SectionId::Apis, "endpoints")]));
        // 1/8*35 = 4.375 -> 4; depth tiny; neutral 20.
        assert!(result.score >= 24);
        assert_eq!(result.requirement_coverage, "0/0");
    }

    #[test]
    fn requirement_with_only_stopwords_is_never_covered() {
        let result = run_review(
            &reqs(&["for the users"]),
            &draft_with(&[(SectionId::Requirements, "for the users")]),
        );
        assert_eq!(result.requirement_coverage, "0/1");
    }

    #[test]
    fn score_clamped_to_100() {
        // Max out all three components: 8 sections, 600+ words, full coverage.
        let filler = "cache queue replication sharding latency throughput availability \
                      tradeoff capacity qps "
            .repeat(10);
        let mut draft = Draft::default();
        for id in SectionId::ALL {
            draft.set_section(id, filler.clone());
        }
        let result = run_review(&reqs(&["Use a cache for hot keys."]), &draft);
        assert_eq!(result.score, 100);
    }

    // -- idempotence and monotonicity --

    #[test]
    fn identical_input_gives_identical_result() {
        let requirements = reqs(&[
            "Drivers report location every 4 seconds.",
            "Riders can see nearby drivers on a map.",
        ]);
        let draft = draft_with(&[(SectionId::Requirements, "- location\n- map")]);
        let first = run_review(&requirements, &draft);
        let second = run_review(&requirements, &draft);
        assert_eq!(first, second);
    }

    #[test]
    fn covering_another_requirement_never_lowers_the_score() {
        let requirements = reqs(&[
            "Track click analytics.",
            "Redirect from short URL to original URL quickly.",
        ]);
        let before_draft = draft_with(&[(SectionId::HighLevelDesign, "analytics pipeline")]);
        let before = run_review(&requirements, &before_draft);

        let after_draft =
            draft_with(&[(SectionId::HighLevelDesign, "analytics pipeline redirect")]);
        let after = run_review(&requirements, &after_draft);

        assert_eq!(before.requirement_coverage, "1/2");
        assert_eq!(after.requirement_coverage, "2/2");
        assert!(after.score > before.score);
    }

    // -- the ride-sharing scenario --

    #[test]
    fn ride_sharing_coverage_scenario() {
        let requirements = reqs(&[
            "Drivers report location every 4 seconds.",
            "Riders can see nearby drivers on a map.",
        ]);
        let draft = draft_with(&[(SectionId::Requirements, "- location\n- map")]);
        let result = run_review(&requirements, &draft);

        // "location" intersects requirement 1, "map" intersects requirement 2.
        assert_eq!(result.requirement_coverage, "2/2");
        // Raw document: 22 heading tokens + "- location" + "- map" bodies.
        assert_eq!(result.word_count, draft.document().split_whitespace().count());
        assert_eq!(result.word_count, 26);
    }

    // -- strengths --

    #[test]
    fn empty_draft_gets_only_the_fallback_strength() {
        let result = run_review(&reqs(&["Anything concrete."]), &Draft::default());
        assert_eq!(
            result.strengths,
            vec!["You have a workable foundation to iterate from.".to_string()]
        );
    }

    #[test]
    fn section_coverage_strength_at_six_answered() {
        let mut draft = Draft::default();
        for id in SectionId::ALL.iter().take(6) {
            draft.set_section(*id, "content here".into());
        }
        let result = run_review(&[], &draft);
        assert!(result.strengths[0].contains("section coverage"));
    }

    #[test]
    fn vocabulary_strength_needs_three_distinct_terms() {
        let two = draft_with(&[(SectionId::Scaling, "cache and queue")]);
        let result = run_review(&[], &two);
        assert!(!result
            .strengths
            .iter()
            .any(|s| s.contains("Architecture vocabulary")));

        let three = draft_with(&[(SectionId::Scaling, "cache queue sharding")]);
        let result = run_review(&[], &three);
        assert!(result
            .strengths
            .iter()
            .any(|s| s.contains("Architecture vocabulary")));
    }

    #[test]
    fn strengths_appear_in_fixed_order() {
        let filler = format!(
            "cache queue replication latency redirect {}",
            "detail ".repeat(400)
        );
        let mut draft = Draft::default();
        for id in SectionId::ALL {
            draft.set_section(id, filler.clone());
        }
        let result = run_review(&reqs(&["Redirect from short URL."]), &draft);
        assert_eq!(result.strengths.len(), 4);
        assert!(result.strengths[0].contains("section coverage"));
        assert!(result.strengths[1].contains("Answer depth"));
        assert!(result.strengths[2].contains("Architecture vocabulary"));
        assert!(result.strengths[3].contains("requirements are referenced"));
    }

    // -- improvements --

    #[test]
    fn empty_draft_lists_first_four_missing_sections_and_hints() {
        let result = run_review(&reqs(&["Track click analytics."]), &Draft::default());
        assert_eq!(result.improvements.len(), 4);
        assert_eq!(
            result.improvements[0],
            "Fill missing sections: Requirements, APIs, High-Level Design, Data Model."
        );
        assert!(result.improvements[1].contains("concrete detail"));
        assert!(result.improvements[2].contains("every listed requirement"));
        assert!(result.improvements[3].contains("capacity estimates"));
    }

    #[test]
    fn tradeoff_hint_suppressed_by_document_headings() {
        // The rendered document always contains the "Trade-Offs" heading,
        // which tokenizes to "trade"/"offs", so the hint can never fire.
        let result = run_review(&[], &Draft::default());
        assert!(!result.improvements.iter().any(|i| i.contains("trade-offs")));
    }

    #[test]
    fn capacity_improvement_suppressed_by_qps() {
        let draft = draft_with(&[(SectionId::Scaling, "plan for 5000 qps at peak")]);
        let result = run_review(&[], &draft);
        assert!(!result
            .improvements
            .iter()
            .any(|i| i.contains("capacity estimates")));
    }

    #[test]
    fn no_improvements_for_a_complete_answer() {
        let filler = format!(
            "tradeoff capacity analytics {}",
            "substance ".repeat(300)
        );
        let mut draft = Draft::default();
        for id in SectionId::ALL {
            draft.set_section(id, filler.clone());
        }
        let result = run_review(&reqs(&["Track click analytics."]), &draft);
        assert!(result.improvements.is_empty());
    }
}
