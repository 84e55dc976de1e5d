//! Gap analyzer pipeline: expand a keyword into search strings, collect the
//! competitive SERP landscape, and synthesize content gaps and opportunities.

use crate::{
    errors::PipelineError,
    instruction::InstructionSource,
    pipeline::Pipeline,
    stage::{CompletionStage, SearchStage, StageContext, StructuredStage, Validate},
};
use blogflow_sdk::{CompletionModel, SearchProvider};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const QUERY_INTERPRETATION_KEY: &str = "query_interpretation";
pub const RAW_SERP_DATA_KEY: &str = "raw_serp_data";
pub const SERP_RESULTS_KEY: &str = "serp_results";
pub const GAP_ANALYSIS_KEY: &str = "gap_analysis";

pub const MIN_SEARCH_STRINGS: usize = 1;
pub const MAX_SEARCH_STRINGS: usize = 2;

/// Output of the query interpreter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QueryInterpretation {
    /// The original user query or keyword as provided.
    pub original_query: String,
    /// One or two precise search strings for competitive SERP analysis.
    #[schemars(length(min = 1, max = 2))]
    pub search_strings: Vec<String>,
    /// Why these search strings were chosen.
    pub rationale: String,
}

impl Validate for QueryInterpretation {
    fn validate(&self) -> Result<(), String> {
        let count = self.search_strings.len();
        if !(MIN_SEARCH_STRINGS..=MAX_SEARCH_STRINGS).contains(&count) {
            return Err(format!(
                "query interpretation must contain {MIN_SEARCH_STRINGS} to {MAX_SEARCH_STRINGS} search strings, got {count}"
            ));
        }
        Ok(())
    }
}

/// Individual SERP result item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SerpResultItem {
    pub title: String,
    pub snippet: String,
    pub url: String,
    /// Inferred focus area based on title and snippet.
    pub focus_area: String,
}

/// Structured SERP collection across all searches.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SerpCollection {
    pub total_results: u32,
    #[serde(default)]
    pub results: Vec<SerpResultItem>,
    /// Key themes observed across titles and snippets.
    #[serde(default)]
    pub themes: Vec<String>,
    /// Notable patterns in format or coverage; notes sparse results
    /// explicitly.
    pub patterns: String,
}

impl Validate for SerpCollection {}

fn interpreter_instruction(ctx: &StageContext<'_>) -> String {
    let brief = ctx
        .state
        .markdown(crate::hunter::RESEARCH_BRIEF_KEY)
        .map_or_else(
            || "[research brief missing. Seed state with a research_brief first.]".to_string(),
            ToString::to_string,
        );
    format!(
        "You are the query interpreter. Expand the keyword or topic below \
         into 1-2 precise search strings for competitive SERP analysis.\n\n\
         ## Topic\n{brief}\n\n\
         Return the original query, the search strings, and a brief rationale \
         for your choices. If the original query is already optimal, return \
         it as the single search string."
    )
}

fn interpreted_queries(ctx: &StageContext<'_>) -> Vec<String> {
    ctx.state
        .structured(QUERY_INTERPRETATION_KEY)
        .and_then(|value| serde_json::from_value::<QueryInterpretation>(value.clone()).ok())
        .map(|interpretation| interpretation.search_strings)
        .unwrap_or_default()
}

fn serp_structuring_instruction(ctx: &StageContext<'_>) -> String {
    let raw = ctx
        .state
        .structured(RAW_SERP_DATA_KEY)
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "[raw SERP data missing]".to_string());
    format!(
        "You are the SERP structuring agent. Organize the raw search results \
         below into a structured summary.\n\n\
         ## Raw SERP data\n{raw}\n\n\
         For each result extract title, snippet, url, and an inferred \
         focus_area. Compile total_results, the key themes across results, \
         and the notable patterns in content format or buyer-stage coverage. \
         If results are sparse, say so explicitly in the patterns field."
    )
}

fn gap_synthesis_instruction(ctx: &StageContext<'_>) -> String {
    let interpretation = ctx
        .state
        .structured(QUERY_INTERPRETATION_KEY)
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "[query interpretation missing]".to_string());
    let serp = ctx
        .state
        .structured(SERP_RESULTS_KEY)
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "[SERP results missing]".to_string());
    format!(
        "You are the gap synthesis agent. Analyze the collected SERP data and \
         synthesize actionable insights.\n\n\
         ## Query interpretation\n{interpretation}\n\n\
         ## SERP results\n{serp}\n\n\
         Produce markdown with three sections: SERP Themes (common angles, \
         formats, and buyer stages in the top results), Identified Gaps \
         (missing subtopics, weak buyer-stage coverage, depth deficits), and \
         Opportunities (tone, assets, and data that would differentiate new \
         content). If the results are insufficient, note your assumptions and \
         suggest follow-up queries. Reference source URLs for specific \
         claims."
    )
}

/// Step 1: expand the user query into bounded search strings.
pub fn query_interpreter(model: Arc<dyn CompletionModel>) -> StructuredStage<QueryInterpretation> {
    StructuredStage::new(
        "query_interpreter",
        QUERY_INTERPRETATION_KEY,
        model,
        InstructionSource::dynamic(interpreter_instruction),
    )
}

/// Step 2: execute the searches and structure the SERP landscape.
pub fn serp_collector(
    model: Arc<dyn CompletionModel>,
    search: Arc<dyn SearchProvider>,
) -> Result<Pipeline, PipelineError> {
    Pipeline::builder("serp_collector")
        .stage(SearchStage::new(
            "serp_tool_user",
            RAW_SERP_DATA_KEY,
            search,
            interpreted_queries,
        ))
        .stage(StructuredStage::<SerpCollection>::new(
            "serp_structuring",
            SERP_RESULTS_KEY,
            model,
            InstructionSource::dynamic(serp_structuring_instruction),
        ))
        .build()
}

/// Step 3: synthesize gaps and opportunities into `gap_analysis.md`.
pub fn gap_synthesis(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "gap_synthesis",
        GAP_ANALYSIS_KEY,
        model,
        InstructionSource::dynamic(gap_synthesis_instruction),
    )
    .persisted_to_store()
}

/// The full gap analysis workflow: interpretation, collection, synthesis.
pub fn gap_analyzer_pipeline(
    model: &Arc<dyn CompletionModel>,
    search: &Arc<dyn SearchProvider>,
) -> Result<Pipeline, PipelineError> {
    Pipeline::builder("gap_analyzer_pipeline")
        .stage(query_interpreter(model.clone()))
        .pipeline(serp_collector(model.clone(), search.clone())?)
        .stage(gap_synthesis(model.clone()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_search_strings() {
        let interpretation = QueryInterpretation {
            original_query: "q".to_string(),
            search_strings: vec![],
            rationale: "r".to_string(),
        };
        assert!(interpretation.validate().is_err());
    }

    #[test]
    fn rejects_three_search_strings() {
        let interpretation = QueryInterpretation {
            original_query: "q".to_string(),
            search_strings: vec!["a".into(), "b".into(), "c".into()],
            rationale: "r".to_string(),
        };
        assert!(interpretation.validate().is_err());
    }

    #[test]
    fn accepts_one_or_two_search_strings() {
        for count in 1..=2 {
            let interpretation = QueryInterpretation {
                original_query: "q".to_string(),
                search_strings: (0..count).map(|i| format!("s{i}")).collect(),
                rationale: "r".to_string(),
            };
            assert!(interpretation.validate().is_ok());
        }
    }
}
