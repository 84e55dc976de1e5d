//! Data hunter pipeline: plan research queries from a user brief, execute
//! them against the search capability, structure the findings, and synthesize
//! the data analysis consumed by the article planner.

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

/// Seeded into shared state by the caller before the pipeline runs.
pub const RESEARCH_BRIEF_KEY: &str = "research_brief";
pub const RESEARCH_PLAN_KEY: &str = "research_plan";
pub const RAW_SEARCH_RESULTS_KEY: &str = "raw_search_results";
pub const COLLECTED_FINDINGS_KEY: &str = "collected_findings";
pub const DATA_ANALYSIS_KEY: &str = "data_analysis";

pub const MIN_RESEARCH_TASKS: usize = 1;
pub const MAX_RESEARCH_TASKS: usize = 4;

/// A single research task with specific search parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchTask {
    /// The exact search query to execute for this task.
    pub search_query: String,
    /// Preferred source type (e.g. "academic", "industry", "news", "mixed").
    pub source_pref: String,
    /// Target recency window (e.g. "≤18 months", "2024-2025").
    pub freshness_window: String,
    /// Why this query matters for the research brief.
    pub reasoning: String,
}

/// Output of the query planner: between one and four research tasks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchPlan {
    #[schemars(length(min = 1, max = 4))]
    pub tasks: Vec<ResearchTask>,
}

impl ResearchPlan {
    /// Construct a plan, rejecting task counts outside `[1, 4]`.
    pub fn new(tasks: Vec<ResearchTask>) -> Result<Self, String> {
        let plan = Self { tasks };
        plan.validate()?;
        Ok(plan)
    }
}

impl Validate for ResearchPlan {
    fn validate(&self) -> Result<(), String> {
        let count = self.tasks.len();
        if !(MIN_RESEARCH_TASKS..=MAX_RESEARCH_TASKS).contains(&count) {
            return Err(format!(
                "research plan must contain {MIN_RESEARCH_TASKS} to {MAX_RESEARCH_TASKS} tasks, got {count}"
            ));
        }
        Ok(())
    }
}

/// Initial credibility assessment of a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Credibility {
    High,
    Medium,
    Low,
}

/// An individual finding from search collection, with source metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchFinding {
    /// Title of the search result.
    pub title: String,
    /// Snippet or description text from the source.
    pub snippet: String,
    /// Source URL.
    pub url: String,
    /// Inferred source type ("academic", "industry", "news", "blog", "other").
    pub source_type: String,
    /// Credibility assessment based on domain and context.
    pub credibility_guess: Credibility,
    /// Categorization tags such as "statistics" or "report".
    #[serde(default)]
    pub tags: Vec<String>,
    /// Index of the research task that produced this result.
    #[serde(default)]
    pub task_id: Option<u32>,
}

/// All findings collected across the research tasks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchBatch {
    #[serde(default)]
    pub findings: Vec<ResearchFinding>,
    pub total_findings: u32,
    pub tasks_executed: u32,
}

impl Validate for ResearchBatch {}

fn planner_instruction(ctx: &StageContext<'_>) -> String {
    let brief = ctx
        .state
        .markdown(RESEARCH_BRIEF_KEY)
        .map_or_else(
            || "[research brief missing. Seed state with a research_brief first.]".to_string(),
            ToString::to_string,
        );
    format!(
        "You are the query planner. Break the research brief below into 1-4 \
         research tasks that together cover its core intent.\n\n\
         ## Research brief\n{brief}\n\n\
         For each task provide search_query (a precise search string, for \
         academic material prefer the form '[topic] filetype:pdf site:.org'), \
         source_pref, freshness_window, and reasoning. Keep the tasks diverse \
         enough to cover different angles while staying focused, and \
         prioritize recent academic papers."
    )
}

/// Extracts the planned queries from shared state. An absent or malformed
/// plan yields no queries; the search stage degrades instead of aborting.
fn planned_queries(ctx: &StageContext<'_>) -> Vec<String> {
    ctx.state
        .structured(RESEARCH_PLAN_KEY)
        .and_then(|value| serde_json::from_value::<ResearchPlan>(value.clone()).ok())
        .map(|plan| {
            plan.tasks
                .into_iter()
                .map(|task| task.search_query)
                .collect()
        })
        .unwrap_or_default()
}

fn structuring_instruction(ctx: &StageContext<'_>) -> String {
    let raw = ctx
        .state
        .structured(RAW_SEARCH_RESULTS_KEY)
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "[raw search results missing]".to_string());
    let plan = ctx
        .state
        .structured(RESEARCH_PLAN_KEY)
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "[research plan missing]".to_string());
    format!(
        "You are the result structuring agent. Convert the raw search results \
         below into standardized ResearchFinding records.\n\n\
         ## Research plan\n{plan}\n\n\
         ## Raw search results\n{raw}\n\n\
         For each result produce title, snippet, url, source_type, \
         credibility_guess (base it on the domain: .edu is high, commercial \
         sites medium, unknown low), tags, and the task_id of the task that \
         produced it. Aggregate everything into a ResearchBatch with \
         total_findings and tasks_executed counts."
    )
}

fn synthesis_instruction(ctx: &StageContext<'_>) -> String {
    let findings = ctx
        .state
        .structured(COLLECTED_FINDINGS_KEY)
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_else(|| "[collected findings missing]".to_string());
    format!(
        "You are the research synthesis agent. Summarize the collected \
         findings below into a data analysis document for content planning.\n\n\
         ## Collected findings\n{findings}\n\n\
         Produce markdown with three sections: Key Themes (patterns across \
         the findings), Supporting Data (statistics and evidence worth \
         citing, with source URLs), and Coverage Notes (angles the findings \
         do not cover well). Reference source URLs when making specific \
         claims."
    )
}

/// Step 1: expand the user brief into a bounded set of research tasks.
pub fn query_planner(model: Arc<dyn CompletionModel>) -> StructuredStage<ResearchPlan> {
    StructuredStage::new(
        "query_planner",
        RESEARCH_PLAN_KEY,
        model,
        InstructionSource::dynamic(planner_instruction),
    )
    .persisted_to_store()
}

/// Step 2: a two-phase sub-pipeline that first executes the planned searches
/// and then reshapes the raw results into schema-validated findings.
pub fn source_collector(
    model: Arc<dyn CompletionModel>,
    search: Arc<dyn SearchProvider>,
) -> Result<Pipeline, PipelineError> {
    Pipeline::builder("source_collector")
        .stage(SearchStage::new(
            "tool_collector",
            RAW_SEARCH_RESULTS_KEY,
            search,
            planned_queries,
        ))
        .stage(
            StructuredStage::<ResearchBatch>::new(
                "result_structuring",
                COLLECTED_FINDINGS_KEY,
                model,
                InstructionSource::dynamic(structuring_instruction),
            )
            .persisted_to_store(),
        )
        .build()
}

/// Step 3: synthesize the findings into the `data_analysis.md` document the
/// article planner reads.
pub fn research_synthesis(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "research_synthesis",
        DATA_ANALYSIS_KEY,
        model,
        InstructionSource::dynamic(synthesis_instruction),
    )
    .persisted_to_store()
}

/// The full research workflow: planning, collection, synthesis.
pub fn data_hunter_pipeline(
    model: &Arc<dyn CompletionModel>,
    search: &Arc<dyn SearchProvider>,
) -> Result<Pipeline, PipelineError> {
    Pipeline::builder("data_hunter_pipeline")
        .stage(query_planner(model.clone()))
        .pipeline(source_collector(model.clone(), search.clone())?)
        .stage(research_synthesis(model.clone()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(query: &str) -> ResearchTask {
        ResearchTask {
            search_query: query.to_string(),
            source_pref: "academic".to_string(),
            freshness_window: "≤18 months".to_string(),
            reasoning: "coverage".to_string(),
        }
    }

    #[test]
    fn accepts_one_to_four_tasks() {
        for count in 1..=4 {
            let tasks = (0..count).map(|i| task(&format!("q{i}"))).collect();
            assert!(ResearchPlan::new(tasks).is_ok(), "count {count}");
        }
    }

    #[test]
    fn rejects_empty_plan() {
        assert!(ResearchPlan::new(vec![]).is_err());
    }

    #[test]
    fn rejects_five_tasks() {
        let tasks = (0..5).map(|i| task(&format!("q{i}"))).collect();
        assert!(ResearchPlan::new(tasks).is_err());
    }

    #[test]
    fn decoded_plan_is_bounds_checked() {
        let plan: ResearchPlan = serde_json::from_value(serde_json::json!({
            "tasks": (0..5).map(|i| serde_json::json!({
                "search_query": format!("q{i}"),
                "source_pref": "mixed",
                "freshness_window": "2024-2025",
                "reasoning": "r",
            })).collect::<Vec<_>>()
        }))
        .expect("shape decodes");
        assert!(plan.validate().is_err());
    }
}
