use super::{
    filters::{
        filter_for_conceptual, filter_for_conclusion, filter_for_evidence,
        filter_for_introduction, filter_for_technical, PlanView,
    },
    plan::ArticlePlan,
};
use crate::{
    errors::PipelineError,
    instruction::InstructionSource,
    pipeline::{ParallelGroup, Pipeline},
    stage::{CompletionStage, StageContext, StructuredStage},
    store::ArtifactStore,
};
use blogflow_sdk::CompletionModel;
use serde::Serialize;
use std::sync::Arc;

pub const ARTICLE_PLAN_KEY: &str = "article_plan";
pub const INTRODUCTION_SECTION_KEY: &str = "introduction_section";
pub const TECHNICAL_SECTIONS_KEY: &str = "technical_sections";
pub const EVIDENCE_SECTIONS_KEY: &str = "evidence_sections";
pub const CONCEPTUAL_SECTIONS_KEY: &str = "conceptual_sections";
pub const CONCLUSION_SECTION_KEY: &str = "conclusion_section";
pub const BLOG_ARTICLE_KEY: &str = "blog_article";

/// Upstream analysis files, written by the hunter and gap pipelines and read
/// here by conventional filename.
pub const DATA_ANALYSIS_FILE: &str = "data_analysis.md";
pub const GAP_ANALYSIS_FILE: &str = "gap_analysis.md";

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn load_plan(store: &ArtifactStore) -> Option<ArticlePlan> {
    let value = store.load_latest_structured(ARTICLE_PLAN_KEY)?;
    serde_json::from_value(value).ok()
}

fn planner_instruction(ctx: &StageContext<'_>) -> String {
    let data_analysis = ctx
        .store
        .markdown_or_note(DATA_ANALYSIS_FILE, "data hunter");
    let gap_analysis = ctx.store.markdown_or_note(GAP_ANALYSIS_FILE, "gap analyzer");
    format!(
        "You are the article planner. Analyze the two analysis documents below and \
         produce a structured plan for a comprehensive blog article.\n\n\
         ## Data analysis\n{data_analysis}\n\n\
         ## Gap analysis\n{gap_analysis}\n\n\
         Produce a JSON object matching the ArticlePlan schema: an overview \
         (target_audience, purpose, key_message, value_proposition, \
         differentiation_strategy), an ordered structure of sections (title, \
         description, estimated_word_count, key_points, evidence_needs, \
         technical_depth, practical_examples, conceptual_distinctions, \
         focus_areas), a focus_areas_mapping of section titles, \
         visual_opportunities, and tone_and_style guidelines. Address the \
         identified gaps and plan for evidence throughout."
    )
}

/// Builds the prompt for one writer from its filtered view of the plan. When
/// the plan file is absent the prompt degrades to an explicit missing-input
/// note so the stage still completes.
fn writer_instruction(
    role: &'static str,
    task: &'static str,
    filter: fn(&ArticlePlan) -> PlanView,
) -> InstructionSource {
    InstructionSource::dynamic(move |ctx: &StageContext<'_>| match load_plan(ctx.store) {
        Some(plan) => {
            let view = filter(&plan);
            format!(
                "You are the {role}. {task}\n\n\
                 ## Relevant article plan context\n{}\n\n\
                 Follow the tone_and_style guidelines and the estimated word \
                 counts. Produce well-formatted markdown ready for assembly \
                 into the final article.",
                pretty(&view)
            )
        }
        None => format!(
            "You are the {role}. {}",
            ArtifactStore::missing_note("article_plan", "article planner")
        ),
    })
}

fn formatter_instruction(ctx: &StageContext<'_>) -> String {
    let sections = [
        ("Introduction", INTRODUCTION_SECTION_KEY, "introduction writer"),
        ("Technical sections", TECHNICAL_SECTIONS_KEY, "technical writer"),
        ("Evidence sections", EVIDENCE_SECTIONS_KEY, "evidence writer"),
        ("Conceptual sections", CONCEPTUAL_SECTIONS_KEY, "conceptual writer"),
        ("Conclusion", CONCLUSION_SECTION_KEY, "conclusion writer"),
    ];
    let mut rendered = String::new();
    for (heading, key, producer) in sections {
        let filename = format!("{key}.md");
        let body = ctx.store.markdown_or_note(&filename, producer);
        rendered.push_str(&format!("### {heading}\n{body}\n\n"));
    }
    format!(
        "You are the final formatter. Combine the drafted sections below into \
         one publication-ready blog article.\n\n\
         ## Drafted sections\n{rendered}\
         Merge them in reading order with a single H1 title, consistent \
         heading hierarchy, smooth transitions, and no duplicate headings. \
         Preserve the content; edit only for flow and formatting. Output the \
         complete article as markdown."
    )
}

/// Step 1: analyze the research and gap analysis files into a structured
/// article plan.
pub fn article_planner(model: Arc<dyn CompletionModel>) -> StructuredStage<ArticlePlan> {
    StructuredStage::new(
        "article_planner",
        ARTICLE_PLAN_KEY,
        model,
        InstructionSource::dynamic(planner_instruction),
    )
    .persisted_to_store()
}

pub fn introduction_writer(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "introduction_writer",
        INTRODUCTION_SECTION_KEY,
        model,
        writer_instruction(
            "introduction writer",
            "Write a compelling introduction that hooks the reader, sets \
             context, previews the article structure, and states the value \
             proposition.",
            filter_for_introduction,
        ),
    )
    .persisted_to_store()
}

pub fn technical_writer(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "technical_writer",
        TECHNICAL_SECTIONS_KEY,
        model,
        writer_instruction(
            "technical writer",
            "Draft the technically deep sections of the article, covering the \
             listed key points with practical examples at the required depth.",
            filter_for_technical,
        ),
    )
    .persisted_to_store()
}

pub fn evidence_writer(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "evidence_writer",
        EVIDENCE_SECTIONS_KEY,
        model,
        writer_instruction(
            "evidence writer",
            "Draft the sections that rely on data and evidence, grounding \
             every claim in the listed evidence needs.",
            filter_for_evidence,
        ),
    )
    .persisted_to_store()
}

pub fn conceptual_writer(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "conceptual_writer",
        CONCEPTUAL_SECTIONS_KEY,
        model,
        writer_instruction(
            "conceptual writer",
            "Draft the sections that develop conceptual distinctions and \
             ethical considerations, making each distinction explicit.",
            filter_for_conceptual,
        ),
    )
    .persisted_to_store()
}

pub fn conclusion_writer(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "conclusion_writer",
        CONCLUSION_SECTION_KEY,
        model,
        writer_instruction(
            "conclusion writer",
            "Write a conclusion that reinforces the key message and value \
             proposition and ends with a clear takeaway.",
            filter_for_conclusion,
        ),
    )
    .persisted_to_store()
}

/// Final step: merge the drafted section files into the finished article.
pub fn final_formatter(model: Arc<dyn CompletionModel>) -> CompletionStage {
    CompletionStage::new(
        "final_formatter",
        BLOG_ARTICLE_KEY,
        model,
        InstructionSource::dynamic(formatter_instruction),
    )
    .persisted_to_store()
}

/// The five section writers as one barrier group. Each writer reads only the
/// persisted plan, never a sibling's output, so their keys are disjoint by
/// construction.
pub fn section_writers(model: &Arc<dyn CompletionModel>) -> ParallelGroup {
    ParallelGroup::new("section_writers")
        .stage(introduction_writer(model.clone()))
        .stage(technical_writer(model.clone()))
        .stage(evidence_writer(model.clone()))
        .stage(conceptual_writer(model.clone()))
        .stage(conclusion_writer(model.clone()))
}

/// The complete blog writing workflow: plan, draft all sections in parallel,
/// then format.
pub fn blog_writing_pipeline(
    model: &Arc<dyn CompletionModel>,
) -> Result<Pipeline, PipelineError> {
    Pipeline::builder("blog_writing_pipeline")
        .stage(article_planner(model.clone()))
        .parallel(section_writers(model))
        .stage(final_formatter(model.clone()))
        .build()
}
