//! Blog writing pipeline: plan the article from the research and gap
//! analyses, draft the sections in parallel, and format the final post.

mod filters;
mod plan;
mod stages;

pub use filters::{
    filter_for_conceptual, filter_for_conclusion, filter_for_evidence, filter_for_introduction,
    filter_for_technical, filter_for_visuals, OverviewView, PlanView,
};
pub use plan::{
    ArticleOverview, ArticlePlan, FocusAreasMapping, SectionPlan, TechnicalDepth, ToneAndStyle,
    VisualOpportunity, FOCUS_CONCEPTUAL_DISTINCTIONS, FOCUS_ETHICAL_CONSIDERATIONS,
    FOCUS_EVIDENCE_AND_METRICS, FOCUS_TECHNICAL_IMPLEMENTATION,
};
pub use stages::{
    article_planner, blog_writing_pipeline, conceptual_writer, conclusion_writer,
    evidence_writer, final_formatter, introduction_writer, section_writers, technical_writer,
    ARTICLE_PLAN_KEY, BLOG_ARTICLE_KEY, CONCEPTUAL_SECTIONS_KEY, CONCLUSION_SECTION_KEY,
    DATA_ANALYSIS_FILE, EVIDENCE_SECTIONS_KEY, GAP_ANALYSIS_FILE, INTRODUCTION_SECTION_KEY,
    TECHNICAL_SECTIONS_KEY,
};
