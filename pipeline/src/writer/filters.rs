//! Per-consumer views of the article plan.
//!
//! Each writer stage receives only the parts of the plan relevant to it,
//! which keeps prompts small and focused. Filters are pure: they never mutate
//! the plan, and an empty match yields an empty view rather than an error.

use super::plan::{
    ArticleOverview, ArticlePlan, SectionPlan, TechnicalDepth, ToneAndStyle, VisualOpportunity,
    FOCUS_CONCEPTUAL_DISTINCTIONS, FOCUS_ETHICAL_CONSIDERATIONS, FOCUS_EVIDENCE_AND_METRICS,
    FOCUS_TECHNICAL_IMPLEMENTATION,
};
use serde::Serialize;

/// The overview fields a given consumer is allowed to see.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct OverviewView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_proposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differentiation_strategy: Option<String>,
}

impl OverviewView {
    fn full(overview: &ArticleOverview) -> Self {
        Self {
            target_audience: Some(overview.target_audience.clone()),
            purpose: Some(overview.purpose.clone()),
            key_message: Some(overview.key_message.clone()),
            value_proposition: Some(overview.value_proposition.clone()),
            differentiation_strategy: Some(overview.differentiation_strategy.clone()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target_audience.is_none()
            && self.purpose.is_none()
            && self.key_message.is_none()
            && self.value_proposition.is_none()
            && self.differentiation_strategy.is_none()
    }
}

/// A narrowed view of the plan for one consumer. Sections always exist by
/// title in the source plan; no field value is fabricated.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct PlanView {
    #[serde(skip_serializing_if = "OverviewView::is_empty")]
    pub overview: OverviewView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionPlan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visual_opportunities: Vec<VisualOpportunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_and_style: Option<ToneAndStyle>,
}

/// What the introduction writer needs: the full overview and the introduction
/// section, i.e. the one whose title contains "introduction"
/// (case-insensitive), falling back to the first section.
#[must_use]
pub fn filter_for_introduction(plan: &ArticlePlan) -> PlanView {
    let section = plan
        .structure
        .iter()
        .find(|s| title_contains(s, "introduction"))
        .or_else(|| plan.structure.first());
    PlanView {
        overview: OverviewView::full(&plan.overview),
        sections: section.cloned().into_iter().collect(),
        visual_opportunities: vec![],
        tone_and_style: Some(plan.tone_and_style.clone()),
    }
}

/// Sections with medium/high technical depth or a technical-implementation
/// focus area.
#[must_use]
pub fn filter_for_technical(plan: &ArticlePlan) -> PlanView {
    let sections = plan
        .structure
        .iter()
        .filter(|s| {
            matches!(
                s.technical_depth,
                TechnicalDepth::Medium | TechnicalDepth::High
            ) || has_focus(s, FOCUS_TECHNICAL_IMPLEMENTATION)
        })
        .cloned()
        .collect();
    PlanView {
        overview: OverviewView {
            target_audience: Some(plan.overview.target_audience.clone()),
            key_message: Some(plan.overview.key_message.clone()),
            ..OverviewView::default()
        },
        sections,
        visual_opportunities: vec![],
        tone_and_style: Some(plan.tone_and_style.clone()),
    }
}

/// Sections that need evidence or data.
#[must_use]
pub fn filter_for_evidence(plan: &ArticlePlan) -> PlanView {
    let sections = plan
        .structure
        .iter()
        .filter(|s| !s.evidence_needs.is_empty() || has_focus(s, FOCUS_EVIDENCE_AND_METRICS))
        .cloned()
        .collect();
    PlanView {
        overview: OverviewView {
            target_audience: Some(plan.overview.target_audience.clone()),
            value_proposition: Some(plan.overview.value_proposition.clone()),
            ..OverviewView::default()
        },
        sections,
        visual_opportunities: vec![],
        tone_and_style: Some(plan.tone_and_style.clone()),
    }
}

/// Sections with conceptual distinctions or ethical considerations.
#[must_use]
pub fn filter_for_conceptual(plan: &ArticlePlan) -> PlanView {
    let sections = plan
        .structure
        .iter()
        .filter(|s| {
            !s.conceptual_distinctions.is_empty()
                || has_focus(s, FOCUS_CONCEPTUAL_DISTINCTIONS)
                || has_focus(s, FOCUS_ETHICAL_CONSIDERATIONS)
        })
        .cloned()
        .collect();
    PlanView {
        overview: OverviewView {
            key_message: Some(plan.overview.key_message.clone()),
            differentiation_strategy: Some(plan.overview.differentiation_strategy.clone()),
            ..OverviewView::default()
        },
        sections,
        visual_opportunities: vec![],
        tone_and_style: Some(plan.tone_and_style.clone()),
    }
}

/// What the conclusion writer needs: the conclusion section, i.e. the last
/// one whose title contains "conclusion" (case-insensitive, searched from the
/// end), falling back to the last section.
#[must_use]
pub fn filter_for_conclusion(plan: &ArticlePlan) -> PlanView {
    let section = plan
        .structure
        .iter()
        .rev()
        .find(|s| title_contains(s, "conclusion"))
        .or_else(|| plan.structure.last());
    PlanView {
        overview: OverviewView {
            key_message: Some(plan.overview.key_message.clone()),
            value_proposition: Some(plan.overview.value_proposition.clone()),
            ..OverviewView::default()
        },
        sections: section.cloned().into_iter().collect(),
        visual_opportunities: vec![],
        tone_and_style: Some(plan.tone_and_style.clone()),
    }
}

/// Visual opportunities plus all sections for placement context.
#[must_use]
pub fn filter_for_visuals(plan: &ArticlePlan) -> PlanView {
    PlanView {
        overview: OverviewView::full(&plan.overview),
        sections: plan.structure.clone(),
        visual_opportunities: plan.visual_opportunities.clone(),
        tone_and_style: Some(plan.tone_and_style.clone()),
    }
}

fn title_contains(section: &SectionPlan, needle: &str) -> bool {
    section.title.to_lowercase().contains(needle)
}

fn has_focus(section: &SectionPlan, focus: &str) -> bool {
    section.focus_areas.iter().any(|area| area == focus)
}
