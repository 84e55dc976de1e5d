use blogflow_pipeline::writer::{
    filter_for_conceptual, filter_for_conclusion, filter_for_evidence, filter_for_introduction,
    filter_for_technical, filter_for_visuals, ArticleOverview, ArticlePlan, FocusAreasMapping,
    PlanView, SectionPlan, TechnicalDepth, ToneAndStyle, VisualOpportunity,
    FOCUS_EVIDENCE_AND_METRICS, FOCUS_TECHNICAL_IMPLEMENTATION,
};

fn overview() -> ArticleOverview {
    ArticleOverview {
        target_audience: "engineering leads".to_string(),
        purpose: "explain the topic".to_string(),
        key_message: "the key message".to_string(),
        value_proposition: "the value proposition".to_string(),
        differentiation_strategy: "the differentiation strategy".to_string(),
    }
}

fn tone() -> ToneAndStyle {
    ToneAndStyle {
        professional_tone: "professional".to_string(),
        technical_accessibility_balance: "balanced".to_string(),
        critical_thinking: "balanced perspectives".to_string(),
        evidence_based_approach: "cite sources".to_string(),
    }
}

fn section(title: &str, depth: TechnicalDepth) -> SectionPlan {
    SectionPlan {
        title: title.to_string(),
        description: format!("covers {title}"),
        estimated_word_count: 400,
        key_points: vec![],
        evidence_needs: vec![],
        technical_depth: depth,
        practical_examples: vec![],
        conceptual_distinctions: vec![],
        focus_areas: vec![],
    }
}

fn plan(sections: Vec<SectionPlan>) -> ArticlePlan {
    ArticlePlan {
        overview: overview(),
        structure: sections,
        focus_areas_mapping: FocusAreasMapping::default(),
        visual_opportunities: vec![],
        tone_and_style: tone(),
    }
}

fn assert_strict_narrowing(view: &PlanView, plan: &ArticlePlan) {
    for filtered in &view.sections {
        let source = plan
            .structure
            .iter()
            .find(|s| s.title == filtered.title)
            .unwrap_or_else(|| panic!("section `{}` not in source plan", filtered.title));
        assert_eq!(filtered, source, "section `{}` was altered", filtered.title);
    }
}

#[test]
fn introduction_selects_titled_section() {
    let plan = plan(vec![
        section("Overview", TechnicalDepth::Low),
        section("Introduction to X", TechnicalDepth::Low),
        section("Deep Dive", TechnicalDepth::High),
    ]);
    let view = filter_for_introduction(&plan);
    assert_eq!(view.sections.len(), 1);
    assert_eq!(view.sections[0].title, "Introduction to X");
    assert_strict_narrowing(&view, &plan);
}

#[test]
fn introduction_falls_back_to_first_section() {
    let plan = plan(vec![
        section("Overview", TechnicalDepth::Low),
        section("Deep Dive", TechnicalDepth::High),
    ]);
    let view = filter_for_introduction(&plan);
    assert_eq!(view.sections[0].title, "Overview");
}

#[test]
fn introduction_passes_full_overview_and_tone() {
    let plan = plan(vec![section("Intro", TechnicalDepth::Low)]);
    let view = filter_for_introduction(&plan);
    assert_eq!(
        view.overview.target_audience.as_deref(),
        Some("engineering leads")
    );
    assert_eq!(
        view.overview.differentiation_strategy.as_deref(),
        Some("the differentiation strategy")
    );
    assert_eq!(view.tone_and_style.as_ref(), Some(&plan.tone_and_style));
}

#[test]
fn conclusion_selects_titled_section_from_end() {
    let plan = plan(vec![
        section("Conclusion of the survey", TechnicalDepth::Low),
        section("Middle", TechnicalDepth::Low),
        section("Final Conclusions", TechnicalDepth::Low),
        section("Appendix", TechnicalDepth::Low),
    ]);
    let view = filter_for_conclusion(&plan);
    assert_eq!(view.sections[0].title, "Final Conclusions");
}

#[test]
fn conclusion_falls_back_to_last_section() {
    let plan = plan(vec![
        section("Intro", TechnicalDepth::Low),
        section("Wrapping Up", TechnicalDepth::Low),
    ]);
    let view = filter_for_conclusion(&plan);
    assert_eq!(view.sections[0].title, "Wrapping Up");
}

#[test]
fn conclusion_overview_is_narrowed() {
    let plan = plan(vec![section("End", TechnicalDepth::Low)]);
    let view = filter_for_conclusion(&plan);
    assert!(view.overview.key_message.is_some());
    assert!(view.overview.value_proposition.is_some());
    assert!(view.overview.target_audience.is_none());
    assert!(view.overview.purpose.is_none());
    assert!(view.overview.differentiation_strategy.is_none());
}

#[test]
fn technical_filter_excludes_depth_none_without_focus() {
    let mut shallow = section("Background", TechnicalDepth::None);
    shallow.focus_areas = vec![];
    let plan = plan(vec![
        shallow,
        section("Implementation", TechnicalDepth::Medium),
        section("Internals", TechnicalDepth::High),
    ]);
    let view = filter_for_technical(&plan);
    let titles: Vec<_> = view.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Implementation", "Internals"]);
    assert_strict_narrowing(&view, &plan);
}

#[test]
fn technical_filter_includes_focus_area_regardless_of_depth() {
    let mut focused = section("Rollout Guide", TechnicalDepth::None);
    focused.focus_areas = vec![FOCUS_TECHNICAL_IMPLEMENTATION.to_string()];
    let plan = plan(vec![focused, section("History", TechnicalDepth::Low)]);
    let view = filter_for_technical(&plan);
    let titles: Vec<_> = view.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Rollout Guide"]);
}

#[test]
fn technical_overview_keeps_audience_and_key_message_only() {
    let plan = plan(vec![section("Impl", TechnicalDepth::High)]);
    let view = filter_for_technical(&plan);
    assert!(view.overview.target_audience.is_some());
    assert!(view.overview.key_message.is_some());
    assert!(view.overview.purpose.is_none());
    assert!(view.overview.value_proposition.is_none());
}

#[test]
fn evidence_filter_matches_needs_or_focus() {
    let mut with_needs = section("Benchmarks", TechnicalDepth::Low);
    with_needs.evidence_needs = vec!["latency numbers".to_string()];
    let mut with_focus = section("Market Size", TechnicalDepth::None);
    with_focus.focus_areas = vec![FOCUS_EVIDENCE_AND_METRICS.to_string()];
    let plain = section("Opinion", TechnicalDepth::None);
    let plan = plan(vec![with_needs, with_focus, plain]);

    let view = filter_for_evidence(&plan);
    let titles: Vec<_> = view.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Benchmarks", "Market Size"]);
    assert_strict_narrowing(&view, &plan);
}

#[test]
fn conceptual_filter_matches_distinctions_or_ethics_focus() {
    let mut with_distinctions = section("Definitions", TechnicalDepth::Low);
    with_distinctions.conceptual_distinctions = vec!["A vs B".to_string()];
    let mut with_ethics = section("Risks", TechnicalDepth::None);
    with_ethics.focus_areas = vec!["ethical_considerations".to_string()];
    let plain = section("Setup", TechnicalDepth::Medium);
    let plan = plan(vec![with_distinctions, with_ethics, plain]);

    let view = filter_for_conceptual(&plan);
    let titles: Vec<_> = view.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Definitions", "Risks"]);
}

#[test]
fn visuals_filter_passes_everything_through() {
    let mut plan = plan(vec![
        section("One", TechnicalDepth::Low),
        section("Two", TechnicalDepth::High),
    ]);
    plan.visual_opportunities = vec![VisualOpportunity {
        kind: "diagram".to_string(),
        description: "architecture sketch".to_string(),
        suggested_location: "Two".to_string(),
        purpose: "orient the reader".to_string(),
    }];
    let view = filter_for_visuals(&plan);
    assert_eq!(view.sections.len(), 2);
    assert_eq!(view.visual_opportunities, plan.visual_opportunities);
    assert_strict_narrowing(&view, &plan);
}

#[test]
fn empty_structure_yields_empty_views() {
    let plan = plan(vec![]);
    for view in [
        filter_for_introduction(&plan),
        filter_for_technical(&plan),
        filter_for_evidence(&plan),
        filter_for_conceptual(&plan),
        filter_for_conclusion(&plan),
    ] {
        assert!(view.sections.is_empty());
        assert!(view.tone_and_style.is_some());
    }
}

#[test]
fn filters_do_not_mutate_the_plan() {
    let original = plan(vec![
        section("Introduction", TechnicalDepth::Low),
        section("Conclusion", TechnicalDepth::Low),
    ]);
    let copy = original.clone();
    let _ = filter_for_introduction(&original);
    let _ = filter_for_conclusion(&original);
    let _ = filter_for_technical(&original);
    assert_eq!(original, copy);
}
