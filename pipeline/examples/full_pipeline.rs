//! End-to-end run of the research -> gap analysis -> blog writing workflow.
//!
//! Uses the mock capabilities so it runs offline; swap in
//! `blogflow_sdk::openrouter::OpenRouterModel` (and a real search provider)
//! with credentials from `Config::load()` to run against live services.

use blogflow_pipeline::{
    gap, hunter, writer, Artifact, ArtifactStore, Pipeline, SharedState,
};
use blogflow_sdk::{
    testing::{hit, MockCompletionModel, MockSearchProvider},
    CompletionModel, SearchProvider,
};
use serde_json::json;
use std::sync::Arc;

fn mock_model() -> Arc<MockCompletionModel> {
    let model = MockCompletionModel::new();

    // data hunter: plan, structuring, synthesis
    model.enqueue_text(
        json!({
            "tasks": [{
                "search_query": "multi-agent content pipelines filetype:pdf site:.org",
                "source_pref": "academic",
                "freshness_window": "≤18 months",
                "reasoning": "primary literature on agent pipelines"
            }]
        })
        .to_string(),
    );
    model.enqueue_text(
        json!({
            "findings": [{
                "title": "Composing LLM agents",
                "snippet": "Sequential and parallel agent composition",
                "url": "https://example.org/agents.pdf",
                "source_type": "academic",
                "credibility_guess": "high",
                "tags": ["survey"],
                "task_id": 0
            }],
            "total_findings": 1,
            "tasks_executed": 1
        })
        .to_string(),
    );
    model.enqueue_text("# Data analysis\n\nAgent pipelines are maturing fast.");

    // gap analyzer: interpretation, serp structuring, synthesis
    model.enqueue_text(
        json!({
            "original_query": "multi-agent content pipelines",
            "search_strings": ["multi-agent blog writing pipeline"],
            "rationale": "single focused query suffices"
        })
        .to_string(),
    );
    model.enqueue_text(
        json!({
            "total_results": 1,
            "results": [{
                "title": "Writing with agents",
                "snippet": "A tutorial",
                "url": "https://example.com/tutorial",
                "focus_area": "tutorial"
            }],
            "themes": ["tutorials dominate"],
            "patterns": "mostly beginner content, little depth"
        })
        .to_string(),
    );
    model.enqueue_text("# Gap analysis\n\nDepth on orchestration is missing.");

    // blog writer: plan, five sections, final article
    model.enqueue_text(
        json!({
            "overview": {
                "target_audience": "engineering leads",
                "purpose": "explain agent pipeline orchestration",
                "key_message": "structure beats prompt size",
                "value_proposition": "a working mental model",
                "differentiation_strategy": "go deep where tutorials stay shallow"
            },
            "structure": [
                {
                    "title": "Introduction",
                    "description": "why orchestration matters",
                    "estimated_word_count": 300,
                    "key_points": ["the gap"],
                    "evidence_needs": [],
                    "technical_depth": "low",
                    "practical_examples": [],
                    "conceptual_distinctions": [],
                    "focus_areas": []
                },
                {
                    "title": "Pipeline Architecture",
                    "description": "stages, state, and barriers",
                    "estimated_word_count": 900,
                    "key_points": ["shared state", "parallel groups"],
                    "evidence_needs": ["adoption numbers"],
                    "technical_depth": "high",
                    "practical_examples": ["worked example"],
                    "conceptual_distinctions": ["orchestration vs choreography"],
                    "focus_areas": ["technical_implementation"]
                },
                {
                    "title": "Conclusion",
                    "description": "takeaways",
                    "estimated_word_count": 200,
                    "key_points": [],
                    "evidence_needs": [],
                    "technical_depth": "none",
                    "practical_examples": [],
                    "conceptual_distinctions": [],
                    "focus_areas": []
                }
            ],
            "focus_areas_mapping": {
                "technical_implementation": ["Pipeline Architecture"],
                "evidence_and_metrics": ["Pipeline Architecture"],
                "conceptual_distinctions": ["Pipeline Architecture"],
                "ethical_considerations": []
            },
            "visual_opportunities": [{
                "type": "diagram",
                "description": "pipeline topology",
                "suggested_location": "Pipeline Architecture",
                "purpose": "show the barrier"
            }],
            "tone_and_style": {
                "professional_tone": "measured",
                "technical_accessibility_balance": "define terms on first use",
                "critical_thinking": "name the tradeoffs",
                "evidence_based_approach": "link sources"
            }
        })
        .to_string(),
    );
    // The five writers run in parallel and drain the queue in completion
    // order, so the drafts are interchangeable here.
    for _ in 0..5 {
        model.enqueue_text("## Drafted section\n\nSection content.");
    }
    model.enqueue_text("# Agent Pipelines, Properly\n\nThe finished article.");

    Arc::new(model)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = ArtifactStore::open_default()?;
    let mut state = SharedState::new();
    state.set(
        hunter::RESEARCH_BRIEF_KEY,
        Artifact::Markdown("multi-agent content pipelines".to_string()),
    );

    let model: Arc<dyn CompletionModel> = mock_model();
    let search_provider = Arc::new(MockSearchProvider::new());
    search_provider.enqueue_hits(vec![hit(
        "Composing LLM agents",
        "Sequential and parallel agent composition",
        "https://example.org/agents.pdf",
    )]);
    search_provider.enqueue_hits(vec![hit(
        "Writing with agents",
        "A tutorial",
        "https://example.com/tutorial",
    )]);
    let search: Arc<dyn SearchProvider> = search_provider;

    let workflow = Pipeline::builder("blog_research_workflow")
        .pipeline(hunter::data_hunter_pipeline(&model, &search)?)
        .pipeline(gap::gap_analyzer_pipeline(&model, &search)?)
        .pipeline(writer::blog_writing_pipeline(&model)?)
        .build()?;

    let report = workflow.run(&mut state, &store).await?;
    println!(
        "completed {} stages (invocation {})",
        report.completed.len(),
        report.invocation_id
    );

    if let Some(article) = state.markdown(writer::BLOG_ARTICLE_KEY) {
        println!("\n{article}");
    }
    println!(
        "\nartifacts written under {}",
        store.root().display()
    );
    Ok(())
}
