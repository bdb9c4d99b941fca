//! Centralized prompt construction for all pipeline stages.
//!
//! Every prompt sent to the LLM is built here so there is exactly one place
//! to review, audit, and test the strings that reach the model.
//!
//! Each stage has a template function in [`template_for`]. A template takes
//! the job title and a pre-rendered context block holding every earlier
//! stage's output, so adding a stage means adding a template, not touching
//! pipeline control flow.
//!
//! # Injection risk
//!
//! The job title is user input and earlier outputs are model text. Earlier
//! outputs are wrapped in per-stage `---TAG---` fences so the model can tell
//! payload from instructions. The fences are static strings; output that
//! reproduces a fence line verbatim may still confuse the model.

use crate::report::Section;
use crate::stage::Stage;

/// Template signature: `(job_title, context_block) -> prompt`.
pub type TemplateFn = fn(&str, &str) -> String;

/// Look up the template for a stage.
pub fn template_for(stage: Stage) -> TemplateFn {
    match stage {
        Stage::Description => description,
        Stage::Missions => missions,
        Stage::Technologies => technologies,
        Stage::Enhancements => enhancements,
        Stage::TransitionPlan => transition_plan,
    }
}

/// Build the prompt for `stage` from the job title and earlier results.
///
/// Only sections whose stage precedes `stage` are embedded; anything else in
/// `prior` is ignored.
pub fn build(stage: Stage, job_title: &str, prior: &[Section]) -> String {
    let context = context_block(stage, prior);
    template_for(stage)(job_title, &context)
}

/// Render all five prompts with stage placeholders in place of model output.
///
/// Used by `jobshift prompts` to show what will be sent without calling the
/// LLM.
pub fn preview(job_title: &str) -> Vec<(Stage, String)> {
    let placeholders: Vec<Section> = Stage::ALL
        .iter()
        .map(|&stage| Section {
            stage,
            text: stage.placeholder().to_owned(),
        })
        .collect();

    Stage::ALL
        .iter()
        .map(|&stage| (stage, build(stage, job_title, &placeholders)))
        .collect()
}

/// Fence every earlier section under its label. Empty for the first stage.
fn context_block(stage: Stage, prior: &[Section]) -> String {
    let mut block = String::new();
    for section in prior.iter().filter(|s| s.stage < stage) {
        let delim = section.stage.delimiter();
        block.push_str(&format!(
            "\n\n{label}:\n\
             {delim}\n\
             {text}\n\
             {delim}",
            label = section.stage.label().to_uppercase(),
            text = section.text,
        ));
    }
    block
}

fn description(job_title: &str, _context: &str) -> String {
    format!(
        "Generate a concise job description for a {job_title}.\n\
         Include key responsibilities, required skills, and typical industries.\n\
         Format the output clearly with bullet points.\n\
         Keep your response under 200 words and focus on the most essential information.\n\
         Use short, clear sentences and avoid unnecessary jargon."
    )
}

fn missions(job_title: &str, context: &str) -> String {
    format!(
        "Using ONLY the context provided below about the {job_title} role, extract:\n\
         - 3 key missions (numbered) - one sentence each\n\
         - 5 main deliverables (bullet points) - one sentence each\n\
         - 7 critical daily tasks (bullet points) - keep to 5-7 words each\n\n\
         Do not add any information that is not directly derived from the context.\n\
         Keep your entire response under 250 words.\n\
         Use clear, direct language and avoid unnecessary elaboration.\
         {context}"
    )
}

fn technologies(job_title: &str, context: &str) -> String {
    format!(
        "Based on the context below, recommend 5 specific technologies and tools that would enhance the {job_title} role.\n\
         For each technology, provide a single concise paragraph (2-3 sentences) that includes:\n\
         1) What it is and what it does\n\
         2) How it specifically helps with this job role\n\
         3) Approximate learning curve (easy/medium/difficult)\n\
         4) Whether it's free/paid/open-source\n\n\
         Format as a bulleted list with exactly 5 recommendations.\n\
         Keep your entire response under 300 words.\n\
         Focus on the most impactful technologies rather than covering everything possible.\
         {context}"
    )
}

fn enhancements(job_title: &str, context: &str) -> String {
    format!(
        "Concisely explain how AI can augment and improve the {job_title} role described below.\n\
         Provide in bullet point format:\n\
         1) Specific AI tools that could be used (3-4 tools, one sentence each)\n\
         2) Automation opportunities (3-4 points, one sentence each)\n\
         3) Efficiency gains (3-4 points, one sentence each)\n\
         4) Risks to consider (3-4 points, one sentence each)\n\n\
         Keep your entire response under 300 words.\n\
         Use clear, direct language with no unnecessary elaboration.\n\
         Focus on practical, actionable insights rather than theoretical possibilities.\
         {context}"
    )
}

fn transition_plan(job_title: &str, context: &str) -> String {
    format!(
        "You are a specialized AI transformation consultant with expertise in helping professionals transition to AI-augmented roles.\n\
         Your task is to create a concise, practical, and actionable transition plan for a {job_title} to evolve into an AI-augmented professional.\n\n\
         First, analyze the following context carefully:\
         {context}\n\n\
         Then, create a focused transition roadmap with the following sections, keeping the ENTIRE response under 600 words:\n\n\
         1) SKILLS DEVELOPMENT PLAN (25% of your response):\n\
         \x20  - TECHNICAL SKILLS: List 3 specific technical skills most relevant for this role. For each, provide a one-sentence explanation of importance.\n\
         \x20  - SOFT SKILLS: List 3 critical soft skills needed when working with AI. One sentence each.\n\
         \x20  - LEARNING RESOURCES: For each skill, recommend ONE specific resource (course, book, or certification).\n\n\
         2) AI TOOLS IMPLEMENTATION STRATEGY (25% of your response):\n\
         \x20  - IMMEDIATE ADOPTION (First 30 days): List 2 user-friendly AI tools with one-sentence descriptions.\n\
         \x20  - INTERMEDIATE ADOPTION (2-3 months): List 2 more advanced tools with one-sentence descriptions.\n\
         \x20  - ADVANCED ADOPTION (6-12 months): List 1 sophisticated AI solution with a one-sentence description.\n\
         \x20  - For each tool, only note whether it's free/paid/open-source.\n\n\
         3) PSYCHOLOGICAL & ORGANIZATIONAL ADAPTATION (25% of your response):\n\
         \x20  - MINDSET EVOLUTION: 2-3 sentences on required mindset shifts.\n\
         \x20  - RESISTANCE MANAGEMENT: List 2 common resistance points with one-sentence strategies to overcome each.\n\
         \x20  - ETHICAL CONSIDERATIONS: List 1 key ethical consideration with a one-sentence recommendation.\n\n\
         4) PHASED IMPLEMENTATION PLAN (25% of your response):\n\
         \x20  - FIRST 30 DAYS: 2-3 bullet points with specific goals.\n\
         \x20  - 2-3 MONTHS: 2-3 bullet points with specific goals.\n\
         \x20  - 6-12 MONTHS: 2-3 bullet points with specific goals.\n\
         \x20  - SUCCESS METRICS: List 3 specific metrics (one sentence each).\n\n\
         Format your response with clear headings and bullet points. Use extremely concise language. \
         Make all recommendations highly specific to the {job_title} role, not generic advice. \
         Prioritize brevity and clarity over comprehensiveness."
    )
}
