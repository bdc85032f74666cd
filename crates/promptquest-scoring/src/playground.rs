//! Prompt playground
//!
//! Runs a prompt through the whole teaching pipeline at once: tokenize,
//! score, and return a canned "model output" picked by keyword.

use promptquest_common::ScoreResult;
use serde::Serialize;

use crate::prompt::score_prompt;
use crate::tokenizer::{tokenize, Tokenization};

const OUTPUT_DEFAULT: &str = "Based on your prompt, here is a simulated AI response. In a real LLM, this would be generated token-by-token using billions of parameters learned from vast amounts of training data.";
const OUTPUT_EXPLAIN: &str = "Here's an explanation: The concept works by breaking down complex information into simpler components. Each step builds on the previous one, creating a chain of understanding that makes the topic accessible to learners.";
const OUTPUT_LIST: &str = "Here are the key points:\n1. First important aspect\n2. Second crucial element\n3. Third key consideration\n4. Fourth relevant factor\n5. Fifth supporting detail";
const OUTPUT_CODE: &str = "```python\n# Simulated code output\ndef solution():\n    # This is where the AI would generate actual code\n    # based on your specific requirements\n    return 'Hello from PromptQuest!'\n```";
const OUTPUT_STORY: &str = "Once upon a time, in a world where knowledge was power, a young learner discovered the secrets of artificial intelligence. Through patience and curiosity, they mastered the art of prompting...";

/// Keyword groups checked in order; first hit wins
const OUTPUT_RULES: &[(&[&str], &str)] = &[
    (&["code", "function", "program", "write a"], OUTPUT_CODE),
    (&["list", "steps", "enumerate", "give me"], OUTPUT_LIST),
    (&["explain", "what is", "how does", "describe"], OUTPUT_EXPLAIN),
    (&["story", "once", "narrative", "tell"], OUTPUT_STORY),
];

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStep {
    pub step: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaygroundAnalysis {
    pub prompt: String,
    pub tokens: Tokenization,
    pub score: ScoreResult,
    pub simulated_output: &'static str,
    pub pipeline_steps: Vec<PipelineStep>,
}

/// Pick the canned response for a prompt
pub fn simulate_output(prompt: &str) -> &'static str {
    let lower = prompt.to_lowercase();
    OUTPUT_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(_, output)| *output)
        .unwrap_or(OUTPUT_DEFAULT)
}

pub fn analyze(prompt: &str) -> PlaygroundAnalysis {
    let tokens = tokenize(prompt);
    let score = score_prompt(prompt);

    let pipeline_steps = vec![
        PipelineStep {
            step: "Input",
            description: "Your prompt is received".to_string(),
        },
        PipelineStep {
            step: "Tokenization",
            description: format!("Split into {} tokens", tokens.token_count),
        },
        PipelineStep {
            step: "Embedding",
            description: "Each token converted to a vector".to_string(),
        },
        PipelineStep {
            step: "Attention",
            description: "Transformer computes relationships".to_string(),
        },
        PipelineStep {
            step: "Generation",
            description: "Output generated token by token".to_string(),
        },
    ];

    PlaygroundAnalysis {
        prompt: prompt.to_string(),
        tokens,
        score,
        simulated_output: simulate_output(prompt),
        pipeline_steps,
    }
}
