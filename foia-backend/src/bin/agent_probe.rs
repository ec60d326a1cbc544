//! Gateway probe
//!
//! A minimal harness for testing an OpenAI-compatible endpoint without
//! booting the full app. Sends one drafting prompt and prints the completion
//! and token usage.
//!
//! Usage:
//!   PROBE_PROMPT="records about bridge inspections" \
//!   LLM_ENDPOINT="https://api.openai.com/v1/chat/completions" \
//!   LLM_API_KEY="your-api-key" \
//!   LLM_MODEL="gpt-4o" \
//!   cargo run --bin agent_probe

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let prompt = env::var("PROBE_PROMPT").unwrap_or_else(|_| {
        eprintln!("PROBE_PROMPT not set, using default");
        "all inspection records for highway bridges in 2025".to_string()
    });
    let endpoint = env::var("LLM_ENDPOINT").unwrap_or_else(|_| {
        eprintln!("LLM_ENDPOINT not set!");
        std::process::exit(1);
    });
    let api_key = env::var("LLM_API_KEY").unwrap_or_else(|_| {
        eprintln!("LLM_API_KEY not set!");
        std::process::exit(1);
    });
    let model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

    println!("Probing {} with model {}", endpoint, model);

    let client = Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("Failed to create HTTP client");

    let request = ChatRequest {
        model,
        messages: vec![
            Message {
                role: "system".to_string(),
                content: "You are a FOIA request drafting expert.".to_string(),
            },
            Message {
                role: "user".to_string(),
                content: format!("Draft a FOIA request for: {}", prompt),
            },
        ],
        max_tokens: 1500,
    };

    let response = client
        .post(&endpoint)
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&request)
        .send()
        .await
        .unwrap_or_else(|e| {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        });

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        eprintln!("API error {}: {}", status, body);
        std::process::exit(1);
    }

    let parsed: ChatResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
        eprintln!("Failed to parse response: {} - body: {}", e, body);
        std::process::exit(1);
    });

    match parsed.choices.first().and_then(|c| c.message.content.as_ref()) {
        Some(content) => {
            println!("\n--- completion ---\n{}\n", content);
        }
        None => {
            eprintln!("Completion had no content");
            std::process::exit(1);
        }
    }

    if let Some(usage) = parsed.usage {
        println!(
            "tokens: {} prompt + {} completion = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
}
