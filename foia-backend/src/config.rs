use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub llm_api_key: String,
    pub llm_endpoint: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub gateway_timeout_secs: u64,
    pub gateway_max_retries: u32,
    pub worker_count: usize,
    /// Days after submission before a silent request counts as overdue
    pub overdue_threshold_days: i64,
    pub overdue_sweep_cron: String,
    pub analysis_sweep_cron: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/foia.db".to_string()),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_endpoint: env::var("LLM_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            llm_max_tokens: env::var("LLM_MAX_TOKENS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .expect("LLM_MAX_TOKENS must be a valid number"),
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("GATEWAY_TIMEOUT_SECS must be a valid number"),
            gateway_max_retries: env::var("GATEWAY_MAX_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("GATEWAY_MAX_RETRIES must be a valid number"),
            worker_count: env::var("AGENT_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("AGENT_WORKERS must be a valid number"),
            overdue_threshold_days: env::var("OVERDUE_THRESHOLD_DAYS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("OVERDUE_THRESHOLD_DAYS must be a valid number"),
            // sec min hour day month weekday
            overdue_sweep_cron: env::var("OVERDUE_SWEEP_CRON")
                .unwrap_or_else(|_| "0 0 9 * * *".to_string()),
            analysis_sweep_cron: env::var("ANALYSIS_SWEEP_CRON")
                .unwrap_or_else(|_| "0 0 */6 * * *".to_string()),
        }
    }
}
