#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub window_seconds: u64,
    pub repeat_threshold: usize,
    pub top_k: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}
