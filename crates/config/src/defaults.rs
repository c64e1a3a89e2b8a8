pub fn default_service_name() -> String {
    "livescore".to_string()
}

pub fn default_environment() -> String {
    "development".to_string()
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8080
}

pub fn default_shutdown_timeout_secs() -> u64 {
    30
}

pub fn default_history_capacity() -> usize {
    50
}

pub fn default_over_buffer_capacity() -> usize {
    60
}

pub fn default_broadcast_capacity() -> usize {
    64
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
