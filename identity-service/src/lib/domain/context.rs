/// What the core knows about the request being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestContext {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }
}
