//! Built-in provider families.

/// How a template routes the agent to its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvRule {
    /// `ANTHROPIC_BASE_URL` + `ANTHROPIC_AUTH_TOKEN`, no `ANTHROPIC_API_KEY`
    DefaultBearerToken,
    /// Default bearer routing plus the key in a family-specific variable
    BearerTokenPlusFamilyKey { key_var: &'static str },
    /// Local server accepting a fixed placeholder key
    LocalFixedKey,
    /// Routing is handled by the OAuth token, nothing to set
    OAuthNoop,
}

impl EnvRule {
    pub fn family_key_var(&self) -> Option<&'static str> {
        match self {
            EnvRule::BearerTokenPlusFamilyKey { key_var } => Some(key_var),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTemplate {
    pub id: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
    pub default_models: &'static [&'static str],
    /// Static entries applied on top of the routing variables
    pub extra_env: &'static [(&'static str, &'static str)],
    /// Key used when the user doesn't provide one
    pub default_api_key: Option<&'static str>,
    pub env_rule: EnvRule,
}

impl ProviderTemplate {
    pub fn is_oauth(&self) -> bool {
        self.env_rule == EnvRule::OAuthNoop
    }

    pub fn is_local(&self) -> bool {
        self.env_rule == EnvRule::LocalFixedKey
    }
}

pub const ANTHROPIC_TEMPLATE_ID: &str = "anthropic";

const NONESSENTIAL: (&str, &str) = ("CLAUDE_CODE_DISABLE_NONESSENTIAL_TRAFFIC", "1");
const LONG_TIMEOUT: (&str, &str) = ("API_TIMEOUT_MS", "600000");

pub static TEMPLATES: &[ProviderTemplate] = &[
    ProviderTemplate {
        id: ANTHROPIC_TEMPLATE_ID,
        description: "Anthropic (OAuth)",
        base_url: "",
        default_models: &[],
        extra_env: &[],
        default_api_key: None,
        env_rule: EnvRule::OAuthNoop,
    },
    ProviderTemplate {
        id: "alibaba",
        description: "Alibaba Cloud Model Studio",
        base_url: "https://coding-intl.dashscope.aliyuncs.com/apps/anthropic",
        default_models: &[
            "qwen3-coder-next",
            "qwen3-coder-plus",
            "qwen3.5-plus",
            "qwen3-max-2026-01-23",
            "glm-4.7",
            "kimi-k2.5",
        ],
        extra_env: &[NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "deepseek",
        description: "DeepSeek",
        base_url: "https://api.deepseek.com/anthropic",
        default_models: &["deepseek-chat", "deepseek-reasoner"],
        extra_env: &[LONG_TIMEOUT, NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "minimax",
        description: "MiniMax",
        base_url: "https://api.minimax.io/anthropic",
        default_models: &[
            "MiniMax-M2.5-highspeed",
            "MiniMax-M2.5",
            "MiniMax-M2.1",
            "MiniMax-M2",
        ],
        extra_env: &[NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "moonshot",
        description: "Moonshot AI",
        base_url: "https://api.moonshot.ai/anthropic",
        default_models: &[
            "kimi-k2.5",
            "kimi-k2-0905-preview",
            "kimi-k2-0711-preview",
            "kimi-k2-turbo-preview",
            "kimi-k2-thinking",
            "kimi-k2-thinking-turbo",
        ],
        extra_env: &[NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "novita",
        description: "Novita AI",
        base_url: "https://api.novita.ai/anthropic",
        default_models: &[
            "deepseek/deepseek-v3.2",
            "deepseek/deepseek-v3.2-exp",
            "deepseek/deepseek-v3.1-terminus",
            "deepseek/deepseek-v3.1",
            "deepseek/deepseek-v3-0324",
            "minimax/minimax-m2.5",
            "minimax/minimax-m2.1",
            "minimax/minimax-m2",
            "moonshotai/kimi-k2.5",
            "moonshotai/kimi-k2-thinking",
            "moonshotai/kimi-k2-0905",
            "moonshotai/kimi-k2-instruct",
            "qwen/qwen3-coder-next",
            "qwen/qwen3-coder-480b-a35b-instruct",
            "qwen/qwen3-next-80b-a3b-instruct",
            "qwen/qwen3-next-80b-a3b-thinking",
            "qwen/qwen3-235b-a22b-thinking-2507",
            "zai-org/glm-5",
            "zai-org/glm-4.7",
            "zai-org/glm-4.6v",
            "zai-org/glm-4.6",
            "xiaomimimo/mimo-v2-flash",
        ],
        extra_env: &[NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "openrouter",
        description: "OpenRouter",
        base_url: "https://openrouter.ai/api",
        default_models: &[],
        extra_env: &[],
        default_api_key: None,
        env_rule: EnvRule::BearerTokenPlusFamilyKey {
            key_var: "OPENROUTER_API_KEY",
        },
    },
    ProviderTemplate {
        id: "poe",
        description: "Poe",
        base_url: "https://api.poe.com",
        default_models: &[
            "claude-sonnet-4.5",
            "claude-opus-4.5",
            "claude-haiku-4.5",
            "claude-opus-4.1",
            "claude-sonnet-4",
            "claude-opus-4",
            "claude-sonnet-3.7",
            "claude-haiku-3.5",
            "claude-haiku-3",
        ],
        extra_env: &[NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "requesty",
        description: "Requesty",
        base_url: "https://router.requesty.ai",
        default_models: &[],
        extra_env: &[NONESSENTIAL],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "zai",
        description: "Z.AI",
        base_url: "https://api.z.ai/api/anthropic",
        default_models: &[
            "GLM-5",
            "GLM-5-Code",
            "GLM-4.7",
            "GLM-4.7-FlashX",
            "GLM-4.6",
            "GLM-4.5",
            "GLM-4.5-X",
            "GLM-4.5-Air",
            "GLM-4.5-AirX",
            "GLM-4-32B-0414-128K",
            "GLM-4.7-Flash",
            "GLM-4.5-Flash",
        ],
        extra_env: &[("API_TIMEOUT_MS", "3000000")],
        default_api_key: None,
        env_rule: EnvRule::DefaultBearerToken,
    },
    ProviderTemplate {
        id: "llamacpp",
        description: "llama.cpp (Local)",
        base_url: "http://127.0.0.1:8080",
        default_models: &[],
        extra_env: &[NONESSENTIAL, LONG_TIMEOUT],
        default_api_key: Some("llamacpp"),
        env_rule: EnvRule::LocalFixedKey,
    },
    ProviderTemplate {
        id: "lmstudio",
        description: "LM Studio (Local)",
        base_url: "http://localhost:1234",
        default_models: &[],
        extra_env: &[NONESSENTIAL, LONG_TIMEOUT],
        default_api_key: Some("lmstudio"),
        env_rule: EnvRule::LocalFixedKey,
    },
    ProviderTemplate {
        id: "ollama",
        description: "Ollama (Local)",
        base_url: "http://localhost:11434",
        default_models: &[],
        extra_env: &[NONESSENTIAL, LONG_TIMEOUT],
        default_api_key: Some("ollama"),
        env_rule: EnvRule::LocalFixedKey,
    },
];

pub fn template_by_id(id: &str) -> Option<&'static ProviderTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}
