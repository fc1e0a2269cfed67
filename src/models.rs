#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Premium,
    Free,
}

#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    pub value: &'static str,
    pub label: &'static str,
    pub tier: Tier,
    pub icon: &'static str,
}

pub const DEFAULT_MODEL: &str = "deepseek";

pub const MODELS: &[ModelInfo] = &[
    ModelInfo { value: "claude", label: "Claude Sonnet 4", tier: Tier::Premium, icon: "🤖" },
    ModelInfo { value: "gpt-4", label: "GPT-4", tier: Tier::Premium, icon: "🧠" },
    ModelInfo { value: "gpt-3.5", label: "ChatGPT 3.5", tier: Tier::Free, icon: "💬" },
    ModelInfo { value: "gemini", label: "Gemini Pro", tier: Tier::Premium, icon: "✨" },
    ModelInfo { value: "deepseek", label: "DeepSeek", tier: Tier::Free, icon: "🔍" },
    ModelInfo { value: "perplexity", label: "Perplexity Sonar Pro", tier: Tier::Premium, icon: "🔮" },
    ModelInfo { value: "grok", label: "Grok 4", tier: Tier::Premium, icon: "⚡" },
];

pub fn find(value: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.value == value)
}

/// Display label, falling back to the raw identifier.
pub fn label(value: &str) -> &str {
    find(value).map(|m| m.label).unwrap_or(value)
}

pub fn list(out: &mut dyn std::io::Write) -> std::io::Result<()> {
    for m in MODELS {
        let tier = match m.tier {
            Tier::Premium => "premium",
            Tier::Free => "free",
        };
        writeln!(out, "{} {:<12}{:<24}{}", m.icon, m.value, m.label, tier)?;
    }
    Ok(())
}
