use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub llm: Option<LlmConfig>,
    pub ocr: Option<OcrConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_input_chars: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    pub language: Option<String>,
    pub dpi: Option<u32>,
    pub max_pages: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Strategy wire names ("layer_a", "layer_b", "layer_c", "ocr") to
    /// leave out of the cascade.
    pub disabled: Option<Vec<String>>,
    pub max_file_size_mb: Option<u64>,
}

/// Platform config directory path: `<config_dir>/ratecon/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ratecon").join("config.toml"))
}

/// Load config by cascading CWD `.ratecon.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".ratecon.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        llm: Some(LlmConfig {
            api_key: overlay
                .llm
                .as_ref()
                .and_then(|l| l.api_key.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.api_key.clone())),
            model: overlay
                .llm
                .as_ref()
                .and_then(|l| l.model.clone())
                .or_else(|| base.llm.as_ref().and_then(|l| l.model.clone())),
            max_input_chars: overlay
                .llm
                .as_ref()
                .and_then(|l| l.max_input_chars)
                .or_else(|| base.llm.as_ref().and_then(|l| l.max_input_chars)),
            timeout_secs: overlay
                .llm
                .as_ref()
                .and_then(|l| l.timeout_secs)
                .or_else(|| base.llm.as_ref().and_then(|l| l.timeout_secs)),
        }),
        ocr: Some(OcrConfig {
            language: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.language.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.language.clone())),
            dpi: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.dpi)
                .or_else(|| base.ocr.as_ref().and_then(|o| o.dpi)),
            max_pages: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.max_pages)
                .or_else(|| base.ocr.as_ref().and_then(|o| o.max_pages)),
        }),
        extraction: Some(ExtractionConfig {
            disabled: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.disabled.clone())
                .or_else(|| base.extraction.as_ref().and_then(|e| e.disabled.clone())),
            max_file_size_mb: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.max_file_size_mb)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.max_file_size_mb)),
        }),
    }
}
