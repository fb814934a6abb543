use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::report::AnalysisOptions;
use crate::signals::{DEFAULT_MAX_SUMMARIES, DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::tokenize::Segmentation;

pub const CONFIG_ENV: &str = "REPORT_CONFIG";
pub const CONFIG_DIR_ENV: &str = "REPORT_CONFIG_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_n: usize,
    pub window_days: u32,
    pub summaries: usize,
    pub timezone: String, // IANA name, decides what "today" is
    pub segmentation: Segmentation,
    pub max_records: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            window_days: DEFAULT_WINDOW_DAYS,
            summaries: DEFAULT_MAX_SUMMARIES,
            timezone: "Asia/Shanghai".to_string(),
            segmentation: Segmentation::Jieba,
            max_records: 5000,
        }
    }
}

impl AnalysisConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?} in analysis config: {}", self.timezone, e))
    }

    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.window_days > MAX_WINDOW_DAYS {
            return Err(anyhow!(
                "window_days {} in analysis config exceeds the maximum of {}",
                self.window_days,
                MAX_WINDOW_DAYS
            ));
        }
        Ok(())
    }

    pub fn options_for(&self, today: NaiveDate) -> Result<AnalysisOptions> {
        self.validate()?;
        let mut o = AnalysisOptions::new(today, self.timezone()?);
        o.top_n = self.top_n;
        o.window_days = self.window_days;
        o.max_summaries = self.summaries;
        o.segmentation = self.segmentation;
        Ok(o)
    }

    pub fn options_today(&self) -> Result<AnalysisOptions> {
        let tz = self.timezone()?;
        self.options_for(AnalysisOptions::today_in(tz).today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Api,
    Pdf,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub order: Vec<RendererKind>,
    pub api: Option<ApiRendererConfig>, // api renderer is skipped when absent
    pub pdf: Option<PdfRendererConfig>, // font pdf renderer is skipped when absent
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            order: vec![RendererKind::Api, RendererKind::Pdf, RendererKind::Placeholder],
            api: None,
            pdf: None,
        }
    }
}

/// HTML layout through an awful_aj chat template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRendererConfig {
    /// awful_aj config.yaml (api_base, api_key, model); falls back to
    /// `$AJ_CONFIG`, then `<aj config dir>/config.yaml`.
    pub aj_config: Option<PathBuf>,
    pub template: String,
    pub timeout_secs: u64,
    pub max_prompt_tokens: usize,
}

impl Default for ApiRendererConfig {
    fn default() -> Self {
        Self {
            aj_config: None,
            template: "report_html_designer".to_string(),
            timeout_secs: 30,
            max_prompt_tokens: 6000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfRendererConfig {
    /// TrueType font with CJK coverage, e.g. Noto Sans SC.
    pub font_path: PathBuf,
}

/// Where to look for the config file: explicit path, else `$REPORT_CONFIG`,
/// else `config.yaml` in the config dir if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    let base = match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::config_dir()?.join("corpus-report"),
    };
    let candidate = base.join("config.yaml");
    candidate.exists().then_some(candidate)
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Reading config {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let cfg: AppConfig =
        serde_yaml::from_str(&text).with_context(|| format!("Parsing config {}", path.display()))?;
    cfg.analysis.validate()?;
    Ok(cfg)
}

/// Load the effective configuration.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow!(
                    "config not found at {}\n\
                     Use --config to point at a config file, or set {}.\n\
                     Example config.yaml:\n\
                     analysis:\n  timezone: \"Asia/Shanghai\"\n\
                     render:\n  api:\n    template: \"report_html_designer\"\n  pdf:\n    font_path: \"/usr/share/fonts/noto/NotoSansSC-Regular.ttf\"\n",
                    path.display(),
                    CONFIG_ENV
                ));
            }
            debug!("Using config file: {}", path.display());
            load_config(&path)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_means_defaults() {
        let file = write_config("");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.analysis.top_n, 20);
        assert_eq!(
            cfg.render.order,
            vec![RendererKind::Api, RendererKind::Pdf, RendererKind::Placeholder]
        );
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let file = write_config(
            "analysis:\n  window_days: 3\n  segmentation: whitespace\nrender:\n  order: [pdf, placeholder]\n  api:\n    template: html_designer\n  pdf:\n    font_path: /fonts/NotoSansSC.ttf\n",
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.analysis.window_days, 3);
        assert_eq!(cfg.analysis.segmentation, Segmentation::Whitespace);
        assert_eq!(cfg.analysis.top_n, 20);
        assert_eq!(cfg.render.order, vec![RendererKind::Pdf, RendererKind::Placeholder]);
        let api = cfg.render.api.unwrap();
        assert_eq!(api.template, "html_designer");
        assert_eq!(api.timeout_secs, 30);
        assert!(api.aj_config.is_none());
        assert_eq!(cfg.render.pdf.unwrap().font_path, PathBuf::from("/fonts/NotoSansSC.ttf"));
    }

    #[test]
    fn empty_api_block_enables_the_api_renderer() {
        let file = write_config("render:\n  api: {}\n");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.render.api, Some(ApiRendererConfig::default()));
        assert!(cfg.render.pdf.is_none());
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let file = write_config("analysis:\n  timezone: Mars/Olympus\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid timezone"));
    }

    #[test]
    fn options_follow_config() {
        let cfg = AnalysisConfig {
            top_n: 7,
            window_days: 3,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let o = cfg.options_for(today).unwrap();
        assert_eq!((o.top_n, o.window_days, o.today), (7, 3, today));
        assert_eq!(o.timezone, chrono_tz::Asia::Shanghai);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let file = write_config("analysis:\n  window_days: 4000000000\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));

        let cfg = AnalysisConfig {
            window_days: MAX_WINDOW_DAYS + 1,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert!(cfg.options_for(today).is_err());

        let at_cap = AnalysisConfig {
            window_days: MAX_WINDOW_DAYS,
            ..Default::default()
        };
        assert_eq!(at_cap.options_for(today).unwrap().window_days, MAX_WINDOW_DAYS);
    }

    #[test]
    fn explicit_path_wins() {
        let p = Path::new("/tmp/somewhere/config.yaml");
        assert_eq!(resolve_config_path(Some(p)), Some(p.to_path_buf()));
    }
}
