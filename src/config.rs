use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

use crate::chart::ChartKind;

pub const DEFAULT_PROJECT: &str = "en.wikipedia.org";
pub const DEFAULT_TEMPLATE: &str = "visualize";
pub const DEFAULT_CHART: &str = "pie";
pub const DEFAULT_X_CAPTION: &str = "x axis";
pub const DEFAULT_Y_CAPTION: &str = "y axis";
pub const DEFAULT_GROUP: &str = "Labels";

/// Template name that switches to the `{{dataset}}` motion chart.
pub const MOTION_TEMPLATE: &str = "visualize";

pub const AUTHORISED_DOMAINS: &[&str] = &[
    "wikipedia.org",
    "wikimedia.org",
    "wikibooks.org",
    "wikiquote.org",
    "mediawiki.org",
    "wikinews.org",
    "wiktionary.org",
    "wikisource.org",
    "wikiversity.org",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("{0} is not an authorised domain name; project should look like en.wikipedia.org")]
    UnauthorisedDomain(String),
    #[error("chart type \"{0}\" is not valid (expected pie, bar, col, line, scatter or area)")]
    InvalidChartType(String),
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Which pipeline a request goes through.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Table { template: String, kind: ChartKind },
    Motion {
        x_caption: String,
        y_caption: String,
        group: String,
    },
}

/// A fully resolved request: what to fetch and how to chart it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    /// Page title as sent to the API, spaces replaced by underscores.
    pub page: String,
    pub display_name: String,
    pub project: String,
    pub title: String,
    pub mode: Mode,
    pub strict_rows: bool,
}

/// Unvalidated settings from one source. Later sources override earlier ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestSettings {
    pub page: Option<String>,
    pub project: Option<String>,
    pub template: Option<String>,
    pub chart: Option<String>,
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub group: Option<String>,
    pub strict: Option<bool>,
}

impl RequestSettings {
    /// Read `WIKIVIZ_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(Environment::with_prefix("WIKIVIZ"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn merge(self, over: RequestSettings) -> Self {
        RequestSettings {
            page: over.page.or(self.page),
            project: over.project.or(self.project),
            template: over.template.or(self.template),
            chart: over.chart.or(self.chart),
            title: over.title.or(self.title),
            x: over.x.or(self.x),
            y: over.y.or(self.y),
            group: over.group.or(self.group),
            strict: over.strict.or(self.strict),
        }
    }

    pub fn resolve(self) -> Result<ChartRequest, ConfigError> {
        let page = self
            .page
            .map(|p| p.trim().replace(' ', "_"))
            .filter(|p| !p.is_empty() && p != "_")
            .ok_or(ConfigError::MissingParameter("page"))?;
        let display_name = page.replace('_', " ");

        let project = self.project.unwrap_or_else(|| DEFAULT_PROJECT.to_string());
        check_domain(&project)?;

        let template = self.template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        let mode = if template.eq_ignore_ascii_case(MOTION_TEMPLATE) {
            Mode::Motion {
                x_caption: self.x.unwrap_or_else(|| DEFAULT_X_CAPTION.to_string()),
                y_caption: self.y.unwrap_or_else(|| DEFAULT_Y_CAPTION.to_string()),
                group: self.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            }
        } else {
            let kind = self.chart.as_deref().unwrap_or(DEFAULT_CHART).parse()?;
            Mode::Table { template, kind }
        };

        Ok(ChartRequest {
            title: self.title.unwrap_or_else(|| display_name.clone()),
            page,
            display_name,
            project,
            mode,
            strict_rows: self.strict.unwrap_or(false),
        })
    }
}

/// The project's domain is everything after its first dot.
fn check_domain(project: &str) -> Result<(), ConfigError> {
    let domain = project.split_once('.').map(|(_, d)| d).unwrap_or("");
    if AUTHORISED_DOMAINS.contains(&domain) {
        Ok(())
    } else {
        Err(ConfigError::UnauthorisedDomain(domain.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_page(page: &str) -> RequestSettings {
        RequestSettings {
            page: Some(page.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_to_motion_chart_on_english_wikipedia() {
        let req = with_page("User:Al Maghi/Growth").resolve().unwrap();
        assert_eq!(req.page, "User:Al_Maghi/Growth");
        assert_eq!(req.display_name, "User:Al Maghi/Growth");
        assert_eq!(req.title, "User:Al Maghi/Growth");
        assert_eq!(req.project, "en.wikipedia.org");
        assert_eq!(
            req.mode,
            Mode::Motion {
                x_caption: "x axis".into(),
                y_caption: "y axis".into(),
                group: "Labels".into(),
            }
        );
        assert!(!req.strict_rows);
    }

    #[test]
    fn table_mode_with_chart_kind() {
        let settings = RequestSettings {
            template: Some("visualizer".into()),
            chart: Some("scatter".into()),
            title: Some("Sizes".into()),
            ..with_page("Template:Visualizer/Scatter")
        };
        let req = settings.resolve().unwrap();
        assert_eq!(
            req.mode,
            Mode::Table {
                template: "visualizer".into(),
                kind: ChartKind::Scatter
            }
        );
        assert_eq!(req.title, "Sizes");
    }

    #[test]
    fn missing_page() {
        for settings in [RequestSettings::default(), with_page(""), with_page("_")] {
            assert!(matches!(
                settings.resolve(),
                Err(ConfigError::MissingParameter("page"))
            ));
        }
    }

    #[test]
    fn rejects_unknown_domain() {
        let settings = RequestSettings {
            project: Some("en.example.com".into()),
            ..with_page("Foo")
        };
        assert!(matches!(
            settings.resolve(),
            Err(ConfigError::UnauthorisedDomain(d)) if d == "example.com"
        ));
        let settings = RequestSettings {
            project: Some("fr.wiktionary.org".into()),
            ..with_page("Foo")
        };
        assert!(settings.resolve().is_ok());
    }

    #[test]
    fn rejects_unknown_chart() {
        let settings = RequestSettings {
            template: Some("visualizer".into()),
            chart: Some("radar".into()),
            ..with_page("Foo")
        };
        assert!(matches!(
            settings.resolve(),
            Err(ConfigError::InvalidChartType(c)) if c == "radar"
        ));
    }

    #[test]
    fn later_settings_win() {
        let env = RequestSettings {
            project: Some("de.wikipedia.org".into()),
            chart: Some("bar".into()),
            ..with_page("Env")
        };
        let cli = RequestSettings {
            chart: Some("line".into()),
            ..Default::default()
        };
        let merged = env.merge(cli);
        assert_eq!(merged.page.as_deref(), Some("Env"));
        assert_eq!(merged.project.as_deref(), Some("de.wikipedia.org"));
        assert_eq!(merged.chart.as_deref(), Some("line"));
    }
}
