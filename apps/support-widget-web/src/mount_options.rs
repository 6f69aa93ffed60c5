use support_widget_core::config::DEFAULT_BASE_URL;
use support_widget_core::{ConfigError, WidgetConfig};

/// Where the base URL came from, for the boot log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BaseUrlSource {
    MountArgument,
    PageGlobal,
    Default,
}

impl BaseUrlSource {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::MountArgument => "mount_argument",
            Self::PageGlobal => "page_global",
            Self::Default => "default_local",
        }
    }
}

/// An explicit mount argument wins over the page global; blank values are
/// treated as absent.
pub(crate) fn resolve_mount_config(
    mount_argument: Option<&str>,
    page_global: Option<&str>,
) -> Result<(WidgetConfig, BaseUrlSource), ConfigError> {
    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|value| !value.is_empty())
    }

    let (base_url, source) = match (non_blank(mount_argument), non_blank(page_global)) {
        (Some(base_url), _) => (base_url, BaseUrlSource::MountArgument),
        (None, Some(base_url)) => (base_url, BaseUrlSource::PageGlobal),
        (None, None) => (DEFAULT_BASE_URL, BaseUrlSource::Default),
    };
    Ok((WidgetConfig::new(base_url)?, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_argument_wins_over_page_global() {
        let (config, source) = resolve_mount_config(
            Some("https://help.example.com/api/"),
            Some("https://other.example.com/api"),
        )
        .expect("config");
        assert_eq!(config.base_url, "https://help.example.com/api");
        assert_eq!(source, BaseUrlSource::MountArgument);
    }

    #[test]
    fn blank_argument_falls_through_to_global_then_default() {
        let (config, source) =
            resolve_mount_config(Some("  "), Some("https://help.example.com/api")).expect("config");
        assert_eq!(config.base_url, "https://help.example.com/api");
        assert_eq!(source.as_str(), "page_global");

        let (config, source) = resolve_mount_config(None, None).expect("config");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(source, BaseUrlSource::Default);
    }

    #[test]
    fn malformed_global_is_rejected() {
        assert!(matches!(
            resolve_mount_config(None, Some("ftp://example.com")),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
