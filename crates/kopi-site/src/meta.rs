//! Site configuration and the crawler files served at the site root.

use serde::Deserialize;

/// Site identity and deployment settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title
    pub title: String,

    /// Production URL, without trailing slash
    pub url: String,

    /// Development server host
    pub dev_host: String,

    /// Development server port
    pub dev_port: u16,

    /// Ad network publisher ID listed in ads.txt
    pub ad_publisher_id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Kopidev".to_string(),
            url: "https://kopi.dev".to_string(),
            dev_host: "localhost".to_string(),
            dev_port: 4321,
            ad_publisher_id: "pub-9343099184243971".to_string(),
        }
    }
}

impl SiteConfig {
    /// Base URL for production or the development server.
    pub fn base_url(&self, dev: bool) -> String {
        if dev {
            format!("http://{}:{}", self.dev_host, self.dev_port)
        } else {
            self.url.trim_end_matches('/').to_string()
        }
    }

    /// Absolute URL for a site path.
    pub fn create_url(&self, path: &str, dev: bool) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}{}", self.base_url(dev), path)
    }
}

/// Render robots.txt.
pub fn robots_txt(config: &SiteConfig) -> String {
    format!(
        r#"User-agent: *
Allow: /

# Sitemaps
Sitemap: {}

Disallow: /admin/
Disallow: /private/

Allow: /css/
Allow: /js/
Allow: /images/
Allow: /_astro/

Crawl-delay: 1
"#,
        config.create_url("sitemap.xml", false)
    )
}

/// Render ads.txt.
pub fn ads_txt(config: &SiteConfig) -> String {
    format!(
        "google.com, {}, DIRECT, f08c47fec0942fa0\n",
        config.ad_publisher_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_urls() {
        let config = SiteConfig::default();

        assert_eq!(config.create_url("blog", false), "https://kopi.dev/blog");
        assert_eq!(
            config.create_url("/blog", true),
            "http://localhost:4321/blog"
        );
    }

    #[test]
    fn robots_points_at_sitemap() {
        let config = SiteConfig {
            url: "https://example.com/".to_string(),
            ..Default::default()
        };

        let robots = robots_txt(&config);

        assert!(robots.starts_with("User-agent: *\nAllow: /\n"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }

    #[test]
    fn ads_lists_publisher() {
        let config = SiteConfig {
            ad_publisher_id: "pub-1".to_string(),
            ..Default::default()
        };

        assert_eq!(ads_txt(&config), "google.com, pub-1, DIRECT, f08c47fec0942fa0\n");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SiteConfig = toml::from_str(r#"title = "Other""#).unwrap();

        assert_eq!(config.title, "Other");
        assert_eq!(config.dev_port, 4321);
    }
}
