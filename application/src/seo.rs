use crate::{ApplicationError, BusinessRepository, StoreQuery};
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{Business, BusinessId};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::form_urlencoded;

/// Public identity of the directory site, used to build absolute URLs and JSON-LD.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteInfo {
    /// Absolute base URL without a trailing slash.
    pub base_url: String,
    pub locality: String,
    pub region: String,
    pub country: String,
}

impl SiteInfo {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// A single `<url>` of the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

const IMAGE_THEMES: &[(&str, &str)] = &[
    ("Restaurant", "restaurant"),
    ("Retail", "retail"),
    ("Healthcare", "healthcare"),
    ("Professional Services", "office"),
    ("Technology", "tech"),
    ("Education", "education"),
    ("Entertainment", "entertainment"),
    ("Fitness", "fitness"),
];

const STATIC_PAGES: &[(&str, &str, f32)] = &[
    ("", "daily", 1.0),
    ("/businesses", "daily", 0.9),
    ("/categories", "weekly", 0.8),
    ("/add-business", "monthly", 0.7),
    ("/contact", "monthly", 0.6),
];

/// Builds search-engine metadata: the sitemap and per-business structured data.
pub struct SeoService {
    repo: Arc<dyn BusinessRepository>,
    site: SiteInfo,
}

impl SeoService {
    pub fn new(repo: Arc<dyn BusinessRepository>, site: SiteInfo) -> Self {
        Self { repo, site }
    }

    /// Static pages, then one URL per business, then one per category.
    /// Store failures only drop the dynamic part; this never fails.
    #[instrument(skip(self))]
    pub async fn sitemap(&self) -> Vec<SitemapEntry> {
        let now = Utc::now();
        let mut entries: Vec<SitemapEntry> = STATIC_PAGES
            .iter()
            .map(|(path, change_frequency, priority)| SitemapEntry {
                loc: self.site.url(path),
                last_modified: now,
                change_frequency: *change_frequency,
                priority: *priority,
            })
            .collect();

        match self.dynamic_entries(now).await {
            Ok(dynamic) => entries.extend(dynamic),
            Err(e) => warn!("Sitemap falling back to static pages: {}", e),
        }
        info!(count = entries.len(), "Sitemap generated");
        entries
    }

    async fn dynamic_entries(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<SitemapEntry>, ApplicationError> {
        let businesses = self.repo.find(&StoreQuery::all()).await?;
        let categories = self.repo.distinct_categories().await?;

        let business_pages = businesses.iter().map(|b| SitemapEntry {
            loc: self.site.url(&format!("/business/{}", b.id)),
            last_modified: b.date_added,
            change_frequency: "weekly",
            priority: 0.8,
        });
        let category_pages = categories.iter().map(|c| SitemapEntry {
            loc: self.site.url(&format!("/businesses?category={}", encode_component(c))),
            last_modified: now,
            change_frequency: "weekly",
            priority: 0.7,
        });
        Ok(business_pages.chain(category_pages).collect())
    }

    /// schema.org `LocalBusiness` and `BreadcrumbList` documents for one business.
    #[instrument(skip(self))]
    pub async fn structured_data(&self, raw_id: &str) -> Result<Value, ApplicationError> {
        let id = BusinessId::parse(raw_id)?;
        let business = self
            .repo
            .get(&id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(id.to_string()))?;
        Ok(json!([
            self.local_business(&business),
            self.breadcrumbs(&business)
        ]))
    }

    fn local_business(&self, business: &Business) -> Value {
        let cuisine = if business.category == "Restaurant" { "American" } else { "" };
        let image = business_image_path(&business.id, &business.category);
        let mut doc = json!({
            "@context": "https://schema.org",
            "@type": "LocalBusiness",
            "name": business.name,
            "description": business.description,
            "image": self.site.url(&image),
            "url": self.site.url(&format!("/business/{}", business.id)),
            "telephone": business.phone.clone().unwrap_or_default(),
            "address": {
                "@type": "PostalAddress",
                "streetAddress": business.address,
                "addressLocality": self.site.locality,
                "addressRegion": self.site.region,
                "addressCountry": self.site.country,
            },
            "openingHours": business.hours.clone().unwrap_or_default(),
            "priceRange": "$$",
            "servesCuisine": cuisine,
            "sameAs": business.website.iter().collect::<Vec<_>>(),
        });
        if let Some(location) = business.location {
            doc["geo"] = json!({
                "@type": "GeoCoordinates",
                "latitude": location.lat,
                "longitude": location.lng,
            });
        }
        doc
    }

    fn breadcrumbs(&self, business: &Business) -> Value {
        json!({
            "@context": "https://schema.org",
            "@type": "BreadcrumbList",
            "itemListElement": [
                {
                    "@type": "ListItem",
                    "position": 1,
                    "name": "Home",
                    "item": self.site.url(""),
                },
                {
                    "@type": "ListItem",
                    "position": 2,
                    "name": "Businesses",
                    "item": self.site.url("/businesses"),
                },
                {
                    "@type": "ListItem",
                    "position": 3,
                    "name": business.name,
                    "item": self.site.url(&format!("/business/{}", business.id)),
                },
            ],
        })
    }
}

/// Placeholder image picked from the category theme and the id's character sum,
/// so a business always gets the same picture.
fn business_image_path(id: &BusinessId, category: &str) -> String {
    let theme = IMAGE_THEMES
        .iter()
        .find(|(name, _)| *name == category)
        .map_or("business", |(_, theme)| theme);
    let id_sum: u32 = id.to_string().chars().map(u32::from).sum();
    format!(
        "/placeholder.svg?height=400&width=800&text={}{}",
        theme,
        id_sum % 10 + 1
    )
}

/// Percent-encodes a query value the way `encodeURIComponent` does for spaces (`%20`).
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Renders entries as a sitemaps.org `urlset` document.
pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in entries {
        let lastmod = entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true);
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_frequency));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
