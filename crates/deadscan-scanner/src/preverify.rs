//! Out-of-band verification for plain navigational anchors.
//!
//! Clicking a healthy link costs a full navigation plus the cascading
//! re-snapshot of the origin route. For plain same-origin anchors an HTTP
//! existence check proves the same thing without ever leaving the page.

use reqwest::Client;
use tracing::debug;
use url::Url;

use deadscan_core::DiscoveredElement;

/// What the pre-verifier concluded about an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    /// Same-origin target answered with a non-error status.
    Healthy { destination: String },
    /// Same-origin target answered >= 400 or the request failed.
    Broken {
        destination: String,
        status: Option<u16>,
    },
    /// Cross-origin / mailto / tel: navigable, but outside auditable scope.
    External { destination: String },
}

/// Substitutes an out-of-band GET for an actual click on plain anchors.
///
/// Invariant: this path never triggers a page navigation.
pub struct LinkPreVerifier {
    http: Client,
}

impl Default for LinkPreVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkPreVerifier {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Decide whether `element` is a plain navigational anchor this
    /// verifier answers. `None` means the element must be classified live:
    /// not an anchor, no href, a hash link, a `javascript:` pseudo-link, or
    /// an unresolvable URL.
    pub async fn verdict(
        &self,
        element: &DiscoveredElement,
        page_url: &str,
    ) -> Option<LinkVerdict> {
        if element.snapshot.tag_name != "a" {
            return None;
        }
        let href = element.snapshot.href.as_deref()?.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let lower = href.to_ascii_lowercase();
        if lower.starts_with("javascript:") {
            return None;
        }
        if lower.starts_with("mailto:") || lower.starts_with("tel:") {
            return Some(LinkVerdict::External {
                destination: href.to_string(),
            });
        }

        let base = Url::parse(page_url).ok()?;
        let resolved = base.join(href).ok()?;
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            return Some(LinkVerdict::External {
                destination: resolved.into(),
            });
        }
        if resolved.origin() != base.origin() {
            return Some(LinkVerdict::External {
                destination: resolved.into(),
            });
        }

        debug!("Pre-verifying link {}", resolved);
        match self.http.get(resolved.clone()).send().await {
            Ok(response) if response.status().as_u16() < 400 => Some(LinkVerdict::Healthy {
                destination: resolved.into(),
            }),
            Ok(response) => Some(LinkVerdict::Broken {
                destination: resolved.into(),
                status: Some(response.status().as_u16()),
            }),
            Err(e) => {
                debug!("Link pre-check failed for {}: {}", resolved, e);
                Some(LinkVerdict::Broken {
                    destination: resolved.into(),
                    status: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::testutil::{anchor, anonymous_button};

    #[tokio::test]
    async fn non_anchors_and_pseudo_links_fall_through() {
        let verifier = LinkPreVerifier::new();
        let page = "https://app.test/home";

        let button = anonymous_button("#b", "B");
        assert!(verifier.verdict(&button, page).await.is_none());

        for href in ["#section", "javascript:void(0)", ""] {
            let element = anchor("#l", href, "L");
            assert!(
                verifier.verdict(&element, page).await.is_none(),
                "href {href:?} should fall through to live classification"
            );
        }
    }

    #[tokio::test]
    async fn mailto_tel_and_cross_origin_are_external() {
        let verifier = LinkPreVerifier::new();
        let page = "https://app.test/home";

        let mail = anchor("#m", "mailto:team@app.test", "Mail");
        assert_eq!(
            verifier.verdict(&mail, page).await,
            Some(LinkVerdict::External {
                destination: "mailto:team@app.test".into()
            })
        );

        let other = anchor("#o", "https://other.example/docs", "Docs");
        assert_eq!(
            verifier.verdict(&other, page).await,
            Some(LinkVerdict::External {
                destination: "https://other.example/docs".into()
            })
        );
    }

    #[tokio::test]
    async fn healthy_same_origin_link_passes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lessons"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let verifier = LinkPreVerifier::new();
        let page = format!("{}/home", server.uri());
        let element = anchor("#lessons", "/lessons", "Lessons");

        assert_eq!(
            verifier.verdict(&element, &page).await,
            Some(LinkVerdict::Healthy {
                destination: format!("{}/lessons", server.uri())
            })
        );
    }

    #[tokio::test]
    async fn missing_same_origin_link_is_broken() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let verifier = LinkPreVerifier::new();
        let page = format!("{}/home", server.uri());
        let element = anchor("#gone", "/gone", "Gone");

        assert_eq!(
            verifier.verdict(&element, &page).await,
            Some(LinkVerdict::Broken {
                destination: format!("{}/gone", server.uri()),
                status: Some(404),
            })
        );
    }

    #[tokio::test]
    async fn relative_hrefs_resolve_against_the_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/section/detail"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let verifier = LinkPreVerifier::new();
        let page = format!("{}/section/list", server.uri());
        let element = anchor("#d", "detail", "Detail");

        assert_eq!(
            verifier.verdict(&element, &page).await,
            Some(LinkVerdict::Healthy {
                destination: format!("{}/section/detail", server.uri())
            })
        );
    }
}
