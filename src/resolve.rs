use url::Url;

use crate::config::{JourneyConfig, normalize_prefix};

/// Canonical content endpoint for a page plus the fallbacks to try after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub primary: String,
    pub variants: Vec<String>,
    /// Fragment of the requested URL, without the leading `#`.
    pub fragment: Option<String>,
}

impl ResolvedUrl {
    /// Primary first, then variants, in priority order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.variants.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct UrlResolver {
    journey_path_prefix: String,
    content_suffix: String,
    intro_suffixes: Vec<String>,
}

impl UrlResolver {
    pub fn new(config: &JourneyConfig) -> Self {
        Self {
            journey_path_prefix: normalize_prefix(&config.journey_path_prefix),
            content_suffix: config.content_suffix.trim_matches('/').to_owned(),
            intro_suffixes: config
                .intro_suffixes
                .iter()
                .map(|s| s.trim_matches('/'))
                .filter(|s| !s.is_empty())
                .map(|s| format!("{s}/"))
                .collect(),
        }
    }

    pub fn resolve(&self, url: &str) -> ResolvedUrl {
        let (without_fragment, fragment) = split_fragment(url);

        let Ok(mut parsed) = Url::parse(without_fragment) else {
            tracing::debug!(url, "unparseable url; using it as the only candidate");
            return ResolvedUrl {
                primary: without_fragment.to_owned(),
                variants: Vec::new(),
                fragment,
            };
        };
        parsed.set_query(None);
        parsed.set_fragment(None);

        let path = parsed.path().to_owned();
        // The suffix only counts as a whole trailing segment.
        let page_path = path
            .strip_suffix(self.content_suffix.as_str())
            .filter(|rest| rest.ends_with('/'))
            .unwrap_or(&path);
        let dir = with_trailing_slash(page_path);
        let suffix = &self.content_suffix;

        let primary = with_path(&parsed, &format!("{dir}{suffix}"));
        let mut variants = Vec::new();
        let mut push = |candidate: String| {
            if candidate != primary && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        };

        let toggled = toggle_trailing_slash(page_path);
        if !toggled.is_empty() {
            push(with_path(&parsed, &toggled));
        }

        for intro in &self.intro_suffixes {
            push(with_path(&parsed, &format!("{dir}{intro}{suffix}")));
        }

        let segments = dir
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        for strip in 1..=2 {
            if segments.len() <= strip {
                break;
            }
            let parent = segments[..segments.len() - strip].join("/");
            push(with_path(&parsed, &format!("/{parent}/{suffix}")));
        }

        ResolvedUrl {
            primary,
            variants,
            fragment,
        }
    }

    /// Root URL of the journey `url` belongs to, or `url` itself when it is not
    /// under the journey path prefix.
    pub fn base_url_of(&self, url: &str) -> String {
        let Ok(parsed) = Url::parse(url) else {
            return url.to_owned();
        };
        let Some(rest) = parsed.path().strip_prefix(&self.journey_path_prefix) else {
            return url.to_owned();
        };
        let slug = rest.split('/').next().unwrap_or_default();
        if slug.is_empty() {
            return url.to_owned();
        }

        format!(
            "{}{}{slug}/",
            parsed.origin().ascii_serialization(),
            self.journey_path_prefix
        )
    }
}

/// Absolute form of `reference`, resolved against `base` when it is relative.
/// References that cannot be resolved are returned trimmed but otherwise as is.
pub fn absolutize(reference: &str, base: &Url) -> String {
    let reference = reference.trim();
    if let Ok(absolute) = Url::parse(reference) {
        return absolute.to_string();
    }
    match base.join(reference) {
        Ok(joined) => joined.to_string(),
        Err(_) => reference.to_owned(),
    }
}

pub fn split_fragment(url: &str) -> (&str, Option<String>) {
    match url.split_once('#') {
        Some((head, fragment)) if !fragment.is_empty() => (head, Some(fragment.to_owned())),
        Some((head, _)) => (head, None),
        None => (url, None),
    }
}

pub fn toggle_trailing_slash(s: &str) -> String {
    match s.strip_suffix('/') {
        Some(trimmed) => trimmed.to_owned(),
        None => format!("{s}/"),
    }
}

/// Equal as given, or equal once one side's trailing slash is toggled.
pub fn same_modulo_trailing_slash(a: &str, b: &str) -> bool {
    a == b || a.trim_end_matches('/') == b.trim_end_matches('/')
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}

fn with_path(base: &Url, path: &str) -> String {
    let mut out = base.clone();
    out.set_path(path);
    out.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> UrlResolver {
        UrlResolver::new(&JourneyConfig::default())
    }

    #[test]
    fn primary_appends_content_suffix() {
        let resolved = resolver().resolve("https://grafana.com/docs/learning-journeys/logs/step-1/");
        assert_eq!(
            resolved.primary,
            "https://grafana.com/docs/learning-journeys/logs/step-1/unstyled.html"
        );
        assert_eq!(resolved.fragment, None);
    }

    #[test]
    fn variants_are_priority_ordered() {
        let resolved = resolver().resolve("https://grafana.com/docs/learning-journeys/logs/step-1/");
        assert_eq!(
            resolved.variants,
            vec![
                "https://grafana.com/docs/learning-journeys/logs/step-1",
                "https://grafana.com/docs/learning-journeys/logs/step-1/introduction/unstyled.html",
                "https://grafana.com/docs/learning-journeys/logs/step-1/overview/unstyled.html",
                "https://grafana.com/docs/learning-journeys/logs/unstyled.html",
                "https://grafana.com/docs/learning-journeys/unstyled.html",
            ]
        );
    }

    #[test]
    fn fragment_is_split_off_and_kept() {
        let resolved = resolver().resolve("https://grafana.com/docs/learning-journeys/logs/step-1#query");
        assert_eq!(
            resolved.primary,
            "https://grafana.com/docs/learning-journeys/logs/step-1/unstyled.html"
        );
        assert_eq!(resolved.fragment.as_deref(), Some("query"));
        assert_eq!(
            resolved.variants[0],
            "https://grafana.com/docs/learning-journeys/logs/step-1/"
        );
        assert!(resolved.candidates().all(|c| !c.contains('#')));
    }

    #[test]
    fn already_suffixed_url_is_not_suffixed_twice() {
        let resolved =
            resolver().resolve("https://grafana.com/docs/learning-journeys/logs/unstyled.html");
        assert_eq!(
            resolved.primary,
            "https://grafana.com/docs/learning-journeys/logs/unstyled.html"
        );
    }

    #[test]
    fn suffix_glued_to_a_segment_is_not_stripped() {
        let resolved = resolver().resolve("https://grafana.com/docs/foo-unstyled.html");
        assert_eq!(
            resolved.primary,
            "https://grafana.com/docs/foo-unstyled.html/unstyled.html"
        );
        assert_eq!(resolved.variants[0], "https://grafana.com/docs/foo-unstyled.html/");
        assert!(resolved.candidates().all(|c| !c.contains("foo-/")));
    }

    #[test]
    fn shallow_paths_produce_no_root_variant() {
        let resolved = resolver().resolve("https://docs.example/topic/");
        assert_eq!(resolved.primary, "https://docs.example/topic/unstyled.html");
        assert!(
            !resolved
                .variants
                .contains(&"https://docs.example/unstyled.html".to_owned())
        );
    }

    #[test]
    fn candidates_are_unique() {
        let resolved = resolver().resolve("https://docs.example/a/b/c");
        let all = resolved.candidates().collect::<Vec<_>>();
        let mut deduped = all.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(all.len(), deduped.len());
        assert_eq!(all[0], "https://docs.example/a/b/c/unstyled.html");
    }

    #[test]
    fn unparseable_url_is_its_own_candidate() {
        let resolved = resolver().resolve("not a url");
        assert_eq!(resolved.primary, "not a url");
        assert!(resolved.variants.is_empty());
    }

    #[test]
    fn base_url_extracts_journey_root() {
        let r = resolver();
        assert_eq!(
            r.base_url_of("https://grafana.com/docs/learning-journeys/logs/step-3/#x"),
            "https://grafana.com/docs/learning-journeys/logs/"
        );
        assert_eq!(
            r.base_url_of("https://grafana.com/docs/learning-journeys/logs"),
            "https://grafana.com/docs/learning-journeys/logs/"
        );
    }

    #[test]
    fn base_url_of_foreign_url_is_unchanged() {
        let r = resolver();
        assert_eq!(
            r.base_url_of("https://grafana.com/docs/grafana/latest/"),
            "https://grafana.com/docs/grafana/latest/"
        );
        assert_eq!(
            r.base_url_of("https://grafana.com/docs/learning-journeys/"),
            "https://grafana.com/docs/learning-journeys/"
        );
    }

    #[test]
    fn absolutize_resolves_relative_and_scheme_relative() {
        let host = Url::parse("https://grafana.com/").unwrap();
        assert_eq!(
            absolutize("/media/docs/a.png", &host),
            "https://grafana.com/media/docs/a.png"
        );
        assert_eq!(
            absolutize("//cdn.example/a.png", &host),
            "https://cdn.example/a.png"
        );
        assert_eq!(
            absolutize("https://other.example/x", &host),
            "https://other.example/x"
        );
        let page = Url::parse("https://grafana.com/docs/learning-journeys/logs/step-1/").unwrap();
        assert_eq!(
            absolutize("img/chart.svg", &page),
            "https://grafana.com/docs/learning-journeys/logs/step-1/img/chart.svg"
        );
    }

    #[test]
    fn trailing_slash_helpers() {
        assert_eq!(toggle_trailing_slash("/a/"), "/a");
        assert_eq!(toggle_trailing_slash("/a"), "/a/");
        assert!(same_modulo_trailing_slash("https://x/a/", "https://x/a"));
        assert!(!same_modulo_trailing_slash("https://x/a/", "https://x/ab"));
    }
}
