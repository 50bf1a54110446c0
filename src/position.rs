use url::Url;

use crate::formats::Milestone;
use crate::resolve::{same_modulo_trailing_slash, split_fragment};

/// Ordinal of the milestone `requested_url` points at, or 0 (the cover page)
/// when nothing matches. Marks exactly that milestone active.
pub fn resolve_position(requested_url: &str, base_url: &str, milestones: &mut [Milestone]) -> u32 {
    let ordinal = match_ordinal(requested_url, base_url, milestones);
    for milestone in milestones.iter_mut() {
        milestone.is_active = ordinal != 0 && milestone.ordinal == ordinal;
    }
    ordinal
}

fn match_ordinal(requested_url: &str, base_url: &str, milestones: &[Milestone]) -> u32 {
    let (requested, _) = split_fragment(requested_url);

    if let Some(m) = milestones
        .iter()
        .find(|m| same_modulo_trailing_slash(requested, &m.url))
    {
        return m.ordinal;
    }

    if let Some(requested_path) = path_of(requested)
        && let Some(m) = milestones.iter().find(|m| {
            path_of(&m.url).is_some_and(|p| same_modulo_trailing_slash(&requested_path, &p))
        })
    {
        return m.ordinal;
    }

    if same_modulo_trailing_slash(requested, split_fragment(base_url).0) {
        tracing::debug!(url = requested_url, "resolved to journey cover page");
    } else {
        tracing::debug!(
            url = requested_url,
            base_url,
            "url matches no milestone; treating it as the cover page"
        );
    }
    0
}

fn path_of(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.path().to_owned())
}
