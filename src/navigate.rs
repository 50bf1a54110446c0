//! Next/previous over an already resolved milestone list.

use crate::formats::Milestone;

/// URL of the page after `current`. From the cover page this is milestone 1.
pub fn next_url(current: u32, milestones: &[Milestone]) -> Option<&str> {
    let total = milestones.len();
    let current = current as usize;
    if current >= total {
        return None;
    }
    milestones.get(current).map(|m| m.url.as_str())
}

/// URL of the page before `current`. The cover page is never reached this way.
pub fn previous_url(current: u32, milestones: &[Milestone]) -> Option<&str> {
    let current = current as usize;
    if current <= 1 || current > milestones.len() {
        return None;
    }
    milestones.get(current - 2).map(|m| m.url.as_str())
}
