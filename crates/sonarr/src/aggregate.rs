//! Play state of seasons and shows, derived from their children.

use chrono::{DateTime, Duration, Utc};
use pith_core::{Item, PlayState, PlayStatus};

/// Combine child statuses.
///
/// No recorded state at all gives `None`; every child watched gives
/// `Watched`; any child watched or in progress gives `InProgress`;
/// anything else is `Unwatched`. Children without state count as unwatched.
pub fn aggregate_status<I>(children: I) -> Option<PlayStatus>
where
    I: IntoIterator<Item = Option<PlayStatus>>,
{
    let mut any_state = false;
    let mut all_watched = true;
    let mut any_started = false;

    for status in children {
        match status {
            Some(PlayStatus::Watched) => {
                any_state = true;
                any_started = true;
            }
            Some(PlayStatus::InProgress) => {
                any_state = true;
                any_started = true;
                all_watched = false;
            }
            Some(PlayStatus::Unwatched) => {
                any_state = true;
                all_watched = false;
            }
            None => all_watched = false,
        }
    }

    if !any_state {
        None
    } else if all_watched {
        Some(PlayStatus::Watched)
    } else if any_started {
        Some(PlayStatus::InProgress)
    } else {
        Some(PlayStatus::Unwatched)
    }
}

/// Aggregate play state for the parent `id` over `children`.
pub fn aggregate_play_state(id: &str, children: &[Item]) -> Option<PlayState> {
    aggregate_status(children.iter().map(|c| c.play_state.as_ref().map(|s| s.status)))
        .map(|status| PlayState::new(id, status))
}

/// Whether a show has something new to watch.
///
/// Looks at the most recent playable episode only: it must be unwatched and
/// scanned within `max_age` of `now`.
pub fn has_new(episodes: &[Item], now: DateTime<Utc>, max_age: Duration) -> bool {
    let Some(last) = episodes.iter().rev().find(|e| e.playable) else {
        return false;
    };
    let watched = last
        .play_state
        .as_ref()
        .is_some_and(|s| s.status == PlayStatus::Watched);
    // A window reaching past the earliest representable time covers everything.
    let recent = last
        .date_scanned
        .is_some_and(|d| now.checked_sub_signed(max_age).is_none_or(|cutoff| d > cutoff));
    !watched && recent
}
