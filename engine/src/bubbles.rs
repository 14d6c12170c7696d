use blocks::{Bubble, Millis, SpriteState};

/// Copy of `state` with every bubble whose deadline is at or before `now`
/// removed. Unexpired bubbles are kept.
pub fn expire(state: &SpriteState, now: Millis) -> SpriteState {
    SpriteState {
        say: state.say.clone().filter(|b| !b.is_expired(now)),
        think: state.think.clone().filter(|b| !b.is_expired(now)),
        ..state.clone()
    }
}

/// Whether [`expire`] would change anything.
pub fn has_expired(state: &SpriteState, now: Millis) -> bool {
    let expired = |bubble: &Option<Bubble>| bubble.as_ref().is_some_and(|b| b.is_expired(now));
    expired(&state.say) || expired(&state.think)
}
