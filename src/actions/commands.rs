use crate::{
    actions::{ActionBar, ActionStates},
    AppState,
};

fn action_bar_from_state(state: &AppState) -> ActionBar {
    state.actions.clone()
}

pub async fn save_draft(state: &AppState) -> Result<ActionStates, String> {
    let bar = action_bar_from_state(state);
    bar.save_draft().await.map_err(|e| e.to_string())?;
    Ok(bar.states().await)
}

pub async fn finalize_report(state: &AppState) -> Result<ActionStates, String> {
    let bar = action_bar_from_state(state);
    bar.finalize_report().await.map_err(|e| e.to_string())?;
    Ok(bar.states().await)
}

pub async fn get_action_states(state: &AppState) -> Result<ActionStates, String> {
    Ok(action_bar_from_state(state).states().await)
}
