use crate::{
    models::{ConsultType, Patient},
    AppState,
};

pub fn list_patients(state: &AppState) -> Result<Vec<Patient>, String> {
    state.repository.list_patients().map_err(|e| e.to_string())
}

pub fn search_patients(state: &AppState, term: String) -> Result<Vec<Patient>, String> {
    state
        .repository
        .search_patients(&term)
        .map_err(|e| e.to_string())
}

pub fn list_consult_types(state: &AppState) -> Result<Vec<ConsultType>, String> {
    Ok(state.catalog.consult_types())
}
