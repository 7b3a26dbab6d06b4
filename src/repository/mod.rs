//! Data access the workflow depends on, injected rather than read from globals.

pub mod commands;
pub mod fixtures;

use std::sync::{RwLock, RwLockReadGuard};

use anyhow::{bail, Result};
use log::info;

use crate::models::{ConsultType, Patient};

pub trait PatientRepository: Send + Sync {
    fn list_patients(&self) -> Result<Vec<Patient>>;

    fn find_patient(&self, id: &str) -> Result<Option<Patient>> {
        Ok(self
            .list_patients()?
            .into_iter()
            .find(|patient| patient.id == id))
    }

    /// Case-insensitive substring match on the patient name.
    fn search_patients(&self, term: &str) -> Result<Vec<Patient>> {
        let needle = term.trim().to_lowercase();
        let patients = self.list_patients()?;
        if needle.is_empty() {
            return Ok(patients);
        }
        Ok(patients
            .into_iter()
            .filter(|patient| patient.name.to_lowercase().contains(&needle))
            .collect())
    }
}

pub trait ConsultTypeCatalog: Send + Sync {
    fn consult_types(&self) -> Vec<ConsultType>;
}

pub struct InMemoryRepository {
    patients: RwLock<Vec<Patient>>,
}

impl InMemoryRepository {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients: RwLock::new(patients),
        }
    }

    pub fn with_fixtures() -> Self {
        let patients = fixtures::default_patients();
        info!("Seeded in-memory repository with {} patients", patients.len());
        Self::new(patients)
    }

    pub fn insert_patient(&self, patient: Patient) -> Result<()> {
        let mut guard = self
            .patients
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.iter().any(|existing| existing.id == patient.id) {
            bail!("patient {} already exists", patient.id);
        }
        guard.push(patient);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Patient>> {
        self.patients
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PatientRepository for InMemoryRepository {
    fn list_patients(&self) -> Result<Vec<Patient>> {
        Ok(self.read().clone())
    }

    fn find_patient(&self, id: &str) -> Result<Option<Patient>> {
        Ok(self.read().iter().find(|patient| patient.id == id).cloned())
    }
}

impl ConsultTypeCatalog for InMemoryRepository {
    fn consult_types(&self) -> Vec<ConsultType> {
        ConsultType::ALL.to_vec()
    }
}
