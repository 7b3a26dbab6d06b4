use crate::models::Patient;

/// Patients the dashboard ships with until a real backend is wired in.
pub fn default_patients() -> Vec<Patient> {
    vec![
        Patient::new("12345", "Mariana Costa"),
        Patient::new("12346", "Pedro Almeida"),
        Patient::new("12347", "Juliana Santos"),
        Patient::new("12348", "Rafael Mendes"),
    ]
}
