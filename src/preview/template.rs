use crate::models::{ReportSection, SectionBody};

pub const SESSION_SUMMARY: &str = "Session summary";
pub const SYMPTOMS: &str = "Symptoms / complaints";
pub const CLINICAL_EVOLUTION: &str = "Clinical evolution";
pub const DIAGNOSTIC_HYPOTHESES: &str = "Diagnostic hypotheses";
pub const ACTIONS: &str = "Actions";
pub const MEDICATIONS: &str = "Medications";
pub const THERAPEUTIC_PLAN: &str = "Therapeutic plan";

/// Section titles in display order.
pub const SECTION_ORDER: [&str; 7] = [
    SESSION_SUMMARY,
    SYMPTOMS,
    CLINICAL_EVOLUTION,
    DIAGNOSTIC_HYPOTHESES,
    ACTIONS,
    MEDICATIONS,
    THERAPEUTIC_PLAN,
];

fn paragraph(title: &str, text: &str) -> ReportSection {
    ReportSection {
        title: title.to_string(),
        body: SectionBody::Paragraph(text.to_string()),
    }
}

fn bullets(title: &str, items: &[&str]) -> ReportSection {
    ReportSection {
        title: title.to_string(),
        body: SectionBody::Bullets(items.iter().map(|item| item.to_string()).collect()),
    }
}

/// Fixed note body; nothing here depends on the consult content.
pub fn clinical_note_sections() -> Vec<ReportSection> {
    vec![
        paragraph(
            SESSION_SUMMARY,
            "Patient attended the follow-up consultation reporting partial improvement of \
             anxiety symptoms 30 days after starting medication. Panic episodes are less \
             frequent, but intermittent insomnia and excessive work-related worry persist.",
        ),
        bullets(
            SYMPTOMS,
            &[
                "Fewer panic episodes (1-2 per week, previously 4-5)",
                "Intermittent insomnia (difficulty falling asleep 2-3 times per week)",
                "Excessive worry about professional performance",
                "Improved irritability",
                "No significant medication side effects",
            ],
        ),
        paragraph(
            CLINICAL_EVOLUTION,
            "Favourable evolution since the last visit with partial response to the \
             prescribed treatment. Panic episodes and irritability decreased markedly; \
             worry and sleep difficulties remain at lower intensity. Good adherence to \
             pharmacological and psychotherapeutic treatment.",
        ),
        bullets(
            DIAGNOSTIC_HYPOTHESES,
            &[
                "F41.1 - Generalized anxiety disorder",
                "F41.0 - Panic disorder (partial remission)",
                "F51.0 - Non-organic insomnia",
            ],
        ),
        bullets(
            ACTIONS,
            &[
                "Keep current pharmacological treatment with dose adjustment",
                "Reinforce breathing techniques for anxiety management",
                "Sleep hygiene guidance",
                "Keep weekly psychotherapy",
            ],
        ),
        bullets(
            MEDICATIONS,
            &[
                "Escitalopram 15mg - 1 tablet in the morning (up from 10mg)",
                "Clonazepam 0.5mg - 1 tablet at night (unchanged)",
                "Zolpidem 5mg - 1 tablet 30 minutes before bed, if needed",
            ],
        ),
        paragraph(
            THERAPEUTIC_PLAN,
            "Psychiatric follow-up in 30 days to reassess the response to the dose \
             adjustment. Continue weekly cognitive-behavioural therapy. Monitor medication \
             effects and residual symptoms; contact the clinic if symptoms worsen.",
        ),
    ]
}
