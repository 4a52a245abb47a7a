//! Builder for application input.

use jobtrack::{ApplicationInput, NumericInput};

pub struct ApplicationBuilder {
    input: ApplicationInput,
}

impl ApplicationBuilder {
    /// A valid application referencing the given status and last step.
    pub fn new(status: i64, last_step: i64) -> Self {
        Self {
            input: ApplicationInput {
                company: Some("Acme".to_string()),
                title: Some("SWE".to_string()),
                applied_on: Some("2024-01-15".to_string()),
                status: Some(status),
                last_step: Some(last_step),
                ..Default::default()
            },
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.input.id = Some(id);
        self
    }

    pub fn company(mut self, company: &str) -> Self {
        self.input.company = Some(company.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.input.title = Some(title.to_string());
        self
    }

    pub fn link(mut self, link: &str) -> Self {
        self.input.link = Some(link.to_string());
        self
    }

    pub fn applied_on(mut self, applied_on: &str) -> Self {
        self.input.applied_on = Some(applied_on.to_string());
        self
    }

    pub fn salary(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.input.salary_min = min.map(NumericInput::Number);
        self.input.salary_max = max.map(NumericInput::Number);
        self
    }

    pub fn salary_text(mut self, min: &str, max: &str) -> Self {
        self.input.salary_min = Some(NumericInput::Text(min.to_string()));
        self.input.salary_max = Some(NumericInput::Text(max.to_string()));
        self
    }

    pub fn status(mut self, status: Option<i64>) -> Self {
        self.input.status = status;
        self
    }

    pub fn last_step(mut self, last_step: Option<i64>) -> Self {
        self.input.last_step = last_step;
        self
    }

    pub fn modality(mut self, modality: Option<i64>) -> Self {
        self.input.modality = modality;
        self
    }

    pub fn last_updated(mut self, last_updated: &str) -> Self {
        self.input.last_updated = Some(last_updated.to_string());
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.input.notes = Some(notes.to_string());
        self
    }

    pub fn build(self) -> ApplicationInput {
        self.input
    }
}
