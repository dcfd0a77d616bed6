use crate::prelude::{WorkflowError, WorkflowResult};

/// Fixed set of top-level UI sections. Exactly one is visible at a
/// time; selecting an unknown name is a contained, non-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Detect,
    Activity,
    About,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Detect, Section::Activity, Section::About];

    pub fn name(self) -> &'static str {
        match self {
            Section::Detect => "detect",
            Section::Activity => "activity",
            Section::About => "about",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Detect => "Detect",
            Section::Activity => "Activity",
            Section::About => "About",
        }
    }

    pub fn from_name(name: &str) -> WorkflowResult<Self> {
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.name() == name)
            .ok_or_else(|| WorkflowError::UnknownSection(name.to_string()))
    }
}

impl Default for Section {
    fn default() -> Self {
        Section::Detect
    }
}
