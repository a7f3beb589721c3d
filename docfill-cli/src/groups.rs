use std::path::Path;

use docfill::{PlaceholderGroup, Template, placeholder::available_slot_indices, traits::Loader};
use serde::Serialize;

use crate::CliError;

#[derive(Debug, Serialize)]
pub struct GroupsOutput {
    pub placeholders: Vec<String>,
    pub groups: Vec<PlaceholderGroup>,
    pub slots: Vec<u32>,
}

pub fn run_groups(template: &Path) -> Result<GroupsOutput, CliError> {
    let template = Template::read_from(template)?;
    let groups = template.groups();
    let slots = available_slot_indices(&groups);
    Ok(GroupsOutput {
        placeholders: template.placeholders().to_vec(),
        groups,
        slots,
    })
}
