pub mod terminal;

use anyhow::{Context, Result};
use serde::Serialize;

use pixmerge::{DiffGroup, GroupSet};

/// JSON view of one difference group.
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub pixels: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl From<&DiffGroup> for GroupSummary {
    fn from(group: &DiffGroup) -> Self {
        let (x, y, _, _) = group.bounds();
        Self {
            pixels: group.len(),
            x,
            y,
            width: group.width(),
            height: group.height(),
        }
    }
}

pub fn group_summaries(groups: &GroupSet) -> Vec<GroupSummary> {
    groups.iter().map(GroupSummary::from).collect()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{out}");
    Ok(())
}
