use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::pipeline::StepReport;
use crate::reconcile::ReconcileResult;
use crate::resource::ResourceAddress;

/// Renders the reconcile outcome as a tree: parent on the root, one leaf per
/// attachment.
pub fn reconcile_tree(parent_address: &ResourceAddress, result: &ReconcileResult) -> Tree<String> {
    let mut root = Tree::new(format!("{parent_address}: {}", result.parent));
    for outcome in &result.attachments {
        root.push(Tree::new(format!("{}: {}", outcome.address, outcome.status)));
    }
    root
}

#[derive(Tabled)]
struct StepRow<'a> {
    #[tabled(rename = "Step")]
    name: &'a str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: &'a str,
}

pub fn step_table(steps: &[StepReport]) -> Table {
    let rows: Vec<StepRow<'_>> = steps
        .iter()
        .map(|step| StepRow {
            name: step.name,
            status: step.status.to_string(),
            detail: &step.detail,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table
}
