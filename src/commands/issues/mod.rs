pub mod report_issue_command;
pub mod resolve_issue_command;
pub mod update_issue_command;

pub use report_issue_command::ReportIssueCommand;
pub use resolve_issue_command::ResolveIssueCommand;
pub use update_issue_command::UpdateIssueCommand;
