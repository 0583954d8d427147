use uuid::Uuid;

/// Tools the remote agent needs for the pull-request task.
pub const AGENT_TOOLS: [&str; 3] = ["terminal", "file_editor", "task_tracker"];

/// Instructions for the scripted branch/edit/commit/push/PR task.
pub fn pull_request_task(branch_suffix: Uuid) -> String {
    format!(
        "You are connected to a git workspace whose remote is github.com/aweeraman/hello.

Task:
- Create a branch \"feature/update-hello-{branch_suffix}\" from main.
- Edit index.js so it logs \"Hello from OpenHands!\".
- Commit with message \"Update greeting\".
- Push the branch to GitHub.
- Open a pull request against main with title \"Update hello greeting\".
- Reply with ONLY the PR URL."
    )
}
