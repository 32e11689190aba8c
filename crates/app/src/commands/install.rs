use super::emit;
use super::sync::short_commit;
use crate::cli::{OutputFormat, ScopeArg, UninstallScopeArg};
use crate::Skillix;
use anyhow::Result;
use skillix_sync::{InstallOptions, InstallOutcome, ScopedInstall, UninstallOutcome};
use std::fmt::Write;

/// Handle the `install` command.
pub(crate) fn handle_install_command(
    app: &Skillix,
    name: String,
    source: Option<String>,
    scope: ScopeArg,
    force: bool,
    format: OutputFormat,
) -> Result<()> {
    let opts = InstallOptions {
        source,
        scope: scope.into(),
        force,
    };
    let outcome = app.install(&name, &opts)?;
    emit(format, &outcome, render_install)
}

pub(crate) fn render_install(outcome: &InstallOutcome) -> String {
    format!(
        "{} {} ({}) from {} @ {} -> {}\n",
        if outcome.replaced { "Reinstalled" } else { "Installed" },
        outcome.name,
        outcome.scope,
        outcome.source_name,
        short_commit(&outcome.commit),
        outcome.path.display()
    )
}

/// Handle the `uninstall` command.
pub(crate) fn handle_uninstall_command(
    app: &Skillix,
    name: String,
    scope: UninstallScopeArg,
    format: OutputFormat,
) -> Result<()> {
    let outcome = app.uninstall(&name, scope.into())?;
    emit(format, &outcome, render_uninstall)
}

pub(crate) fn render_uninstall(outcome: &UninstallOutcome) -> String {
    format!(
        "Removed {} ({}) from {}\n",
        outcome.name,
        outcome.scope,
        outcome.path.display()
    )
}

/// Handle the `list` command.
pub(crate) fn handle_list_command(
    app: &Skillix,
    scope: Option<ScopeArg>,
    format: OutputFormat,
) -> Result<()> {
    let installed = app.list(scope.map(Into::into))?;
    emit(format, &installed, |i| render_list(i))
}

pub(crate) fn render_list(installed: &[ScopedInstall]) -> String {
    if installed.is_empty() {
        return "No skills installed.\n".to_string();
    }
    let mut out = String::new();
    for entry in installed {
        let _ = writeln!(
            out,
            "{:<8} {:<28} {} @ {}",
            entry.scope,
            entry.skill.name,
            entry.skill.source_name,
            short_commit(&entry.skill.commit)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillix_discovery::SkillScope;
    use std::path::PathBuf;

    #[test]
    fn install_text_mentions_replacement() {
        let outcome = InstallOutcome {
            name: "pdf".into(),
            scope: SkillScope::Project,
            path: PathBuf::from("/p/.skillix/skills/pdf"),
            source_id: "github.com/org/main".into(),
            source_name: "main".into(),
            commit: "abcdef123456".into(),
            replaced: true,
        };
        assert_eq!(
            render_install(&outcome),
            "Reinstalled pdf (project) from main @ abcdef1 -> /p/.skillix/skills/pdf\n"
        );
    }

    #[test]
    fn empty_list() {
        assert_eq!(render_list(&[]), "No skills installed.\n");
    }
}
