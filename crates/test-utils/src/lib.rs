//! Test helpers shared by the skillix crates: env var guards and on-disk
//! fixtures for skill storage and fake catalogue remotes.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Process-wide lock for tests that touch `SKILLIX_*` or other env vars.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Puts an env var back the way it was when dropped.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

/// Sets (or with `None`, removes) `key` until the returned guard drops.
///
/// ```
/// let _home = skillix_test_utils::set_env_var("SKILLIX_HOME", Some("/tmp/skillix-doc"));
/// assert_eq!(std::env::var("SKILLIX_HOME").unwrap(), "/tmp/skillix-doc");
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    match value {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }
    EnvVarGuard { key, previous }
}

/// Render a SKILL.md descriptor with standard front matter.
pub fn skill_markdown(name: &str, description: &str, tags: &[&str]) -> String {
    let mut out = format!("---\nname: {name}\ndescription: {description}\n");
    if !tags.is_empty() {
        out.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    }
    out.push_str(&format!("---\n# {name}\n\nInstructions for {name}.\n"));
    out
}

/// Standard test fixture with a global root, a project root, and room for
/// fake remote catalogues.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Global skillix root (`$HOME/.skillix` in the temp environment).
    pub global_root: PathBuf,
    /// A project checkout; its `.skillix` directory is [`TestFixture::project_dir`].
    pub project_root: PathBuf,
    /// Parent directory for fake remote catalogue repositories.
    pub remotes: PathBuf,
}

impl TestFixture {
    /// Creates:
    /// - `<tmp>/home/.skillix/skills/`
    /// - `<tmp>/project/.skillix/skills/`
    /// - `<tmp>/remotes/`
    ///
    /// Does NOT set any env var - use [`TestFixture::home_guard`] for that.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let global_root = tempdir.path().join("home/.skillix");
        let project_root = tempdir.path().join("project");
        let remotes = tempdir.path().join("remotes");

        std::fs::create_dir_all(global_root.join("skills"))?;
        std::fs::create_dir_all(project_root.join(".skillix/skills"))?;
        std::fs::create_dir_all(&remotes)?;

        Ok(Self {
            tempdir,
            global_root,
            project_root,
            remotes,
        })
    }

    /// The project's `.skillix` directory.
    pub fn project_dir(&self) -> PathBuf {
        self.project_root.join(".skillix")
    }

    /// Create an RAII guard that points `SKILLIX_HOME` at this fixture.
    pub fn home_guard(&self) -> EnvVarGuard {
        set_env_var("SKILLIX_HOME", Some(self.global_root.to_str().unwrap()))
    }

    /// Create a skill in `scope` ("global" or "project").
    ///
    /// Returns the path to the skill directory.
    pub fn create_skill(
        &self,
        scope: &str,
        name: &str,
        description: &str,
        tags: &[&str],
    ) -> std::io::Result<PathBuf> {
        let base = match scope {
            "project" => self.project_dir(),
            _ => self.global_root.clone(),
        };
        let skill_dir = base.join("skills").join(name);
        std::fs::create_dir_all(&skill_dir)?;
        std::fs::write(
            skill_dir.join("SKILL.md"),
            skill_markdown(name, description, tags),
        )?;
        Ok(skill_dir)
    }

    /// Create a fake remote catalogue at `<tmp>/remotes/<repo>` with a
    /// `skills/<name>/SKILL.md` per entry of `(name, description)`.
    pub fn create_remote(&self, repo: &str, skills: &[(&str, &str)]) -> std::io::Result<PathBuf> {
        let root = self.remotes.join(repo);
        for (name, description) in skills {
            write_catalogue_skill(&root, name, &skill_markdown(name, description, &[]))?;
        }
        if skills.is_empty() {
            std::fs::create_dir_all(&root)?;
        }
        Ok(root)
    }
}

/// Write `skills/<dir>/SKILL.md` under a catalogue root.
pub fn write_catalogue_skill(root: &Path, dir: &str, content: &str) -> std::io::Result<PathBuf> {
    let skill_dir = root.join("skills").join(dir);
    std::fs::create_dir_all(&skill_dir)?;
    std::fs::write(skill_dir.join("SKILL.md"), content)?;
    Ok(skill_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_guard_is_reentrant_across_tests() {
        let _g = env_guard();
    }

    #[test]
    fn set_env_var_restores_unset_var() {
        let _g = env_guard();

        const KEY: &str = "SKILLIX_TEST_UTILS_TEST_VAR";
        std::env::remove_var(KEY);

        {
            let _guard = set_env_var(KEY, Some("test_value"));
            assert_eq!(std::env::var(KEY).ok(), Some("test_value".to_string()));
        }
        assert!(std::env::var(KEY).is_err());
    }

    #[test]
    fn set_env_var_none_removes_then_restores() {
        let _g = env_guard();

        const KEY: &str = "SKILLIX_TEST_REMOVE_VAR";
        std::env::set_var(KEY, "exists");

        {
            let _guard = set_env_var(KEY, None);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok(), Some("exists".to_string()));

        std::env::remove_var(KEY);
    }

    #[test]
    fn fixture_lays_out_roots() {
        let fixture = TestFixture::new().expect("fixture creation");
        assert!(fixture.global_root.join("skills").is_dir());
        assert!(fixture.project_dir().join("skills").is_dir());
        assert!(fixture.remotes.is_dir());
    }

    #[test]
    fn create_skill_targets_scope() {
        let fixture = TestFixture::new().expect("fixture creation");
        let global = fixture
            .create_skill("global", "g-skill", "Global one", &["a"])
            .expect("create skill");
        let project = fixture
            .create_skill("project", "p-skill", "Project one", &[])
            .expect("create skill");

        assert!(global.starts_with(&fixture.global_root));
        assert!(project.starts_with(fixture.project_dir()));
        let content = std::fs::read_to_string(global.join("SKILL.md")).unwrap();
        assert!(content.contains("name: g-skill"));
        assert!(content.contains("tags: [a]"));
    }

    #[test]
    fn create_remote_writes_catalogue() {
        let fixture = TestFixture::new().expect("fixture creation");
        let remote = fixture
            .create_remote("catalogue", &[("one", "First"), ("two", "Second")])
            .expect("remote");
        assert!(remote.join("skills/one/SKILL.md").is_file());
        assert!(remote.join("skills/two/SKILL.md").is_file());
    }

    #[test]
    fn home_guard_points_at_global_root() {
        let _g = env_guard();
        let fixture = TestFixture::new().expect("fixture creation");

        let original = std::env::var("SKILLIX_HOME").ok();
        {
            let _home_guard = fixture.home_guard();
            let new_home = std::env::var("SKILLIX_HOME").unwrap();
            assert_eq!(new_home, fixture.global_root.to_str().unwrap());
        }
        assert_eq!(std::env::var("SKILLIX_HOME").ok(), original);
    }
}
