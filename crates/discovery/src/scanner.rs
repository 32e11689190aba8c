use crate::frontmatter;
use crate::types::{LocalSkill, SkillRoot, SkillScope};
use crate::{Result, SKILL_FILE};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Skill storage directory under a global or project `.skillix` root.
pub fn skills_dir(base: &Path) -> PathBuf {
    base.join("skills")
}

/// Roots to read, in precedence order: project first, then global.
pub fn default_roots(global_base: &Path, project_base: Option<&Path>) -> Vec<SkillRoot> {
    let mut roots = Vec::with_capacity(2);
    if let Some(project) = project_base {
        roots.push(SkillRoot {
            root: skills_dir(project),
            scope: SkillScope::Project,
        });
    }
    roots.push(SkillRoot {
        root: skills_dir(global_base),
        scope: SkillScope::Global,
    });
    roots
}

/// Reads one skill directory. Returns `Ok(None)` when it has no descriptor.
///
/// A descriptor whose front matter fails to parse is reported as an error so
/// callers can decide whether to skip it.
pub fn read_skill(dir: &Path, scope: SkillScope) -> Result<Option<LocalSkill>> {
    let descriptor = dir.join(SKILL_FILE);
    if !descriptor.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&descriptor)?;
    let parsed = frontmatter::parse(&content)?;
    let fallback = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let meta = parsed.metadata;

    Ok(Some(LocalSkill {
        name: meta.name().map(str::to_string).unwrap_or(fallback),
        description: meta.description().map(str::to_string).unwrap_or_default(),
        version: meta.version.clone(),
        tags: meta.tags(),
        dir: dir.to_path_buf(),
        scope,
    }))
}

/// Lists every skill under the given roots.
///
/// Roots are visited in order; a skill name already seen in an earlier root
/// shadows later ones. Unreadable or malformed descriptors are skipped.
pub fn list_all_skills(roots: &[SkillRoot]) -> Vec<LocalSkill> {
    let mut skills = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for root_cfg in roots {
        if !root_cfg.root.is_dir() {
            continue;
        }
        let mut dirs: Vec<PathBuf> = WalkDir::new(&root_cfg.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        dirs.sort();

        for dir in dirs {
            match read_skill(&dir, root_cfg.scope) {
                Ok(Some(skill)) => {
                    if seen.insert(skill.name.clone()) {
                        skills.push(skill);
                    } else {
                        tracing::debug!(
                            name = %skill.name,
                            scope = %root_cfg.scope,
                            "skill shadowed by higher-precedence scope"
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(path = %dir.display(), error = %e, "skipping unreadable skill");
                }
            }
        }
    }
    skills
}

/// Looks a skill up by name, honouring root precedence.
///
/// The directory named after the skill is tried first and accepted only when
/// its front-matter name agrees; otherwise the front-matter names of every
/// skill are compared.
pub fn get_skill(roots: &[SkillRoot], name: &str) -> Option<LocalSkill> {
    for root_cfg in roots {
        let candidate = root_cfg.root.join(name);
        if let Ok(Some(skill)) = read_skill(&candidate, root_cfg.scope) {
            if skill.name == name {
                return Some(skill);
            }
        }
    }
    list_all_skills(roots).into_iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_skill(root: &Path, dir: &str, content: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(SKILL_FILE), content).unwrap();
    }

    #[test]
    fn default_roots_put_project_first() {
        let tmp = tempdir().unwrap();
        let roots = default_roots(&tmp.path().join("g"), Some(&tmp.path().join("p")));
        let scopes: Vec<_> = roots.iter().map(|r| r.scope).collect();
        assert_eq!(scopes, vec![SkillScope::Project, SkillScope::Global]);
        assert!(roots[0].root.ends_with("p/skills"));
    }

    #[test]
    fn default_roots_without_project() {
        let tmp = tempdir().unwrap();
        let roots = default_roots(tmp.path(), None);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].scope, SkillScope::Global);
    }

    #[test]
    fn project_skill_shadows_global() {
        let tmp = tempdir().unwrap();
        let global = tmp.path().join("global");
        let project = tmp.path().join("project");
        write_skill(&global, "lint", "---\nname: lint\ndescription: global lint\n---\n");
        write_skill(&project, "lint", "---\nname: lint\ndescription: project lint\n---\n");
        write_skill(&global, "fmt", "---\nname: fmt\ndescription: formatter\n---\n");

        let roots = vec![
            SkillRoot {
                root: project.clone(),
                scope: SkillScope::Project,
            },
            SkillRoot {
                root: global.clone(),
                scope: SkillScope::Global,
            },
        ];
        let skills = list_all_skills(&roots);
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].name, "lint");
        assert_eq!(skills[0].scope, SkillScope::Project);
        assert_eq!(skills[0].description, "project lint");
        assert_eq!(skills[1].name, "fmt");
    }

    #[test]
    fn malformed_descriptor_is_skipped() {
        let tmp = tempdir().unwrap();
        write_skill(tmp.path(), "bad", "---\nname: [oops\n---\n");
        write_skill(tmp.path(), "good", "---\nname: good\ndescription: ok\n---\n");
        let roots = vec![SkillRoot {
            root: tmp.path().to_path_buf(),
            scope: SkillScope::Global,
        }];
        let skills = list_all_skills(&roots);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "good");
    }

    #[test]
    fn name_falls_back_to_directory() {
        let tmp = tempdir().unwrap();
        write_skill(tmp.path(), "plain", "# Plain skill\n");
        let skill = read_skill(&tmp.path().join("plain"), SkillScope::Global)
            .unwrap()
            .unwrap();
        assert_eq!(skill.name, "plain");
        assert!(skill.description.is_empty());
    }

    #[test]
    fn get_skill_matches_frontmatter_name() {
        let tmp = tempdir().unwrap();
        write_skill(tmp.path(), "dir-name", "---\nname: real-name\ndescription: d\n---\n");
        let roots = vec![SkillRoot {
            root: tmp.path().to_path_buf(),
            scope: SkillScope::Global,
        }];
        let skill = get_skill(&roots, "real-name").unwrap();
        assert!(skill.dir.ends_with("dir-name"));
        assert!(get_skill(&roots, "missing").is_none());
    }

    #[test]
    fn get_skill_ignores_directory_with_other_frontmatter_name() {
        let tmp = tempdir().unwrap();
        write_skill(tmp.path(), "lint", "---\nname: clippy\ndescription: d\n---\n");
        let roots = vec![SkillRoot {
            root: tmp.path().to_path_buf(),
            scope: SkillScope::Global,
        }];
        assert!(get_skill(&roots, "lint").is_none());
        assert!(get_skill(&roots, "clippy").unwrap().dir.ends_with("lint"));
    }
}
