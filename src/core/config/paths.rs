use directories::ProjectDirs;

/// Platform directories for config and credential files.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "lilith-engine", "lilith")
}
