use serde::Deserialize;

/// Display name used when the forge omits a repository's name.
pub const UNNAMED_REPOSITORY: &str = "Unnamed Repository";

/// One entry of the forge's repository listing.
///
/// Only the fields the mirror needs are deserialized; everything else in the
/// Gitea payload is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
}

impl RepositoryDescriptor {
    pub fn new(name: &str, clone_url: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            clone_url: clone_url.map(str::to_string),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNNAMED_REPOSITORY)
    }

    /// Clone URL, treating an empty string as absent.
    pub fn clone_url(&self) -> Option<&str> {
        self.clone_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Name of the subdirectory this repository is cloned into.
    ///
    /// Falls back to the last segment of the clone URL (minus `.git`), which is
    /// what `git clone` itself would pick.
    pub fn directory_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }

        let url = self.clone_url()?.trim_end_matches('/');
        let segment = url.rsplit(|c| c == '/' || c == ':').next()?;
        let segment = segment.strip_suffix(".git").unwrap_or(segment);
        if segment.is_empty() {
            None
        } else {
            Some(segment.to_string())
        }
    }
}

/// Whether `name` can be joined onto the target directory without escaping it.
pub fn is_safe_directory_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
