use std::path::{Path, PathBuf};

/// An untrusted entry read from the archive headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveMember {
    pub path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: MemberKind,
}

impl ArchiveMember {
    pub fn new(path: impl Into<PathBuf>, size: u64, mode: Option<u32>, kind: MemberKind) -> Self {
        Self {
            path: path.into(),
            size,
            mode,
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, MemberKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, MemberKind::Directory)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, MemberKind::Symlink { .. })
    }

    pub fn link_target(&self) -> Option<&Path> {
        match &self.kind {
            MemberKind::Symlink { target } | MemberKind::Hardlink { target } => Some(target),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
    /// Target is relative to the directory containing the link.
    Symlink { target: PathBuf },
    /// Target is relative to the archive root.
    Hardlink { target: PathBuf },
    /// Devices, FIFOs and unknown type flags. Never written.
    Unsupported { type_flag: u8 },
}

/// A member whose destination has passed containment checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedMember {
    pub member: ArchiveMember,
    /// Absolute, normalized path under the extraction root.
    pub destination: PathBuf,
    /// Absolute, normalized link target for symlinks and hardlinks.
    pub resolved_target: Option<PathBuf>,
}

/// Every member of an archive, validated against one extraction root.
///
/// Only obtainable from [`crate::validate_members`], so holding a plan means
/// no member can escape `root`.
#[derive(Clone, Debug)]
pub struct ExtractionPlan {
    pub(crate) root: PathBuf,
    pub(crate) members: Vec<ValidatedMember>,
}

impl ExtractionPlan {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn members(&self) -> &[ValidatedMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.members
            .iter()
            .filter(|m| m.member.is_file())
            .map(|m| m.member.size)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_fields() {
        let member = ArchiveMember::new("paper.tex", 1024, Some(0o644), MemberKind::File);
        assert_eq!(member.path, PathBuf::from("paper.tex"));
        assert_eq!(member.size, 1024);
        assert!(member.is_file());
        assert!(!member.is_directory());
        assert!(!member.is_symlink());
        assert_eq!(member.link_target(), None);
    }

    #[test]
    fn member_symlink() {
        let member = ArchiveMember::new(
            "figs/current.png",
            0,
            Some(0o777),
            MemberKind::Symlink {
                target: PathBuf::from("v2.png"),
            },
        );
        assert!(member.is_symlink());
        assert_eq!(member.link_target(), Some(Path::new("v2.png")));
    }

    #[test]
    fn member_hardlink_target() {
        let member = ArchiveMember::new(
            "copy.tex",
            0,
            None,
            MemberKind::Hardlink {
                target: PathBuf::from("paper.tex"),
            },
        );
        assert!(!member.is_symlink());
        assert_eq!(member.link_target(), Some(Path::new("paper.tex")));
    }

    #[test]
    fn plan_total_bytes_counts_files_only() {
        let root = PathBuf::from("/data/2411.00148");
        let plan = ExtractionPlan {
            root: root.clone(),
            members: vec![
                ValidatedMember {
                    member: ArchiveMember::new("figs", 0, None, MemberKind::Directory),
                    destination: root.join("figs"),
                    resolved_target: None,
                },
                ValidatedMember {
                    member: ArchiveMember::new("figs/a.png", 300, None, MemberKind::File),
                    destination: root.join("figs/a.png"),
                    resolved_target: None,
                },
                ValidatedMember {
                    member: ArchiveMember::new("paper.tex", 200, None, MemberKind::File),
                    destination: root.join("paper.tex"),
                    resolved_target: None,
                },
            ],
        };
        assert_eq!(plan.len(), 3);
        assert!(!plan.is_empty());
        assert_eq!(plan.total_bytes(), 500);
        assert_eq!(plan.root(), root.as_path());
    }
}
