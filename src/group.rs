//! Correlates artifacts of one `(train, device)` pair into release entries.
//!
//! Grouping runs in two phases. The first phase indexes every artifact by its
//! group key (the base filename, with a bootloader variant suffix stripped for
//! variant images). The second phase walks the artifacts in scan order and,
//! the first time a key is seen, drains that key's bucket into one
//! [`ReleaseGroup`]. Each key therefore yields exactly one group, and groups
//! appear in the order their first artifact was scanned.
//!
//! Within a bucket the first artifact in scan order wins a slot. A second
//! tarball, a second plain image, or a second image for an already present
//! bootloader variant is returned in [`Grouping::duplicates`] instead of
//! silently replacing the first one.

use std::collections::HashMap;

use crate::classify::{ArtifactDescriptor, ArtifactKind};

#[cfg(test)]
mod tests;

/// One logical release assembled from related artifacts.
#[derive(Debug)]
pub struct ReleaseGroup<'a, T> {
    /// Shared base filename
    pub key: &'a str,
    /// Update tarball
    pub file: Option<&'a T>,
    /// Plain disk image
    pub image: Option<&'a T>,
    /// Bootloader-variant images in scan order
    pub uboot: Vec<&'a T>,
}

impl<'a, T> ReleaseGroup<'a, T> {
    fn new(key: &'a str) -> Self {
        Self {
            key,
            file: None,
            image: None,
            uboot: Vec::new(),
        }
    }

    /// Every member of the group: tarball, image, then bootloader images.
    pub fn members(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.file
            .into_iter()
            .chain(self.image)
            .chain(self.uboot.iter().copied())
    }
}

/// Result of grouping one `(train, device)` artifact list.
#[derive(Debug)]
pub struct Grouping<'a, T> {
    /// Release groups in order of first appearance
    pub groups: Vec<ReleaseGroup<'a, T>>,
    /// Artifacts that lost a slot to an earlier artifact of the same group
    pub duplicates: Vec<&'a T>,
}

/// Group `artifacts` (given in scan order) into release groups.
///
/// Every input artifact ends up either in exactly one group or in
/// `duplicates`.
pub fn group_artifacts<T: AsRef<ArtifactDescriptor>>(artifacts: &[T]) -> Grouping<'_, T> {
    // Phase one: key -> artifacts sharing it, in scan order.
    let mut buckets: HashMap<&str, Vec<&T>> = HashMap::new();
    for artifact in artifacts {
        buckets
            .entry(artifact.as_ref().group_key())
            .or_default()
            .push(artifact);
    }

    // Phase two: drain each bucket the first time its key comes up.
    let mut groups = Vec::new();
    let mut duplicates = Vec::new();
    for artifact in artifacts {
        let key = artifact.as_ref().group_key();
        let Some(bucket) = buckets.remove(key) else {
            continue;
        };

        let mut group = ReleaseGroup::new(key);
        for member in bucket {
            if !assign(&mut group, member) {
                duplicates.push(member);
            }
        }
        groups.push(group);
    }

    Grouping { groups, duplicates }
}

/// Places `member` into its slot, returning `false` when the slot is taken.
fn assign<'a, T: AsRef<ArtifactDescriptor>>(group: &mut ReleaseGroup<'a, T>, member: &'a T) -> bool {
    let descriptor = member.as_ref();
    let slot = match descriptor.kind {
        ArtifactKind::Tarball => &mut group.file,
        ArtifactKind::Image if descriptor.boot_variant.is_empty() => &mut group.image,
        ArtifactKind::Image => {
            let taken = group
                .uboot
                .iter()
                .any(|existing| existing.as_ref().boot_variant == descriptor.boot_variant);
            if taken {
                return false;
            }
            group.uboot.push(member);
            return true;
        }
    };

    if slot.is_some() {
        return false;
    }
    *slot = Some(member);
    true
}
