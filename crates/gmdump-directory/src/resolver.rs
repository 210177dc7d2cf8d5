//! Nested group membership resolution with cycle detection.
//!
//! Provides:
//! - Depth-first expansion of `member` references through a [`DirectoryGateway`]
//! - Cycle detection on the current expansion path
//! - Optional max depth enforcement
//! - Deterministic merge: sort by `cn`, then keep the first entry per identity

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::entry::{Entry, CN_ATTRIBUTE, MEMBER_ATTRIBUTE, OBJECT_CLASS_ATTRIBUTE};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::Filter;
use crate::gateway::DirectoryGateway;

/// Attributes requested on every membership lookup.
pub const BASE_ATTRIBUTES: [&str; 3] = [CN_ATTRIBUTE, MEMBER_ATTRIBUTE, OBJECT_CLASS_ATTRIBUTE];

/// Resolves the transitive, de-duplicated membership of directory groups.
pub struct MembershipResolver<'g, G: DirectoryGateway + ?Sized> {
    gateway: &'g G,
    lookup_attributes: Vec<String>,
    max_depth: Option<u32>,
}

impl<'g, G: DirectoryGateway + ?Sized> MembershipResolver<'g, G> {
    /// Create a resolver that requests only [`BASE_ATTRIBUTES`].
    pub fn new(gateway: &'g G) -> Self {
        Self {
            gateway,
            lookup_attributes: BASE_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
            max_depth: None,
        }
    }

    /// Also request these attributes on every lookup, so they can be reported.
    ///
    /// Names already requested (case-insensitively) are skipped.
    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for attribute in attributes {
            let attribute = attribute.into();
            if attribute.is_empty() {
                continue;
            }
            if !self
                .lookup_attributes
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&attribute))
            {
                self.lookup_attributes.push(attribute);
            }
        }
        self
    }

    /// Fail when groups nest deeper than `max_depth` levels below a top-level group.
    ///
    /// With `0`, any nested group is an error.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Attributes requested on each membership lookup.
    pub fn lookup_attributes(&self) -> &[String] {
        &self.lookup_attributes
    }

    /// Find all groups in the subtree below `base_dn`.
    ///
    /// Only the `member` attribute is requested for these top-level groups.
    /// A base DN that does not exist is an error, not an empty result.
    #[instrument(skip(self), fields(gateway = self.gateway.display_name()))]
    pub async fn find_groups(&self, base_dn: &str) -> DirectoryResult<Vec<Entry>> {
        let groups = self
            .gateway
            .search(base_dn, &Filter::groups(), &[MEMBER_ATTRIBUTE.to_string()])
            .await?;

        info!(base_dn = %base_dn, groups = groups.len(), "Found top-level groups");
        Ok(groups)
    }

    /// Resolve the members of `top_groups` into a flat, sorted, de-duplicated list.
    ///
    /// Nested groups are replaced by their own resolved members. References
    /// that resolve to nothing, or to an object that does not exist, are
    /// skipped. Any gateway error aborts the whole
    /// resolution.
    ///
    /// # Errors
    /// * Any error returned by the gateway
    /// * [`DirectoryError::CycleDetected`] when a group is reached again while
    ///   it is still being expanded
    /// * [`DirectoryError::MaxDepthExceeded`] when a max depth is set and exceeded
    #[instrument(skip(self, top_groups), fields(top_groups = top_groups.len(), gateway = self.gateway.display_name()))]
    pub async fn resolve_members(&self, top_groups: &[Entry]) -> DirectoryResult<Vec<Entry>> {
        let mut path: Vec<String> = Vec::new();
        let members = self.resolve_groups(top_groups, &mut path).await?;

        info!(members = members.len(), "Membership resolution complete");
        Ok(members)
    }

    async fn resolve_groups(
        &self,
        groups: &[Entry],
        path: &mut Vec<String>,
    ) -> DirectoryResult<Vec<Entry>> {
        let mut members: Vec<Entry> = Vec::new();

        for group in groups {
            path.push(group.identity().to_string());
            let expanded = self.expand_group(group, path, &mut members).await;
            path.pop();
            expanded?;
        }

        Ok(sort_and_dedup(members))
    }

    async fn expand_group(
        &self,
        group: &Entry,
        path: &mut Vec<String>,
        members: &mut Vec<Entry>,
    ) -> DirectoryResult<()> {
        for member_dn in group.member_refs() {
            let lookup = self
                .gateway
                .search(
                    member_dn,
                    &Filter::membership_lookup(member_dn),
                    &self.lookup_attributes,
                )
                .await;

            let mut entries = match lookup {
                Ok(entries) => entries,
                Err(DirectoryError::NoSuchObject { .. }) => Vec::new(),
                Err(e) => return Err(e),
            };

            // Dangling reference, or not a person/group
            if entries.is_empty() {
                debug!(group = %group.identity(), member = %member_dn, "Skipping unresolved member");
                continue;
            }

            if entries[0].is_group() {
                let nested = entries.swap_remove(0);
                self.check_descent(&nested, path)?;

                debug!(
                    group = %group.identity(),
                    nested = %nested.identity(),
                    depth = path.len(),
                    "Expanding nested group"
                );

                let resolved =
                    Box::pin(self.resolve_groups(std::slice::from_ref(&nested), path)).await?;
                members.extend(resolved);
            } else {
                members.extend(entries);
            }
        }

        Ok(())
    }

    /// Refuse to expand `nested` when it is already on the path or too deep.
    fn check_descent(&self, nested: &Entry, path: &[String]) -> DirectoryResult<()> {
        if path.iter().any(|dn| dn == nested.identity()) {
            warn!(
                group = %nested.identity(),
                path = %path.join(" -> "),
                "Circular group nesting detected"
            );
            let mut cycle = path.to_vec();
            cycle.push(nested.identity().to_string());
            return Err(DirectoryError::CycleDetected {
                identity: nested.identity().to_string(),
                path: cycle,
            });
        }

        if let Some(max_depth) = self.max_depth {
            // Top-level group is at depth 0, so the nested one lands at path.len().
            if path.len() as u32 > max_depth {
                warn!(group = %nested.identity(), max_depth, "Max nesting depth exceeded");
                return Err(DirectoryError::MaxDepthExceeded {
                    identity: nested.identity().to_string(),
                    max_depth,
                });
            }
        }

        Ok(())
    }
}

/// Sort entries by `cn` and keep the first entry for each identity.
///
/// The sort is stable, so entries sharing a `cn` keep their accumulation
/// order. Entries without `cn` sort as the empty string.
pub fn sort_and_dedup(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| a.cn().cmp(b.cn()));

    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());
    entries.retain(|entry| seen.insert(entry.identity().to_string()));
    entries
}
